//! One print intent: options, ticket, printer and the document being printed.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::document::PrintDocument;
use crate::error::QueueError;
use crate::job::{PrintSessionId, PrintTarget, PrintTicket};
use crate::metadata::LayoutMetadata;
use crate::options::PrintOptions;
use crate::preview::{RequestId, UpdateReason};
use crate::queue::PreviewUpdateQueue;

/// Immutable view of a session captured when a preview request starts.
#[derive(Clone)]
pub struct SessionSnapshot {
    pub session_id: PrintSessionId,
    pub options: Arc<PrintOptions>,
    pub ticket: Arc<PrintTicket>,
    pub printer: Option<PrintTarget>,
    pub document: Arc<dyn PrintDocument>,
}

impl SessionSnapshot {
    pub fn layout_metadata(&self) -> LayoutMetadata {
        self.options.layout_metadata()
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("session_id", &self.session_id)
            .field("options", &self.options)
            .field("ticket", &self.ticket)
            .field("printer", &self.printer)
            .field("document", &self.document.title())
            .finish()
    }
}

pub struct PrintSession {
    id: PrintSessionId,
    options: Arc<PrintOptions>,
    ticket: Arc<PrintTicket>,
    printer: Option<PrintTarget>,
    document: Arc<dyn PrintDocument>,
    preview_queue: Option<Arc<PreviewUpdateQueue>>,
}

impl PrintSession {
    pub fn new(document: Arc<dyn PrintDocument>) -> Self {
        Self::with_options(document, PrintOptions::default())
    }

    pub fn with_options(document: Arc<dyn PrintDocument>, options: PrintOptions) -> Self {
        let ticket = PrintTicket::from_options(&options);
        Self {
            id: PrintSessionId::new(),
            options: Arc::new(options),
            ticket: Arc::new(ticket),
            printer: None,
            document,
            preview_queue: None,
        }
    }

    pub fn id(&self) -> PrintSessionId {
        self.id
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn ticket(&self) -> &PrintTicket {
        &self.ticket
    }

    pub fn printer(&self) -> Option<&PrintTarget> {
        self.printer.as_ref()
    }

    pub fn document(&self) -> &Arc<dyn PrintDocument> {
        &self.document
    }

    /// Derived from the current options on every call.
    pub fn layout_metadata(&self) -> LayoutMetadata {
        self.options.layout_metadata()
    }

    /// Routes later invalidations to `queue`. Does not request a preview.
    pub fn attach_preview_queue(&mut self, queue: Arc<PreviewUpdateQueue>) {
        self.preview_queue = Some(queue);
    }

    pub fn detach_preview_queue(&mut self) -> Option<Arc<PreviewUpdateQueue>> {
        self.preview_queue.take()
    }

    /// Edits a copy of the options and swaps it in, keeping the ticket's media
    /// and orientation in step. Snapshots taken earlier keep the old value.
    pub fn update_options<F>(&mut self, op: F) -> Result<Option<RequestId>, QueueError>
    where
        F: FnOnce(&mut PrintOptions),
    {
        let mut options = PrintOptions::clone(&self.options);
        op(&mut options);
        self.set_options(options)
    }

    pub fn set_options(&mut self, options: PrintOptions) -> Result<Option<RequestId>, QueueError> {
        let mut ticket = PrintTicket::clone(&self.ticket);
        ticket.sync_page_setup(&options);
        self.options = Arc::new(options);
        self.ticket = Arc::new(ticket);
        self.invalidate_preview(UpdateReason::OptionsChanged)
    }

    pub fn update_ticket<F>(&mut self, op: F) -> Result<Option<RequestId>, QueueError>
    where
        F: FnOnce(&mut PrintTicket),
    {
        let mut ticket = PrintTicket::clone(&self.ticket);
        op(&mut ticket);
        if let Some(printer) = &self.printer {
            ticket.constrain_to(&printer.capabilities);
        }
        self.ticket = Arc::new(ticket);
        self.invalidate_preview(UpdateReason::TicketChanged)
    }

    /// Assigns (or clears) the printer; the ticket is constrained to what it supports.
    pub fn set_printer(
        &mut self,
        printer: Option<PrintTarget>,
    ) -> Result<Option<RequestId>, QueueError> {
        if let Some(target) = &printer {
            let mut ticket = PrintTicket::clone(&self.ticket);
            ticket.constrain_to(&target.capabilities);
            self.ticket = Arc::new(ticket);
        }
        self.printer = printer;
        self.invalidate_preview(UpdateReason::PrinterChanged)
    }

    /// Asks the attached queue for a fresh preview. `Ok(None)` when detached.
    pub fn invalidate_preview(
        &self,
        reason: UpdateReason,
    ) -> Result<Option<RequestId>, QueueError> {
        match &self.preview_queue {
            Some(queue) => queue.request_update(self, reason).map(Some),
            None => {
                debug!("{}: no preview queue attached, skipping {:?}", self.id, reason);
                Ok(None)
            }
        }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::new(SessionSnapshot {
            session_id: self.id,
            options: Arc::clone(&self.options),
            ticket: Arc::clone(&self.ticket),
            printer: self.printer.clone(),
            document: Arc::clone(&self.document),
        })
    }
}

impl fmt::Debug for PrintSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintSession")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("ticket", &self.ticket)
            .field("printer", &self.printer)
            .field("document", &self.document.title())
            .field("preview_queue", &self.preview_queue.is_some())
            .finish()
    }
}
