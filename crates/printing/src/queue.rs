//! Serializes preview regeneration for a session.
//!
//! Every accepted request gets its own worker thread and cancellation token.
//! A newer request cancels the older one; only the request whose token is
//! still current when it finishes may publish, and it publishes while holding
//! the queue lock so visible results never reorder.

use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::error::{PreviewError, QueueError};
use crate::preview::{PreviewEvent, PreviewProvider, RequestId, UpdateReason};
use crate::session::{PrintSession, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Generating,
    Disposed,
}

struct QueueInner {
    current: Option<CancellationToken>,
    next_request: u64,
    disposed: bool,
    sender: Sender<PreviewEvent>,
    workers: Vec<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<QueueInner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct PreviewUpdateQueue {
    provider: Arc<dyn PreviewProvider>,
    shared: Arc<Shared>,
}

impl PreviewUpdateQueue {
    /// Creates a queue and the receiving end its events are published to.
    pub fn new(provider: Arc<dyn PreviewProvider>) -> (Self, PreviewEvents) {
        let (sender, receiver) = mpsc::channel();
        let queue = Self {
            provider,
            shared: Arc::new(Shared {
                inner: Mutex::new(QueueInner {
                    current: None,
                    next_request: 0,
                    disposed: false,
                    sender,
                    workers: Vec::new(),
                }),
            }),
        };
        (queue, PreviewEvents { rx: receiver })
    }

    pub fn state(&self) -> QueueState {
        let inner = self.shared.lock();
        if inner.disposed {
            QueueState::Disposed
        } else if inner.current.is_some() {
            QueueState::Generating
        } else {
            QueueState::Idle
        }
    }

    /// Schedules a preview for the session's current state, cancelling the
    /// request still in flight (if any).
    pub fn request_update(
        &self,
        session: &PrintSession,
        reason: UpdateReason,
    ) -> Result<RequestId, QueueError> {
        let snapshot = session.snapshot();

        let (token, superseded) = {
            let mut inner = self.shared.lock();
            if inner.disposed {
                return Err(QueueError::Disposed);
            }
            inner.next_request += 1;
            let token = CancellationToken::new(inner.next_request);
            let superseded = inner.current.replace(token.clone());
            (token, superseded)
        };
        let request = RequestId(token.request());

        if let Some(previous) = superseded {
            debug!(
                "{}: {} supersedes preview-request-{}",
                snapshot.session_id,
                request,
                previous.request()
            );
            previous.cancel();
        }

        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(&self.provider);
        let worker_token = token.clone();
        let spawned = thread::Builder::new()
            .name(format!("preview-{}", request.0))
            .spawn(move || run_request(shared, provider, snapshot, worker_token, reason));

        let mut inner = self.shared.lock();
        match spawned {
            Ok(handle) => {
                inner.workers.retain(|worker| !worker.is_finished());
                inner.workers.push(handle);
                debug!("{} scheduled ({:?})", request, reason);
                Ok(request)
            }
            Err(source) => {
                if inner
                    .current
                    .as_ref()
                    .is_some_and(|current| current.same_request(&token))
                {
                    inner.current = None;
                }
                Err(QueueError::Spawn(source))
            }
        }
    }

    /// Cancels in-flight work and rejects every later request. Idempotent.
    pub fn dispose(&self) {
        let in_flight = {
            let mut inner = self.shared.lock();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.current.take()
        };
        if let Some(token) = in_flight {
            token.cancel();
        }
        info!("preview update queue disposed");
    }

    /// Blocks until every worker started so far has finished.
    pub fn wait_for_idle(&self) {
        loop {
            let workers = mem::take(&mut self.shared.lock().workers);
            if workers.is_empty() {
                return;
            }
            for worker in workers {
                if worker.join().is_err() {
                    warn!("preview worker panicked");
                }
            }
        }
    }
}

impl Drop for PreviewUpdateQueue {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn run_request(
    shared: Arc<Shared>,
    provider: Arc<dyn PreviewProvider>,
    snapshot: Arc<SessionSnapshot>,
    token: CancellationToken,
    reason: UpdateReason,
) {
    let request = RequestId(token.request());
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        provider.create_preview(&snapshot, &token)
    }))
    .unwrap_or_else(|payload| {
        let message = panic_message(&*payload);
        warn!("{request}: preview provider panicked: {message}");
        Err(PreviewError::Provider(format!("provider panicked: {message}")))
    });

    let mut inner = shared.lock();
    let is_current = inner
        .current
        .as_ref()
        .is_some_and(|current| current.same_request(&token));
    if inner.disposed || !is_current {
        let disposed = inner.disposed;
        drop(inner);
        if disposed {
            debug!("{request}: queue disposed, dropping result");
        } else {
            debug!("{request}: discarding superseded result");
        }
        // The model's release hook runs here, outside the lock.
        drop(outcome);
        return;
    }

    inner.current = None;
    let event = match outcome {
        Ok(model) => {
            info!("{request}: preview available ({} pages)", model.page_count());
            PreviewEvent::Available {
                model,
                reason,
                request,
            }
        }
        Err(error) => {
            warn!("{request}: preview failed: {error}");
            PreviewEvent::Failed { error, request }
        }
    };
    let undelivered = inner.sender.send(event).err();
    drop(inner);
    if undelivered.is_some() {
        debug!("{request}: no event consumer left");
    }
}

/// Receiving end of a queue's preview events.
pub struct PreviewEvents {
    rx: Receiver<PreviewEvent>,
}

fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

impl PreviewEvents {
    /// Returns the next event without blocking, `None` when nothing is pending.
    /// 不阻塞地取出下一個事件；沒有待處理事件時回傳 `None`。
    pub fn try_next(&self) -> Option<PreviewEvent> {
        self.rx.try_recv().ok()
    }

    /// Blocks until the next event, or fails once the queue is gone.
    /// 阻塞等待下一個事件；佇列消失後回傳錯誤。
    pub fn recv(&self) -> Result<PreviewEvent, QueueError> {
        self.rx.recv().map_err(|_| QueueError::Disconnected)
    }

    /// Waits until the timeout, returning `None` when nothing arrived.
    /// 等待至逾時；期間沒有事件時回傳 `None`。
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<PreviewEvent>, QueueError> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }
}
