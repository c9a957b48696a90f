use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use printingtools_printing::metadata::keys;
use printingtools_printing::{
    apply_layout, LayoutKind, LayoutMetadata, NUpOrder, PageSettings, PrintOptions, PrintPage,
    MAX_TILES_PER_AXIS,
};

const ROUNDS: usize = 64;

fn source_pages(count: usize) -> Vec<PrintPage> {
    (1..=count)
        .map(|n| PrintPage::blank(PageSettings::default()).with_page_number(n as u32))
        .collect()
}

fn layout(kind: LayoutKind) -> PrintOptions {
    PrintOptions {
        layout_kind: kind,
        ..PrintOptions::default()
    }
}

#[test]
fn derived_counts_stay_in_range_for_any_input() {
    let candidates = [
        "", "0", "-5", "1", "3", "3.7", "32", "33", "1e9", "NaN", "inf", "four", " 2 ",
    ];
    let keys = [
        keys::NUP_ROWS,
        keys::NUP_COLUMNS,
        keys::POSTER_ROWS,
        keys::POSTER_COLUMNS,
    ];
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..ROUNDS {
        let mut map = BTreeMap::new();
        for key in keys {
            if rng.random_bool(0.8) {
                let value = candidates[rng.random_range(0..candidates.len())];
                map.insert(key.to_string(), value.to_string());
            }
        }
        map.insert(keys::KIND.to_string(), "n-up".to_string());

        let metadata = LayoutMetadata::derive(&map);
        for count in [
            metadata.nup_rows,
            metadata.nup_columns,
            metadata.poster_rows,
            metadata.poster_columns,
        ] {
            assert!((1..=MAX_TILES_PER_AXIS).contains(&count), "{map:?} -> {count}");
        }
        assert!(metadata.nup_tile_count() >= 1);
        assert!(metadata.poster_tile_count() >= 1);
        assert_eq!(metadata.kind, LayoutKind::NUp);
    }
}

#[test]
fn standard_layout_is_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..ROUNDS {
        let count = rng.random_range(0..30);
        let output = apply_layout(source_pages(count), &layout(LayoutKind::Standard));
        let numbers: Vec<_> = output.iter().filter_map(|page| page.page_number).collect();
        assert_eq!(numbers, (1..=count as u32).collect::<Vec<_>>());
    }
}

#[test]
fn nup_groups_every_page_once_in_order() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..ROUNDS {
        let count = rng.random_range(0..40);
        let options = PrintOptions {
            nup_rows: rng.random_range(1..4),
            nup_columns: rng.random_range(1..4),
            nup_order: NUpOrder::TopToBottomRightToLeft,
            ..layout(LayoutKind::NUp)
        };
        let tiles = options.layout_metadata().nup_tile_count() as usize;
        let output = apply_layout(source_pages(count), &options);

        assert_eq!(output.len(), count.div_ceil(tiles));
        let sources: Vec<u32> = output.iter().flat_map(|page| page.tile_sources()).collect();
        assert_eq!(sources, (1..=count as u32).collect::<Vec<_>>());
        assert!(output.iter().all(|page| page.content.placements().len() <= tiles));
    }
}

#[test]
fn poster_emits_one_sheet_per_tile() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..ROUNDS {
        let count = rng.random_range(0..6);
        let options = PrintOptions {
            poster_rows: rng.random_range(1..4),
            poster_columns: rng.random_range(1..4),
            poster_overlap_pt: rng.random_range(0.0..12.0),
            ..layout(LayoutKind::Poster)
        };
        let tiles = options.layout_metadata().poster_tile_count() as usize;
        let output = apply_layout(source_pages(count), &options);

        assert_eq!(output.len(), count * tiles);
        for (index, sheet) in output.iter().enumerate() {
            assert_eq!(sheet.tile_sources(), vec![(index / tiles) as u32 + 1]);
        }
    }
}

#[test]
fn booklet_sheets_cover_every_page_once() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..ROUNDS {
        let count = rng.random_range(1..30);
        let options = PrintOptions {
            booklet_bind_long_edge: rng.random_bool(0.5),
            ..layout(LayoutKind::Booklet)
        };
        let output = apply_layout(source_pages(count), &options);

        assert_eq!(output.len(), count.div_ceil(4) * 2);
        let mut sources: Vec<u32> = output.iter().flat_map(|page| page.tile_sources()).collect();
        sources.sort_unstable();
        assert_eq!(sources, (1..=count as u32).collect::<Vec<_>>());
    }
}

#[test]
fn eight_page_booklet_imposition() {
    let output = apply_layout(source_pages(8), &layout(LayoutKind::Booklet));
    let sides: Vec<Vec<u32>> = output.iter().map(|page| page.tile_sources()).collect();
    assert_eq!(
        sides,
        vec![vec![8, 1], vec![2, 7], vec![6, 3], vec![4, 5]]
    );
}
