#![forbid(unsafe_code)]

//! Property tests for heading collection and resolution.
//!
//! # Invariants
//!
//! 1. Every level-2/3 heading with an id and non-blank text is collected,
//!    and nothing else.
//! 2. Collected entries keep document order.
//! 3. The visible-rule winner is intersecting and has the minimal top.
//! 4. The fallback winner is at or above the fallback line, and no other
//!    qualifying heading is lower.

use std::collections::HashMap;

use folio_toc::{
    ActiveHeadingResolver, HeadingCollector, HeadingEntry, HeadingLevel, RawHeading, TrackerConfig,
    VisibilityMap, VisibilityRecord,
};
use proptest::prelude::*;

fn raw_heading() -> impl Strategy<Value = RawHeading> {
    (
        1u8..=5,
        proptest::option::weighted(0.8, "[a-z]{1,6}"),
        prop_oneof![Just(String::new()), Just("   ".to_owned()), "[A-Za-z ]{1,12}"],
    )
        .prop_map(|(rank, id, text)| RawHeading { rank, id, text })
}

fn entries(n: usize) -> Vec<HeadingEntry> {
    (0..n)
        .map(|i| HeadingEntry {
            id: format!("h{i}"),
            text: format!("Heading {i}"),
            level: HeadingLevel::H2,
        })
        .collect()
}

proptest! {
    #[test]
    fn collector_keeps_exactly_the_trackable_headings(raw in proptest::collection::vec(raw_heading(), 0..24)) {
        let expected: Vec<(String, String)> = raw
            .iter()
            .filter(|h| matches!(h.rank, 2 | 3))
            .filter_map(|h| {
                let id = h.id.clone().filter(|id| !id.is_empty())?;
                let text = h.text.trim();
                (!text.is_empty()).then(|| (id, text.to_owned()))
            })
            .collect();

        let got: Vec<(String, String)> = HeadingCollector::filter(raw)
            .into_iter()
            .map(|e| (e.id, e.text))
            .collect();

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn visible_winner_has_minimal_top(
        records in proptest::collection::vec((any::<bool>(), -500.0f64..800.0), 1..12)
    ) {
        let headings = entries(records.len());
        let batch: Vec<VisibilityRecord> = records
            .iter()
            .enumerate()
            .map(|(i, (hit, top))| VisibilityRecord::new(format!("h{i}"), *hit, *top))
            .collect();
        let mut map = VisibilityMap::new();
        map.apply_batch(&batch);

        let resolver = ActiveHeadingResolver::new(&TrackerConfig::default());
        let winner = resolver.topmost_visible(&headings, &map);
        let min_top = batch
            .iter()
            .filter(|r| r.is_intersecting)
            .map(|r| r.top_offset)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))));

        match (winner, min_top) {
            (None, None) => {}
            (Some(id), Some(min)) => {
                let record = map.get(id).expect("winner has a record");
                prop_assert!(record.is_intersecting);
                prop_assert_eq!(record.top_offset, min);
            }
            other => prop_assert!(false, "winner/min mismatch: {:?}", other),
        }
    }

    #[test]
    fn fallback_winner_is_nearest_above_line(tops in proptest::collection::vec(-2000.0f64..2000.0, 1..12)) {
        let headings = entries(tops.len());
        let by_id: HashMap<String, f64> = tops
            .iter()
            .enumerate()
            .map(|(i, t)| (format!("h{i}"), *t))
            .collect();
        let config = TrackerConfig::default();
        let resolver = ActiveHeadingResolver::new(&config);
        let winner = resolver.fallback(&headings, |id: &str| by_id.get(id).copied());

        let qualifying: Vec<f64> = tops.iter().copied().filter(|t| *t <= config.fallback_offset).collect();
        match winner {
            None => prop_assert!(qualifying.is_empty()),
            Some(id) => {
                let top = by_id[id];
                prop_assert!(top <= config.fallback_offset);
                prop_assert!(qualifying.iter().all(|t| *t <= top));
            }
        }
    }
}
