//! # Property-Based Tests
//!
//! Invariants of the stanza grouping engine and identifier derivation,
//! checked with proptest.

use postdata_core::grouping::{StanzaGrouping, group_by_stanza, stanza_shape};
use postdata_core::{Datatype, PoemUri, ResultSet, Row, Value, shorthash};
use proptest::collection::vec;
use proptest::prelude::*;

const GROUPING: StanzaGrouping = StanzaGrouping {
    stanza_key: "StanzaNo",
    value_key: "value",
    datatype: Datatype::Str,
};

fn rows(lines: &[(i64, String)]) -> Vec<Row> {
    ResultSet::from_rows(lines.iter().map(|(stanza, value)| {
        [
            ("StanzaNo".to_string(), stanza.to_string()),
            ("value".to_string(), value.clone()),
        ]
    }))
    .rows
}

/// Number of maximal runs of equal consecutive stanza numbers.
fn runs(lines: &[(i64, String)]) -> usize {
    lines
        .windows(2)
        .filter(|pair| pair[0].0 != pair[1].0)
        .count()
        + usize::from(!lines.is_empty())
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Flattening the stanzas gives back the input values in input order.
    #[test]
    fn grouping_preserves_line_order(lines in vec((0i64..5, "[a-z+-]{1,6}"), 0..60)) {
        let grouped = group_by_stanza(&rows(&lines), &GROUPING).expect("group");
        let flattened: Vec<Value> = grouped.into_iter().flatten().collect();
        let expected: Vec<Value> = lines.iter().map(|(_, v)| Value::from(v.as_str())).collect();
        prop_assert_eq!(flattened, expected);
    }

    /// One stanza per run of equal stanza numbers; empty input gives one
    /// empty stanza.
    #[test]
    fn stanza_count_equals_runs(lines in vec((0i64..3, "[a-z]{1,3}"), 0..60)) {
        let grouped = group_by_stanza(&rows(&lines), &GROUPING).expect("group");
        prop_assert_eq!(grouped.len(), runs(&lines).max(1));
    }

    /// Only the empty input produces an empty stanza.
    #[test]
    fn stanzas_are_non_empty(lines in vec((0i64..4, "[a-z]{1,3}"), 1..60)) {
        let grouped = group_by_stanza(&rows(&lines), &GROUPING).expect("group");
        prop_assert!(stanza_shape(&grouped).iter().all(|&n| n > 0));
        prop_assert_eq!(stanza_shape(&grouped).iter().sum::<usize>(), lines.len());
    }

    /// Integer coercion keeps the numeric value.
    #[test]
    fn int_coercion_round_trips(counts in vec(0i64..40, 1..30)) {
        let lines: Vec<(i64, String)> = counts.iter().map(|c| (1, c.to_string())).collect();
        let grouping = StanzaGrouping { datatype: Datatype::Int, ..GROUPING };
        let grouped = group_by_stanza(&rows(&lines), &grouping).expect("group");
        let expected: Vec<Vec<Value>> = vec![counts.iter().map(|c| Value::Int(*c)).collect()];
        prop_assert_eq!(grouped, expected);
    }

    /// Short identifiers are 8 lowercase hex characters and deterministic.
    #[test]
    fn shorthash_is_stable(input in ".{0,80}") {
        let id = shorthash(&input);
        prop_assert_eq!(id.len(), 8);
        prop_assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(id, shorthash(&input));
    }

    /// Parsed poem URIs derive name and id from the URI alone.
    #[test]
    fn poem_uri_derivation(author in "[a-z][a-z-]{0,20}", title in "[a-z][a-z-]{0,20}") {
        let uri = format!("http://postdata.linhd.uned.es/resource/pw_{author}_{title}");
        let parsed = PoemUri::parse(uri.clone()).expect("parse");
        prop_assert_eq!(parsed.name(), format!("{author}_{title}"));
        prop_assert_eq!(parsed.id(), shorthash(&uri));
    }
}
