//! # Stanza Grouping
//!
//! Regroups a flat, line-ordered sequence of per-line rows into stanzas.
//!
//! The store returns one row per verse line, each carrying the number of the
//! stanza the line belongs to. Stanza boundaries are detected by a change of
//! that number, never by counting lines, so the grouping does not depend on
//! the store pre-grouping anything.
//!
//! The final stanza is always emitted, which means an empty input produces
//! `[[]]` (one empty stanza). Callers see that shape for poems without
//! scansion lines.

use crate::results::Row;
use crate::{Datatype, PostdataError, Value};

/// Per-stanza sequences of per-line values.
pub type StanzaFeature = Vec<Vec<Value>>;

/// Which fields hold the stanza key and the value, and how to coerce the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanzaGrouping {
    pub stanza_key: &'static str,
    pub value_key: &'static str,
    pub datatype: Datatype,
}

/// Syllable counts per line (metrical and grammatical share the layout).
pub const SYLLABLES_IN_STANZAS: StanzaGrouping = StanzaGrouping {
    stanza_key: "StanzaNo",
    value_key: "count",
    datatype: Datatype::Int,
};

/// Word counts per line.
pub const WORDS_IN_STANZAS: StanzaGrouping = StanzaGrouping {
    stanza_key: "StanzaNo",
    value_key: "count",
    datatype: Datatype::Int,
};

/// Grammatical stress patterns per line.
pub const STRESS_PATTERNS_IN_STANZAS: StanzaGrouping = StanzaGrouping {
    stanza_key: "StanzaNumber",
    value_key: "grammaticalStressPattern",
    datatype: Datatype::Str,
};

/// Metrical patterns per line.
pub const METRICAL_PATTERNS_IN_STANZAS: StanzaGrouping = StanzaGrouping {
    stanza_key: "StanzaNumber",
    value_key: "metricalPattern",
    datatype: Datatype::Str,
};

/// Partition line-ordered `rows` into stanzas.
///
/// Line order inside a stanza and stanza order across the poem are preserved.
/// A stanza number that reappears after a different one starts a new stanza.
pub fn group_by_stanza(
    rows: &[Row],
    grouping: &StanzaGrouping,
) -> Result<StanzaFeature, PostdataError> {
    let mut grouped: StanzaFeature = Vec::new();
    let mut stanza: Vec<Value> = Vec::new();
    // None = no stanza seen yet
    let mut current_stanza: Option<i64> = None;

    for row in rows {
        let stanza_number = stanza_number(row, grouping.stanza_key)?;
        let raw = row
            .get(grouping.value_key)
            .ok_or_else(|| PostdataError::MissingField(grouping.value_key.to_string()))?;
        let value = grouping.datatype.coerce(grouping.value_key, raw)?;

        if current_stanza == Some(stanza_number) {
            stanza.push(value);
        } else {
            if current_stanza.is_some() {
                grouped.push(std::mem::take(&mut stanza));
            }
            current_stanza = Some(stanza_number);
            stanza = vec![value];
        }
    }

    grouped.push(stanza);
    Ok(grouped)
}

fn stanza_number(row: &Row, key: &str) -> Result<i64, PostdataError> {
    let raw = row
        .get(key)
        .ok_or_else(|| PostdataError::MissingField(key.to_string()))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PostdataError::InvalidValue {
            field: key.to_string(),
            value: raw.clone(),
        })
}

/// Number of lines in each stanza of a grouped feature.
#[must_use]
pub fn stanza_shape(feature: &[Vec<Value>]) -> Vec<usize> {
    feature.iter().map(Vec::len).collect()
}

// =============================================================================
// TESTS
// =============================================================================
