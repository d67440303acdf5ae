//! # Analysis Record
//!
//! The consolidated metrical analysis of one poem, as read from its automatic
//! scansion. Built once by [`crate::Poem::get_analysis`] and never mutated.

use serde::Serialize;

use crate::Value;
use crate::grouping::{StanzaFeature, stanza_shape};

/// Where the analysis was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScansionSource {
    /// URI of the automatic scansion.
    pub uri: String,
}

/// Metrical analysis of a poem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub source: ScansionSource,
    pub num_of_stanzas: i64,
    pub num_of_lines: i64,
    pub num_of_words: i64,
    pub num_of_lines_in_stanzas: Vec<i64>,
    pub rhyme_schemes_of_stanzas: Vec<String>,
    pub num_of_metrical_syllables: i64,
    pub num_of_grammatical_syllables: i64,
    pub num_of_metrical_syllables_in_stanzas: StanzaFeature,
    pub num_of_grammatical_syllables_in_stanzas: StanzaFeature,
    pub num_of_words_in_stanzas: StanzaFeature,
    pub grammatical_stress_patterns_in_stanzas: StanzaFeature,
    pub metrical_patterns_in_stanzas: StanzaFeature,
}

impl Analysis {
    /// The stanza-grouped features, keyed by their serialized name.
    #[must_use]
    pub fn features(&self) -> [(&'static str, &[Vec<Value>]); 5] {
        [
            (
                "numOfMetricalSyllablesInStanzas",
                &self.num_of_metrical_syllables_in_stanzas,
            ),
            (
                "numOfGrammaticalSyllablesInStanzas",
                &self.num_of_grammatical_syllables_in_stanzas,
            ),
            ("numOfWordsInStanzas", &self.num_of_words_in_stanzas),
            (
                "grammaticalStressPatternsInStanzas",
                &self.grammatical_stress_patterns_in_stanzas,
            ),
            ("metricalPatternsInStanzas", &self.metrical_patterns_in_stanzas),
        ]
    }

    /// Features whose stanza/line partition differs from the metrical
    /// syllables feature.
    ///
    /// All features describe the same lines, so any entry here points at
    /// inconsistent scansion data in the store.
    #[must_use]
    pub fn partition_mismatches(&self) -> Vec<&'static str> {
        let reference = stanza_shape(&self.num_of_metrical_syllables_in_stanzas);
        self.features()
            .into_iter()
            .skip(1)
            .filter(|(_, feature)| stanza_shape(feature) != reference)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(stanzas: &[&[i64]]) -> StanzaFeature {
        stanzas
            .iter()
            .map(|s| s.iter().map(|n| Value::Int(*n)).collect())
            .collect()
    }

    fn sample() -> Analysis {
        Analysis {
            source: ScansionSource {
                uri: "http://postdata.linhd.uned.es/resource/sc_x".to_string(),
            },
            num_of_stanzas: 2,
            num_of_lines: 3,
            num_of_words: 15,
            num_of_lines_in_stanzas: vec![2, 1],
            rhyme_schemes_of_stanzas: vec!["aa".to_string(), "b".to_string()],
            num_of_metrical_syllables: 22,
            num_of_grammatical_syllables: 25,
            num_of_metrical_syllables_in_stanzas: ints(&[&[7, 8], &[7]]),
            num_of_grammatical_syllables_in_stanzas: ints(&[&[8, 9], &[8]]),
            num_of_words_in_stanzas: ints(&[&[5, 5], &[5]]),
            grammatical_stress_patterns_in_stanzas: ints(&[&[0, 0], &[0]]),
            metrical_patterns_in_stanzas: ints(&[&[0, 0], &[0]]),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["numOfStanzas"], 2);
        assert_eq!(json["source"]["uri"], "http://postdata.linhd.uned.es/resource/sc_x");
        assert_eq!(json["numOfLinesInStanzas"], serde_json::json!([2, 1]));
        assert_eq!(
            json["numOfMetricalSyllablesInStanzas"],
            serde_json::json!([[7, 8], [7]])
        );
        assert!(json.get("metricalPatternsInStanzas").is_some());
    }

    #[test]
    fn consistent_partitions_have_no_mismatch() {
        assert!(sample().partition_mismatches().is_empty());
    }

    #[test]
    fn reports_diverging_feature() {
        let mut analysis = sample();
        analysis.num_of_words_in_stanzas = ints(&[&[5], &[5, 5]]);
        assert_eq!(analysis.partition_mismatches(), vec!["numOfWordsInStanzas"]);
    }
}
