//! # Primitives
//!
//! Fixed constants of the POSTDATA data model.
//!
//! These values are shared between the query catalog, the identifier
//! derivation and the corpus lookup. Changing one of them independently
//! breaks identifier-based lookup of poems.

/// Number of hex characters kept from the MD5 digest of a URI.
///
/// Poem and author identifiers are `hex(md5(uri))[..ID_LENGTH]`.
pub const ID_LENGTH: usize = 8;

/// Separator between the prefix, author slug and title slug of a poem URI.
///
/// `http://postdata.linhd.uned.es/resource/pw_<author-slug>_<title-slug>`
pub const URI_SEGMENT_SEPARATOR: char = '_';

/// Property linking a verse line to its metrical syllables.
pub const METRICAL_SYLLABLE_PREDICATE: &str = "pdp:hasMetricalSyllable";

/// Property linking a verse line to its grammatical syllables.
pub const GRAMMATICAL_SYLLABLE_PREDICATE: &str = "pdp:hasGrammaticalSyllable";

/// Default base URL of POSTDATA's Poetry Lab.
pub const POETRY_LAB_BASE_URL: &str = "http://poetry.linhd.uned.es:3000";

/// Default Poetry Lab language.
pub const POETRY_LAB_LANG: &str = "en";

/// Label reported next to the Poetry Lab link in poem metadata.
pub const POETRY_LAB_LABEL: &str = "POSTDATA Poetry Lab";

/// The single corpus exposed by the service.
///
/// POSTDATA keeps everything in one graph; it is treated as one corpus.
pub const DEFAULT_CORPUS: &str = "postdata";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_length_is_eight() {
        assert_eq!(ID_LENGTH, 8);
    }

    #[test]
    fn predicates_are_prefixed_names() {
        assert!(METRICAL_SYLLABLE_PREDICATE.starts_with("pdp:"));
        assert!(GRAMMATICAL_SYLLABLE_PREDICATE.starts_with("pdp:"));
    }
}
