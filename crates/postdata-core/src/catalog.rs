//! # Query Catalog
//!
//! Every SPARQL query the core issues against the POSTDATA graph.
//!
//! Placeholders: `$1` is always the URI of the poem (or author), `$2` is the
//! syllable predicate (`pdp:hasMetricalSyllable` / `pdp:hasGrammaticalSyllable`).
//! Per-line queries are ordered by absolute line number; the stanza grouping
//! engine relies on that order.

use crate::query::QueryTemplate;

macro_rules! prefixes {
    () => {
        "PREFIX pdc: <http://postdata.linhd.uned.es/ontology/postdata-core#>\n\
         PREFIX pdp: <http://postdata.linhd.uned.es/ontology/postdata-poeticAnalysis#>\n\
         PREFIX kos: <http://postdata.linhd.uned.es/kos/>\n\
         PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\n"
    };
}

// =============================================================================
// POEM METADATA
// =============================================================================

pub static POEM_TITLE: QueryTemplate = QueryTemplate {
    name: "PoemTitle",
    description: "Title of a poem",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?title WHERE {\n",
        "  <$1> pdc:title ?title .\n",
        "}"
    ),
};

pub static POEM_CREATION_YEAR: QueryTemplate = QueryTemplate {
    name: "PoemCreationYear",
    description: "Year of creation of a poem (may carry uncertainty markers)",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?creationYear WHERE {\n",
        "  <$1> pdc:wasInitiatedBy ?creation .\n",
        "  ?creation pdc:date ?creationYear .\n",
        "}"
    ),
};

pub static POEM_AUTHOR_URIS: QueryTemplate = QueryTemplate {
    name: "PoemAuthorUris",
    description: "URIs of the authors of a poem",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT DISTINCT ?authorUri WHERE {\n",
        "  <$1> pdc:wasInitiatedBy ?creation .\n",
        "  ?creation pdc:hasAgentRole ?role .\n",
        "  ?role pdc:roleFunction kos:Creator ;\n",
        "        pdc:hasAgent ?authorUri .\n",
        "}\n",
        "ORDER BY ?authorUri"
    ),
};

// =============================================================================
// SCANSION
// =============================================================================

pub static POEM_AUTOMATIC_SCANSION_URI: QueryTemplate = QueryTemplate {
    name: "PoemAutomaticScansionUri",
    description: "URI of the automatic scansion of a poem",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?scansion WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic .\n",
        "}\n",
        "ORDER BY ?scansion"
    ),
};

pub static POEM_COUNT_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemCountStanzas",
    description: "Number of stanzas in the automatic scansion",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(DISTINCT ?stanza) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "}"
    ),
};

pub static POEM_COUNT_LINES: QueryTemplate = QueryTemplate {
    name: "PoemCountLines",
    description: "Number of verse lines in the automatic scansion",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(DISTINCT ?line) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:hasLine ?line .\n",
        "}"
    ),
};

pub static POEM_COUNT_WORDS: QueryTemplate = QueryTemplate {
    name: "PoemCountWords",
    description: "Number of words in the automatic scansion",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(?word) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:hasLine ?line .\n",
        "  ?line pdp:hasWord ?word .\n",
        "}"
    ),
};

pub static POEM_COUNT_LINES_IN_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemCountLinesInStanzas",
    description: "Number of verse lines per stanza, in stanza order",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(?line) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNo ;\n",
        "          pdp:hasLine ?line .\n",
        "}\n",
        "GROUP BY ?StanzaNo\n",
        "ORDER BY xsd:integer(?StanzaNo)"
    ),
};

pub static POEM_RHYME_SCHEMES_OF_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemRhymeSchemesOfStanzas",
    description: "Rhyme scheme of each stanza, in stanza order",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?rhymeScheme WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNo ;\n",
        "          pdp:rhymeScheme ?rhymeScheme .\n",
        "}\n",
        "ORDER BY xsd:integer(?StanzaNo)"
    ),
};

pub static POEM_COUNT_SYLLABLES: QueryTemplate = QueryTemplate {
    name: "PoemCountSyllables",
    description: "Number of syllables of a kind in the whole poem",
    parameters: 2,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(?syllable) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:hasLine ?line .\n",
        "  ?line $2 ?syllable .\n",
        "}"
    ),
};

pub static POEM_COUNT_SYLLABLES_IN_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemCountSyllablesInStanzas",
    description: "Number of syllables of a kind per verse line, with stanza number",
    parameters: 2,
    text: concat!(
        prefixes!(),
        "SELECT ?StanzaNo (COUNT(?syllable) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNo ;\n",
        "          pdp:hasLine ?line .\n",
        "  ?line pdp:absoluteLineNumber ?lineNo ;\n",
        "        $2 ?syllable .\n",
        "}\n",
        "GROUP BY ?StanzaNo ?lineNo\n",
        "ORDER BY xsd:integer(?lineNo)"
    ),
};

pub static POEM_COUNT_WORDS_IN_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemCountWordsInStanzas",
    description: "Number of words per verse line, with stanza number",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?StanzaNo (COUNT(?word) AS ?count) WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNo ;\n",
        "          pdp:hasLine ?line .\n",
        "  ?line pdp:absoluteLineNumber ?lineNo ;\n",
        "        pdp:hasWord ?word .\n",
        "}\n",
        "GROUP BY ?StanzaNo ?lineNo\n",
        "ORDER BY xsd:integer(?lineNo)"
    ),
};

pub static POEM_GRAMMATICAL_STRESS_PATTERNS_IN_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemGrammaticalStressPatternsInStanzas",
    description: "Grammatical stress pattern per verse line, with stanza number",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?StanzaNumber ?grammaticalStressPattern WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNumber ;\n",
        "          pdp:hasLine ?line .\n",
        "  ?line pdp:absoluteLineNumber ?lineNo ;\n",
        "        pdp:grammaticalStressPattern ?grammaticalStressPattern .\n",
        "}\n",
        "ORDER BY xsd:integer(?lineNo)"
    ),
};

pub static POEM_METRICAL_PATTERNS_IN_STANZAS: QueryTemplate = QueryTemplate {
    name: "PoemMetricalPatternsInStanzas",
    description: "Metrical pattern per verse line, with stanza number",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?StanzaNumber ?metricalPattern WHERE {\n",
        "  ?scansion pdp:isScansionOf <$1> ;\n",
        "            pdp:typeOfScansion kos:Automatic ;\n",
        "            pdp:hasStanza ?stanza .\n",
        "  ?stanza pdp:stanzaNumber ?StanzaNumber ;\n",
        "          pdp:hasLine ?line .\n",
        "  ?line pdp:absoluteLineNumber ?lineNo ;\n",
        "        pdp:patterningMetricalScheme ?metricalPattern .\n",
        "}\n",
        "ORDER BY xsd:integer(?lineNo)"
    ),
};

// =============================================================================
// AUTHORS
// =============================================================================

pub static AUTHOR_NAME: QueryTemplate = QueryTemplate {
    name: "AuthorName",
    description: "Name of an author",
    parameters: 1,
    text: concat!(
        prefixes!(),
        "SELECT ?name WHERE {\n",
        "  <$1> pdc:name ?name .\n",
        "}"
    ),
};

// =============================================================================
// CORPUS
// =============================================================================

pub static CORPUS_POEM_URIS: QueryTemplate = QueryTemplate {
    name: "CorpusPoemUris",
    description: "URIs of all poetic works in the graph",
    parameters: 0,
    text: concat!(
        prefixes!(),
        "SELECT ?poem WHERE {\n",
        "  ?poem a pdc:PoeticWork .\n",
        "}\n",
        "ORDER BY ?poem"
    ),
};

pub static CORPUS_COUNT_POEMS: QueryTemplate = QueryTemplate {
    name: "CorpusCountPoems",
    description: "Number of poetic works in the graph",
    parameters: 0,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(DISTINCT ?poem) AS ?count) WHERE {\n",
        "  ?poem a pdc:PoeticWork .\n",
        "}"
    ),
};

pub static CORPUS_COUNT_AUTHORS: QueryTemplate = QueryTemplate {
    name: "CorpusCountAuthors",
    description: "Number of distinct creators of poetic works",
    parameters: 0,
    text: concat!(
        prefixes!(),
        "SELECT (COUNT(DISTINCT ?author) AS ?count) WHERE {\n",
        "  ?poem a pdc:PoeticWork ;\n",
        "        pdc:wasInitiatedBy ?creation .\n",
        "  ?creation pdc:hasAgentRole ?role .\n",
        "  ?role pdc:roleFunction kos:Creator ;\n",
        "        pdc:hasAgent ?author .\n",
        "}"
    ),
};

/// Every template in the catalog.
pub static ALL: [&QueryTemplate; 18] = [
    &POEM_TITLE,
    &POEM_CREATION_YEAR,
    &POEM_AUTHOR_URIS,
    &POEM_AUTOMATIC_SCANSION_URI,
    &POEM_COUNT_STANZAS,
    &POEM_COUNT_LINES,
    &POEM_COUNT_WORDS,
    &POEM_COUNT_LINES_IN_STANZAS,
    &POEM_RHYME_SCHEMES_OF_STANZAS,
    &POEM_COUNT_SYLLABLES,
    &POEM_COUNT_SYLLABLES_IN_STANZAS,
    &POEM_COUNT_WORDS_IN_STANZAS,
    &POEM_GRAMMATICAL_STRESS_PATTERNS_IN_STANZAS,
    &POEM_METRICAL_PATTERNS_IN_STANZAS,
    &AUTHOR_NAME,
    &CORPUS_POEM_URIS,
    &CORPUS_COUNT_POEMS,
    &CORPUS_COUNT_AUTHORS,
];

/// Look up a template by name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static QueryTemplate> {
    ALL.iter().copied().find(|t| t.name == name)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Highest `$n` placeholder used in a template.
    fn highest_placeholder(text: &str) -> usize {
        text.match_indices('$')
            .filter_map(|(i, _)| {
                let digits: String = text[i + 1..]
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<usize>().ok()
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn declared_parameters_match_placeholders() {
        for template in ALL {
            assert_eq!(
                highest_placeholder(template.text),
                template.parameters,
                "{}",
                template.name
            );
        }
    }

    #[test]
    fn names_are_unique() {
        let names: BTreeSet<_> = ALL.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn syllable_queries_take_predicate() {
        assert_eq!(POEM_COUNT_SYLLABLES.parameters, 2);
        assert_eq!(POEM_COUNT_SYLLABLES_IN_STANZAS.parameters, 2);
        assert_eq!(POEM_TITLE.parameters, 1);
    }

    #[test]
    fn per_line_queries_are_line_ordered() {
        for template in [
            &POEM_COUNT_SYLLABLES_IN_STANZAS,
            &POEM_COUNT_WORDS_IN_STANZAS,
            &POEM_GRAMMATICAL_STRESS_PATTERNS_IN_STANZAS,
            &POEM_METRICAL_PATTERNS_IN_STANZAS,
        ] {
            assert!(template.text.contains("ORDER BY xsd:integer(?lineNo)"));
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("PoemTitle"), Some(&POEM_TITLE));
        assert!(by_name("NoSuchQuery").is_none());
    }
}
