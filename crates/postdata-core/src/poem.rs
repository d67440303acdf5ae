//! # Poem Module
//!
//! Metadata and metrical analysis of a single poem.
//!
//! ## Memoization
//!
//! Every memoized field is a write-once [`OnceCell`]. An empty cell means
//! "not computed yet"; a filled cell holds the computed value, which may
//! itself be `None` ("computed, absent"). The two states never share a
//! representation.
//!
//! ## Atomic Aggregation
//!
//! [`Poem::get_analysis`] resolves every metric before storing anything.
//! If one sub-query fails, the error propagates and the poem stays without a
//! cached analysis.

use serde::Serialize;
use std::cell::OnceCell;

use crate::analysis::{Analysis, ScansionSource};
use crate::author::{Author, AuthorMetadata};
use crate::catalog::{
    POEM_AUTHOR_URIS, POEM_AUTOMATIC_SCANSION_URI, POEM_COUNT_LINES, POEM_COUNT_LINES_IN_STANZAS,
    POEM_COUNT_STANZAS, POEM_COUNT_SYLLABLES, POEM_COUNT_SYLLABLES_IN_STANZAS, POEM_COUNT_WORDS,
    POEM_COUNT_WORDS_IN_STANZAS, POEM_CREATION_YEAR, POEM_GRAMMATICAL_STRESS_PATTERNS_IN_STANZAS,
    POEM_METRICAL_PATTERNS_IN_STANZAS, POEM_RHYME_SCHEMES_OF_STANZAS, POEM_TITLE,
};
use crate::executor::{QueryExecutor, execute};
use crate::grouping::{
    METRICAL_PATTERNS_IN_STANZAS, STRESS_PATTERNS_IN_STANZAS, SYLLABLES_IN_STANZAS,
    StanzaFeature, StanzaGrouping, WORDS_IN_STANZAS, group_by_stanza,
};
use crate::identifiers::PoemUri;
use crate::primitives::{POETRY_LAB_BASE_URL, POETRY_LAB_LABEL, POETRY_LAB_LANG};
use crate::query::QueryTemplate;
use crate::results::{ResultSet, at_most_one, exactly_one};
use crate::{PostdataError, SyllableKind};

/// Serializable poem metadata.
///
/// `authors` is present only when requested and the poem has authors;
/// `analysis` only when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemMetadata {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub source: String,
    pub source_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<AuthorMetadata>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`Poem`].
#[derive(Debug)]
pub struct PoemBuilder<'db, E: QueryExecutor + ?Sized> {
    uri: Option<String>,
    database: Option<&'db E>,
    poetry_lab_base: String,
    poetry_lab_lang: String,
}

impl<'db, E: QueryExecutor + ?Sized> PoemBuilder<'db, E> {
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: &'db E) -> Self {
        self.database = Some(database);
        self
    }

    /// Override the Poetry Lab location used for the `source` link.
    #[must_use]
    pub fn poetry_lab(mut self, base_url: impl Into<String>, lang: impl Into<String>) -> Self {
        self.poetry_lab_base = base_url.into();
        self.poetry_lab_lang = lang.into();
        self
    }

    /// Parse the URI (if any) and create the poem.
    pub fn build(self) -> Result<Poem<'db, E>, PostdataError> {
        let uri = self.uri.map(PoemUri::parse).transpose()?;
        Ok(Poem {
            uri,
            database: self.database,
            poetry_lab_base: self.poetry_lab_base,
            poetry_lab_lang: self.poetry_lab_lang,
            title: OnceCell::new(),
            creation_year: OnceCell::new(),
            author_uris: OnceCell::new(),
            authors: OnceCell::new(),
            analysis: OnceCell::new(),
        })
    }
}

// =============================================================================
// POEM
// =============================================================================

/// A poem of the POSTDATA graph.
///
/// Borrows the executor; it never owns or closes it. Not `Sync`: one instance
/// serves one request.
#[derive(Debug)]
pub struct Poem<'db, E: QueryExecutor + ?Sized> {
    uri: Option<PoemUri>,
    database: Option<&'db E>,
    poetry_lab_base: String,
    poetry_lab_lang: String,
    title: OnceCell<Option<String>>,
    creation_year: OnceCell<Option<String>>,
    author_uris: OnceCell<Option<Vec<String>>>,
    authors: OnceCell<Vec<Author<'db, E>>>,
    analysis: OnceCell<Analysis>,
}

impl<'db, E: QueryExecutor + ?Sized> Poem<'db, E> {
    #[must_use]
    pub fn builder() -> PoemBuilder<'db, E> {
        PoemBuilder {
            uri: None,
            database: None,
            poetry_lab_base: POETRY_LAB_BASE_URL.to_string(),
            poetry_lab_lang: POETRY_LAB_LANG.to_string(),
        }
    }

    /// Shorthand for a poem with both a URI and an executor.
    pub fn new(uri: impl Into<String>, database: &'db E) -> Result<Self, PostdataError> {
        Self::builder().uri(uri).database(database).build()
    }

    /// The parsed URI, if one was set.
    #[must_use]
    pub fn poem_uri(&self) -> Option<&PoemUri> {
        self.uri.as_ref()
    }

    pub fn get_uri(&self) -> Result<&str, PostdataError> {
        self.require_uri().map(PoemUri::as_str)
    }

    /// The 8-character short identifier.
    pub fn get_id(&self) -> Result<&str, PostdataError> {
        self.require_uri().map(PoemUri::id)
    }

    /// `<author-slug>_<title-slug>`.
    pub fn get_name(&self) -> Result<&str, PostdataError> {
        self.require_uri().map(PoemUri::name)
    }

    pub fn get_poetry_lab_url(&self) -> Result<String, PostdataError> {
        Ok(self
            .require_uri()?
            .poetry_lab_url(&self.poetry_lab_base, &self.poetry_lab_lang))
    }

    // -------------------------------------------------------------------------
    // Basic metadata (memoized)
    // -------------------------------------------------------------------------

    pub fn get_title(&self) -> Result<Option<&str>, PostdataError> {
        let title = memoized(&self.title, || {
            at_most_one(self.query(&POEM_TITLE, None)?.strings()?, "title")
        })?;
        Ok(title.as_deref())
    }

    /// Year of creation, as stored. May carry uncertainty markers, so it is
    /// kept as a string.
    pub fn get_creation_year(&self) -> Result<Option<&str>, PostdataError> {
        let year = memoized(&self.creation_year, || {
            at_most_one(
                self.query(&POEM_CREATION_YEAR, None)?.strings()?,
                "creationYear",
            )
        })?;
        Ok(year.as_deref())
    }

    /// Author URIs; `None` when the poem has no authors.
    pub fn get_author_uris(&self) -> Result<Option<&[String]>, PostdataError> {
        let uris = memoized(&self.author_uris, || {
            let uris = self.query(&POEM_AUTHOR_URIS, None)?.strings()?;
            Ok((!uris.is_empty()).then_some(uris))
        })?;
        Ok(uris.as_deref())
    }

    /// Construct one [`Author`] per author URI.
    ///
    /// Returns `false`, with no authors cached, when the poem has none.
    pub fn load_authors(&self) -> Result<bool, PostdataError> {
        if self.authors.get().is_some() {
            return Ok(true);
        }
        let database = self.require_database()?;
        let Some(uris) = self.get_author_uris()? else {
            return Ok(false);
        };
        let authors = uris
            .iter()
            .map(|uri| Author::new(uri.as_str(), database))
            .collect();
        let _ = self.authors.set(authors);
        Ok(true)
    }

    /// Authors constructed by [`Poem::load_authors`].
    #[must_use]
    pub fn authors(&self) -> Option<&[Author<'db, E>]> {
        self.authors.get().map(Vec::as_slice)
    }

    /// Serializable metadata, optionally with authors and analysis.
    pub fn get_metadata(
        &self,
        include_authors: bool,
        include_analysis: bool,
    ) -> Result<PoemMetadata, PostdataError> {
        let uri = self.require_uri()?;

        let authors = if include_authors && self.load_authors()? {
            let authors = self.authors().unwrap_or_default();
            Some(
                authors
                    .iter()
                    .map(Author::get_metadata)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            None
        };

        let analysis = if include_analysis {
            Some(self.get_analysis()?.clone())
        } else {
            None
        };

        Ok(PoemMetadata {
            id: uri.id().to_string(),
            uri: uri.as_str().to_string(),
            name: uri.name().to_string(),
            source: uri.poetry_lab_url(&self.poetry_lab_base, &self.poetry_lab_lang),
            source_uri: POETRY_LAB_LABEL.to_string(),
            authors,
            analysis,
        })
    }

    // -------------------------------------------------------------------------
    // Automatic scansion
    // -------------------------------------------------------------------------

    /// URI of the automatic scansion.
    ///
    /// When the graph holds several, the first in URI order is used and a
    /// warning is logged.
    pub fn get_automatic_scansion_uri(&self) -> Result<String, PostdataError> {
        let uris = self.query(&POEM_AUTOMATIC_SCANSION_URI, None)?.strings()?;
        if uris.len() > 1 {
            tracing::warn!(
                poem = self.get_uri().unwrap_or_default(),
                count = uris.len(),
                "multiple automatic scansions, using the first"
            );
        }
        uris.into_iter()
            .next()
            .ok_or(PostdataError::NoResults(POEM_AUTOMATIC_SCANSION_URI.name))
    }

    pub fn get_number_of_stanzas(&self) -> Result<i64, PostdataError> {
        self.count(&POEM_COUNT_STANZAS, None)
    }

    pub fn get_number_of_lines(&self) -> Result<i64, PostdataError> {
        self.count(&POEM_COUNT_LINES, None)
    }

    pub fn get_number_of_words(&self) -> Result<i64, PostdataError> {
        self.count(&POEM_COUNT_WORDS, None)
    }

    pub fn get_number_of_syllables(&self, kind: SyllableKind) -> Result<i64, PostdataError> {
        self.count(&POEM_COUNT_SYLLABLES, Some(kind))
    }

    pub fn get_number_of_lines_in_stanzas(&self) -> Result<Vec<i64>, PostdataError> {
        self.query(&POEM_COUNT_LINES_IN_STANZAS, None)?.ints("count")
    }

    pub fn get_rhyme_schemes_of_stanzas(&self) -> Result<Vec<String>, PostdataError> {
        self.query(&POEM_RHYME_SCHEMES_OF_STANZAS, None)?.strings()
    }

    pub fn get_number_of_syllables_in_stanzas(
        &self,
        kind: SyllableKind,
    ) -> Result<StanzaFeature, PostdataError> {
        self.grouped(
            &POEM_COUNT_SYLLABLES_IN_STANZAS,
            Some(kind),
            &SYLLABLES_IN_STANZAS,
        )
    }

    pub fn get_number_of_words_in_stanzas(&self) -> Result<StanzaFeature, PostdataError> {
        self.grouped(&POEM_COUNT_WORDS_IN_STANZAS, None, &WORDS_IN_STANZAS)
    }

    pub fn get_grammatical_stress_patterns_in_stanzas(
        &self,
    ) -> Result<StanzaFeature, PostdataError> {
        self.grouped(
            &POEM_GRAMMATICAL_STRESS_PATTERNS_IN_STANZAS,
            None,
            &STRESS_PATTERNS_IN_STANZAS,
        )
    }

    pub fn get_metrical_patterns_in_stanzas(&self) -> Result<StanzaFeature, PostdataError> {
        self.grouped(
            &POEM_METRICAL_PATTERNS_IN_STANZAS,
            None,
            &METRICAL_PATTERNS_IN_STANZAS,
        )
    }

    /// Analysis of the automatic scansion, computed on first call.
    pub fn get_analysis(&self) -> Result<&Analysis, PostdataError> {
        memoized(&self.analysis, || {
            let analysis = Analysis {
                source: ScansionSource {
                    uri: self.get_automatic_scansion_uri()?,
                },
                num_of_stanzas: self.get_number_of_stanzas()?,
                num_of_lines: self.get_number_of_lines()?,
                num_of_words: self.get_number_of_words()?,
                num_of_lines_in_stanzas: self.get_number_of_lines_in_stanzas()?,
                rhyme_schemes_of_stanzas: self.get_rhyme_schemes_of_stanzas()?,
                num_of_metrical_syllables: self.get_number_of_syllables(SyllableKind::Metrical)?,
                num_of_grammatical_syllables: self
                    .get_number_of_syllables(SyllableKind::Grammatical)?,
                num_of_metrical_syllables_in_stanzas: self
                    .get_number_of_syllables_in_stanzas(SyllableKind::Metrical)?,
                num_of_grammatical_syllables_in_stanzas: self
                    .get_number_of_syllables_in_stanzas(SyllableKind::Grammatical)?,
                num_of_words_in_stanzas: self.get_number_of_words_in_stanzas()?,
                grammatical_stress_patterns_in_stanzas: self
                    .get_grammatical_stress_patterns_in_stanzas()?,
                metrical_patterns_in_stanzas: self.get_metrical_patterns_in_stanzas()?,
            };

            let mismatches = analysis.partition_mismatches();
            if !mismatches.is_empty() {
                tracing::warn!(
                    scansion = %analysis.source.uri,
                    features = ?mismatches,
                    "stanza partition differs between features"
                );
            }
            Ok(analysis)
        })
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn require_uri(&self) -> Result<&PoemUri, PostdataError> {
        self.uri.as_ref().ok_or(PostdataError::MissingUri)
    }

    fn require_database(&self) -> Result<&'db E, PostdataError> {
        self.database.ok_or(PostdataError::NoDatabaseConnection)
    }

    /// Bind the poem URI (and the syllable predicate, for syllable queries)
    /// and execute.
    fn query(
        &self,
        template: &'static QueryTemplate,
        kind: Option<SyllableKind>,
    ) -> Result<ResultSet, PostdataError> {
        let uri = self.require_uri()?.as_str();
        let database = self.require_database()?;
        let bound = match kind {
            Some(kind) => template.bind(&[uri, kind.predicate()])?,
            None => template.bind(&[uri])?,
        };
        Ok(execute(database, bound)?.results)
    }

    fn count(
        &self,
        template: &'static QueryTemplate,
        kind: Option<SyllableKind>,
    ) -> Result<i64, PostdataError> {
        exactly_one(self.query(template, kind)?.ints("count")?, template.name)
    }

    fn grouped(
        &self,
        template: &'static QueryTemplate,
        kind: Option<SyllableKind>,
        grouping: &StanzaGrouping,
    ) -> Result<StanzaFeature, PostdataError> {
        let results = self.query(template, kind)?;
        group_by_stanza(&results.rows, grouping)
    }
}

/// Return the cached value, or compute and cache it. Nothing is cached when
/// `compute` fails.
fn memoized<T>(
    cell: &OnceCell<T>,
    compute: impl FnOnce() -> Result<T, PostdataError>,
) -> Result<&T, PostdataError> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value))
}

// =============================================================================
// TESTS
// =============================================================================
