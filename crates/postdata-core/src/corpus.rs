//! # Corpus Module
//!
//! The POSTDATA graph seen as a single corpus of poems.
//!
//! Poems are addressed by their short identifier. The graph does not store
//! it, so lookup lists every poem URI and compares [`shorthash`] values; the
//! same function derives [`Poem`] identifiers.

use serde::Serialize;

use crate::PostdataError;
use crate::catalog::{CORPUS_COUNT_AUTHORS, CORPUS_COUNT_POEMS, CORPUS_POEM_URIS};
use crate::executor::{QueryExecutor, execute};
use crate::identifiers::shorthash;
use crate::poem::{Poem, PoemMetadata};
use crate::primitives::{DEFAULT_CORPUS, POETRY_LAB_BASE_URL, POETRY_LAB_LANG};
use crate::query::QueryTemplate;
use crate::results::exactly_one;

/// Size of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusMetrics {
    pub poems: i64,
    pub authors: i64,
}

/// Serializable corpus description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusMetadata {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CorpusMetrics>,
}

/// A named corpus backed by the shared executor.
#[derive(Debug)]
pub struct Corpus<'db, E: QueryExecutor + ?Sized> {
    name: String,
    database: &'db E,
    poetry_lab_base: String,
    poetry_lab_lang: String,
}

impl<'db, E: QueryExecutor + ?Sized> Corpus<'db, E> {
    /// Open a corpus by name. Only [`DEFAULT_CORPUS`] exists.
    pub fn open(name: &str, database: &'db E) -> Result<Self, PostdataError> {
        if name != DEFAULT_CORPUS {
            return Err(PostdataError::UnknownCorpus(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            database,
            poetry_lab_base: POETRY_LAB_BASE_URL.to_string(),
            poetry_lab_lang: POETRY_LAB_LANG.to_string(),
        })
    }

    /// Poetry Lab location passed on to every poem of the corpus.
    #[must_use]
    pub fn with_poetry_lab(mut self, base_url: impl Into<String>, lang: impl Into<String>) -> Self {
        self.poetry_lab_base = base_url.into();
        self.poetry_lab_lang = lang.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URIs of every poem, in URI order.
    pub fn list_poem_uris(&self) -> Result<Vec<String>, PostdataError> {
        let bound = CORPUS_POEM_URIS.bind::<&str>(&[])?;
        execute(self.database, bound)?.results.strings()
    }

    /// Find the poem URI whose short identifier is `id`.
    pub fn lookup_poem_uri(&self, id: &str) -> Result<String, PostdataError> {
        self.list_poem_uris()?
            .into_iter()
            .find(|uri| shorthash(uri) == id)
            .ok_or_else(|| PostdataError::PoemNotFound(id.to_string()))
    }

    /// Resolve a poem by short identifier.
    pub fn poem(&self, id: &str) -> Result<Poem<'db, E>, PostdataError> {
        let uri = self.lookup_poem_uri(id)?;
        self.poem_at(uri)
    }

    /// Basic metadata of every poem.
    ///
    /// URIs that do not follow the poem URI layout are skipped with a warning.
    pub fn list_poems(&self) -> Result<Vec<PoemMetadata>, PostdataError> {
        let mut poems = Vec::new();
        for uri in self.list_poem_uris()? {
            match self.poem_at(uri) {
                Ok(poem) => poems.push(poem.get_metadata(false, false)?),
                Err(PostdataError::MalformedUri(uri)) => {
                    tracing::warn!(corpus = %self.name, %uri, "skipping poem with malformed URI");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(poems)
    }

    pub fn metrics(&self) -> Result<CorpusMetrics, PostdataError> {
        Ok(CorpusMetrics {
            poems: self.count(&CORPUS_COUNT_POEMS)?,
            authors: self.count(&CORPUS_COUNT_AUTHORS)?,
        })
    }

    pub fn get_metadata(&self, include_metrics: bool) -> Result<CorpusMetadata, PostdataError> {
        let metrics = if include_metrics {
            Some(self.metrics()?)
        } else {
            None
        };
        Ok(CorpusMetadata {
            name: self.name.clone(),
            title: "POSTDATA".to_string(),
            metrics,
        })
    }

    fn poem_at(&self, uri: String) -> Result<Poem<'db, E>, PostdataError> {
        Poem::builder()
            .uri(uri)
            .database(self.database)
            .poetry_lab(self.poetry_lab_base.as_str(), self.poetry_lab_lang.as_str())
            .build()
    }

    fn count(&self, template: &'static QueryTemplate) -> Result<i64, PostdataError> {
        let bound = template.bind::<&str>(&[])?;
        exactly_one(execute(self.database, bound)?.results.ints("count")?, template.name)
    }
}
