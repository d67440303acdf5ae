//! # Identifiers
//!
//! Derivation of short identifiers and display names from graph URIs.
//!
//! The short identifier is the public-facing key of a poem. The corpus lookup
//! recomputes it for every poem URI it lists, so both sides must go through
//! [`shorthash`].

use md5::{Digest, Md5};
use serde::Serialize;

use crate::PostdataError;
use crate::primitives::{ID_LENGTH, URI_SEGMENT_SEPARATOR};

/// Truncated lowercase hex MD5 of `input`.
#[must_use]
pub fn shorthash(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(ID_LENGTH);
    hex
}

/// A parsed poem URI together with its derived identifiers.
///
/// `id` and `name` are computed once in [`PoemUri::parse`] and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoemUri {
    uri: String,
    id: String,
    name: String,
    author_slug: String,
    title_slug: String,
}

impl PoemUri {
    /// Parse a URI of the form `.../pw_<author-slug>_<title-slug>`.
    ///
    /// Fails with [`PostdataError::MalformedUri`] unless splitting on `_`
    /// yields exactly three non-empty segments.
    pub fn parse(uri: impl Into<String>) -> Result<Self, PostdataError> {
        let uri = uri.into();
        let segments: Vec<&str> = uri.split(URI_SEGMENT_SEPARATOR).collect();
        let [_, author, title] = segments.as_slice() else {
            return Err(PostdataError::MalformedUri(uri));
        };
        if author.is_empty() || title.is_empty() {
            return Err(PostdataError::MalformedUri(uri));
        }
        let author_slug = (*author).to_string();
        let title_slug = (*title).to_string();
        Ok(Self {
            id: shorthash(&uri),
            name: format!("{author_slug}{URI_SEGMENT_SEPARATOR}{title_slug}"),
            uri,
            author_slug,
            title_slug,
        })
    }

    /// The full URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// The 8-character short identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn author_slug(&self) -> &str {
        &self.author_slug
    }

    #[must_use]
    pub fn title_slug(&self) -> &str {
        &self.title_slug
    }

    /// Display name: author slug and title slug joined by `_`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link to the poem in POSTDATA's Poetry Lab.
    #[must_use]
    pub fn poetry_lab_url(&self, base_url: &str, lang: &str) -> String {
        format!(
            "{}/{}/author/{}/poetic-work/{}",
            base_url.trim_end_matches('/'),
            lang,
            self.author_slug,
            self.title_slug
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
