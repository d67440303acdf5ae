//! # postdata-core
//!
//! Poem metadata and metrical analysis over the POSTDATA knowledge graph - THE LOGIC.
//!
//! This crate issues parameterized SPARQL queries through a [`QueryExecutor`],
//! normalizes the tabular results and regroups per-line scansion data into
//! stanzas. The HTTP layer calls into it with a poem URI or identifier and
//! receives plain serializable structures back.
//!
//! ## Architectural Constraints
//!
//! - Synchronous and blocking: one query at a time, no async
//! - No network code: query transport is the executor's concern
//! - No retries and no partial recovery: every failure propagates
//! - Per-instance memoization only, in write-once cells

// =============================================================================
// MODULES
// =============================================================================

pub mod analysis;
pub mod author;
pub mod catalog;
pub mod corpus;
pub mod executor;
pub mod grouping;
pub mod identifiers;
pub mod poem;
pub mod primitives;
pub mod query;
pub mod results;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Datatype, PostdataError, SyllableKind, Value};

// =============================================================================
// RE-EXPORTS: Query Pipeline
// =============================================================================

pub use executor::{InMemoryExecutor, QueryExecutor, QueryOutcome, execute};
pub use grouping::{StanzaFeature, StanzaGrouping, group_by_stanza};
pub use identifiers::{PoemUri, shorthash};
pub use query::{BoundQuery, QueryTemplate};
pub use results::{FieldTypes, ResultSet, Row, Simplified};

// =============================================================================
// RE-EXPORTS: Domain
// =============================================================================

pub use analysis::{Analysis, ScansionSource};
pub use author::{Author, AuthorMetadata};
pub use corpus::{Corpus, CorpusMetadata, CorpusMetrics};
pub use poem::{Poem, PoemBuilder, PoemMetadata};
