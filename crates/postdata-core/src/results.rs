//! # Results Module
//!
//! Tabular query results and their normalization into plain values.
//!
//! - Row order is significant and never changed (per-line queries arrive in
//!   line order)
//! - Field order inside a row is not significant (`BTreeMap`)
//! - Nothing is deduplicated; an empty result set simplifies to an empty `Vec`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Datatype, PostdataError, Value};

/// One result row: field name to raw string value.
pub type Row = BTreeMap<String, String>;

/// A tabular result set of named-field rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Projected variables, in projection order. May be empty for
    /// hand-built result sets, in which case rows decide the shape.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Rows, in the order the store returned them.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A simplified row: a bare value for single-field results, a map otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Simplified {
    Scalar(Value),
    Row(BTreeMap<String, Value>),
}

/// Per-field coercion requested from [`ResultSet::simplify`].
///
/// Fields without an entry pass through as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTypes(BTreeMap<String, Datatype>);

impl FieldTypes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coercion for `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, datatype: Datatype) -> Self {
        self.0.insert(field.into(), datatype);
        self
    }

    /// The common case: a single integer field.
    #[must_use]
    pub fn int(field: impl Into<String>) -> Self {
        Self::new().with(field, Datatype::Int)
    }

    fn datatype_of(&self, field: &str) -> Datatype {
        self.0.get(field).copied().unwrap_or(Datatype::Raw)
    }
}

impl ResultSet {
    /// Build a result set from rows of `(field, value)` pairs.
    pub fn from_rows<I, R, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
            .collect();
        let mut fields: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
        }
        Self { fields, rows }
    }

    /// Single-field result set, one row per value.
    pub fn column<S: Into<String>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let field = field.into();
        let rows = values
            .into_iter()
            .map(|v| BTreeMap::from([(field.clone(), v.into())]))
            .collect();
        Self {
            fields: vec![field],
            rows,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row carries exactly one field.
    #[must_use]
    pub fn is_single_field(&self) -> bool {
        if self.fields.is_empty() {
            self.rows.iter().all(|row| row.len() == 1)
        } else {
            self.fields.len() == 1
        }
    }

    /// Parse a SPARQL 1.1 Query Results JSON document.
    ///
    /// Only the `value` of each bound term is kept; unbound variables are
    /// absent from their row.
    pub fn from_sparql_json(body: &str) -> Result<Self, PostdataError> {
        let doc: SparqlJson = serde_json::from_str(body)
            .map_err(|e| PostdataError::QueryError(format!("Invalid SPARQL JSON: {}", e)))?;
        let results = doc.results.ok_or_else(|| {
            PostdataError::QueryError("SPARQL response carries no result bindings".to_string())
        })?;

        let rows = results
            .bindings
            .into_iter()
            .map(|binding| {
                binding
                    .into_iter()
                    .map(|(var, term)| (var, term.value))
                    .collect()
            })
            .collect();

        Ok(Self {
            fields: doc.head.vars,
            rows,
        })
    }

    /// Normalize rows into plain values.
    ///
    /// One field per row yields [`Simplified::Scalar`] per row; otherwise each
    /// row becomes a [`Simplified::Row`]. Fields listed in `types` are coerced.
    pub fn simplify(&self, types: &FieldTypes) -> Result<Vec<Simplified>, PostdataError> {
        if self.is_single_field() {
            self.rows
                .iter()
                .map(|row| {
                    let (field, raw) = row
                        .iter()
                        .next()
                        .ok_or_else(|| PostdataError::MissingField(self.fields.join(",")))?;
                    types.datatype_of(field).coerce(field, raw).map(Simplified::Scalar)
                })
                .collect()
        } else {
            self.rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(field, raw)| {
                            types
                                .datatype_of(field)
                                .coerce(field, raw)
                                .map(|value| (field.clone(), value))
                        })
                        .collect::<Result<BTreeMap<_, _>, _>>()
                        .map(Simplified::Row)
                })
                .collect()
        }
    }

    /// Simplify a single-field result into its values.
    pub fn scalars(&self, types: &FieldTypes) -> Result<Vec<Value>, PostdataError> {
        self.simplify(types)?
            .into_iter()
            .map(|item| match item {
                Simplified::Scalar(value) => Ok(value),
                Simplified::Row(row) => Err(PostdataError::QueryError(format!(
                    "Expected a single-field result, got fields {:?}",
                    row.keys().collect::<Vec<_>>()
                ))),
            })
            .collect()
    }

    /// Simplify a single-field result into strings.
    pub fn strings(&self) -> Result<Vec<String>, PostdataError> {
        Ok(self
            .scalars(&FieldTypes::new())?
            .into_iter()
            .map(|value| value.to_string())
            .collect())
    }

    /// Simplify a single-field result into integers.
    pub fn ints(&self, field: &str) -> Result<Vec<i64>, PostdataError> {
        self.scalars(&FieldTypes::int(field))?
            .into_iter()
            .map(|value| {
                value.as_int().ok_or_else(|| PostdataError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }
}

// =============================================================================
// SINGLE-VALUE POLICY
// =============================================================================

/// Zero values are "absent", one is resolved, more is a data error.
pub fn at_most_one<T>(mut values: Vec<T>, field: &str) -> Result<Option<T>, PostdataError> {
    match values.len() {
        0 => Ok(None),
        1 => Ok(values.pop()),
        count => Err(PostdataError::MultipleValues {
            field: field.to_string(),
            count,
        }),
    }
}

/// Exactly one value is required; zero is [`PostdataError::NoResults`].
pub fn exactly_one<T>(values: Vec<T>, query: &'static str) -> Result<T, PostdataError> {
    at_most_one(values, query)?.ok_or(PostdataError::NoResults(query))
}

// =============================================================================
// SPARQL JSON WIRE FORMAT
// =============================================================================

#[derive(Deserialize)]
struct SparqlJson {
    head: SparqlHead,
    #[serde(default)]
    results: Option<SparqlResults>,
}

#[derive(Deserialize)]
struct SparqlHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct SparqlResults {
    bindings: Vec<BTreeMap<String, SparqlTerm>>,
}

#[derive(Deserialize)]
struct SparqlTerm {
    value: String,
}

// =============================================================================
// TESTS
// =============================================================================
