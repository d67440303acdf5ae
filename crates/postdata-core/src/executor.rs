//! # Executor Module
//!
//! The contract between the core and whatever runs SPARQL against the graph.
//!
//! The core never talks to a store directly. It binds a template, hands the
//! [`BoundQuery`] to a [`QueryExecutor`] and receives a [`ResultSet`].
//! Connection handling, timeouts and retries belong to the implementor.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::PostdataError;
use crate::query::BoundQuery;
use crate::results::ResultSet;

/// Executes bound queries against a graph store.
///
/// Implementors must be `Send + Sync`: one executor is shared, read-only, by
/// every poem and author resolved by the service.
pub trait QueryExecutor: Send + Sync {
    /// Run `query` and return its rows in store order.
    ///
    /// Fails with [`PostdataError::ConnectionError`] when the store cannot be
    /// reached and [`PostdataError::QueryError`] when it rejects the query.
    fn execute(&self, query: &BoundQuery) -> Result<ResultSet, PostdataError>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn execute(&self, query: &BoundQuery) -> Result<ResultSet, PostdataError> {
        (**self).execute(query)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<E> {
    fn execute(&self, query: &BoundQuery) -> Result<ResultSet, PostdataError> {
        (**self).execute(query)
    }
}

/// A bound query together with the results it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: BoundQuery,
    pub results: ResultSet,
}

/// Execute `query` and keep it next to its results for inspection.
pub fn execute<E: QueryExecutor + ?Sized>(
    executor: &E,
    query: BoundQuery,
) -> Result<QueryOutcome, PostdataError> {
    let results = executor.execute(&query).inspect_err(|e| {
        tracing::debug!(query = query.name(), error = %e, "query failed");
    })?;
    tracing::debug!(
        query = query.name(),
        parameters = ?query.parameters(),
        rows = results.len(),
        "query executed"
    );
    Ok(QueryOutcome { query, results })
}

// =============================================================================
// IN-MEMORY EXECUTOR
// =============================================================================

/// Fixture-backed executor.
///
/// Results are looked up by template name and bound parameters, falling back
/// to the template name alone. Every call is counted.
#[derive(Debug, Default)]
pub struct InMemoryExecutor {
    exact: BTreeMap<(String, Vec<String>), ResultSet>,
    by_name: BTreeMap<String, ResultSet>,
    executions: AtomicUsize,
    per_query: Mutex<BTreeMap<String, usize>>,
}

#[derive(Deserialize)]
struct FixtureFile {
    fixtures: Vec<Fixture>,
}

#[derive(Deserialize)]
struct Fixture {
    query: String,
    #[serde(default)]
    parameters: Option<Vec<String>>,
    result: ResultSet,
}

impl InMemoryExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every execution of `query` with `results`.
    #[must_use]
    pub fn with_result(mut self, query: &str, results: ResultSet) -> Self {
        self.by_name.insert(query.to_string(), results);
        self
    }

    /// Answer `query` bound to exactly `parameters` with `results`.
    #[must_use]
    pub fn with_bound_result<S: AsRef<str>>(
        mut self,
        query: &str,
        parameters: &[S],
        results: ResultSet,
    ) -> Self {
        let parameters = parameters.iter().map(|p| p.as_ref().to_string()).collect();
        self.exact.insert((query.to_string(), parameters), results);
        self
    }

    /// Load fixtures from JSON:
    /// `{"fixtures": [{"query": "...", "parameters": [...]?, "result": {"fields": [...], "rows": [...]}}]}`.
    pub fn from_json(body: &str) -> Result<Self, PostdataError> {
        let file: FixtureFile = serde_json::from_str(body)
            .map_err(|e| PostdataError::ConfigError(format!("Invalid fixture file: {}", e)))?;
        let mut executor = Self::new();
        for fixture in file.fixtures {
            executor = match fixture.parameters {
                Some(parameters) => {
                    executor.with_bound_result(&fixture.query, &parameters, fixture.result)
                }
                None => executor.with_result(&fixture.query, fixture.result),
            };
        }
        Ok(executor)
    }

    /// Total number of executions so far.
    #[must_use]
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Number of executions of one template.
    #[must_use]
    pub fn executions_of(&self, query: &str) -> usize {
        self.per_query
            .lock()
            .map(|counts| counts.get(query).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl QueryExecutor for InMemoryExecutor {
    fn execute(&self, query: &BoundQuery) -> Result<ResultSet, PostdataError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut counts) = self.per_query.lock() {
            *counts.entry(query.name().to_string()).or_insert(0) += 1;
        }

        let key = (query.name().to_string(), query.parameters().to_vec());
        self.exact
            .get(&key)
            .or_else(|| self.by_name.get(query.name()))
            .cloned()
            .ok_or_else(|| PostdataError::QueryError(format!("No fixture for {}", query.name())))
    }
}

// =============================================================================
// TESTS
// =============================================================================
