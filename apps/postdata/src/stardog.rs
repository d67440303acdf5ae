//! # Stardog Adapter
//!
//! [`QueryExecutor`] over Stardog's SPARQL HTTP endpoint.
//!
//! Queries are sent as `POST {protocol}://{host}:{port}/{database}/query`
//! with the SPARQL text in the `query` form field, HTTP basic auth, and
//! SPARQL 1.1 JSON results requested.
//!
//! The client is blocking. Create and call it off the async runtime
//! (`tokio::task::spawn_blocking`).

use postdata_core::{BoundQuery, PostdataError, QueryExecutor, ResultSet};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

use crate::config::StoreConfig;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Request timeout for a single query.
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest response body excerpt carried in an error.
const MAX_ERROR_BODY: usize = 512;

/// Blocking Stardog client.
pub struct StardogExecutor {
    http: Client,
    endpoint: String,
    user: String,
    password: String,
}

impl StardogExecutor {
    pub fn new(config: &StoreConfig) -> Result<Self, PostdataError> {
        let http = Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .map_err(|e| PostdataError::ConnectionError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for StardogExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StardogExecutor")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .finish()
    }
}

impl QueryExecutor for StardogExecutor {
    fn execute(&self, query: &BoundQuery) -> Result<ResultSet, PostdataError> {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query.sparql())])
            .send()
            .map_err(|e| PostdataError::ConnectionError(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| PostdataError::QueryError(format!("Reading response: {}", e)))?;

        if !status.is_success() {
            return Err(PostdataError::QueryError(format!(
                "{} failed with {}: {}",
                query.name(),
                status,
                excerpt(&body)
            )));
        }

        ResultSet::from_sparql_json(&body)
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigLayer};
    use postdata_core::catalog::POEM_TITLE;

    #[test]
    fn endpoint_follows_store_config() {
        let config = Config::resolve(ConfigLayer::default()).expect("config");
        let executor = StardogExecutor::new(&config.store).expect("client");
        assert_eq!(executor.endpoint(), "http://localhost:5820/PD_KG/query");
        assert!(!format!("{:?}", executor).contains("password"));
    }

    #[test]
    fn unreachable_store_is_a_connection_error() {
        let mut layer = ConfigLayer::default();
        // Port 9 (discard) on loopback; nothing listens there in test environments.
        layer.store.host = Some("127.0.0.1".to_string());
        layer.store.port = Some(9);
        let config = Config::resolve(layer).expect("config");
        let executor = StardogExecutor::new(&config.store).expect("client");

        let bound = POEM_TITLE
            .bind(&["http://postdata.linhd.uned.es/resource/pw_a_b"])
            .expect("bind");
        assert!(matches!(
            executor.execute(&bound),
            Err(PostdataError::ConnectionError(_))
        ));
    }

    #[test]
    fn error_excerpt_is_bounded() {
        let body = "x".repeat(2000);
        assert_eq!(excerpt(&body).len(), MAX_ERROR_BODY);
        assert_eq!(excerpt("short"), "short");
    }
}
