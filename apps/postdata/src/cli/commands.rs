//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Commands that touch the store build the executor and run the core on the
//! blocking thread pool, then print JSON to stdout.

use crate::api::{self, AppState};
use crate::config::{Config, StoreConfig};
use crate::stardog::StardogExecutor;
use postdata_core::{
    Corpus, Datatype, FieldTypes, InMemoryExecutor, Poem, PoemUri, PostdataError, QueryExecutor,
    catalog, execute, primitives::DEFAULT_CORPUS,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum size of a fixture file (10 MB).
const MAX_FIXTURE_FILE_SIZE: u64 = 10 * 1024 * 1024;

// =============================================================================
// HELPERS
// =============================================================================

/// Build the query executor: fixtures when given, the triple store otherwise.
///
/// Must run off the async runtime; the Stardog client is blocking.
pub fn connect(
    store: &StoreConfig,
    fixtures: Option<&Path>,
) -> Result<Arc<dyn QueryExecutor>, PostdataError> {
    match fixtures {
        Some(path) => {
            tracing::info!("Answering queries from fixtures in {}", path.display());
            let body = read_fixture_file(path)?;
            Ok(Arc::new(InMemoryExecutor::from_json(&body)?))
        }
        None => {
            let executor = StardogExecutor::new(store)?;
            tracing::info!("Using {} at {}", store.triplestore, executor.endpoint());
            Ok(Arc::new(executor))
        }
    }
}

fn read_fixture_file(path: &Path) -> Result<String, PostdataError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        PostdataError::IoError(format!("Cannot read fixtures '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_FIXTURE_FILE_SIZE {
        return Err(PostdataError::IoError(format!(
            "Fixture file size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_FIXTURE_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path).map_err(|e| {
        PostdataError::IoError(format!("Cannot read fixtures '{}': {}", path.display(), e))
    })
}

/// Connect and run `work` against the executor on the blocking pool.
async fn with_executor<T, F>(
    config: Config,
    fixtures: Option<PathBuf>,
    work: F,
) -> Result<T, PostdataError>
where
    F: FnOnce(&dyn QueryExecutor, &Config) -> Result<T, PostdataError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let executor = connect(&config.store, fixtures.as_deref())?;
        work(executor.as_ref(), &config)
    })
    .await
    .map_err(|e| PostdataError::IoError(format!("Worker task failed: {}", e)))?
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PostdataError> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| PostdataError::IoError(format!("JSON serialization failed: {}", e)))?;
    println!("{}", output);
    Ok(())
}

fn open_poem<'db>(
    uri: String,
    executor: &'db dyn QueryExecutor,
    config: &Config,
) -> Result<Poem<'db, dyn QueryExecutor + 'db>, PostdataError> {
    Poem::builder()
        .uri(uri)
        .database(executor)
        .poetry_lab(
            config.service.poetry_lab_url.as_str(),
            config.service.poetry_lab_lang.as_str(),
        )
        .build()
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    config: Config,
    fixtures: Option<PathBuf>,
    host: &str,
    port: Option<u16>,
    quiet: bool,
) -> Result<(), PostdataError> {
    let port = port.unwrap_or(config.service.port);

    if !quiet {
        println!("POSTDATA 2 DraCor API v{} Starting...", config.service.version);
        println!();
        println!("Configuration:");
        println!("  Host:        {}", host);
        println!("  Port:        {}", port);
        match &fixtures {
            Some(path) => println!("  Fixtures:    {}", path.display()),
            None => println!("  Store:       {}", config.store.endpoint()),
        }
        println!("  Poetry Lab:  {}", config.service.poetry_lab_url);
        println!();
        println!("Endpoints:");
        println!("  GET /health                                      - Health check");
        println!("  GET /info                                        - Service information");
        println!("  GET /corpora                                     - List corpora");
        println!("  GET /corpora/{{corpus}}/poems                      - List poems");
        println!("  GET /corpora/{{corpus}}/poems/{{id}}                 - Poem metadata");
        println!("  GET /corpora/{{corpus}}/poems/{{id}}/analysis        - Metrical analysis");
        println!("  GET /corpora/{{corpus}}/poems/{{id}}/syllables/{{kind}} - Syllable counts");
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    let store = config.store.clone();
    let executor = tokio::task::spawn_blocking(move || connect(&store, fixtures.as_deref()))
        .await
        .map_err(|e| PostdataError::IoError(format!("Worker task failed: {}", e)))??;

    let state = AppState::new(executor, config.service);
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CORPUS COMMANDS
// =============================================================================

/// List the poems of the corpus.
pub async fn cmd_poems(config: Config, fixtures: Option<PathBuf>) -> Result<(), PostdataError> {
    let poems = with_executor(config, fixtures, |executor, config| {
        Corpus::open(DEFAULT_CORPUS, executor)?
            .with_poetry_lab(
                config.service.poetry_lab_url.as_str(),
                config.service.poetry_lab_lang.as_str(),
            )
            .list_poems()
    })
    .await?;
    print_json(&poems)
}

// =============================================================================
// POEM COMMANDS
// =============================================================================

/// Show the metadata of a poem.
pub async fn cmd_poem(
    config: Config,
    fixtures: Option<PathBuf>,
    uri: String,
    include_authors: bool,
    include_analysis: bool,
) -> Result<(), PostdataError> {
    let metadata = with_executor(config, fixtures, move |executor, config| {
        open_poem(uri, executor, config)?.get_metadata(include_authors, include_analysis)
    })
    .await?;
    print_json(&metadata)
}

/// Show the metrical analysis of a poem.
pub async fn cmd_analysis(
    config: Config,
    fixtures: Option<PathBuf>,
    uri: String,
) -> Result<(), PostdataError> {
    let analysis = with_executor(config, fixtures, move |executor, config| {
        let poem = open_poem(uri, executor, config)?;
        poem.get_analysis().cloned()
    })
    .await?;
    print_json(&analysis)
}

/// Print the short identifier of a poem URI.
pub fn cmd_id(uri: &str) -> Result<(), PostdataError> {
    let poem_uri = PoemUri::parse(uri)?;
    println!("{}", poem_uri.id());
    Ok(())
}

// =============================================================================
// QUERY COMMANDS
// =============================================================================

/// List the query catalog.
pub fn cmd_queries() -> Result<(), PostdataError> {
    let queries: Vec<serde_json::Value> = catalog::ALL
        .iter()
        .map(|template| {
            serde_json::json!({
                "name": template.name,
                "description": template.description,
                "parameters": template.parameters,
            })
        })
        .collect();
    print_json(&queries)
}

/// Run one catalog query and print the normalized rows.
pub async fn cmd_query(
    config: Config,
    fixtures: Option<PathBuf>,
    name: String,
    params: Vec<String>,
    types: Vec<(String, Datatype)>,
) -> Result<(), PostdataError> {
    let template = catalog::by_name(&name)
        .ok_or_else(|| PostdataError::QueryError(format!("Unknown query '{}'", name)))?;
    let query = template.bind(&params)?;
    let types = types
        .into_iter()
        .fold(FieldTypes::new(), |types, (field, datatype)| {
            types.with(field, datatype)
        });

    let rows = with_executor(config, fixtures, move |executor, _| {
        execute(executor, query)?.results.simplify(&types)
    })
    .await?;
    print_json(&rows)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLayer;
    use std::io::Write;

    #[test]
    fn connect_reads_fixtures() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"fixtures": [{{"query": "CorpusCountPoems", "result": {{"fields": ["count"], "rows": [{{"count": "3"}}]}}}}]}}"#
        )
        .expect("write");

        let config = Config::resolve(ConfigLayer::default()).expect("config");
        let executor = connect(&config.store, Some(file.path())).expect("connect");
        let bound = catalog::CORPUS_COUNT_POEMS.bind::<&str>(&[]).expect("bind");
        let results = executor.execute(&bound).expect("execute");
        assert_eq!(results.ints("count").expect("ints"), vec![3]);
    }

    #[test]
    fn connect_reports_missing_fixtures() {
        let config = Config::resolve(ConfigLayer::default()).expect("config");
        let result = connect(&config.store, Some(Path::new("/nonexistent/fixtures.json")));
        assert!(matches!(result, Err(PostdataError::IoError(_))));
    }

    #[test]
    fn open_poem_borrows_a_scoped_executor() {
        let mut layer = ConfigLayer::default();
        layer.service.poetry_lab_lang = Some("es".to_string());
        let config = Config::resolve(layer).expect("config");

        let db = InMemoryExecutor::new();
        let poem = open_poem(
            "http://postdata.linhd.uned.es/resource/pw_jane-doe_my-poem".to_string(),
            &db,
            &config,
        )
        .expect("poem");

        assert_eq!(poem.get_id().expect("id"), "e75985ca");
        assert_eq!(
            poem.get_poetry_lab_url().expect("url"),
            "http://poetry.linhd.uned.es:3000/es/author/jane-doe/poetic-work/my-poem"
        );
        assert_eq!(db.executions(), 0);
    }

    #[test]
    fn id_rejects_malformed_uri() {
        assert!(matches!(
            cmd_id("http://postdata.linhd.uned.es/resource/nounderscore"),
            Err(PostdataError::MalformedUri(_))
        ));
    }
}
