//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! The core is synchronous and its executor blocks on the network, so every
//! handler touching the store runs its work through [`blocking`].

use super::{
    AppState,
    types::{ApiError, CorporaParams, HealthResponse, InfoResponse, SyllablesResponse},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use postdata_core::{
    Analysis, Corpus, CorpusMetadata, PoemMetadata, PostdataError, QueryExecutor, SyllableKind,
    primitives::DEFAULT_CORPUS,
};

// =============================================================================
// HELPERS
// =============================================================================

/// Run core work on the blocking thread pool.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PostdataError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError(PostdataError::IoError(format!("Worker task failed: {}", e))))?
        .map_err(ApiError)
}

/// Open a corpus with the service's Poetry Lab settings.
fn open_corpus<'a>(
    state: &'a AppState,
    name: &str,
) -> Result<Corpus<'a, dyn QueryExecutor>, PostdataError> {
    Ok(Corpus::open(name, state.executor.as_ref())?.with_poetry_lab(
        state.service.poetry_lab_url.as_str(),
        state.service.poetry_lab_lang.as_str(),
    ))
}

// =============================================================================
// HEALTH & INFO HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Information about the service.
pub async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse::new(state.service.version.as_str()))
}

// =============================================================================
// CORPUS HANDLERS
// =============================================================================

/// List available corpora, optionally with metrics.
///
/// An `include` value other than `metrics` is rejected with a plain-text 400.
pub async fn corpora_handler(
    State(state): State<AppState>,
    Query(params): Query<CorporaParams>,
) -> Response {
    let include_metrics = match params.include.as_deref() {
        None => false,
        Some("metrics") => true,
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("{} is not a valid value of parameter 'include'.", other),
            )
                .into_response();
        }
    };

    let result = blocking(move || -> Result<Vec<CorpusMetadata>, PostdataError> {
        let corpus = open_corpus(&state, DEFAULT_CORPUS)?;
        Ok(vec![corpus.get_metadata(include_metrics)?])
    })
    .await;

    match result {
        Ok(corpora) => Json(corpora).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Basic metadata of every poem in a corpus.
pub async fn poems_handler(
    State(state): State<AppState>,
    Path(corpus): Path<String>,
) -> Result<Json<Vec<PoemMetadata>>, ApiError> {
    let poems = blocking(move || open_corpus(&state, &corpus)?.list_poems()).await?;
    Ok(Json(poems))
}

// =============================================================================
// POEM HANDLERS
// =============================================================================

/// Metadata of one poem, with authors.
pub async fn poem_handler(
    State(state): State<AppState>,
    Path((corpus, id)): Path<(String, String)>,
) -> Result<Json<PoemMetadata>, ApiError> {
    let metadata = blocking(move || {
        let corpus = open_corpus(&state, &corpus)?;
        corpus.poem(&id)?.get_metadata(true, false)
    })
    .await?;
    Ok(Json(metadata))
}

/// Metrical analysis of one poem.
pub async fn analysis_handler(
    State(state): State<AppState>,
    Path((corpus, id)): Path<(String, String)>,
) -> Result<Json<Analysis>, ApiError> {
    let analysis = blocking(move || {
        let corpus = open_corpus(&state, &corpus)?;
        let poem = corpus.poem(&id)?;
        poem.get_analysis().cloned()
    })
    .await?;
    Ok(Json(analysis))
}

/// Syllable counts of one kind (`metrical` or `grammatical`).
pub async fn syllables_handler(
    State(state): State<AppState>,
    Path((corpus, id, kind)): Path<(String, String, String)>,
) -> Result<Json<SyllablesResponse>, ApiError> {
    let kind: SyllableKind = kind.parse()?;
    let response = blocking(move || {
        let corpus = open_corpus(&state, &corpus)?;
        let poem = corpus.poem(&id)?;
        Ok(SyllablesResponse {
            kind,
            total: poem.get_number_of_syllables(kind)?,
            in_stanzas: poem.get_number_of_syllables_in_stanzas(kind)?,
        })
    })
    .await?;
    Ok(Json(response))
}
