use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::omdb::{OmdbMovieDetail, OmdbSearchPage};
use crate::schemas::{AppState, ErrorResponse};

/// Query parameters for the external movie search
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SearchQuery {
    /// Search query (movie title)
    pub q: Option<String>,
    /// Result page, defaults to 1
    pub page: Option<u32>,
}

/// Search the external movie database by title
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = OmdbSearchPage),
        (status = 400, description = "Missing search query", body = ErrorResponse),
        (status = 401, description = "Missing or invalid upstream credentials", body = ErrorResponse),
        (status = 403, description = "Upstream rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn search_movies(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<OmdbSearchPage>, ApiError> {
    trace!("Entering search_movies function");

    let q = match query.q.filter(|v| !v.is_empty()) {
        Some(q) => q,
        None => {
            return Err(ApiError::ValidationFailed(
                "Search query is required".to_string(),
            ));
        }
    };
    let page = query.page.unwrap_or(1);

    let cache_key = format!("search_{q}_{page}");
    if let Some(cached) = state.search_cache.get(&cache_key).await {
        debug!(%q, page, "Search results served from cache");
        return Ok(Json(cached));
    }

    let results = match state.omdb.search(&q, page).await {
        Ok(results) => results,
        Err(omdb_error) => {
            warn!(%q, page, "External search failed: {}", omdb_error);
            return Err(omdb_error.into());
        }
    };

    state.search_cache.insert(cache_key, results.clone()).await;

    info!(%q, page, hits = results.search.len(), "External search completed");
    Ok(Json(results))
}

/// Fetch one movie's details from the external database by IMDb id
#[utoipa::path(
    get,
    path = "/api/v1/search/{imdb_id}",
    tag = "search",
    params(
        ("imdb_id" = String, Path, description = "IMDb identifier, e.g. tt2543164"),
    ),
    responses(
        (status = 200, description = "Movie details", body = OmdbMovieDetail),
        (status = 400, description = "Missing IMDb id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid upstream credentials", body = ErrorResponse),
        (status = 403, description = "Upstream rate limit exceeded", body = ErrorResponse),
        (status = 404, description = "Movie not found upstream", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_search_detail(
    Path(imdb_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OmdbMovieDetail>, ApiError> {
    trace!("Entering get_search_detail for imdb_id: {}", imdb_id);

    if imdb_id.is_empty() {
        return Err(ApiError::ValidationFailed(
            "IMDB ID is required".to_string(),
        ));
    }

    let detail = match state.omdb.lookup(&imdb_id).await {
        Ok(detail) => detail,
        Err(omdb_error) => {
            warn!(%imdb_id, "External detail lookup failed: {}", omdb_error);
            return Err(omdb_error.into());
        }
    };

    info!(%imdb_id, title = %detail.title, "External detail lookup completed");
    Ok(Json(detail))
}
