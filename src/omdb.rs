//! OMDb API client.
//!
//! The service proxies movie search and detail lookups to OMDb
//! (<https://www.omdbapi.com/>). OMDb reports most failures as HTTP 200
//! with `Response: "False"` and an `Error` string, so classification
//! happens on both the status code and the body.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb client errors
#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("OMDB API key is required. Set OMDB_API_KEY in the environment.")]
    MissingApiKey,

    #[error("OMDB API authentication failed. Please check your API key.")]
    InvalidApiKey,

    #[error("OMDB API access forbidden. Your API key may have exceeded the rate limit.")]
    RateLimited,

    #[error("{0}")]
    NotFound(String),

    #[error("OMDB API error {0}: {1}")]
    Api(u16, String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One hit in an OMDb title search.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OmdbSearchHit {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub media_type: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

/// A page of OMDb search results, forwarded to the caller as-is.
///
/// Benign upstream answers like "Movie not found!" keep the 200 status
/// and surface as an `error` note next to an empty result list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct OmdbSearchPage {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchHit>,
    #[serde(rename = "totalResults", default)]
    pub total_results: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OmdbSearchPage {
    fn empty_with_error(message: String) -> Self {
        Self {
            search: Vec::new(),
            total_results: "0".to_string(),
            error: Some(message),
        }
    }
}

/// OMDb movie detail by IMDb id.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OmdbMovieDetail {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Rated", default)]
    pub rated: Option<String>,
    #[serde(rename = "Released", default)]
    pub released: Option<String>,
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
}

/// OMDb API client
#[derive(Clone, Debug)]
pub struct OmdbClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(api_key: Option<String>) -> Result<Self, OmdbError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OmdbError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    fn key(&self) -> Result<&str, OmdbError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() && key != "demo" => Ok(key),
            _ => Err(OmdbError::MissingApiKey),
        }
    }

    /// Search movies by title.
    pub async fn search(&self, query: &str, page: u32) -> Result<OmdbSearchPage, OmdbError> {
        let key = self.key()?;

        debug!(query, page, "Querying OMDB search");
        let body = self
            .request(&[
                ("apikey", key),
                ("s", query),
                ("page", &page.to_string()),
                ("type", "movie"),
            ])
            .await?;

        if let Some(message) = upstream_error(&body)? {
            // "Movie not found!" and "Too many results." are answers, not
            // failures; forward them with an empty page.
            return Ok(OmdbSearchPage::empty_with_error(message));
        }

        serde_json::from_value(body).map_err(|e| OmdbError::Parse(e.to_string()))
    }

    /// Lookup one movie by IMDb id.
    pub async fn lookup(&self, imdb_id: &str) -> Result<OmdbMovieDetail, OmdbError> {
        let key = self.key()?;

        debug!(imdb_id, "Querying OMDB detail");
        let body = self
            .request(&[("apikey", key), ("i", imdb_id), ("plot", "full")])
            .await?;

        if let Some(message) = upstream_error(&body)? {
            return Err(OmdbError::NotFound(message));
        }

        serde_json::from_value(body).map_err(|e| OmdbError::Parse(e.to_string()))
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, OmdbError> {
        let response = self
            .http_client
            .get(OMDB_BASE_URL)
            .query(params)
            .send()
            .await
            .map_err(|e| OmdbError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(OmdbError::InvalidApiKey);
        }
        if status.as_u16() == 403 {
            return Err(OmdbError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OmdbError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OmdbError::Parse(e.to_string()))
    }
}

/// Inspect an OMDb 200 body for the in-band failure signal. Credential
/// and rate-limit messages become hard errors; anything else is returned
/// for the caller to interpret.
fn upstream_error(body: &serde_json::Value) -> Result<Option<String>, OmdbError> {
    if body.get("Response").and_then(|v| v.as_str()) != Some("False") {
        return Ok(None);
    }

    let message = body
        .get("Error")
        .and_then(|v| v.as_str())
        .unwrap_or("No results found")
        .to_string();

    let lowered = message.to_lowercase();
    if lowered.contains("invalid api key") {
        return Err(OmdbError::InvalidApiKey);
    }
    if lowered.contains("request limit") {
        return Err(OmdbError::RateLimited);
    }

    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_without_key_reports_missing_key() {
        let client = OmdbClient::new(None).unwrap();
        assert!(matches!(client.key(), Err(OmdbError::MissingApiKey)));

        let client = OmdbClient::new(Some("demo".to_string())).unwrap();
        assert!(matches!(client.key(), Err(OmdbError::MissingApiKey)));

        let client = OmdbClient::new(Some("abc123".to_string())).unwrap();
        assert_eq!(client.key().unwrap(), "abc123");
    }

    #[test]
    fn in_band_credential_failure_is_classified() {
        let body = serde_json::json!({ "Response": "False", "Error": "Invalid API key!" });
        assert!(matches!(
            upstream_error(&body),
            Err(OmdbError::InvalidApiKey)
        ));
    }

    #[test]
    fn in_band_no_results_is_benign() {
        let body = serde_json::json!({ "Response": "False", "Error": "Movie not found!" });
        assert_eq!(
            upstream_error(&body).unwrap(),
            Some("Movie not found!".to_string())
        );
    }

    #[test]
    fn search_page_parses_omdb_shape() {
        let body = serde_json::json!({
            "Search": [
                { "Title": "Arrival", "Year": "2016", "imdbID": "tt2543164", "Type": "movie", "Poster": "https://example.com/p.jpg" }
            ],
            "totalResults": "1",
            "Response": "True"
        });
        let page: OmdbSearchPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.search.len(), 1);
        assert_eq!(page.search[0].imdb_id, "tt2543164");
        assert_eq!(page.total_results, "1");
    }
}
