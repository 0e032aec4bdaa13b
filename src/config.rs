use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::time::Duration;

use crate::omdb::OmdbClient;
use crate::schemas::AppState;

/// Initialize application state against the given database URL.
///
/// The database connection and the OMDb client are constructed exactly
/// once here and handed to every handler through [`AppState`]; nothing
/// else in the service opens connections or reads the environment.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let omdb_api_key = std::env::var("OMDB_API_KEY").ok();
    if omdb_api_key.is_none() {
        tracing::warn!("OMDB_API_KEY is not set; external search endpoints will reject requests");
    }
    let omdb = OmdbClient::new(omdb_api_key)?;

    // External search results change rarely; cache pages briefly.
    let search_cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    Ok(AppState {
        db,
        omdb,
        search_cache,
    })
}
