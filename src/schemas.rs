use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::omdb::{OmdbClient, OmdbSearchPage};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// OMDb metadata client
    pub omdb: OmdbClient,
    /// Cache for external search results
    pub search_cache: Cache<String, OmdbSearchPage>,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::movies::create_movie,
        crate::handlers::movies::get_movies,
        crate::handlers::movies::get_movie,
        crate::handlers::movies::update_movie,
        crate::handlers::movies::patch_movie,
        crate::handlers::movies::delete_movie,
        crate::handlers::movies::get_movie_reviews,
        crate::handlers::movies::create_movie_review,
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::get_reviews,
        crate::handlers::reviews::get_review,
        crate::handlers::reviews::update_review,
        crate::handlers::reviews::patch_review,
        crate::handlers::reviews::delete_review,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::patch_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::add_favorite,
        crate::handlers::users::remove_favorite,
        crate::handlers::users::follow_user,
        crate::handlers::users::unfollow_user,
        crate::handlers::search::search_movies,
        crate::handlers::search::get_search_detail,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ApiResponse<crate::handlers::movies::MovieResponse>,
            ApiResponse<Vec<crate::handlers::movies::MovieResponse>>,
            ApiResponse<crate::handlers::movies::MovieDetailResponse>,
            ApiResponse<crate::handlers::reviews::ReviewResponse>,
            ApiResponse<Vec<crate::handlers::reviews::ReviewResponse>>,
            ApiResponse<crate::handlers::users::UserDetailResponse>,
            ApiResponse<crate::handlers::auth::AuthResponse>,
            ApiResponse<relations::privacy::FullUser>,
            ApiResponse<Vec<relations::privacy::PublicUser>>,
            ApiResponse<String>,
            crate::handlers::movies::CreateMovieRequest,
            crate::handlers::movies::UpdateMovieRequest,
            crate::handlers::movies::MovieResponse,
            crate::handlers::movies::MovieDetailResponse,
            crate::handlers::movies::MovieReviewResponse,
            crate::handlers::movies::MovieSummary,
            crate::handlers::movies::CreateMovieReviewRequest,
            crate::handlers::reviews::CreateReviewRequest,
            crate::handlers::reviews::UpdateReviewRequest,
            crate::handlers::reviews::ReviewResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserDetailResponse,
            crate::handlers::users::UserReviewResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::omdb::OmdbSearchHit,
            crate::omdb::OmdbSearchPage,
            crate::omdb::OmdbMovieDetail,
            relations::privacy::PublicUser,
            relations::privacy::FullUser,
            relations::privacy::UserView,
            relations::privacy::UserSummary,
            common::ResourceRef<relations::privacy::UserSummary>,
            common::ResourceRef<crate::handlers::movies::MovieSummary>,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "movies", description = "Movie catalog endpoints"),
        (name = "reviews", description = "Review endpoints"),
        (name = "users", description = "User, favorite and follow endpoints"),
        (name = "search", description = "External movie metadata proxy"),
    ),
    info(
        title = "Cinelog API",
        description = "Movie review platform API - search, save and review movies, follow other reviewers",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
