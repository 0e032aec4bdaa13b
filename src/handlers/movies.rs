use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use common::ResourceRef;
use model::entities::{movie, review, user};
use model::types::RefSet;
use relations::privacy::UserSummary;
use relations::reviews::NewReview;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ensure_valid_id, ApiError};
use crate::helpers::converters::coerce_opt_int;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new movie
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Release year; accepted as a number or a numeric string
    #[serde(default, deserialize_with = "coerce_opt_int")]
    #[schema(value_type = Option<i32>)]
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub genre: Option<String>,
}

/// Request body for updating a movie; only provided fields are applied
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce_opt_int")]
    #[schema(value_type = Option<i32>)]
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub genre: Option<String>,
}

/// Request body for creating a review under a movie
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMovieReviewRequest {
    /// Rating; accepted as a number or a numeric string
    #[serde(default, deserialize_with = "coerce_opt_int")]
    #[schema(value_type = Option<i32>)]
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub user_id: Option<String>,
}

/// Query parameters for listing movies
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct MoviesQuery {
    /// Filter by genre
    pub genre: Option<String>,
    /// Filter by release year
    pub year: Option<i32>,
    /// Maximum number of movies to return
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// Movie response model; reference sets are returned as raw identifiers
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub poster_url: Option<String>,
    pub genre: String,
    pub reviews: Vec<String>,
    pub favorited_by: Vec<String>,
}

impl From<movie::Model> for MovieResponse {
    fn from(model: movie::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            release_year: model.release_year,
            poster_url: model.poster_url,
            genre: model.genre,
            reviews: model.reviews.to_vec(),
            favorited_by: model.favorited_by.to_vec(),
        }
    }
}

/// A movie reference embedded in another entity's output
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
}

impl From<&movie::Model> for MovieSummary {
    fn from(model: &movie::Model) -> Self {
        Self {
            id: model.id.clone(),
            title: model.title.clone(),
        }
    }
}

/// One of the movie's reviews with its author expanded
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieReviewResponse {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub user_id: ResourceRef<UserSummary>,
}

/// A movie with reviews and favoriters expanded
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieDetailResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub poster_url: Option<String>,
    pub genre: String,
    pub reviews: Vec<MovieReviewResponse>,
    pub favorited_by: Vec<UserSummary>,
}

/// Create a new movie
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    tag = "movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_movie(
    State(state): State<AppState>,
    Json(request): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MovieResponse>>), ApiError> {
    trace!("Entering create_movie function");

    let (title, description, release_year, genre) = match (
        request.title.filter(|v| !v.is_empty()),
        request.description.filter(|v| !v.is_empty()),
        request.release_year,
        request.genre.filter(|v| !v.is_empty()),
    ) {
        (Some(title), Some(description), Some(release_year), Some(genre)) => {
            (title, description, release_year, genre)
        }
        _ => {
            warn!("Movie creation rejected: missing required fields");
            return Err(ApiError::ValidationFailed(
                "Title, description, releaseYear, and genre are required".to_string(),
            ));
        }
    };

    debug!(%title, release_year, "Creating movie");
    let new_movie = movie::ActiveModel {
        id: Set(common::new_entity_id()),
        title: Set(title),
        description: Set(description),
        release_year: Set(release_year),
        poster_url: Set(request.poster_url),
        genre: Set(genre),
        reviews: Set(RefSet::new()),
        favorited_by: Set(RefSet::new()),
    };

    match new_movie.insert(&state.db).await {
        Ok(movie_model) => {
            info!(movie_id = %movie_model.id, title = %movie_model.title, "Movie created successfully");
            let response = ApiResponse {
                data: MovieResponse::from(movie_model),
                message: "Movie created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create movie: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Get all movies
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    tag = "movies",
    params(MoviesQuery),
    responses(
        (status = 200, description = "Movies retrieved successfully", body = ApiResponse<Vec<MovieResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movies(
    Valid(Query(query)): Valid<Query<MoviesQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MovieResponse>>>, ApiError> {
    trace!("Entering get_movies function");
    debug!(?query, "Fetching movies from database");

    let mut select = movie::Entity::find();
    if let Some(genre) = &query.genre {
        select = select.filter(movie::Column::Genre.eq(genre.clone()));
    }
    if let Some(year) = query.year {
        select = select.filter(movie::Column::ReleaseYear.eq(year));
    }
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    match select.all(&state.db).await {
        Ok(movies) => {
            let movie_count = movies.len();
            let movie_responses: Vec<MovieResponse> =
                movies.into_iter().map(MovieResponse::from).collect();

            info!("Successfully retrieved {} movies", movie_count);
            let response = ApiResponse {
                data: movie_responses,
                message: "Movies retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve movies from database: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Get a specific movie by ID with reviews and favoriters expanded
#[utoipa::path(
    get,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie retrieved successfully", body = ApiResponse<MovieDetailResponse>),
        (status = 400, description = "Invalid movie ID format", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movie(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MovieDetailResponse>>, ApiError> {
    trace!("Entering get_movie function for movie_id: {}", movie_id);
    ensure_valid_id(&movie_id, "movie")?;

    let movie = match movie::Entity::find_by_id(&movie_id).one(&state.db).await {
        Ok(Some(movie)) => movie,
        Ok(None) => {
            warn!(%movie_id, "Movie not found");
            return Err(ApiError::NotFound("Movie not found".to_string()));
        }
        Err(db_error) => {
            error!(%movie_id, "Failed to retrieve movie: {}", db_error);
            return Err(db_error.into());
        }
    };

    // Expand the movie's review set, newest first, with each author
    // resolved to a summary when the user still exists.
    let reviews: Vec<review::Model> = if movie.reviews.is_empty() {
        Vec::new()
    } else {
        review::Entity::find()
            .filter(review::Column::Id.is_in(movie.reviews.to_vec()))
            .order_by_desc(review::Column::CreatedAt)
            .all(&state.db)
            .await?
    };
    let author_ids: Vec<String> = reviews.iter().map(|r| r.user_id.clone()).collect();
    let authors: HashMap<String, UserSummary> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&state.db)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect()
    };
    let reviews: Vec<MovieReviewResponse> = reviews
        .into_iter()
        .map(|r| {
            let author = ResourceRef::resolve_with(r.user_id.clone(), authors.get(&r.user_id).cloned());
            MovieReviewResponse {
                id: r.id,
                rating: r.rating,
                comment: r.comment,
                created_at: r.created_at,
                user_id: author,
            }
        })
        .collect();

    // Expand favoriters into summaries; dangling ids are skipped.
    let favorited_by: Vec<UserSummary> = if movie.favorited_by.is_empty() {
        Vec::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(movie.favorited_by.to_vec()))
            .all(&state.db)
            .await?
            .iter()
            .map(UserSummary::from)
            .collect()
    };

    info!(%movie_id, "Successfully retrieved movie");
    let response = ApiResponse {
        data: MovieDetailResponse {
            id: movie.id,
            title: movie.title,
            description: movie.description,
            release_year: movie.release_year,
            poster_url: movie.poster_url,
            genre: movie.genre,
            reviews,
            favorited_by,
        },
        message: "Movie retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a movie (full update)
#[utoipa::path(
    put,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid movie ID format", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_movie(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateMovieRequest>,
) -> Result<Json<ApiResponse<MovieResponse>>, ApiError> {
    apply_movie_update(&movie_id, &state, request).await
}

/// Partially update a movie
#[utoipa::path(
    patch,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated successfully", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid movie ID format", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn patch_movie(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateMovieRequest>,
) -> Result<Json<ApiResponse<MovieResponse>>, ApiError> {
    apply_movie_update(&movie_id, &state, request).await
}

async fn apply_movie_update(
    movie_id: &str,
    state: &AppState,
    request: UpdateMovieRequest,
) -> Result<Json<ApiResponse<MovieResponse>>, ApiError> {
    trace!("Entering apply_movie_update for movie_id: {}", movie_id);
    ensure_valid_id(movie_id, "movie")?;

    let existing = match movie::Entity::find_by_id(movie_id).one(&state.db).await {
        Ok(Some(movie)) => movie,
        Ok(None) => {
            warn!(%movie_id, "Movie not found for update");
            return Err(ApiError::NotFound("Movie not found".to_string()));
        }
        Err(db_error) => {
            error!(%movie_id, "Failed to lookup movie for update: {}", db_error);
            return Err(db_error.into());
        }
    };

    let mut movie_active: movie::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(title) = request.title.filter(|v| !v.is_empty()) {
        movie_active.title = Set(title.clone());
        updated_fields.push(format!("title: {title}"));
    }
    if let Some(description) = request.description.filter(|v| !v.is_empty()) {
        movie_active.description = Set(description);
        updated_fields.push("description".to_string());
    }
    if let Some(release_year) = request.release_year {
        movie_active.release_year = Set(release_year);
        updated_fields.push(format!("release_year: {release_year}"));
    }
    if let Some(poster_url) = request.poster_url {
        movie_active.poster_url = Set(Some(poster_url));
        updated_fields.push("poster_url".to_string());
    }
    if let Some(genre) = request.genre.filter(|v| !v.is_empty()) {
        movie_active.genre = Set(genre.clone());
        updated_fields.push(format!("genre: {genre}"));
    }

    if updated_fields.is_empty() {
        debug!(%movie_id, "No fields to update");
        let unchanged = movie::Entity::find_by_id(movie_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;
        let response = ApiResponse {
            data: MovieResponse::from(unchanged),
            message: "Movie updated successfully".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    debug!(%movie_id, "Updating fields: {}", updated_fields.join(", "));
    match movie_active.update(&state.db).await {
        Ok(updated) => {
            info!(%movie_id, "Movie updated successfully");
            let response = ApiResponse {
                data: MovieResponse::from(updated),
                message: "Movie updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(%movie_id, "Failed to update movie: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Delete a movie
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{movie_id}",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid movie ID format", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_movie(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_movie function for movie_id: {}", movie_id);
    ensure_valid_id(&movie_id, "movie")?;

    // Deletion does not cascade: reviews keep their movie_id and users
    // keep the id in their favorites; readers tolerate the dangling refs.
    match movie::Entity::delete_by_id(&movie_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!(%movie_id, "Movie deleted successfully");
                let response = ApiResponse {
                    data: format!("Movie {movie_id} deleted"),
                    message: "Movie deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!(%movie_id, "Movie not found for deletion");
                Err(ApiError::NotFound("Movie not found".to_string()))
            }
        }
        Err(db_error) => {
            error!(%movie_id, "Failed to delete movie: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Get all reviews for a specific movie
#[utoipa::path(
    get,
    path = "/api/v1/movies/{movie_id}/reviews",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Vec<crate::handlers::reviews::ReviewResponse>>),
        (status = 400, description = "Invalid movie ID format", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movie_reviews(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<crate::handlers::reviews::ReviewResponse>>>, ApiError> {
    trace!("Entering get_movie_reviews for movie_id: {}", movie_id);
    ensure_valid_id(&movie_id, "movie")?;

    let reviews = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie_id.clone()))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let review_count = reviews.len();
    let responses = crate::handlers::reviews::build_review_responses(&state.db, reviews).await?;

    info!(%movie_id, "Retrieved {} reviews for movie", review_count);
    let response = ApiResponse {
        data: responses,
        message: "Reviews retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a review for a movie
#[utoipa::path(
    post,
    path = "/api/v1/movies/{movie_id}/reviews",
    tag = "movies",
    params(
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    request_body = CreateMovieReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<crate::handlers::reviews::ReviewResponse>),
        (status = 400, description = "Missing required fields or invalid ID", body = ErrorResponse),
        (status = 404, description = "Movie or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_movie_review(
    Path(movie_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CreateMovieReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<crate::handlers::reviews::ReviewResponse>>), ApiError> {
    trace!("Entering create_movie_review for movie_id: {}", movie_id);
    ensure_valid_id(&movie_id, "movie")?;

    let (rating, comment, user_id) = match (
        request.rating,
        request.comment.filter(|v| !v.is_empty()),
        request.user_id.filter(|v| !v.is_empty()),
    ) {
        (Some(rating), Some(comment), Some(user_id)) => (rating, comment, user_id),
        _ => {
            warn!(%movie_id, "Review creation rejected: missing required fields");
            return Err(ApiError::ValidationFailed(
                "Rating, comment, and userId are required".to_string(),
            ));
        }
    };

    let created = match relations::reviews::attach_review(
        &state.db,
        NewReview { rating, comment },
        &movie_id,
        &user_id,
    )
    .await
    {
        Ok(created) => created,
        Err(relation_error) => {
            warn!(%movie_id, %user_id, "Failed to attach review: {}", relation_error);
            return Err(relation_error.into());
        }
    };

    info!(review_id = %created.id, %movie_id, %user_id, "Review created successfully");
    let response = ApiResponse {
        data: crate::handlers::reviews::ReviewResponse::unresolved(created),
        message: "Review created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}
