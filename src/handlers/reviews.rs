use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use common::ResourceRef;
use model::entities::{movie, review, user};
use relations::privacy::UserSummary;
use relations::reviews::NewReview;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ensure_valid_id, ApiError};
use crate::handlers::movies::MovieSummary;
use crate::helpers::converters::coerce_opt_int;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new review
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Rating; accepted as a number or a numeric string
    #[serde(default, deserialize_with = "coerce_opt_int")]
    #[schema(value_type = Option<i32>)]
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub movie_id: Option<String>,
    pub user_id: Option<String>,
}

/// Request body for updating a review; only rating and comment may change
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateReviewRequest {
    #[serde(default, deserialize_with = "coerce_opt_int")]
    #[schema(value_type = Option<i32>)]
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Query parameters for listing reviews
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ReviewsQuery {
    /// Filter by movie
    pub movie_id: Option<String>,
    /// Filter by author
    pub user_id: Option<String>,
    /// Filter by exact rating
    pub rating: Option<i32>,
    /// Maximum number of reviews to return
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// Review response model. The movie and author references are expanded to
/// summaries when those entities still exist; otherwise the raw
/// identifier is carried through.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub movie_id: ResourceRef<MovieSummary>,
    pub user_id: ResourceRef<UserSummary>,
}

impl ReviewResponse {
    /// A response carrying the stored identifiers unexpanded, as returned
    /// from create and update operations.
    pub fn unresolved(model: review::Model) -> Self {
        Self {
            id: model.id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            movie_id: ResourceRef::Unresolved(model.movie_id),
            user_id: ResourceRef::Unresolved(model.user_id),
        }
    }
}

/// Expand a batch of reviews into responses with movie and author
/// summaries resolved where possible.
pub(crate) async fn build_review_responses(
    db: &DatabaseConnection,
    reviews: Vec<review::Model>,
) -> Result<Vec<ReviewResponse>, ApiError> {
    if reviews.is_empty() {
        return Ok(Vec::new());
    }

    let movie_ids: Vec<String> = reviews.iter().map(|r| r.movie_id.clone()).collect();
    let user_ids: Vec<String> = reviews.iter().map(|r| r.user_id.clone()).collect();

    let movies: HashMap<String, MovieSummary> = movie::Entity::find()
        .filter(movie::Column::Id.is_in(movie_ids))
        .all(db)
        .await?
        .iter()
        .map(|m| (m.id.clone(), MovieSummary::from(m)))
        .collect();
    let users: HashMap<String, UserSummary> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .iter()
        .map(|u| (u.id.clone(), UserSummary::from(u)))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|r| {
            let movie_ref =
                ResourceRef::resolve_with(r.movie_id.clone(), movies.get(&r.movie_id).cloned());
            let user_ref =
                ResourceRef::resolve_with(r.user_id.clone(), users.get(&r.user_id).cloned());
            ReviewResponse {
                id: r.id,
                rating: r.rating,
                comment: r.comment,
                created_at: r.created_at,
                movie_id: movie_ref,
                user_id: user_ref,
            }
        })
        .collect())
}

/// Create a new review
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Missing required fields or invalid ID", body = ErrorResponse),
        (status = 404, description = "Movie or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ApiError> {
    trace!("Entering create_review function");

    let (rating, comment, movie_id, user_id) = match (
        request.rating,
        request.comment.filter(|v| !v.is_empty()),
        request.movie_id.filter(|v| !v.is_empty()),
        request.user_id.filter(|v| !v.is_empty()),
    ) {
        (Some(rating), Some(comment), Some(movie_id), Some(user_id)) => {
            (rating, comment, movie_id, user_id)
        }
        _ => {
            warn!("Review creation rejected: missing required fields");
            return Err(ApiError::ValidationFailed(
                "Rating, comment, movieId, and userId are required".to_string(),
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
        data: ReviewResponse::unresolved(created),
        message: "Review created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all reviews
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    tag = "reviews",
    params(ReviewsQuery),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Vec<ReviewResponse>>),
        (status = 400, description = "Invalid filter ID format", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_reviews(
    Valid(Query(query)): Valid<Query<ReviewsQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ReviewResponse>>>, ApiError> {
    trace!("Entering get_reviews function");
    debug!(?query, "Fetching reviews from database");

    let mut select = review::Entity::find();
    if let Some(movie_id) = &query.movie_id {
        ensure_valid_id(movie_id, "movie")?;
        select = select.filter(review::Column::MovieId.eq(movie_id.clone()));
    }
    if let Some(user_id) = &query.user_id {
        ensure_valid_id(user_id, "user")?;
        select = select.filter(review::Column::UserId.eq(user_id.clone()));
    }
    if let Some(rating) = query.rating {
        select = select.filter(review::Column::Rating.eq(rating));
    }
    select = select.order_by_desc(review::Column::CreatedAt);
    if let Some(limit) = query.limit {
        select = select.limit(limit);
    }

    let reviews = match select.all(&state.db).await {
        Ok(reviews) => reviews,
        Err(db_error) => {
            error!("Failed to retrieve reviews from database: {}", db_error);
            return Err(db_error.into());
        }
    };

    let review_count = reviews.len();
    let responses = build_review_responses(&state.db, reviews).await?;

    info!("Successfully retrieved {} reviews", review_count);
    let response = ApiResponse {
        data: responses,
        message: "Reviews retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific review by ID
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = String, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review retrieved successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid review ID format", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_review(
    Path(review_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    trace!("Entering get_review function for review_id: {}", review_id);
    ensure_valid_id(&review_id, "review")?;

    let review = match review::Entity::find_by_id(&review_id).one(&state.db).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            warn!(%review_id, "Review not found");
            return Err(ApiError::NotFound("Review not found".to_string()));
        }
        Err(db_error) => {
            error!(%review_id, "Failed to retrieve review: {}", db_error);
            return Err(db_error.into());
        }
    };

    let mut responses = build_review_responses(&state.db, vec![review]).await?;
    let response_body = responses.remove(0);

    info!(%review_id, "Successfully retrieved review");
    let response = ApiResponse {
        data: response_body,
        message: "Review retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a review (full update)
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = String, Path, description = "Review ID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid review ID format", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_review(
    Path(review_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    apply_review_update(&review_id, &state, request).await
}

/// Partially update a review
#[utoipa::path(
    patch,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = String, Path, description = "Review ID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Invalid review ID format", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn patch_review(
    Path(review_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    apply_review_update(&review_id, &state, request).await
}

async fn apply_review_update(
    review_id: &str,
    state: &AppState,
    request: UpdateReviewRequest,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    trace!("Entering apply_review_update for review_id: {}", review_id);
    ensure_valid_id(review_id, "review")?;

    let existing = match review::Entity::find_by_id(review_id).one(&state.db).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            warn!(%review_id, "Review not found for update");
            return Err(ApiError::NotFound("Review not found".to_string()));
        }
        Err(db_error) => {
            error!(%review_id, "Failed to lookup review for update: {}", db_error);
            return Err(db_error.into());
        }
    };

    let mut review_active: review::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(rating) = request.rating {
        review_active.rating = Set(rating);
        updated_fields.push(format!("rating: {rating}"));
    }
    if let Some(comment) = request.comment.filter(|v| !v.is_empty()) {
        review_active.comment = Set(comment);
        updated_fields.push("comment".to_string());
    }

    if updated_fields.is_empty() {
        debug!(%review_id, "No fields to update");
        let unchanged = review::Entity::find_by_id(review_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;
        let response = ApiResponse {
            data: ReviewResponse::unresolved(unchanged),
            message: "Review updated successfully".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    debug!(%review_id, "Updating fields: {}", updated_fields.join(", "));
    match review_active.update(&state.db).await {
        Ok(updated) => {
            info!(%review_id, "Review updated successfully");
            let response = ApiResponse {
                data: ReviewResponse::unresolved(updated),
                message: "Review updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(%review_id, "Failed to update review: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Delete a review, detaching it from its movie and author
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{review_id}",
    tag = "reviews",
    params(
        ("review_id" = String, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid review ID format", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_review(
    Path(review_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_review function for review_id: {}", review_id);

    match relations::reviews::detach_review(&state.db, &review_id).await {
        Ok(()) => {
            info!(%review_id, "Review deleted successfully");
            let response = ApiResponse {
                data: format!("Review {review_id} deleted"),
                message: "Review deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(relation_error) => {
            warn!(%review_id, "Failed to delete review: {}", relation_error);
            Err(relation_error.into())
        }
    }
}
