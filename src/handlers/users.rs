use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use common::{new_entity_id, ResourceRef};
use model::entities::{movie, review, user};
use model::types::{RefSet, UserRole};
use relations::privacy::{filter_user, is_self, FullUser, PublicUser, UserSummary, UserView};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ensure_valid_id, ApiError};
use crate::handlers::movies::{MovieResponse, MovieSummary};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for updating a user's contact fields.
/// Username, password and role are immutable through this surface.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct UsersQuery {
    /// Filter by role variant name ("RegularUser" or "AdminUser")
    pub role: Option<String>,
    /// Maximum number of users to return
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// Query parameter carrying the requester identity for privacy filtering
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ViewerQuery {
    /// Identity of the requesting user; contact fields are included only
    /// when this equals the requested user's id
    pub viewer_id: Option<String>,
}

/// One of the user's reviews, with the movie reference expanded when the
/// movie still exists
#[derive(Debug, Serialize, ToSchema)]
pub struct UserReviewResponse {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub movie_id: ResourceRef<MovieSummary>,
}

/// A user profile with its reference sets expanded
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub role: UserRole,
    pub favorites: Vec<MovieResponse>,
    pub reviews: Vec<UserReviewResponse>,
    pub following: Vec<UserSummary>,
    pub followers: Vec<UserSummary>,
}

/// Insert a new regular user after checking the email is free.
///
/// Shared by user creation and auth registration. The conflict check runs
/// before the insert so callers get a clean conflict instead of a
/// driver-specific unique violation.
pub(crate) async fn insert_regular_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> Result<user::Model, ApiError> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let new_user = user::ActiveModel {
        id: Set(new_entity_id()),
        username: Set(username.to_string()),
        // TODO: hash passwords instead of storing them verbatim
        password: Set(password.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        role: Set(UserRole::regular(Utc::now())),
        favorites: Set(RefSet::new()),
        reviews: Set(RefSet::new()),
        following: Set(RefSet::new()),
        followers: Set(RefSet::new()),
    };

    match new_user.insert(db).await {
        Ok(user_model) => Ok(user_model),
        Err(DbErr::Exec(exec_err)) => {
            let message = exec_err.to_string().to_lowercase();
            if message.contains("unique") || message.contains("constraint") {
                Err(ApiError::Conflict(
                    "Username or email already exists".to_string(),
                ))
            } else {
                Err(ApiError::Internal(exec_err.to_string()))
            }
        }
        Err(db_error) => Err(db_error.into()),
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<FullUser>),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    trace!("Entering create_user function");

    let (username, email, password) = match (
        request.username.filter(|v| !v.is_empty()),
        request.email.filter(|v| !v.is_empty()),
        request.password.filter(|v| !v.is_empty()),
    ) {
        (Some(username), Some(email), Some(password)) => (username, email, password),
        _ => {
            warn!("User creation rejected: missing required fields");
            return Err(ApiError::ValidationFailed(
                "Username, email, and password are required".to_string(),
            ));
        }
    };

    debug!(%username, %email, "Creating user");
    let created = insert_regular_user(&state.db, &username, &email, &password).await?;

    info!(user_id = %created.id, username = %created.username, "User created successfully");
    let view = filter_user(&created, Some(&created.id));
    let response = ApiResponse {
        data: view,
        message: "User created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(UsersQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<PublicUser>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    Valid(Query(query)): Valid<Query<UsersQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    trace!("Entering get_users function");
    debug!(?query, "Fetching users from database");

    let users = match user::Entity::find().all(&state.db).await {
        Ok(users) => users,
        Err(db_error) => {
            error!("Failed to retrieve users from database: {}", db_error);
            return Err(db_error.into());
        }
    };

    // Role lives inside a JSON column, so the role filter is applied on
    // the loaded models rather than in SQL.
    let mut filtered: Vec<user::Model> = match &query.role {
        Some(role) => users
            .into_iter()
            .filter(|u| u.role.name() == role.as_str())
            .collect(),
        None => users,
    };
    if let Some(limit) = query.limit {
        filtered.truncate(limit as usize);
    }

    let user_count = filtered.len();
    // A listing has no requester identity; every entry is a public view.
    let views: Vec<UserView> = filtered.iter().map(|u| filter_user(u, None)).collect();

    info!("Successfully retrieved {} users", user_count);
    let response = ApiResponse {
        data: views,
        message: "Users retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific user by ID, privacy-filtered and with reference sets
/// expanded
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ViewerQuery,
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserDetailResponse>),
        (status = 400, description = "Invalid user ID format", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<String>,
    Query(viewer): Query<ViewerQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);
    ensure_valid_id(&user_id, "user")?;

    let user = match user::Entity::find_by_id(&user_id).one(&state.db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(%user_id, "User not found");
            return Err(ApiError::NotFound(format!(
                "No user found with ID: {user_id}"
            )));
        }
        Err(db_error) => {
            error!(%user_id, "Failed to retrieve user: {}", db_error);
            return Err(db_error.into());
        }
    };

    // Expand favorites into full movie entries.
    let favorites: Vec<MovieResponse> = if user.favorites.is_empty() {
        Vec::new()
    } else {
        movie::Entity::find()
            .filter(movie::Column::Id.is_in(user.favorites.to_vec()))
            .all(&state.db)
            .await?
            .into_iter()
            .map(MovieResponse::from)
            .collect()
    };

    // Expand the user's reviews, newest first, each with its movie
    // reference resolved when the movie still exists.
    let reviews: Vec<review::Model> = if user.reviews.is_empty() {
        Vec::new()
    } else {
        review::Entity::find()
            .filter(review::Column::Id.is_in(user.reviews.to_vec()))
            .order_by_desc(review::Column::CreatedAt)
            .all(&state.db)
            .await?
    };
    let movie_ids: Vec<String> = reviews.iter().map(|r| r.movie_id.clone()).collect();
    let movie_summaries: HashMap<String, MovieSummary> = if movie_ids.is_empty() {
        HashMap::new()
    } else {
        movie::Entity::find()
            .filter(movie::Column::Id.is_in(movie_ids))
            .all(&state.db)
            .await?
            .iter()
            .map(|m| (m.id.clone(), MovieSummary::from(m)))
            .collect()
    };
    let reviews: Vec<UserReviewResponse> = reviews
        .into_iter()
        .map(|r| {
            let movie_ref =
                ResourceRef::resolve_with(r.movie_id.clone(), movie_summaries.get(&r.movie_id).cloned());
            UserReviewResponse {
                id: r.id,
                rating: r.rating,
                comment: r.comment,
                created_at: r.created_at,
                movie_id: movie_ref,
            }
        })
        .collect();

    let following = load_user_summaries(&state.db, &user.following).await?;
    let followers = load_user_summaries(&state.db, &user.followers).await?;

    let show_contact = is_self(&user.id, viewer.viewer_id.as_deref());
    let response_body = UserDetailResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        email: show_contact.then(|| user.email.clone()),
        phone: if show_contact { user.phone.clone() } else { None },
        role: user.role.clone(),
        favorites,
        reviews,
        following,
        followers,
    };

    info!(%user_id, "Successfully retrieved user");
    let response = ApiResponse {
        data: response_body,
        message: "User retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Expand a set of user ids into summaries, skipping ids whose user no
/// longer exists.
async fn load_user_summaries(
    db: &DatabaseConnection,
    ids: &RefSet,
) -> Result<Vec<UserSummary>, ApiError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?;
    Ok(users.iter().map(UserSummary::from).collect())
}

/// Update a user's contact fields (full update)
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<FullUser>),
        (status = 400, description = "Invalid user ID format", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    apply_contact_update(&user_id, &state, request).await
}

/// Partially update a user's contact fields
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<FullUser>),
        (status = 400, description = "Invalid user ID format", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn patch_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    apply_contact_update(&user_id, &state, request).await
}

async fn apply_contact_update(
    user_id: &str,
    state: &AppState,
    request: UpdateUserRequest,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    trace!("Entering apply_contact_update for user_id: {}", user_id);
    ensure_valid_id(user_id, "user")?;

    let existing = match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(%user_id, "User not found for update");
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        Err(db_error) => {
            error!(%user_id, "Failed to lookup user for update: {}", db_error);
            return Err(db_error.into());
        }
    };

    let mut user_active: user::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(email) = request.email.filter(|v| !v.is_empty()) {
        user_active.email = Set(email.clone());
        updated_fields.push(format!("email: {email}"));
    }
    if let Some(phone) = request.phone {
        user_active.phone = Set(Some(phone.clone()));
        updated_fields.push(format!("phone: {phone}"));
    }

    if updated_fields.is_empty() {
        debug!(%user_id, "No fields to update");
        let unchanged = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        let response = ApiResponse {
            data: filter_user(&unchanged, Some(user_id)),
            message: "User updated successfully".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    debug!(%user_id, "Updating fields: {}", updated_fields.join(", "));
    match user_active.update(&state.db).await {
        Ok(updated) => {
            info!(%user_id, "User updated successfully");
            let response = ApiResponse {
                data: filter_user(&updated, Some(user_id)),
                message: "User updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(%user_id, "Failed to update user: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid user ID format", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);
    ensure_valid_id(&user_id, "user")?;

    // Deletion does not cascade: reviews written by this user and other
    // users' follower sets keep their references; readers tolerate them.
    match user::Entity::delete_by_id(&user_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!(%user_id, "User deleted successfully");
                let response = ApiResponse {
                    data: format!("User {user_id} deleted"),
                    message: "User deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!(%user_id, "User not found for deletion");
                Err(ApiError::NotFound("User not found".to_string()))
            }
        }
        Err(db_error) => {
            error!(%user_id, "Failed to delete user: {}", db_error);
            Err(db_error.into())
        }
    }
}

/// Add a movie to the user's favorites
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/favorites/{movie_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie added to favorites", body = ApiResponse<String>),
        (status = 400, description = "Invalid ID format", body = ErrorResponse),
        (status = 404, description = "User or movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_favorite(
    Path((user_id, movie_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering add_favorite for user {} movie {}", user_id, movie_id);

    match relations::favorites::add_favorite(&state.db, &user_id, &movie_id).await {
        Ok(()) => {
            info!(%user_id, %movie_id, "Movie added to favorites");
            let response = ApiResponse {
                data: movie_id,
                message: "Movie added to favorites".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(relation_error) => {
            warn!(%user_id, %movie_id, "Failed to add favorite: {}", relation_error);
            Err(relation_error.into())
        }
    }
}

/// Remove a movie from the user's favorites
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/favorites/{movie_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("movie_id" = String, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie removed from favorites", body = ApiResponse<String>),
        (status = 400, description = "Invalid ID format", body = ErrorResponse),
        (status = 404, description = "User or movie not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn remove_favorite(
    Path((user_id, movie_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering remove_favorite for user {} movie {}", user_id, movie_id);

    match relations::favorites::remove_favorite(&state.db, &user_id, &movie_id).await {
        Ok(()) => {
            info!(%user_id, %movie_id, "Movie removed from favorites");
            let response = ApiResponse {
                data: movie_id,
                message: "Movie removed from favorites".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(relation_error) => {
            warn!(%user_id, %movie_id, "Failed to remove favorite: {}", relation_error);
            Err(relation_error.into())
        }
    }
}

/// Follow another user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/follow/{target_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("target_id" = String, Path, description = "User to follow"),
    ),
    responses(
        (status = 200, description = "User followed successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid ID format or self-follow", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn follow_user(
    Path((user_id, target_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering follow_user for user {} target {}", user_id, target_id);

    match relations::follows::follow(&state.db, &user_id, &target_id).await {
        Ok(()) => {
            info!(%user_id, %target_id, "User followed successfully");
            let response = ApiResponse {
                data: target_id,
                message: "User followed successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(relation_error) => {
            warn!(%user_id, %target_id, "Failed to follow: {}", relation_error);
            Err(relation_error.into())
        }
    }
}

/// Unfollow a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/follow/{target_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("target_id" = String, Path, description = "User to unfollow"),
    ),
    responses(
        (status = 200, description = "User unfollowed successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid ID format", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unfollow_user(
    Path((user_id, target_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering unfollow_user for user {} target {}", user_id, target_id);

    match relations::follows::unfollow(&state.db, &user_id, &target_id).await {
        Ok(()) => {
            info!(%user_id, %target_id, "User unfollowed successfully");
            let response = ApiResponse {
                data: target_id,
                message: "User unfollowed successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(relation_error) => {
            warn!(%user_id, %target_id, "Failed to unfollow: {}", relation_error);
            Err(relation_error.into())
        }
    }
}
