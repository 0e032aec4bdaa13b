use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::user;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::handlers::users::insert_regular_user;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The identity returned by register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Role variant name ("RegularUser" or "AdminUser")
    pub role: String,
}

impl From<&user::Model> for AuthResponse {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id.clone(),
            username: model.username.clone(),
            email: model.email.clone(),
            role: model.role.name().to_string(),
        }
    }
}

/// Register a new regular user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    trace!("Entering register function");

    let (email, password, username) = match (
        request.email.filter(|v| !v.is_empty()),
        request.password.filter(|v| !v.is_empty()),
        request.username.filter(|v| !v.is_empty()),
    ) {
        (Some(email), Some(password), Some(username)) => (email, password, username),
        _ => {
            warn!("Registration rejected: missing required fields");
            return Err(ApiError::ValidationFailed(
                "Email, password, and username are required".to_string(),
            ));
        }
    };

    debug!(%username, %email, "Registering new user");
    let created = insert_regular_user(&state.db, &username, &email, &password).await?;

    info!(user_id = %created.id, username = %created.username, "User registered successfully");
    let response = ApiResponse {
        data: AuthResponse::from(&created),
        message: "User registered successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log a user in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    trace!("Entering login function");

    let (email, password) = match (
        request.email.filter(|v| !v.is_empty()),
        request.password.filter(|v| !v.is_empty()),
    ) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ApiError::ValidationFailed(
                "Email and password are required".to_string(),
            ));
        }
    };

    debug!(%email, "Login attempt");
    let user = match user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Same generic message as a wrong password; the response must
            // not reveal which of the two failed.
            warn!(%email, "Login failed: unknown email");
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
        Err(db_error) => {
            error!(%email, "Failed to look up user for login: {}", db_error);
            return Err(db_error.into());
        }
    };

    // TODO: replace with salted-hash verification; passwords are stored
    // and compared verbatim.
    if user.password != password {
        warn!(%email, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    info!(user_id = %user.id, "Login successful");
    let response = ApiResponse {
        data: AuthResponse::from(&user),
        message: "Login successful".to_string(),
        success: true,
    };
    Ok(Json(response))
}
