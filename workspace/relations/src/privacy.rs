//! Read-side visibility rules for user entities.
//!
//! Contact fields (email, phone) are visible only to the user themselves.
//! The stored password is visible to nobody, under any requester, in any
//! context. Embedded user references inside other entities' output carry
//! only identifier and username.

use model::entities::user;
use model::types::UserRole;
use serde::Serialize;
use utoipa::ToSchema;

/// A user as anyone may see it: no contact fields, no password.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub role: UserRole,
    pub favorites: Vec<String>,
    pub reviews: Vec<String>,
    pub following: Vec<String>,
    pub followers: Vec<String>,
}

/// A user as they see themselves: contact fields included, password still
/// absent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FullUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub role: UserRole,
    pub favorites: Vec<String>,
    pub reviews: Vec<String>,
    pub following: Vec<String>,
    pub followers: Vec<String>,
}

/// The outcome of a privacy-filtered read.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UserView {
    Full(FullUser),
    Public(PublicUser),
}

/// A user reference embedded in another entity's output. Identifier and
/// username only — embedded contexts have no authenticated requester, so
/// contact fields never appear here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<&user::Model> for UserSummary {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id.clone(),
            username: model.username.clone(),
        }
    }
}

/// Decide what a requester may see of a user.
///
/// The full view is returned only when the requester identity equals the
/// user's own id; an absent or mismatched requester gets the public view.
pub fn filter_user(model: &user::Model, requester_id: Option<&str>) -> UserView {
    if is_self(&model.id, requester_id) {
        UserView::Full(FullUser {
            id: model.id.clone(),
            username: model.username.clone(),
            email: model.email.clone(),
            phone: model.phone.clone(),
            role: model.role.clone(),
            favorites: model.favorites.to_vec(),
            reviews: model.reviews.to_vec(),
            following: model.following.to_vec(),
            followers: model.followers.to_vec(),
        })
    } else {
        UserView::Public(PublicUser {
            id: model.id.clone(),
            username: model.username.clone(),
            role: model.role.clone(),
            favorites: model.favorites.to_vec(),
            reviews: model.reviews.to_vec(),
            following: model.following.to_vec(),
            followers: model.followers.to_vec(),
        })
    }
}

/// True when the requester identity is the user's own id.
pub fn is_self(user_id: &str, requester_id: Option<&str>) -> bool {
    requester_id == Some(user_id)
}
