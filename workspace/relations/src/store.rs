//! Shared lookup helpers: identifier-format checks and entity loads that
//! translate absence into the layer's error taxonomy.

use common::is_valid_entity_id;
use model::entities::{movie, review, user};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::error::{RelationError, Result};

pub(crate) fn ensure_valid_id(id: &str) -> Result<()> {
    if is_valid_entity_id(id) {
        Ok(())
    } else {
        Err(RelationError::InvalidIdentifier(id.to_string()))
    }
}

pub(crate) async fn load_user(db: &DatabaseConnection, id: &str) -> Result<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RelationError::not_found("User", id))
}

pub(crate) async fn load_movie(db: &DatabaseConnection, id: &str) -> Result<movie::Model> {
    movie::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RelationError::not_found("Movie", id))
}

pub(crate) async fn load_review(db: &DatabaseConnection, id: &str) -> Result<review::Model> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RelationError::not_found("Review", id))
}
