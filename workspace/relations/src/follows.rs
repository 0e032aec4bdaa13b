//! The user follow graph.

use model::entities::user;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{debug, instrument};

use crate::error::{RelationError, Result};
use crate::store::{ensure_valid_id, load_user};

/// Make `user_id` follow `target_id`: the target goes into the user's
/// `following` set and the user into the target's `followers` set.
///
/// A user cannot follow itself. Following an already-followed user is a
/// no-op on both sides.
#[instrument(skip(db))]
pub async fn follow(db: &DatabaseConnection, user_id: &str, target_id: &str) -> Result<()> {
    ensure_valid_id(user_id)?;
    ensure_valid_id(target_id)?;

    if user_id == target_id {
        return Err(RelationError::InvalidOperation(
            "Cannot follow yourself".to_string(),
        ));
    }

    let user = load_user(db, user_id).await?;
    let target = load_user(db, target_id).await?;

    let mut following = user.following.clone();
    if following.insert(target_id) {
        let mut active: user::ActiveModel = user.into();
        active.following = Set(following);
        active.update(db).await?;
        debug!(user_id, target_id, "Added target to user's following");
    }

    let mut followers = target.followers.clone();
    if followers.insert(user_id) {
        let mut active: user::ActiveModel = target.into();
        active.followers = Set(followers);
        active.update(db).await?;
        debug!(user_id, target_id, "Added user to target's followers");
    }

    Ok(())
}

/// Remove the mutual follow references; no-op when not following.
#[instrument(skip(db))]
pub async fn unfollow(db: &DatabaseConnection, user_id: &str, target_id: &str) -> Result<()> {
    ensure_valid_id(user_id)?;
    ensure_valid_id(target_id)?;

    let user = load_user(db, user_id).await?;
    let target = load_user(db, target_id).await?;

    let mut following = user.following.clone();
    if following.remove(target_id) {
        let mut active: user::ActiveModel = user.into();
        active.following = Set(following);
        active.update(db).await?;
        debug!(user_id, target_id, "Removed target from user's following");
    }

    let mut followers = target.followers.clone();
    if followers.remove(user_id) {
        let mut active: user::ActiveModel = target.into();
        active.followers = Set(followers);
        active.update(db).await?;
        debug!(user_id, target_id, "Removed user from target's followers");
    }

    Ok(())
}
