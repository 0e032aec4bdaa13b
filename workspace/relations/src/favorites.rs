//! Favorite links between users and movies.

use model::entities::{movie, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::store::{ensure_valid_id, load_movie, load_user};

/// Add `movie_id` to the user's favorites and `user_id` to the movie's
/// `favorited_by` set.
///
/// The two sides are written independently, one row update each, and a
/// side that already holds the reference is skipped entirely. Calling
/// this twice is indistinguishable from calling it once.
#[instrument(skip(db))]
pub async fn add_favorite(db: &DatabaseConnection, user_id: &str, movie_id: &str) -> Result<()> {
    ensure_valid_id(user_id)?;
    ensure_valid_id(movie_id)?;

    let user = load_user(db, user_id).await?;
    let movie = load_movie(db, movie_id).await?;

    let mut favorites = user.favorites.clone();
    if favorites.insert(movie_id) {
        let mut active: user::ActiveModel = user.into();
        active.favorites = Set(favorites);
        active.update(db).await?;
        debug!(user_id, movie_id, "Added movie to user's favorites");
    }

    let mut favorited_by = movie.favorited_by.clone();
    if favorited_by.insert(user_id) {
        let mut active: movie::ActiveModel = movie.into();
        active.favorited_by = Set(favorited_by);
        active.update(db).await?;
        debug!(user_id, movie_id, "Added user to movie's favoritedBy");
    }

    Ok(())
}

/// Remove the mutual favorite references. Removing an absent reference is
/// a no-op on that side.
#[instrument(skip(db))]
pub async fn remove_favorite(db: &DatabaseConnection, user_id: &str, movie_id: &str) -> Result<()> {
    ensure_valid_id(user_id)?;
    ensure_valid_id(movie_id)?;

    let user = load_user(db, user_id).await?;
    let movie = load_movie(db, movie_id).await?;

    let mut favorites = user.favorites.clone();
    if favorites.remove(movie_id) {
        let mut active: user::ActiveModel = user.into();
        active.favorites = Set(favorites);
        active.update(db).await?;
        debug!(user_id, movie_id, "Removed movie from user's favorites");
    }

    let mut favorited_by = movie.favorited_by.clone();
    if favorited_by.remove(user_id) {
        let mut active: movie::ActiveModel = movie.into();
        active.favorited_by = Set(favorited_by);
        active.update(db).await?;
        debug!(user_id, movie_id, "Removed user from movie's favoritedBy");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelationError;
    use crate::test_support::{seed_movie, seed_user, setup_db};
    use common::new_entity_id;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn add_favorite_links_both_sides() {
        let db = setup_db().await;
        let user = seed_user(&db, "alice").await;
        let movie = seed_movie(&db, "Arrival").await;

        add_favorite(&db, &user.id, &movie.id).await.unwrap();

        let user = user::Entity::find_by_id(&user.id).one(&db).await.unwrap().unwrap();
        let movie = movie::Entity::find_by_id(&movie.id).one(&db).await.unwrap().unwrap();
        assert!(user.favorites.contains(&movie.id));
        assert!(movie.favorited_by.contains(&user.id));
    }

    #[tokio::test]
    async fn add_favorite_is_idempotent() {
        let db = setup_db().await;
        let user = seed_user(&db, "alice").await;
        let movie = seed_movie(&db, "Arrival").await;

        add_favorite(&db, &user.id, &movie.id).await.unwrap();
        add_favorite(&db, &user.id, &movie.id).await.unwrap();

        let user = user::Entity::find_by_id(&user.id).one(&db).await.unwrap().unwrap();
        let movie = movie::Entity::find_by_id(&movie.id).one(&db).await.unwrap().unwrap();
        assert_eq!(user.favorites.len(), 1);
        assert_eq!(movie.favorited_by.len(), 1);
    }

    #[tokio::test]
    async fn remove_favorite_restores_prior_state() {
        let db = setup_db().await;
        let user = seed_user(&db, "alice").await;
        let movie = seed_movie(&db, "Arrival").await;

        add_favorite(&db, &user.id, &movie.id).await.unwrap();
        remove_favorite(&db, &user.id, &movie.id).await.unwrap();

        let user = user::Entity::find_by_id(&user.id).one(&db).await.unwrap().unwrap();
        let movie = movie::Entity::find_by_id(&movie.id).one(&db).await.unwrap().unwrap();
        assert!(user.favorites.is_empty());
        assert!(movie.favorited_by.is_empty());
    }

    #[tokio::test]
    async fn remove_favorite_of_absent_link_is_noop() {
        let db = setup_db().await;
        let user = seed_user(&db, "alice").await;
        let movie = seed_movie(&db, "Arrival").await;

        remove_favorite(&db, &user.id, &movie.id).await.unwrap();

        let user = user::Entity::find_by_id(&user.id).one(&db).await.unwrap().unwrap();
        assert!(user.favorites.is_empty());
    }

    #[tokio::test]
    async fn add_favorite_rejects_unknown_entities() {
        let db = setup_db().await;
        let user = seed_user(&db, "alice").await;

        let missing = new_entity_id();
        let err = add_favorite(&db, &user.id, &missing).await.unwrap_err();
        assert!(matches!(err, RelationError::NotFound { kind: "Movie", .. }));
    }

    #[tokio::test]
    async fn add_favorite_rejects_malformed_identifiers() {
        let db = setup_db().await;
        let movie = seed_movie(&db, "Arrival").await;

        let err = add_favorite(&db, "not-an-id", &movie.id).await.unwrap_err();
        assert!(matches!(err, RelationError::InvalidIdentifier(_)));
    }
}
