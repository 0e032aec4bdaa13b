//! Review attachment: a review row plus its back-references on the owning
//! movie and user.

use chrono::Utc;
use common::new_entity_id;
use model::entities::{movie, review, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::store::{ensure_valid_id, load_movie, load_review, load_user};

/// The caller-supplied part of a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

/// Create a review and link it from both its movie and its author.
///
/// Both referenced entities must exist before the review row is written.
/// The two back-reference inserts happen after creation, one row update
/// each; if one of them fails the review is left attached on a single
/// side. The caller may simply re-attempt the insert — it is a set
/// insert, so replaying it cannot double-count.
#[instrument(skip(db, new_review))]
pub async fn attach_review(
    db: &DatabaseConnection,
    new_review: NewReview,
    movie_id: &str,
    user_id: &str,
) -> Result<review::Model> {
    ensure_valid_id(movie_id)?;
    ensure_valid_id(user_id)?;

    let movie = load_movie(db, movie_id).await?;
    let user = load_user(db, user_id).await?;

    let created = review::ActiveModel {
        id: Set(new_entity_id()),
        rating: Set(new_review.rating),
        comment: Set(new_review.comment),
        movie_id: Set(movie.id.clone()),
        user_id: Set(user.id.clone()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    debug!(review_id = %created.id, movie_id, user_id, "Created review");

    let mut movie_reviews = movie.reviews.clone();
    if movie_reviews.insert(&created.id) {
        let mut active: movie::ActiveModel = movie.into();
        active.reviews = Set(movie_reviews);
        active.update(db).await?;
    }

    let mut user_reviews = user.reviews.clone();
    if user_reviews.insert(&created.id) {
        let mut active: user::ActiveModel = user.into();
        active.reviews = Set(user_reviews);
        active.update(db).await?;
    }

    Ok(created)
}

/// Remove a review's back-references from its movie and author, then
/// delete the review row.
///
/// Back-reference removal runs before entity deletion, so a failed
/// deletion cannot leave a review that nothing points at. A side whose
/// entity has since been deleted is skipped rather than treated as an
/// error.
#[instrument(skip(db))]
pub async fn detach_review(db: &DatabaseConnection, review_id: &str) -> Result<()> {
    ensure_valid_id(review_id)?;

    let review = load_review(db, review_id).await?;

    match movie::Entity::find_by_id(&review.movie_id).one(db).await? {
        Some(movie) => {
            let mut movie_reviews = movie.reviews.clone();
            if movie_reviews.remove(review_id) {
                let mut active: movie::ActiveModel = movie.into();
                active.reviews = Set(movie_reviews);
                active.update(db).await?;
            }
        }
        None => {
            warn!(review_id, movie_id = %review.movie_id, "Owning movie is gone; skipping back-reference removal");
        }
    }

    match user::Entity::find_by_id(&review.user_id).one(db).await? {
        Some(user) => {
            let mut user_reviews = user.reviews.clone();
            if user_reviews.remove(review_id) {
                let mut active: user::ActiveModel = user.into();
                active.reviews = Set(user_reviews);
                active.update(db).await?;
            }
        }
        None => {
            warn!(review_id, user_id = %review.user_id, "Owning user is gone; skipping back-reference removal");
        }
    }

    review::Entity::delete_by_id(review_id).exec(db).await?;
    debug!(review_id, "Deleted review");

    Ok(())
}
