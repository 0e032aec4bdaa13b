//! Cross-entity reference maintenance and read-side privacy rules.
//!
//! Every relationship in the system (user⇄movie favorites, user⇄user
//! follows, movie⇄review⇄user attachments) is stored denormalized on both
//! participating rows. The operations here keep those reference sets
//! mutually consistent: each two-sided mutation is performed as two
//! independent single-row updates over idempotent sets, never as a
//! cross-table transaction. A failure between the two writes leaves a
//! transient one-sided reference; retrying the same call converges
//! because set inserts and removals are no-ops once applied.

pub mod error;
pub mod favorites;
pub mod follows;
pub mod privacy;
pub mod reviews;

mod store;

pub use error::{RelationError, Result};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use common::new_entity_id;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{movie, user};
    use model::types::{RefSet, UserRole};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    pub async fn seed_user(db: &DatabaseConnection, username: &str) -> user::Model {
        user::ActiveModel {
            id: Set(new_entity_id()),
            username: Set(username.to_string()),
            password: Set("secret".to_string()),
            email: Set(format!("{username}@example.com")),
            phone: Set(None),
            role: Set(UserRole::regular(Utc::now())),
            favorites: Set(RefSet::new()),
            reviews: Set(RefSet::new()),
            following: Set(RefSet::new()),
            followers: Set(RefSet::new()),
        }
        .insert(db)
        .await
        .expect("Failed to seed user")
    }

    pub async fn seed_movie(db: &DatabaseConnection, title: &str) -> movie::Model {
        movie::ActiveModel {
            id: Set(new_entity_id()),
            title: Set(title.to_string()),
            description: Set(format!("{title} description")),
            release_year: Set(2016),
            poster_url: Set(None),
            genre: Set("Sci-Fi".to_string()),
            reviews: Set(RefSet::new()),
            favorited_by: Set(RefSet::new()),
        }
        .insert(db)
        .await
        .expect("Failed to seed movie")
    }
}
