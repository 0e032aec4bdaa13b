//! This file serves as the root for all SeaORM entity modules.
//! The three collections of the review platform live here: users, movies
//! and reviews. Cross-entity references are stored as identifier sets on
//! the owning row (see [`crate::types::RefSet`]); there are no relational
//! foreign keys, matching the document-store shape the data came from.

pub mod movie;
pub mod review;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::movie::Entity as Movie;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use common::new_entity_id;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
        QueryFilter, Set,
    };

    use super::*;
    use crate::types::{RefSet, UserRole};
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Create a user
        let user = user::ActiveModel {
            id: Set(new_entity_id()),
            username: Set("alice".to_string()),
            password: Set("hunter2".to_string()),
            email: Set("alice@example.com".to_string()),
            phone: Set(Some("555-0100".to_string())),
            role: Set(UserRole::regular(Utc::now())),
            favorites: Set(RefSet::new()),
            reviews: Set(RefSet::new()),
            following: Set(RefSet::new()),
            followers: Set(RefSet::new()),
        }
        .insert(&db)
        .await?;

        // Create a movie
        let movie = movie::ActiveModel {
            id: Set(new_entity_id()),
            title: Set("Arrival".to_string()),
            description: Set("A linguist decodes an alien language.".to_string()),
            release_year: Set(2016),
            poster_url: Set(None),
            genre: Set("Sci-Fi".to_string()),
            reviews: Set(RefSet::new()),
            favorited_by: Set(RefSet::new()),
        }
        .insert(&db)
        .await?;

        // Create a review pointing at both
        let review = review::ActiveModel {
            id: Set(new_entity_id()),
            rating: Set(5),
            comment: Set("great".to_string()),
            movie_id: Set(movie.id.clone()),
            user_id: Set(user.id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await?;

        // Read back and verify
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].role.name(), "RegularUser");

        let movies = Movie::find().all(&db).await?;
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].release_year, 2016);
        assert!(movies[0].reviews.is_empty());

        let found = Review::find()
            .filter(review::Column::MovieId.eq(movie.id.clone()))
            .all(&db)
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, review.id);
        assert_eq!(found[0].user_id, user.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_refset_column_round_trip() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let mut favorites = RefSet::new();
        let movie_id = new_entity_id();
        favorites.insert(&movie_id);

        let user = user::ActiveModel {
            id: Set(new_entity_id()),
            username: Set("bob".to_string()),
            password: Set("pw".to_string()),
            email: Set("bob@example.com".to_string()),
            phone: Set(None),
            role: Set(UserRole::regular(Utc::now())),
            favorites: Set(favorites),
            reviews: Set(RefSet::new()),
            following: Set(RefSet::new()),
            followers: Set(RefSet::new()),
        }
        .insert(&db)
        .await?;

        let loaded = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert!(loaded.favorites.contains(&movie_id));
        assert_eq!(loaded.favorites.len(), 1);

        Ok(())
    }
}
