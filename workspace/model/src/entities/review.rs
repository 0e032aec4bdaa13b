use sea_orm::entity::prelude::*;

/// A review of one movie by one user.
///
/// `movie_id` and `user_id` are plain stored identifiers, not relational
/// foreign keys. Both are validated to exist when the review is created;
/// deleting the movie or user afterwards leaves the review in place with
/// a dangling reference, which readers tolerate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Expected range 1-5; coerced to an integer at the API boundary.
    pub rating: i32,
    pub comment: String,
    pub movie_id: String,
    pub user_id: String,
    /// Set at creation, immutable afterwards.
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
