use sea_orm::entity::prelude::*;

use crate::types::RefSet;

/// A movie saved to the local catalog.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub poster_url: Option<String>,
    pub genre: String,
    /// Reviews written for this movie.
    #[sea_orm(column_type = "Json")]
    pub reviews: RefSet,
    /// Users who favorited this movie; inverse of each user's `favorites`.
    #[sea_orm(column_type = "Json")]
    pub favorited_by: RefSet,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
