use sea_orm::entity::prelude::*;

use crate::types::{RefSet, UserRole};

/// A registered user of the review platform.
///
/// The password is stored verbatim and compared verbatim at login; the
/// privacy filter guarantees it never serializes out of the API.
/// `following`/`followers` are maintained as mutual inverses by the
/// relation layer, as are `favorites` and the movies' `favorited_by`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    /// Role variant; immutable after creation.
    #[sea_orm(column_type = "Json")]
    pub role: UserRole,
    /// Movies this user favorited.
    #[sea_orm(column_type = "Json")]
    pub favorites: RefSet,
    /// Reviews this user wrote.
    #[sea_orm(column_type = "Json")]
    pub reviews: RefSet,
    /// Users this user follows.
    #[sea_orm(column_type = "Json")]
    pub following: RefSet,
    /// Users following this user.
    #[sea_orm(column_type = "Json")]
    pub followers: RefSet,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
