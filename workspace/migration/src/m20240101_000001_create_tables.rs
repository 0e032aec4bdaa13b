use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table. Reference sets and the role variant are JSON
        // columns on the row; cross-entity links are identifiers only, so
        // no foreign keys are declared anywhere in this schema.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::Id).primary_key())
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Password))
                    .col(string(Users::Email).unique_key())
                    .col(string_null(Users::Phone))
                    .col(json(Users::Role))
                    .col(json(Users::Favorites))
                    .col(json(Users::Reviews))
                    .col(json(Users::Following))
                    .col(json(Users::Followers))
                    .to_owned(),
            )
            .await?;

        // Create movies table
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(string(Movies::Id).primary_key())
                    .col(string(Movies::Title))
                    .col(string(Movies::Description))
                    .col(integer(Movies::ReleaseYear))
                    .col(string_null(Movies::PosterUrl))
                    .col(string(Movies::Genre))
                    .col(json(Movies::Reviews))
                    .col(json(Movies::FavoritedBy))
                    .to_owned(),
            )
            .await?;

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(string(Reviews::Id).primary_key())
                    .col(integer(Reviews::Rating))
                    .col(string(Reviews::Comment))
                    .col(string(Reviews::MovieId))
                    .col(string(Reviews::UserId))
                    .col(timestamp_with_time_zone(Reviews::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Reviews are listed by movie and by user constantly; index both.
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_movie_id")
                    .table(Reviews::Table)
                    .col(Reviews::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_user_id")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Email,
    Phone,
    Role,
    Favorites,
    Reviews,
    Following,
    Followers,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Description,
    ReleaseYear,
    PosterUrl,
    Genre,
    Reviews,
    FavoritedBy,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Rating,
    Comment,
    MovieId,
    UserId,
    CreatedAt,
}
