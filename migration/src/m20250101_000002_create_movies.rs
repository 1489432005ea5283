use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(integer_null(Movies::TmdbId))
                    .col(string(Movies::Title))
                    .col(text_null(Movies::Overview))
                    .col(string_null(Movies::ReleaseDate))
                    .col(string_null(Movies::GenreIds))
                    .col(double_null(Movies::VoteAverage))
                    .col(integer_null(Movies::VoteCount))
                    .col(string_null(Movies::PosterPath))
                    .col(string_null(Movies::BackdropPath))
                    .col(big_integer(Movies::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_vote_average")
                    .table(Movies::Table)
                    .col(Movies::VoteAverage)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    TmdbId,
    Title,
    Overview,
    ReleaseDate,
    GenreIds,
    VoteAverage,
    VoteCount,
    PosterPath,
    BackdropPath,
    CreatedAt,
}
