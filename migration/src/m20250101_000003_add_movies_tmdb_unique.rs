use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // NULLs are distinct under a unique index, so untracked movies never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_tmdb_id_unique")
                    .table(Movies::Table)
                    .col(Movies::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_movies_tmdb_id_unique")
                    .table(Movies::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    TmdbId,
}
