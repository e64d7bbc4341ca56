//! Create `recipe` table.
//!
//! `image` holds a path relative to the media root, or NULL.
use sea_orm_migration::{prelude::*, schema::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite NUMERIC affinity stores whole numbers as INTEGER, which the driver
        // refuses to decode as a decimal; REAL keeps every price readable.
        let mut price = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => double(Recipe::Price),
            _ => decimal_len(Recipe::Price, 5, 2),
        };
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(pk_auto(Recipe::Id))
                    .col(uuid(Recipe::UserId).not_null())
                    .col(string_len(Recipe::Title, 255).not_null())
                    .col(integer(Recipe::TimeMinutes).not_null())
                    .col(price.not_null())
                    .col(ColumnDef::new(Recipe::Image).string_len(512).null())
                    .col(timestamp_with_time_zone(Recipe::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Recipe::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_user")
                            .from(Recipe::Table, Recipe::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Recipe::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Recipe { Table, Id, UserId, Title, TimeMinutes, Price, Image, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
