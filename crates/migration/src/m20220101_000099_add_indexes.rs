use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner-scoped listings filter on user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_tag_user")
                    .table(Tag::Table)
                    .col(Tag::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ingredient_user")
                    .table(Ingredient::Table)
                    .col(Ingredient::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_user")
                    .table(Recipe::Table)
                    .col(Recipe::UserId)
                    .to_owned(),
            )
            .await?;

        // Reverse lookups for assigned_only and the recipe id-list filters
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_tag_tag")
                    .table(RecipeTag::Table)
                    .col(RecipeTag::TagId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_ingredient_ingredient")
                    .table(RecipeIngredient::Table)
                    .col(RecipeIngredient::IngredientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tag_user").table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ingredient_user").table(Ingredient::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_recipe_user").table(Recipe::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_recipe_tag_tag").table(RecipeTag::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_recipe_ingredient_ingredient")
                    .table(RecipeIngredient::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Tag { Table, UserId }

#[derive(DeriveIden)]
enum Ingredient { Table, UserId }

#[derive(DeriveIden)]
enum Recipe { Table, UserId }

#[derive(DeriveIden)]
enum RecipeTag { Table, TagId }

#[derive(DeriveIden)]
enum RecipeIngredient { Table, IngredientId }
