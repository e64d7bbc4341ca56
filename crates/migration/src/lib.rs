//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_user;
mod m20220101_000002_create_user_credentials;
mod m20220101_000003_create_tag;
mod m20220101_000004_create_ingredient;
mod m20220101_000005_create_recipe;
mod m20220101_000006_create_recipe_links;
mod m20220101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_user::Migration),
            Box::new(m20220101_000002_create_user_credentials::Migration),
            Box::new(m20220101_000003_create_tag::Migration),
            Box::new(m20220101_000004_create_ingredient::Migration),
            Box::new(m20220101_000005_create_recipe::Migration),
            Box::new(m20220101_000006_create_recipe_links::Migration),
            // Indexes should always be applied last
            Box::new(m20220101_000099_add_indexes::Migration),
        ]
    }
}
