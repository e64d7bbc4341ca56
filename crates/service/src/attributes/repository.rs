use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::domain::Attribute;
use crate::errors::ServiceError;

#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// Singular entity name used in logs, e.g. `tag`.
    fn kind(&self) -> &'static str;
    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<Attribute>, ServiceError>;
    async fn create(&self, user_id: Uuid, name: &str) -> Result<Attribute, ServiceError>;
}

/// SeaORM-backed tag repository.
pub struct SeaOrmTagRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AttributeRepository for SeaOrmTagRepository {
    fn kind(&self) -> &'static str { "tag" }

    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<Attribute>, ServiceError> {
        let rows = models::tag::list_for_user(&self.db, user_id, assigned_only).await?;
        Ok(rows.into_iter().map(Attribute::from).collect())
    }

    async fn create(&self, user_id: Uuid, name: &str) -> Result<Attribute, ServiceError> {
        Ok(models::tag::create(&self.db, user_id, name).await?.into())
    }
}

/// SeaORM-backed ingredient repository.
pub struct SeaOrmIngredientRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AttributeRepository for SeaOrmIngredientRepository {
    fn kind(&self) -> &'static str { "ingredient" }

    async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<Attribute>, ServiceError> {
        let rows = models::ingredient::list_for_user(&self.db, user_id, assigned_only).await?;
        Ok(rows.into_iter().map(Attribute::from).collect())
    }

    async fn create(&self, user_id: Uuid, name: &str) -> Result<Attribute, ServiceError> {
        Ok(models::ingredient::create(&self.db, user_id, name).await?.into())
    }
}
