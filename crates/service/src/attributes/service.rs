use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::Attribute;
use super::repository::AttributeRepository;
use crate::errors::ServiceError;

/// List/create over one attribute kind, always scoped to the caller.
pub struct AttributeService<R: AttributeRepository> {
    repo: Arc<R>,
}

impl<R: AttributeRepository> AttributeService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self), fields(kind = self.repo.kind()))]
    pub async fn list(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<Attribute>, ServiceError> {
        self.repo.list(user_id, assigned_only).await
    }

    #[instrument(skip(self, name), fields(kind = self.repo.kind()))]
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<Attribute, ServiceError> {
        let created = self.repo.create(user_id, name).await?;
        info!(user_id = %user_id, id = created.id, kind = self.repo.kind(), "attribute_created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{SeaOrmIngredientRepository, SeaOrmTagRepository};
    use crate::test_support::get_db;

    #[tokio::test]
    async fn tags_are_scoped_per_user() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = models::user::create(&db, "a@example.com", "").await?;
        let b = models::user::create(&db, "b@example.com", "").await?;
        let svc = AttributeService::new(Arc::new(SeaOrmTagRepository { db }));

        svc.create(a.id, "Vegan").await?;
        svc.create(b.id, "Dessert").await?;

        let names: Vec<String> = svc.list(a.id, false).await?.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Vegan"]);
        Ok(())
    }

    #[tokio::test]
    async fn blank_name_is_rejected_and_not_persisted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let u = models::user::create(&db, "u@example.com", "").await?;
        let svc = AttributeService::new(Arc::new(SeaOrmIngredientRepository { db }));

        match svc.create(u.id, "").await {
            Err(ServiceError::Validation(errors)) => assert!(errors.contains_key("name")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(svc.list(u.id, false).await?.is_empty());
        Ok(())
    }
}
