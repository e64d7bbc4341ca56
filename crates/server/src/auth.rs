use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use configs::{AppConfig, MediaConfig};
use sea_orm::DatabaseConnection;
use tracing::debug;

use service::attributes::{AttributeService, SeaOrmIngredientRepository, SeaOrmTagRepository};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, AuthConfig, AuthService};
use service::recipe::{RecipeService, SeaOrmRecipeRepository};
use service::storage::LocalImageStore;

use crate::errors::ApiError;

pub type Auth = AuthService<SeaOrmAuthRepository>;
pub type Tags = AttributeService<SeaOrmTagRepository>;
pub type Ingredients = AttributeService<SeaOrmIngredientRepository>;
pub type Recipes = RecipeService<SeaOrmRecipeRepository, LocalImageStore>;

/// Shared handler state; services are cheap to clone behind `Arc`.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<Auth>,
    pub tags: Arc<Tags>,
    pub ingredients: Arc<Ingredients>,
    pub recipes: Arc<Recipes>,
    pub media: MediaConfig,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &AppConfig) -> Self {
        let auth_cfg = AuthConfig {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_hours: cfg.auth.token_ttl_hours,
            min_password_len: cfg.auth.min_password_len,
            password_algorithm: "argon2".into(),
        };
        let images = Arc::new(LocalImageStore::new(cfg.media.root.clone(), &cfg.media.url_prefix));
        Self {
            auth: Arc::new(AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), auth_cfg)),
            tags: Arc::new(AttributeService::new(Arc::new(SeaOrmTagRepository { db: db.clone() }))),
            ingredients: Arc::new(AttributeService::new(Arc::new(SeaOrmIngredientRepository { db: db.clone() }))),
            recipes: Arc::new(RecipeService::new(Arc::new(SeaOrmRecipeRepository { db: db.clone() }), images)),
            media: cfg.media.clone(),
            db,
        }
    }
}

/// Extract the token from `Authorization: Bearer <t>` (or `Token <t>`).
fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if (scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token")) && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Reject unauthenticated requests with 401; otherwise attach the
/// `service::auth::domain::AuthUser` as a request extension.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .map(str::to_owned)
        .ok_or(ApiError::Unauthenticated("Authentication credentials were not provided."))?;
    let user = state.auth.authenticate(&token).await.map_err(|e| {
        debug!(code = e.code(), err = %e, "bearer token rejected");
        ApiError::Unauthenticated("Invalid token.")
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
