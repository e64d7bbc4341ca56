use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, ProfileUpdate, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub min_password_len: usize,
    pub password_algorithm: String,
}

impl AuthConfig {
    /// Defaults: 12 hour tokens, 5 character passwords, argon2.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: 12,
            min_password_len: 5,
            password_algorithm: "argon2".into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let input = RegisterInput { email: "user@EXAMPLE.com".into(), name: "Test".into(), password: "abcdef".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = models::user::normalize_email(&input.email);
        models::user::validate_email(&email)?;
        models::user::validate_name(&input.name)?;
        self.check_password(&input.password)?;

        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let user = self
            .repo
            .create_user_with_password(&email, &input.name, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// let me = tokio_test::block_on(svc.authenticate(&session.token)).unwrap();
    /// assert_eq!(me.id, session.user.id);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&models::user::normalize_email(&input.email))
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "token_issued");
        Ok(AuthSession { user, token })
    }

    /// Sign an HS256 token for the user, valid for `token_ttl_hours`.
    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.cfg.token_ttl_hours);
        let claims = Claims { sub: user.id.to_string(), iat: now.timestamp() as usize, exp: exp.timestamp() as usize };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Resolve a bearer token to its (still existing) user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|e| AuthError::TokenError(e.to_string()))?;
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::Unauthorized)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    /// Apply a partial profile update; a new password is re-hashed.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<AuthUser, AuthError> {
        if let Some(name) = &update.name {
            models::user::validate_name(name)?;
        }
        if let Some(password) = &update.password {
            self.check_password(password)?;
        }

        let mut user = self.get_user(user_id).await?;
        if let Some(name) = &update.name {
            user = self.repo.update_name(user_id, name).await?;
        }
        if let Some(password) = &update.password {
            let hash = hash_password(password)?;
            self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
            info!(user_id = %user_id, "password_changed");
        }
        Ok(user)
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.cfg.min_password_len {
            return Err(AuthError::invalid(
                "password",
                format!("Ensure this field has at least {} characters.", self.cfg.min_password_len),
            ));
        }
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}
