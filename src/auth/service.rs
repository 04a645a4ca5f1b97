use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenIssuer;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::{Role, User, UserProfile};
use crate::state::UserStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Accounts created at startup when seeding is enabled
const DEFAULT_USERS: [(&str, &str, &str, Role); 2] = [
    ("admin", "admin123", "admin@emergency.local", Role::Admin),
    ("responder", "responder123", "responder@emergency.local", Role::Responder),
];

/// Token plus the account it was issued for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Registration, login and token validation
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    /// Build from configuration, resolving the signing secret
    pub fn from_config(users: Arc<dyn UserStore>, config: &AuthConfig) -> Result<Self> {
        let secret = config.resolve_secret()?;
        let tokens = TokenIssuer::new(&secret, config.token_ttl_hours);
        Ok(Self::new(users, tokens, config.bcrypt_cost))
    }

    /// Create a `user` account and sign it in
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<AuthSession> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(AppError::Validation(
                "Username, password and email are required".to_string(),
            ));
        }

        if self.users.find_by_username(username).await?.is_some()
            || self.users.find_by_email(email).await?.is_some()
        {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = User::new(
            username.to_string(),
            email.to_string(),
            password_hash,
            Role::User,
        );

        self.users.save_user(&user).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        self.session_for(&user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let invalid = || AppError::Authentication("Invalid credentials".to_string());

        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::debug!(username = %user.username, "Login rejected");
            return Err(invalid());
        }

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        self.session_for(&user)
    }

    /// Resolve a bearer token to the account it belongs to
    pub async fn validate(&self, token: &str) -> Result<UserProfile> {
        let claims = self.tokens.verify_token(token)?;

        let user = self
            .users
            .get_user(&claims.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("User no longer exists".to_string()))?;

        Ok(user.profile())
    }

    /// Recreate the built-in admin and responder accounts
    pub async fn seed_default_users(&self) -> Result<()> {
        for (username, password, email, role) in DEFAULT_USERS {
            if self.users.delete_by_username(username).await? {
                tracing::debug!(username = username, "Removed existing default user");
            }

            let password_hash = hash_password(password, self.bcrypt_cost).await?;
            let user = User::new(username.to_string(), email.to_string(), password_hash, role);

            match self.users.save_user(&user).await {
                Ok(()) => tracing::info!(username = username, role = %role, "Default user seeded"),
                // Email held by an account with another name; leave it alone
                Err(AppError::Conflict(msg)) => {
                    tracing::warn!(username = username, reason = %msg, "Default user not seeded")
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn session_for(&self, user: &User) -> Result<AuthSession> {
        Ok(AuthSession {
            token: self.tokens.issue_token(user.id, user.role)?,
            user: user.profile(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            TokenIssuer::new("test-secret", 24),
            4,
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();

        let session = auth
            .register("dana", "s3cret", "dana@example.com")
            .await
            .unwrap();
        assert_eq!(session.user.username, "dana");
        assert_eq!(session.user.role, Role::User);

        let session = auth.login("dana", "s3cret").await.unwrap();
        let profile = auth.validate(&session.token).await.unwrap();
        assert_eq!(profile.username, "dana");
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let auth = service();
        let result = auth.register("", "pw", "x@example.com").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let auth = service();
        auth.register("dana", "pw", "dana@example.com").await.unwrap();

        let result = auth.register("dana", "pw", "other@example.com").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let result = auth.register("other", "pw", "dana@example.com").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register("dana", "pw", "dana@example.com").await.unwrap();

        let wrong_password = auth.login("dana", "nope").await.unwrap_err();
        let unknown_user = auth.login("nobody", "pw").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let auth = service();
        let result = auth.login("dana", "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_token() {
        let auth = service();
        assert!(matches!(
            auth.validate("garbage").await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_default_users_is_repeatable() {
        let auth = service();
        auth.seed_default_users().await.unwrap();
        auth.seed_default_users().await.unwrap();

        let admin = auth.login("admin", "admin123").await.unwrap();
        assert_eq!(admin.user.role, Role::Admin);

        let responder = auth.login("responder", "responder123").await.unwrap();
        assert_eq!(responder.user.role, Role::Responder);
    }
}
