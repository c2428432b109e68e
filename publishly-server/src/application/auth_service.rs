use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation("missing required fields".into()));
        }
        if !email.contains('@') {
            return Err(DomainError::Validation("invalid email".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists(email));
        }

        let hash =
            hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(name.to_string(), email, hash);
        self.repo.create(user).await
    }

    /// Checks credentials and issues a session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), DomainError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "email and password are required".into(),
            ));
        }

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .keys
            .generate_token(user.id, &user.email)
            .map_err(|err| DomainError::Internal(err.to_string()))?;

        info!(user_id = %user.id, "session issued");
        Ok((user, token))
    }

    /// Resolves a session token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self
            .keys
            .verify_token(token)
            .map_err(|_| DomainError::Unauthorized)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory;
    use chrono::Duration;

    fn service() -> AuthService {
        AuthService::new(
            memory::repositories().users,
            JwtKeys::new("test-secret".into(), Duration::hours(1)),
        )
    }

    #[tokio::test]
    async fn signup_normalizes_email_and_sets_default_avatar() {
        let auth = service();
        let user = auth
            .signup(" Ada ", " Ada@Example.COM ", "longenough")
            .await
            .unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.avatar.is_some());
        assert_ne!(user.password_hash, "longenough");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service();
        auth.signup("Ada", "ada@example.com", "longenough")
            .await
            .unwrap();
        let err = auth
            .signup("Other", "ADA@example.com", "longenough")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let auth = service();
        for (name, email, password) in [
            ("", "a@b.c", "longenough"),
            ("Ada", "not-an-email", "longenough"),
            ("Ada", "a@b.c", "short"),
        ] {
            let err = auth.signup(name, email, password).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_that_authenticates() {
        let auth = service();
        let user = auth
            .signup("Ada", "ada@example.com", "longenough")
            .await
            .unwrap();

        let (logged_in, token) = auth.login("ADA@example.com", "longenough").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.authenticate(&token).await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let auth = service();
        auth.signup("Ada", "ada@example.com", "longenough")
            .await
            .unwrap();

        let wrong = auth.login("ada@example.com", "nope-nope").await.unwrap_err();
        let unknown = auth.login("bob@example.com", "longenough").await.unwrap_err();
        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert!(matches!(unknown, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let err = service().authenticate("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}
