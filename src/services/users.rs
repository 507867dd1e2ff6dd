use std::sync::Arc;

use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::repositories::{NewUser, UserRepository};

/// Verified against when a login names an unknown user, so the
/// unknown-username and wrong-password paths take comparable time.
const DUMMY_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Account registration, login, and promotion.
///
/// Authorization is not checked here: callers (the route layer) must have
/// already established that e.g. only an admin reaches `promote_to_admin`.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    /// Creates a new account. The very first account in the system becomes
    /// the administrator; all later ones start as regular users.
    ///
    /// The count-then-insert here is not atomic; the username unique index
    /// remains the authority on uniqueness, and a duplicate surfaces as
    /// `AppError::Conflict`.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let count = self.repo.count().await?;
        let role = if count == 0 { Role::Admin } else { Role::User };

        let password_hash = hash_password(password)?;

        self.repo
            .insert(NewUser {
                username: username.to_owned(),
                password_hash,
                role,
            })
            .await
    }

    /// Verifies credentials and issues a session token.
    ///
    /// Unknown username and wrong password produce the identical error, so
    /// responses never reveal whether an account exists.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        match self.repo.find_by_username(username).await? {
            Some(user) => {
                if !verify_password(password, &user.password_hash) {
                    return Err(AppError::Unauthorized("invalid credentials".into()));
                }
                let token = self.tokens.issue(user.id, user.role)?;
                Ok((token, user))
            }
            None => {
                let _ = verify_password(password, DUMMY_HASH);
                Err(AppError::Unauthorized("invalid credentials".into()))
            }
        }
    }

    /// Grants the admin role to an existing account.
    ///
    /// Tokens issued before the promotion keep their old role until they
    /// expire; the user picks the new role up at the next login.
    pub async fn promote_to_admin(&self, user_id: Uuid) -> Result<(), AppError> {
        let matched = self.repo.set_role(user_id, Role::Admin).await?;
        if matched == 0 {
            return Err(AppError::NotFound("user not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            TokenService::new(b"user_service_test_secret"),
        )
    }

    #[tokio::test]
    async fn test_first_registered_user_becomes_admin() {
        let service = service();

        let first = service.register("alice", "pw123456").await.unwrap();
        assert_eq!(first.role, Role::Admin);

        let second = service.register("bob", "pw123456").await.unwrap();
        assert_eq!(second.role, Role::User);

        let third = service.register("carol", "pw123456").await.unwrap();
        assert_eq!(third.role, Role::User);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let service = service();

        service.register("alice", "pw123456").await.unwrap();
        let err = service.register("alice", "other-pass").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_returns_token_with_role() {
        let service = service();
        let registered = service.register("alice", "pw123456").await.unwrap();

        let (token, user) = service.login("alice", "pw123456").await.unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(user.role, Role::Admin);

        let claims = TokenService::new(b"user_service_test_secret")
            .verify(&token)
            .unwrap();
        assert_eq!(claims.sub, registered.id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bad_password_and_unknown_user_fail_identically() {
        let service = service();
        service.register("alice", "pw123456").await.unwrap();

        let wrong_password = service.login("alice", "not-the-password").await.unwrap_err();
        let unknown_user = service.login("mallory", "pw123456").await.unwrap_err();

        match (&wrong_password, &unknown_user) {
            (AppError::Unauthorized(a), AppError::Unauthorized(b)) => assert_eq!(a, b),
            other => panic!("expected matching Unauthorized errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_promote_to_admin() {
        let service = service();
        service.register("alice", "pw123456").await.unwrap();
        let bob = service.register("bob", "pw123456").await.unwrap();
        assert_eq!(bob.role, Role::User);

        service.promote_to_admin(bob.id).await.unwrap();

        // The new role shows up on the next login.
        let (_, user) = service.login("bob", "pw123456").await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_promote_unknown_user_not_found() {
        let service = service();

        let err = service.promote_to_admin(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
