//! User signup, login and token verification.

mod password;
mod token;

pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use token::{
    ACCESS_TOKEN_TTL_HOURS, Claims, JwtTokenIssuer, REFRESH_TOKEN_TTL_HOURS, TokenIssuer,
    TokenPair, TokenSubject,
};

use chrono::{DateTime, Utc};
use common::{Address, CartLine, Email, Order, User, UserId};
use document_store::{DocumentStore, UserStore};
use serde::{Deserialize, Serialize};

use crate::context::StoreContext;
use crate::error::DomainError;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 30;
const PASSWORD_MIN_LEN: usize = 6;

/// Signup form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub email: String,
    pub phone: String,
}

impl NewUser {
    fn validate(&self) -> Result<Email, DomainError> {
        check_name("first_name", &self.first_name)?;
        check_name("last_name", &self.last_name)?;
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(DomainError::InvalidSignup(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::InvalidSignup("phone is required".to_string()));
        }
        Email::parse(&self.email).map_err(|e| DomainError::InvalidSignup(e.to_string()))
    }
}

fn check_name(field: &str, value: &str) -> Result<(), DomainError> {
    let len = value.trim().chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(DomainError::InvalidSignup(format!(
            "{field} must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// A user document without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_cart: Vec<CartLine>,
    pub address_details: Vec<Address>,
    pub orders: Vec<Order>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            token: user.token,
            refresh_token: user.refresh_token,
            created_at: user.created_at,
            updated_at: user.updated_at,
            user_cart: user.user_cart,
            address_details: user.address_details,
            orders: user.orders,
        }
    }
}

/// Service for account lifecycle.
pub struct AccountService<S: DocumentStore, H: PasswordHasher, T: TokenIssuer> {
    ctx: StoreContext<S>,
    hasher: H,
    tokens: T,
}

impl<S: DocumentStore, H: PasswordHasher, T: TokenIssuer> AccountService<S, H, T> {
    /// Creates a new account service.
    pub fn new(ctx: StoreContext<S>, hasher: H, tokens: T) -> Self {
        Self {
            ctx,
            hasher,
            tokens,
        }
    }

    /// Registers a user with an empty cart, address list and order history.
    #[tracing::instrument(skip(self, new), fields(email = %new.email))]
    pub async fn signup(&self, new: NewUser) -> Result<UserId, DomainError> {
        let email = new.validate()?;
        let store = self.ctx.store();

        if self.ctx.run(store.email_exists(email.as_str())).await? {
            return Err(DomainError::EmailTaken);
        }
        let phone = new.phone.trim().to_string();
        if self.ctx.run(store.phone_exists(&phone)).await? {
            return Err(DomainError::PhoneTaken);
        }

        let user_id = UserId::new();
        let first_name = new.first_name.trim().to_string();
        let last_name = new.last_name.trim().to_string();
        let tokens = self.tokens.issue(&TokenSubject {
            user_id,
            email: email.as_str().to_string(),
            first_name: first_name.clone(),
            last_name: last_name.clone(),
        })?;
        let password_hash = self.hasher.hash(&new.password)?;

        let now = Utc::now();
        let user = User {
            user_id,
            first_name,
            last_name,
            email,
            phone,
            password_hash,
            token: Some(tokens.token),
            refresh_token: Some(tokens.refresh_token),
            created_at: now,
            updated_at: now,
            user_cart: Vec::new(),
            address_details: Vec::new(),
            orders: Vec::new(),
        };
        self.ctx.run(store.insert_user(user)).await?;

        metrics::counter!("signups_total").increment(1);
        tracing::info!(%user_id, "user signed up");
        Ok(user_id)
    }

    /// Verifies credentials and rotates the user's token pair.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, DomainError> {
        let store = self.ctx.store();
        let mut user = self
            .ctx
            .run(store.find_user_by_email(email.trim()))
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.user_id, "wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let tokens = self.tokens.issue(&TokenSubject {
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        })?;
        self.ctx
            .run(store.update_tokens(
                user.user_id,
                tokens.token.clone(),
                tokens.refresh_token.clone(),
            ))
            .await?;

        user.token = Some(tokens.token);
        user.refresh_token = Some(tokens.refresh_token);
        user.updated_at = Utc::now();

        metrics::counter!("logins_total").increment(1);
        tracing::info!(user_id = %user.user_id, "user logged in");
        Ok(user.into())
    }

    /// Resolves a bearer token to the user it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<UserId, DomainError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::InMemoryDocumentStore;
    use secrecy::SecretString;

    type Service = AccountService<InMemoryDocumentStore, Argon2PasswordHasher, JwtTokenIssuer>;

    fn service(store: &InMemoryDocumentStore) -> Service {
        AccountService::new(
            StoreContext::new(store.clone()),
            Argon2PasswordHasher::new(),
            JwtTokenIssuer::new(&SecretString::from("test-secret".to_string())),
        )
    }

    fn new_user(email: &str, phone: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "engine42".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);
        let user_id = service
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();

        let profile = service.login("ADA@example.com", "engine42").await.unwrap();
        assert_eq!(profile.user_id, user_id);
        assert!(profile.user_cart.is_empty());
        assert!(profile.orders.is_empty());

        let token = profile.token.unwrap();
        assert_eq!(service.verify_token(&token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_clear() {
        let store = InMemoryDocumentStore::new();
        let user_id = service(&store)
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();

        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_ne!(user.password_hash, "engine42");
        assert!(user.token.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);
        service
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();

        let result = service
            .signup(new_user("Ada@Example.com", "555-0199"))
            .await;
        assert!(matches!(result, Err(DomainError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);
        service
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();

        let result = service
            .signup(new_user("grace@example.com", "555-0100"))
            .await;
        assert!(matches!(result, Err(DomainError::PhoneTaken)));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);

        let mut short_name = new_user("a@example.com", "1");
        short_name.first_name = "A".to_string();
        let mut short_password = new_user("b@example.com", "2");
        short_password.password = "abc".to_string();
        let bad_email = new_user("not-an-email", "3");
        let no_phone = new_user("c@example.com", " ");

        for form in [short_name, short_password, bad_email, no_phone] {
            let result = service.signup(form).await;
            assert!(matches!(result, Err(DomainError::InvalidSignup(_))));
        }
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);
        service
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();

        let wrong_password = service.login("ada@example.com", "nope-nope").await;
        let unknown_email = service.login("who@example.com", "engine42").await;
        assert!(matches!(wrong_password, Err(DomainError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rotates_tokens() {
        let store = InMemoryDocumentStore::new();
        let service = service(&store);
        let user_id = service
            .signup(new_user("ada@example.com", "555-0100"))
            .await
            .unwrap();
        let before = store.find_user(user_id).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let profile = service.login("ada@example.com", "engine42").await.unwrap();

        let after = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(after.token, profile.token);
        assert_ne!(after.token, before.token);
    }
}
