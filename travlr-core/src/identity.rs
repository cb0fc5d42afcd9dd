use std::collections::BTreeMap;
use std::sync::Arc;

use travlr_shared::Masked;
use uuid::Uuid;

use crate::repository::UserRepository;
use crate::session::{IssuedSession, SessionKeys};
use crate::{CoreError, CoreResult};

/// bcrypt salt rounds used when nothing else is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// A registered account. The password hash can only be written through
/// [`User::set_password`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    hash: Option<Masked<String>>,
}

impl User {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            hash: None,
        }
    }

    /// Rebuild a user loaded from storage.
    pub fn from_stored(id: Uuid, email: String, name: String, hash: Option<String>) -> Self {
        Self { id, email, name, hash: hash.map(Masked::new) }
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.hash.as_ref().map(|h| h.expose().as_str())
    }

    pub fn set_password(&mut self, password: &str, cost: u32) -> CoreResult<()> {
        if password.is_empty() {
            return Err(CoreError::invalid_field("password", "Password is required"));
        }
        let hash = bcrypt::hash(password, cost).map_err(CoreError::internal)?;
        self.hash = Some(Masked::new(hash));
        Ok(())
    }

    pub fn valid_password(&self, password: &str) -> bool {
        match (&self.hash, password.is_empty()) {
            (Some(hash), false) => bcrypt::verify(password, hash.expose()).unwrap_or(false),
            _ => false,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration and login. Passwords are hashed and checked on the blocking
/// pool so request workers are not held up by bcrypt.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: SessionKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: SessionKeys, bcrypt_cost: u32) -> Self {
        Self { users, keys, bcrypt_cost }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> CoreResult<IssuedSession> {
        let mut missing = BTreeMap::new();
        if name.trim().is_empty() {
            missing.insert("name".to_string(), "Name is required.".to_string());
        }
        if email.trim().is_empty() {
            missing.insert("email".to_string(), "Email is required.".to_string());
        }
        if password.is_empty() {
            missing.insert("password".to_string(), "Password is required.".to_string());
        }
        if !missing.is_empty() {
            return Err(CoreError::ValidationError(missing));
        }

        let email = normalize_email(email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(CoreError::conflict_on("email", "User already exists"));
        }

        let name = name.to_string();
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let user = tokio::task::spawn_blocking(move || {
            let mut user = User::new(&name, &email);
            user.set_password(&password, cost)?;
            Ok::<_, CoreError>(user)
        })
        .await
        .map_err(CoreError::internal)??;

        self.users.create_user(&user).await?;
        tracing::info!(user_id = %user.id, email = %Masked(&user.email), "User registered");

        self.keys.issue(&user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<IssuedSession> {
        if email.trim().is_empty() || password.is_empty() {
            let mut missing = BTreeMap::new();
            if email.trim().is_empty() {
                missing.insert("email".to_string(), "Email is required.".to_string());
            }
            if password.is_empty() {
                missing.insert("password".to_string(), "Password is required.".to_string());
            }
            return Err(CoreError::ValidationError(missing));
        }

        let email = normalize_email(email);
        let user = self.users.find_user_by_email(&email).await?;

        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let (user, matched) = tokio::task::spawn_blocking(move || {
            let matched = password_matches(user.as_ref(), &password, cost);
            (user, matched)
        })
        .await
        .map_err(CoreError::internal)?;

        let user = match (user, matched) {
            (Some(user), true) => user,
            (Some(user), false) => {
                tracing::debug!(user_id = %user.id, "Login with wrong password");
                return Err(invalid_credentials());
            }
            (None, _) => {
                tracing::debug!(email = %Masked(&email), "Login for unknown email");
                return Err(invalid_credentials());
            }
        };

        self.keys.issue(&user)
    }
}

/// Always costs one bcrypt round: an unknown account hashes the submitted
/// password at the configured cost, so it takes as long as a wrong password.
fn password_matches(user: Option<&User>, password: &str, cost: u32) -> bool {
    match user {
        Some(user) => user.valid_password(password),
        None => {
            let _ = bcrypt::hash(password, cost);
            false
        }
    }
}

fn invalid_credentials() -> CoreError {
    CoreError::Unauthorized("Invalid credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUserRepository;

    // Lowest cost bcrypt accepts; keeps the tests fast.
    const TEST_COST: u32 = 4;

    fn service() -> AuthService {
        let keys = SessionKeys::new("test-secret").unwrap();
        AuthService::new(Arc::new(MemoryUserRepository::new()), keys, TEST_COST)
    }

    #[test]
    fn test_hash_is_not_plaintext_and_only_matches_original() {
        let mut user = User::new("Jane", "jane@example.com");
        assert!(!user.valid_password("hunter22"));

        user.set_password("hunter22", TEST_COST).unwrap();
        assert_ne!(user.password_hash(), Some("hunter22"));
        assert!(user.valid_password("hunter22"));
        assert!(!user.valid_password("hunter23"));
        assert!(!user.valid_password("Hunter22"));
        assert!(!user.valid_password(""));
    }

    #[test]
    fn test_password_check_without_account() {
        assert!(!password_matches(None, "hunter22", TEST_COST));

        let mut user = User::new("Jane", "jane@example.com");
        user.set_password("hunter22", TEST_COST).unwrap();
        assert!(password_matches(Some(&user), "hunter22", TEST_COST));
        assert!(!password_matches(Some(&user), "hunter23", TEST_COST));
    }

    #[tokio::test]
    async fn test_unknown_email_still_pays_for_a_hash() {
        // At cost 12 a single bcrypt round is tens of milliseconds, far above
        // an in-memory lookup.
        let keys = SessionKeys::new("test-secret").unwrap();
        let auth = AuthService::new(Arc::new(MemoryUserRepository::new()), keys, 12);

        let started = std::time::Instant::now();
        let err = auth.login("ghost@example.com", "hunter22").await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
        assert!(started.elapsed() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn test_empty_password_is_rejected() {
        let mut user = User::new("Jane", "jane@example.com");
        assert!(matches!(user.set_password("", TEST_COST), Err(CoreError::ValidationError(_))));
        assert!(user.password_hash().is_none());
    }

    #[test]
    fn test_debug_output_masks_hash() {
        let mut user = User::new("Jane", "jane@example.com");
        user.set_password("hunter22", TEST_COST).unwrap();
        let debug = format!("{:?}", user);
        assert!(!debug.contains(user.password_hash().unwrap()));
    }

    #[test]
    fn test_email_is_normalized() {
        let user = User::new("  Jane ", "  Jane@Example.COM ");
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.name, "Jane");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let registered = auth.register("Jane", "Jane@example.com", "hunter22").await.unwrap();

        let session = auth.login("jane@example.com", "hunter22").await.unwrap();
        assert_eq!(session.claims.sub, registered.claims.sub);
        assert_eq!(session.claims.email, "jane@example.com");
        assert_eq!(session.claims.name, "Jane");

        let verified = auth.keys().verify(&session.token).unwrap();
        assert_eq!(verified.sub, registered.claims.sub);
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let auth = service();
        match auth.register("", "jane@example.com", "").await {
            Err(CoreError::ValidationError(fields)) => {
                assert!(fields.contains_key("name"));
                assert!(fields.contains_key("password"));
                assert!(!fields.contains_key("email"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|s| s.claims)),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();
        auth.register("Jane", "jane@example.com", "hunter22").await.unwrap();
        let err = auth.register("Other Jane", "JANE@example.com", "different").await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register("Jane", "jane@example.com", "hunter22").await.unwrap();

        let wrong_password = auth.login("jane@example.com", "nope").await.unwrap_err();
        let unknown_user = auth.login("ghost@example.com", "hunter22").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let auth = service();
        let err = auth.login("jane@example.com", "").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
