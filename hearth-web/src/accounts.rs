//! Account management and the login boundary
//!
//! In-memory account registry with argon2 password hashes; the stand-in
//! for the excluded user-persistence collaborator. Login distinguishes
//! missing input (an authentication-input error) from a bad credential.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_access::{Role, TokenService};

use crate::auth::AuthError;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response: bearer token plus the subject identity
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AccountInfo,
}

/// Public account information
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Internal account data with password hash
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub roles: HashSet<Role>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Account {
    /// Create a new account with a hashed password
    pub fn new(
        username: String,
        password: &str,
        display_name: Option<String>,
        roles: HashSet<Role>,
    ) -> Result<Self, AuthError> {
        let password_hash = hash_password(password)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username,
            display_name,
            password_hash,
            roles,
            created_at: chrono::Utc::now(),
        })
    }

    /// Verify password
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }

    /// Convert to public account info
    pub fn to_account_info(&self) -> AccountInfo {
        let mut roles: Vec<String> = self.roles.iter().map(|r| r.to_string()).collect();
        roles.sort();

        AccountInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            roles,
            is_admin: self.roles.contains(&Role::Admin),
            created_at: self.created_at,
        }
    }
}

/// Account registry and login service
#[derive(Clone)]
pub struct AccountService {
    tokens: Arc<TokenService>,
    /// username -> account
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl AccountService {
    /// Create the service and seed the default admin account
    pub fn new(tokens: Arc<TokenService>) -> Self {
        let service = Self {
            tokens,
            accounts: Arc::new(RwLock::new(HashMap::new())),
        };

        // Default password - should be changed in production
        match service.create_account(
            "admin",
            "admin123",
            Some("Administrator".to_string()),
            [Role::Admin].into_iter().collect(),
        ) {
            Ok(admin) => info!("Created default admin account: {}", admin.username),
            Err(e) => warn!("Failed to create default admin account: {}", e),
        }

        service
    }

    /// Create a new account
    pub fn create_account(
        &self,
        username: &str,
        password: &str,
        display_name: Option<String>,
        roles: HashSet<Role>,
    ) -> Result<AccountInfo, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(username) {
            debug!("Account already exists: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let account = Account::new(username.to_string(), password, display_name, roles)?;
        let info = account.to_account_info();
        accounts.insert(account.username.clone(), account);

        Ok(info)
    }

    /// Authenticate with username and password, minting a bearer token
    pub fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.username.is_empty() || request.password.is_empty() {
            debug!("Login rejected: missing credentials");
            return Err(AuthError::MissingCredentials);
        }

        let accounts = self.accounts.read().unwrap();
        let account = accounts.get(&request.username).ok_or_else(|| {
            debug!("Login rejected: unknown username");
            AuthError::InvalidCredentials
        })?;

        if !account.verify_password(&request.password) {
            debug!("Login rejected: bad password for {}", request.username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.mint(&account.id, &account.roles)?;

        info!("User logged in: {}", account.username);
        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens_ttl_secs(),
            user: account.to_account_info(),
        })
    }

    /// Find an account by its subject id
    pub fn get(&self, account_id: &str) -> Option<AccountInfo> {
        let accounts = self.accounts.read().unwrap();
        accounts
            .values()
            .find(|account| account.id == account_id)
            .map(Account::to_account_info)
    }

    fn tokens_ttl_secs(&self) -> i64 {
        self.tokens.ttl_secs()
    }
}

/// Hash a password with argon2
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!("Password hashing failed: {}", e);
            AuthError::Access(hearth_access::AccessError::TokenCreation)
        })
}

/// Verify a password against its stored hash
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_access::SigningIdentity;

    fn service() -> AccountService {
        let tokens = Arc::new(TokenService::new(
            SigningIdentity::from_secret(b"unit-test-secret"),
            3600,
            "hearth",
        ));
        AccountService::new(tokens)
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn default_admin_can_log_in() {
        let service = service();
        let response = service.login(login_request("admin", "admin123")).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert!(response.user.is_admin);
    }

    #[test]
    fn missing_fields_are_an_input_error() {
        let service = service();
        let err = service.login(login_request("admin", "")).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let err = service.login(login_request("", "admin123")).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn bad_password_is_a_credential_error() {
        let service = service();
        let err = service.login(login_request("admin", "wrong")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn unknown_user_is_a_credential_error() {
        let service = service();
        let err = service.login(login_request("nobody", "pw")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn created_account_is_retrievable_by_id() {
        let service = service();
        let info = service
            .create_account(
                "alice",
                "password123",
                Some("Alice".to_string()),
                [Role::User].into_iter().collect(),
            )
            .unwrap();

        let found = service.get(&info.id).unwrap();
        assert_eq!(found.username, "alice");
        assert!(!found.is_admin);
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let service = service();
        service
            .create_account("alice", "pw1", None, [Role::User].into_iter().collect())
            .unwrap();
        let err = service
            .create_account("alice", "pw2", None, [Role::User].into_iter().collect())
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
