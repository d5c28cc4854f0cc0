use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;
const MIN_PASSWORD_LEN: usize = 8;

/// JWT claims carried by user bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Public view of a user account; never carries the credential hash
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful register or login
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: Claims,
    pub user: UserSummary,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl AuthError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct AuthState {
    users: HashMap<Uuid, User>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredAuthState {
    users: Vec<User>,
}

impl From<StoredAuthState> for AuthState {
    fn from(value: StoredAuthState) -> Self {
        Self {
            users: value
                .users
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&AuthState> for StoredAuthState {
    fn from(value: &AuthState) -> Self {
        Self {
            users: value.users.values().cloned().collect(),
        }
    }
}

/// User store with JSON-file persistence and HS256 token issuance
#[derive(Clone)]
pub struct AuthStore {
    state: Arc<RwLock<AuthState>>,
    file_path: PathBuf,
    jwt_secret: String,
    token_ttl_seconds: i64,
}

impl AuthStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, AuthError> {
        tokio::fs::create_dir_all(&base_dir).await.map_err(|err| {
            AuthError::Storage(format!("Failed to create auth directory: {}", err))
        })?;

        let file_path = base_dir.join("users.json");
        let state = load_state(&file_path).await?;
        let jwt_secret =
            std::env::var("TM_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        let token_ttl_seconds = std::env::var("TM_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path,
            jwt_secret,
            token_ttl_seconds,
        })
    }

    /// Create a new account and return a session for it
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let name = validate_name(name)?;
        let normalized_email = normalize_email(email)?;
        validate_password(password)?;

        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.name == name) {
            return Err(AuthError::Conflict(format!(
                "User '{}' already exists",
                name
            )));
        }
        if state.users.values().any(|user| user.email == normalized_email) {
            return Err(AuthError::Conflict(format!(
                "Email '{}' is already registered",
                normalized_email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            email: normalized_email,
            password_hash: hash_password(password),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        persist_state(&self.file_path, &state).await?;
        drop(state);

        tracing::info!(user_id = %user.id, "user registered");
        self.build_session(user)
    }

    /// Authenticate by login name and password
    ///
    /// The error never distinguishes an unknown name from a bad password.
    pub async fn login(&self, name: &str, password: &str) -> Result<AuthSession, AuthError> {
        let name = name.trim();
        let state = self.state.read().await;

        let user = state
            .users
            .values()
            .find(|user| user.name == name)
            .cloned()
            .ok_or_else(|| AuthError::Unauthorized("Invalid credentials".to_string()))?;
        if !verify_password(&user.password_hash, password) {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        }
        drop(state);

        self.build_session(user)
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authorize_bearer(&self, token: &str) -> Result<UserSummary, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid token subject".to_string()))?;

        let state = self.state.read().await;
        let user = state
            .users
            .get(&user_id)
            .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;
        Ok(user_to_summary(user))
    }

    fn build_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let exp = (Utc::now() + Duration::seconds(self.token_ttl_seconds)).timestamp();
        let exp = usize::try_from(exp)
            .map_err(|_| AuthError::Storage("Failed to encode token expiration".to_string()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            exp,
        };
        Ok(AuthSession {
            claims,
            user: user_to_summary(&user),
        })
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| AuthError::Storage(format!("Failed to encode JWT: {}", err)))
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| AuthError::Unauthorized(format!("Invalid token: {}", err)))?;
        Ok(decoded.claims)
    }
}

fn user_to_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: user.created_at,
    }
}

async fn load_state(path: &Path) -> Result<AuthState, AuthError> {
    if !path.exists() {
        return Ok(AuthState::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to read auth state: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(AuthState::default());
    }
    let stored: StoredAuthState = serde_json::from_str(&content)
        .map_err(|err| AuthError::Storage(format!("Failed to parse auth state: {}", err)))?;
    Ok(stored.into())
}

async fn persist_state(path: &Path, state: &AuthState) -> Result<(), AuthError> {
    let content = serde_json::to_string_pretty(&StoredAuthState::from(state))
        .map_err(|err| AuthError::Storage(format!("Failed to serialize auth state: {}", err)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            AuthError::Storage(format!("Failed to create auth parent dir: {}", err))
        })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to write auth state: {}", err)))?;
    Ok(())
}

fn validate_name(name: &str) -> Result<String, AuthError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::validation("name", "Name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(AuthError::validation("email", "Invalid email"));
    }
    Ok(normalized)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let version = parts.next();
    let encoded_salt = parts.next();
    let encoded_digest = parts.next();
    let (Some(encoded_salt), Some(encoded_digest)) = (encoded_salt, encoded_digest) else {
        return false;
    };
    if version != Some("v1") {
        return false;
    }

    let salt = match URL_SAFE_NO_PAD.decode(encoded_salt) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let expected_digest = match URL_SAFE_NO_PAD.decode(encoded_digest) {
        Ok(value) => value,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let actual_digest = hasher.finalize();
    expected_digest == actual_digest.as_slice()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn build_store() -> (AuthStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = AuthStore::new(temp_dir.path().join("auth")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn register_and_login_roundtrip() {
        let (store, _temp_dir) = build_store().await;
        let session = store
            .register("alice", "alice@example.com", "verysecurepw")
            .await
            .unwrap();
        let token = store.encode_claims(&session.claims).unwrap();
        let authed = store.authorize_bearer(&token).await.unwrap();
        assert_eq!(authed.id, session.user.id);
        assert_eq!(authed.name, "alice");
        assert_eq!(authed.email, "alice@example.com");
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("alice", "alice@example.com", "verysecurepw")
            .await
            .unwrap();
        let result = store
            .register("alice", "other@example.com", "verysecurepw")
            .await;
        match result.unwrap_err() {
            AuthError::Conflict(_) => {}
            e => panic!("Expected Conflict error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let (store, _temp_dir) = build_store().await;
        let result = store.register("bob", "bob@example.com", "short").await;
        match result.unwrap_err() {
            AuthError::Validation { field, .. } => assert_eq!(field, "password"),
            e => panic!("Expected Validation error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("carol", "carol@example.com", "verysecurepw")
            .await
            .unwrap();
        assert!(store.login("carol", "wrong-password").await.is_err());
        assert!(store.login("nobody", "verysecurepw").await.is_err());
        assert!(store.login("carol", "verysecurepw").await.is_ok());
    }

    #[tokio::test]
    async fn garbage_token_rejected() {
        let (store, _temp_dir) = build_store().await;
        assert!(store.authorize_bearer("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn users_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("auth");
        {
            let store = AuthStore::new(base.clone()).await.unwrap();
            store
                .register("dave", "dave@example.com", "verysecurepw")
                .await
                .unwrap();
        }
        {
            let store = AuthStore::new(base).await.unwrap();
            assert!(store.login("dave", "verysecurepw").await.is_ok());
        }
    }
}
