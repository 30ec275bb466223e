//! Signup, login, token checks and logout.

use chrono::Utc;
use uuid::Uuid;

use crate::auth::blacklist::TokenBlacklist;
use crate::auth::jwt::{Claims, TokenIssuer};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthError, FieldError};
use crate::config::AuthConfig;
use crate::observability::metrics;
use crate::store::{StoreError, User, UserStore};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Credential and session handling shared by all handlers.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    issuer: TokenIssuer,
    blacklist: TokenBlacklist,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(config: &AuthConfig, users: UserStore) -> Self {
        Self {
            users,
            issuer: TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs),
            blacklist: TokenBlacklist::new(),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn blacklist(&self) -> &TokenBlacklist {
        &self.blacklist
    }

    /// Create an account.
    ///
    /// Both fields are trimmed; the username is then HTML-escaped before it
    /// is stored. All failing rules are reported together.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        let password = password.trim();

        let mut errors = Vec::new();
        if username.chars().count() < MIN_USERNAME_LEN {
            errors.push(FieldError {
                field: "username",
                message: format!("must be at least {} characters", MIN_USERNAME_LEN),
            });
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError {
                field: "password",
                message: format!("must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }
        if !errors.is_empty() {
            metrics::record_auth_event("signup", "invalid");
            return Err(AuthError::Validation(errors));
        }

        let username = escape_html(username);
        if self.users.find_by_username(&username).is_some() {
            metrics::record_auth_event("signup", "duplicate");
            return Err(AuthError::UsernameTaken);
        }

        let hash = self.hash_blocking(password.to_string()).await?;
        let user = self.users.insert(&username, hash).map_err(|e| match e {
            StoreError::UsernameTaken(_) => AuthError::UsernameTaken,
            other => AuthError::Internal(other.to_string()),
        })?;

        metrics::record_auth_event("signup", "ok");
        tracing::info!(username = %user.username, user_id = %user.id, "User created");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let (username, password) = match (username.map(str::trim), password.map(str::trim)) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AuthError::MissingCredentials),
        };

        let user = match self.users.find_by_username(&escape_html(username)) {
            Some(user) => user,
            None => {
                metrics::record_auth_event("login", "rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let valid = self
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            metrics::record_auth_event("login", "rejected");
            tracing::info!(username = %user.username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user)?;
        metrics::record_auth_event("login", "ok");
        tracing::info!(username = %user.username, "Login successful");
        Ok((user, token))
    }

    /// Validate a bearer token.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        if self.blacklist.is_revoked(token) {
            return Err(AuthError::TokenRevoked);
        }
        self.issuer.verify(token)
    }

    /// Revoke a token until its own expiry.
    ///
    /// Only tokens signed with our key and not yet expired are listed; anything
    /// else is already rejected by `authenticate` and never enters the list.
    pub fn logout(&self, token: Option<&str>) {
        let Some(token) = token else {
            return;
        };

        match self.issuer.expiry_of(token) {
            Some(expires_at) if expires_at > Utc::now().timestamp() => {
                self.blacklist.revoke(token, expires_at);
                metrics::record_auth_event("logout", "ok");
                tracing::info!(revoked = self.blacklist.len(), "Token revoked");
            }
            _ => {
                metrics::record_auth_event("logout", "ignored");
                tracing::debug!("Logout with unusable token, nothing to revoke");
            }
        }
    }

    /// Change the username of account `id`.
    ///
    /// The new name is normalised like a signup name. Issued tokens stay valid
    /// because they are bound to the account id.
    pub fn rename(&self, id: Uuid, new_username: &str) -> Result<User, AuthError> {
        let new_username = new_username.trim();
        if new_username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::Validation(vec![FieldError {
                field: "username",
                message: format!("must be at least {} characters", MIN_USERNAME_LEN),
            }]));
        }

        let current = self.users.find_by_id(id).ok_or(AuthError::InvalidToken)?;
        let new_username = escape_html(new_username);
        if current.username == new_username {
            return Ok(current);
        }

        let user = self
            .users
            .rename(&current.username, &new_username)
            .map_err(|e| match e {
                StoreError::UsernameTaken(_) => AuthError::UsernameTaken,
                StoreError::UserNotFound(_) => AuthError::InvalidToken,
                other => AuthError::Internal(other.to_string()),
            })?;

        metrics::record_auth_event("rename", "ok");
        tracing::info!(old = %current.username, new = %user.username, user_id = %user.id, "Username changed");
        Ok(user)
    }

    /// Drop revocation entries for tokens that have expired on their own.
    pub fn prune_revoked(&self) -> usize {
        self.blacklist.prune(Utc::now().timestamp())
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
    }

    async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
    }
}

/// Replace HTML-significant characters with entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}
