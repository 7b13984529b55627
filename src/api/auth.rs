//! Keystone authentication
//!
//! Issues scoped bearer tokens from the identity service using password
//! auth, and caches them until shortly before expiry.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::http::HttpClient;

/// Header carrying the issued token in a keystone auth response
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL; keystone tokens on Strato live for an hour
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Scope of an issued token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Domain,
    Project,
}

/// Credentials used for password auth against keystone
#[derive(Debug, Clone)]
pub struct Credentials {
    pub domain_name: String,
    pub user: String,
    pub password: String,
    /// Required for project-scoped tokens
    pub project_name: Option<String>,
}

impl Credentials {
    /// Build the keystone v3 password-auth payload for the given scope
    pub fn auth_payload(&self, scope: TokenScope) -> Value {
        let identity = json!({
            "methods": ["password"],
            "password": {
                "user": {
                    "domain": { "name": self.domain_name },
                    "name": self.user,
                    "password": self.password
                }
            }
        });

        let scope_block = match scope {
            TokenScope::Domain => json!({
                "domain": { "name": self.domain_name }
            }),
            TokenScope::Project => json!({
                "project": {
                    "name": self.project_name.as_deref().unwrap_or_default(),
                    "domain": { "name": self.domain_name }
                }
            }),
        };

        json!({
            "auth": {
                "identity": identity,
                "scope": scope_block
            }
        })
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Token issuer with caching.
///
/// Holds the credentials and scope for one identity, issues tokens via
/// `POST /auth/tokens` and reuses them until they near expiry.
#[derive(Clone)]
pub struct TokenIssuer {
    http: HttpClient,
    token_url: String,
    credentials: Credentials,
    scope: TokenScope,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenIssuer {
    /// Create an issuer for the given keystone base URL
    /// (e.g. `https://host/keystone/v3`)
    pub fn new(keystone_url: &str, credentials: Credentials, scope: TokenScope) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            token_url: format!("{}/auth/tokens", keystone_url),
            credentials,
            scope,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a token, issuing a new one if the cached token is stale
    pub async fn token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = self.issue().await?;
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        Ok(token)
    }

    /// Force refresh the token
    pub async fn refresh(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.token().await
    }

    /// Issue a fresh token from keystone
    async fn issue(&self) -> Result<String> {
        let payload = self.credentials.auth_payload(self.scope);
        let response = self.http.post_raw(&self.token_url, &payload).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("failed to fetch token: {} - {}", status, body);
            return Err(anyhow::anyhow!("token issuance failed: {}", status));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("auth response missing X-Subject-Token header")?;

        tracing::debug!(
            "issued {:?}-scoped token for user {}",
            self.scope,
            self.credentials.user
        );
        Ok(token)
    }
}
