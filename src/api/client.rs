//! Strato API client
//!
//! Main client for talking to a Strato deployment, combining token
//! issuance and HTTP plumbing with the URL layout of each service.

use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

use super::auth::{Credentials, TokenIssuer, TokenScope};
use super::http::HttpClient;
use crate::config::Config;

/// Main Strato client.
///
/// One instance covers one identity scope; resource clients clone it.
#[derive(Clone)]
pub struct ApiClient {
    pub auth: TokenIssuer,
    pub http: HttpClient,
    service_url: String,
    api_url: String,
    cluster_id: String,
}

impl ApiClient {
    /// Create a client scoped to a domain (business-unit level operations)
    pub fn domain_scoped(config: &Config) -> Result<Self> {
        Self::new(config, TokenScope::Domain, None)
    }

    /// Create a client scoped to a project
    pub fn project_scoped(config: &Config, project_name: &str) -> Result<Self> {
        Self::new(config, TokenScope::Project, Some(project_name))
    }

    /// Create a client with the cloud-admin identity (domain scope)
    pub fn cloud_admin(config: &Config) -> Result<Self> {
        let credentials = Credentials {
            domain_name: "admin.local".to_string(),
            user: config.cloud_admin().to_string(),
            password: config.cloud_admin_password().to_string(),
            project_name: None,
        };
        Self::with_credentials(config, credentials, TokenScope::Domain)
    }

    fn new(config: &Config, scope: TokenScope, project_name: Option<&str>) -> Result<Self> {
        let credentials = Credentials {
            domain_name: config.domain_name().to_string(),
            user: config.project_admin().to_string(),
            password: config.project_admin_password().to_string(),
            project_name: Some(
                project_name
                    .unwrap_or_else(|| config.project_name())
                    .to_string(),
            ),
        };
        Self::with_credentials(config, credentials, scope)
    }

    /// Create a client from explicit credentials
    pub fn with_credentials(
        config: &Config,
        credentials: Credentials,
        scope: TokenScope,
    ) -> Result<Self> {
        let service_url = valid_base_url(config.service_url())
            .context("invalid service URL in configuration")?;
        let api_url =
            valid_base_url(config.api_url()).context("invalid API URL in configuration")?;

        let auth = TokenIssuer::new(&format!("{}/keystone/v3", service_url), credentials, scope)?;

        Ok(Self {
            auth,
            http: HttpClient::new()?,
            service_url,
            api_url,
            cluster_id: config.cluster_id().to_string(),
        })
    }

    /// Get the current bearer token
    pub async fn token(&self) -> Result<String> {
        self.auth.token().await
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.token().await?;
        self.http.post(url, &token, body).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.token().await?;
        self.http.put(url, &token, body).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.token().await?;
        self.http.patch(url, &token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<Value> {
        let token = self.token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Identity (keystone) URL helpers
    // =========================================================================

    /// Build a keystone v3 URL
    pub fn keystone_url(&self, path: &str) -> String {
        format!("{}/keystone/v3/{}", self.service_url, path)
    }

    // =========================================================================
    // Compute (nova) URL helpers
    // =========================================================================

    /// Build a nova URL scoped to a project
    pub fn compute_url(&self, project_id: &str, path: &str) -> String {
        format!("{}/nova/v2.1/{}/{}", self.service_url, project_id, path)
    }

    // =========================================================================
    // Network (neutron) URL helpers
    // =========================================================================

    /// Build a neutron v2.0 URL
    pub fn network_url(&self, path: &str) -> String {
        format!("{}/neutron/v2.0/{}", self.service_url, path)
    }

    // =========================================================================
    // Image (glance) URL helpers
    // =========================================================================

    /// Build a glance v2 URL
    pub fn image_url(&self, path: &str) -> String {
        format!("{}/glance/v2/{}", self.service_url, path)
    }

    // =========================================================================
    // Platform orchestration URL helpers
    // =========================================================================

    /// Build a cluster-scoped platform API URL
    pub fn cluster_url(&self, path: &str) -> String {
        format!("{}/v2/clusters/{}/{}", self.api_url, self.cluster_id, path)
    }
}

/// Validate a base URL and strip any trailing slash
fn valid_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("cannot parse URL: {}", raw))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "unsupported URL scheme: {}",
        url.scheme()
    );
    Ok(raw.trim_end_matches('/').to_string())
}
