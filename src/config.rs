//! Test-bed configuration
//!
//! Describes the Strato deployment under test: service endpoints, the
//! cluster to operate on, and the identities the suite runs as.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Test-bed configuration.
///
/// Loaded from JSON; every field can be overridden with a `STRATOQA_*`
/// environment variable so CI can point the suite at a different
/// deployment without editing files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the service gateway (keystone/nova/neutron/glance)
    #[serde(default)]
    pub service_url: Option<String>,
    /// Base URL of the platform orchestration API
    #[serde(default)]
    pub api_url: Option<String>,
    /// Cluster the suite operates on
    #[serde(default)]
    pub cluster_id: Option<String>,
    /// Business-unit domain the suite creates resources in
    #[serde(default)]
    pub domain_name: Option<String>,
    /// Project used by project-scoped scenarios
    #[serde(default)]
    pub project_name: Option<String>,
    /// ID of a pre-existing project, for scenarios that don't create
    /// their own
    #[serde(default)]
    pub project_id: Option<String>,
    /// Project admin identity
    #[serde(default)]
    pub project_admin: Option<String>,
    #[serde(default)]
    pub project_admin_password: Option<String>,
    /// Cloud admin identity (domain `admin.local`)
    #[serde(default)]
    pub cloud_admin: Option<String>,
    #[serde(default)]
    pub cloud_admin_password: Option<String>,
    /// WebDriver endpoint for UI scenarios
    #[serde(default)]
    pub webdriver_url: Option<String>,
    /// Portal URL the UI scenarios drive
    #[serde(default)]
    pub portal_url: Option<String>,
}

impl Config {
    /// Get the default config file path
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("STRATOQA_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|p| p.join("stratoqa").join("config.json"))
    }

    /// Load configuration: `STRATOQA_CONFIG` path, then the user config
    /// dir, then defaults. Environment variables override file values.
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .filter(|p| p.exists())
            .and_then(|p| Self::from_file(&p).ok())
            .unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        fn from_env(slot: &mut Option<String>, var: &str) {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *slot = Some(value);
                }
            }
        }

        from_env(&mut self.service_url, "STRATOQA_SERVICE_URL");
        from_env(&mut self.api_url, "STRATOQA_API_URL");
        from_env(&mut self.cluster_id, "STRATOQA_CLUSTER_ID");
        from_env(&mut self.domain_name, "STRATOQA_DOMAIN_NAME");
        from_env(&mut self.project_name, "STRATOQA_PROJECT_NAME");
        from_env(&mut self.project_id, "STRATOQA_PROJECT_ID");
        from_env(&mut self.project_admin, "STRATOQA_PROJECT_ADMIN");
        from_env(
            &mut self.project_admin_password,
            "STRATOQA_PROJECT_ADMIN_PASSWORD",
        );
        from_env(&mut self.cloud_admin, "STRATOQA_CLOUD_ADMIN");
        from_env(
            &mut self.cloud_admin_password,
            "STRATOQA_CLOUD_ADMIN_PASSWORD",
        );
        from_env(&mut self.webdriver_url, "STRATOQA_WEBDRIVER_URL");
        from_env(&mut self.portal_url, "STRATOQA_PORTAL_URL");
    }

    /// Minimal config pointing at the given endpoints; used by unit and
    /// mock-server tests.
    pub fn for_tests(service_url: &str, api_url: &str) -> Self {
        Self {
            service_url: Some(service_url.to_string()),
            api_url: Some(api_url.to_string()),
            cluster_id: Some("test-cluster".to_string()),
            domain_name: Some("qa.local".to_string()),
            project_name: Some("qa-project".to_string()),
            project_id: Some("test-project-id".to_string()),
            project_admin: Some("qa-admin".to_string()),
            project_admin_password: Some("qa-password".to_string()),
            cloud_admin: Some("cloud-admin".to_string()),
            cloud_admin_password: Some("cloud-password".to_string()),
            webdriver_url: Some("http://localhost:4444".to_string()),
            portal_url: Some("https://portal.example.com".to_string()),
        }
    }

    pub fn service_url(&self) -> &str {
        self.service_url.as_deref().unwrap_or_default()
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or_default()
    }

    pub fn cluster_id(&self) -> &str {
        self.cluster_id.as_deref().unwrap_or_default()
    }

    pub fn domain_name(&self) -> &str {
        self.domain_name.as_deref().unwrap_or_default()
    }

    pub fn project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or_default()
    }

    pub fn project_id(&self) -> &str {
        self.project_id.as_deref().unwrap_or_default()
    }

    pub fn project_admin(&self) -> &str {
        self.project_admin.as_deref().unwrap_or_default()
    }

    pub fn project_admin_password(&self) -> &str {
        self.project_admin_password.as_deref().unwrap_or_default()
    }

    pub fn cloud_admin(&self) -> &str {
        self.cloud_admin.as_deref().unwrap_or_default()
    }

    pub fn cloud_admin_password(&self) -> &str {
        self.cloud_admin_password.as_deref().unwrap_or_default()
    }

    pub fn webdriver_url(&self) -> &str {
        self.webdriver_url.as_deref().unwrap_or_default()
    }

    pub fn portal_url(&self) -> &str {
        self.portal_url.as_deref().unwrap_or_default()
    }
}
