//! Business Units and Projects
//!
//! Clients for the platform orchestration API: business-unit and project
//! CRUD, quota management and state waits. Both resources expose their
//! lifecycle as a `state` field on the resource document.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::api::client::ApiClient;
use crate::poll::{self, WaitOpts};

/// State markers reported by the platform
pub const BU_STATE_CREATED: &str = "created";
pub const BU_STATE_DELETED: &str = "deleted";
pub const PROJ_STATE_CREATED: &str = "created";
pub const PROJ_STATE_DELETED: &str = "deleted";

/// Business-unit client
#[derive(Clone)]
pub struct BusinessUnits {
    client: ApiClient,
    wait_opts: WaitOpts,
}

impl BusinessUnits {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            wait_opts: WaitOpts::default(),
        }
    }

    /// Override the polling budget used by `wait_for_state`
    pub fn with_wait_opts(mut self, opts: WaitOpts) -> Self {
        self.wait_opts = opts;
        self
    }

    /// Create a business unit with its admin identity; returns the BU ID.
    pub async fn create(&self, name: &str, admin_user: &str, admin_password: &str) -> Result<String> {
        let url = self.client.cluster_url("business_units");
        let payload = json!({
            "name": name,
            "description": format!("{} (created by stratoqa)", name),
            "admin": {
                "name": admin_user,
                "password": admin_password
            }
        });

        tracing::info!("creating business unit {}", name);
        let response = self.client.post(&url, Some(&payload)).await?;
        let bu_id = response
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .context("business unit create response carried no id")?
            .to_string();

        tracing::info!("business unit {} created: {}", name, bu_id);
        Ok(bu_id)
    }

    /// Fetch a business-unit document
    pub async fn get(&self, bu_id: &str) -> Result<Value> {
        let url = self.client.cluster_url(&format!("business_units/{}", bu_id));
        self.client.get(&url).await
    }

    /// Fetch a business-unit document with query parameters
    /// (e.g. `aggregates=true&quota=true`, `nocache=true` to reload)
    pub async fn get_with(&self, bu_id: &str, query: &[(&str, &str)]) -> Result<Value> {
        let pairs: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        let url = self.client.cluster_url(&format!(
            "business_units/{}?{}",
            bu_id,
            pairs.join("&")
        ));
        self.client.get(&url).await
    }

    /// Fetch the quota document of a business unit
    pub async fn quotas(&self, bu_id: &str) -> Result<Value> {
        let url = self
            .client
            .cluster_url(&format!("business_units/{}/quotas", bu_id));
        self.client.get(&url).await
    }

    /// Update name/description; returns the updated document
    pub async fn update(&self, bu_id: &str, name: &str, description: &str) -> Result<Value> {
        let url = self.client.cluster_url(&format!("business_units/{}", bu_id));
        let payload = json!({
            "name": name,
            "description": description
        });

        tracing::info!("updating business unit {}", bu_id);
        self.client.put(&url, Some(&payload)).await
    }

    /// Select a quota template (e.g. "Medium"); returns the updated document
    pub async fn update_quota(&self, bu_id: &str, template: &str) -> Result<Value> {
        let url = self
            .client
            .cluster_url(&format!("business_units/{}/quotas", bu_id));
        let payload = json!({
            "quota_sets": { "selected_template": template }
        });

        tracing::info!("setting quota template {} on business unit {}", template, bu_id);
        self.client.put(&url, Some(&payload)).await
    }

    /// Delete a business unit
    pub async fn delete(&self, bu_id: &str, force: bool) -> Result<()> {
        let mut url = self.client.cluster_url(&format!("business_units/{}", bu_id));
        if force {
            url.push_str("?force=true");
        }

        tracing::info!("deleting business unit {}", bu_id);
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Current lifecycle state of a business unit
    pub async fn state(&self, bu_id: &str) -> Result<String> {
        let doc = self.get(bu_id).await?;
        Ok(doc
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// Poll until the business unit reaches `target`
    pub async fn wait_for_state(&self, bu_id: &str, target: &str) -> Result<()> {
        let opts = WaitOpts {
            missing_matches: target == BU_STATE_DELETED,
            ..self.wait_opts
        };
        poll::wait_until(&format!("business unit {}", bu_id), target, opts, || {
            self.state(bu_id)
        })
        .await
    }
}

/// Per-service project quotas, mirroring the nova/cinder/neutron keys
/// the platform understands. Unset limits are `-1` (unlimited).
#[derive(Debug, Clone)]
pub struct ProjectQuotas {
    pub compute: Value,
    pub storage: Value,
    pub network: Value,
}

impl ProjectQuotas {
    /// The quota set used by most workflow scenarios
    pub fn large() -> Self {
        Self {
            compute: json!({
                "cores": 128,
                "injected_file_content_bytes": -1,
                "injected_file_path_bytes": -1,
                "injected_files": -1,
                "instances": 64,
                "key_pairs": -1,
                "metadata_items": -1,
                "ram": 262144
            }),
            storage: json!({
                "snapshots": 640,
                "backup_gigabytes": -1,
                "backups": -1,
                "volumes": 640,
                "gigabytes": 25600
            }),
            network: json!({
                "router": 30,
                "subnet": -1,
                "network": 30,
                "port": -1,
                "floatingip": 64,
                "pool": -1
            }),
        }
    }
}

/// Project client
#[derive(Clone)]
pub struct Projects {
    client: ApiClient,
    wait_opts: WaitOpts,
}

impl Projects {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            wait_opts: WaitOpts::default(),
        }
    }

    /// Override the polling budget used by `wait_for_state`
    pub fn with_wait_opts(mut self, opts: WaitOpts) -> Self {
        self.wait_opts = opts;
        self
    }

    /// Create a project inside a business unit; returns the project ID.
    pub async fn create(
        &self,
        name: &str,
        bu_id: &str,
        metadata: &Value,
        quotas: &ProjectQuotas,
    ) -> Result<String> {
        let url = self.client.cluster_url("projects");
        let payload = json!({
            "name": name,
            "business_unit_id": bu_id,
            "metadata": metadata,
            "quotas": {
                "compute": quotas.compute,
                "storage": quotas.storage,
                "network": quotas.network
            }
        });

        tracing::info!("creating project {} in business unit {}", name, bu_id);
        let response = self.client.post(&url, Some(&payload)).await?;
        let project_id = response
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .context("project create response carried no id")?
            .to_string();

        tracing::info!("project {} created: {}", name, project_id);
        Ok(project_id)
    }

    /// Fetch a project document
    pub async fn get(&self, project_id: &str) -> Result<Value> {
        let url = self.client.cluster_url(&format!("projects/{}", project_id));
        self.client.get(&url).await
    }

    /// Update name/description; returns the updated document
    pub async fn update(&self, project_id: &str, name: &str, description: &str) -> Result<Value> {
        let url = self.client.cluster_url(&format!("projects/{}", project_id));
        let payload = json!({
            "name": name,
            "description": description
        });

        tracing::info!("updating project {}", project_id);
        self.client.put(&url, Some(&payload)).await
    }

    /// Delete a project
    pub async fn delete(&self, project_id: &str, force: bool) -> Result<()> {
        let mut url = self.client.cluster_url(&format!("projects/{}", project_id));
        if force {
            url.push_str("?force=true");
        }

        tracing::info!("deleting project {}", project_id);
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Current lifecycle state of a project
    pub async fn state(&self, project_id: &str) -> Result<String> {
        let doc = self.get(project_id).await?;
        Ok(doc
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// Poll until the project reaches `target`
    pub async fn wait_for_state(&self, project_id: &str, target: &str) -> Result<()> {
        let opts = WaitOpts {
            missing_matches: target == PROJ_STATE_DELETED,
            ..self.wait_opts
        };
        poll::wait_until(&format!("project {}", project_id), target, opts, || {
            self.state(project_id)
        })
        .await
    }
}
