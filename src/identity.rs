//! Identity (keystone) clients
//!
//! Users, roles and domains. These run under the cloud-admin identity;
//! business-unit level workflows use [`crate::orgs`] instead.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::api::client::ApiClient;

/// Role listing entry
#[derive(Debug, Clone)]
pub struct Role {
    pub id: String,
    pub name: String,
}

impl From<&Value> for Role {
    fn from(value: &Value) -> Self {
        Self {
            id: value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
        }
    }
}

/// User client
#[derive(Clone)]
pub struct Users {
    client: ApiClient,
}

impl Users {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a user in a domain; returns the user ID
    pub async fn create(&self, domain_id: &str, name: &str, password: &str) -> Result<String> {
        let url = self.client.keystone_url("users");
        let payload = json!({
            "user": {
                "name": name,
                "email": format!("{}@{}.com", name, domain_id),
                "enabled": true,
                "password": password,
                "domain_id": domain_id
            }
        });

        tracing::info!("creating user {}", name);
        let response = self.client.post(&url, Some(&payload)).await?;
        let user_id = response
            .pointer("/user/id")
            .and_then(|v| v.as_str())
            .context("user create response carried no id")?
            .to_string();

        tracing::info!("user {} created: {}", name, user_id);
        Ok(user_id)
    }

    /// List users, optionally restricted to one domain
    pub async fn list(&self, domain_id: Option<&str>) -> Result<Vec<Value>> {
        let url = match domain_id {
            Some(id) => self
                .client
                .keystone_url(&format!("users?domain_id={}", urlencoding::encode(id))),
            None => self.client.keystone_url("users"),
        };
        let response = self.client.get(&url).await?;

        Ok(response
            .get("users")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// Delete a user
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let url = self.client.keystone_url(&format!("users/{}", user_id));
        tracing::info!("deleting user {}", user_id);
        self.client.delete(&url).await?;
        Ok(())
    }
}

/// Role client
#[derive(Clone)]
pub struct Roles {
    client: ApiClient,
}

impl Roles {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List all roles
    pub async fn list(&self) -> Result<Vec<Role>> {
        let url = self.client.keystone_url("roles");
        let response = self.client.get(&url).await?;

        Ok(response
            .get("roles")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(Role::from).collect())
            .unwrap_or_default())
    }

    /// Grant a role to a user on a domain
    pub async fn assign(&self, domain_id: &str, user_id: &str, role_id: &str) -> Result<()> {
        let url = self.client.keystone_url(&format!(
            "domains/{}/users/{}/roles/{}",
            domain_id, user_id, role_id
        ));

        self.client.put(&url, None).await?;
        tracing::info!(
            "assigned role {} to user {} in domain {}",
            role_id,
            user_id,
            domain_id
        );
        Ok(())
    }
}

/// Domain client
#[derive(Clone)]
pub struct Domains {
    client: ApiClient,
}

impl Domains {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a domain; returns the domain ID. The platform assigns the
    /// admin user with the admin role to every new domain.
    pub async fn create(&self, name: &str, description: Option<&str>, ldap: bool) -> Result<String> {
        let url = self.client.keystone_url("domains");
        let payload = json!({
            "domain": {
                "name": name,
                "description": description,
                "ldapSet": ldap
            }
        });

        tracing::info!("creating domain {}", name);
        let response = self.client.post(&url, Some(&payload)).await?;
        let domain_id = response
            .pointer("/domain/id")
            .and_then(|v| v.as_str())
            .context("domain create response carried no id")?
            .to_string();

        tracing::info!("domain {} created: {}", name, domain_id);
        Ok(domain_id)
    }

    /// Update description/enabled flag
    pub async fn update(&self, domain_id: &str, description: Option<&str>, enabled: bool) -> Result<()> {
        let url = self.client.keystone_url(&format!("domains/{}", domain_id));
        let payload = json!({
            "domain": {
                "description": description,
                "enabled": enabled
            }
        });

        tracing::info!("updating domain {}", domain_id);
        self.client.patch(&url, Some(&payload)).await?;
        Ok(())
    }

    /// Delete a domain; keystone requires it to be disabled first
    pub async fn delete(&self, domain_id: &str) -> Result<()> {
        let url = self.client.keystone_url(&format!("domains/{}", domain_id));
        tracing::info!("deleting domain {}", domain_id);
        self.client.delete(&url).await?;
        Ok(())
    }
}
