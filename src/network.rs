//! Network (neutron) clients
//!
//! Internal networks with their subnets, port lookups/updates, and QoS
//! bandwidth-limit policies.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::api::client::ApiClient;

/// CIDR used for internal test networks
const INTERNAL_SUBNET_CIDR: &str = "10.0.0.0/24";

/// Network client
#[derive(Clone)]
pub struct Networks {
    client: ApiClient,
}

impl Networks {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create an internal network with one IPv4 subnet; returns the
    /// network ID.
    pub async fn create_internal(&self, net_name: &str, subnet_name: &str) -> Result<String> {
        let url = self.client.network_url("networks");
        let payload = json!({
            "network": {
                "name": net_name,
                "admin_state_up": true
            }
        });

        tracing::info!("creating network {}", net_name);
        let response = self.client.post(&url, Some(&payload)).await?;
        let network_id = response
            .pointer("/network/id")
            .and_then(|v| v.as_str())
            .context("network create response carried no id")?
            .to_string();

        let subnet_url = self.client.network_url("subnets");
        let subnet_payload = json!({
            "subnet": {
                "network_id": network_id,
                "name": subnet_name,
                "ip_version": 4,
                "cidr": INTERNAL_SUBNET_CIDR
            }
        });

        tracing::info!("creating subnet {} on network {}", subnet_name, network_id);
        self.client.post(&subnet_url, Some(&subnet_payload)).await?;
        Ok(network_id)
    }

    /// Delete an internal network after removing its subnets
    pub async fn delete_internal(&self, network_id: &str) -> Result<()> {
        for subnet_id in self.subnet_ids(network_id).await? {
            let url = self.client.network_url(&format!("subnets/{}", subnet_id));
            tracing::info!("deleting subnet {}", subnet_id);
            self.client.delete(&url).await?;
        }

        let url = self.client.network_url(&format!("networks/{}", network_id));
        tracing::info!("deleting network {}", network_id);
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Fetch a network document
    pub async fn get(&self, network_id: &str) -> Result<Value> {
        let url = self.client.network_url(&format!("networks/{}", network_id));
        let response = self.client.get(&url).await?;
        Ok(response.get("network").cloned().unwrap_or(response))
    }

    /// List all networks visible to the scope
    pub async fn list(&self) -> Result<Vec<Value>> {
        let url = self.client.network_url("networks");
        let response = self.client.get(&url).await?;
        Ok(response
            .get("networks")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    async fn subnet_ids(&self, network_id: &str) -> Result<Vec<String>> {
        let url = self
            .client
            .network_url(&format!("subnets?network_id={}", urlencoding::encode(network_id)));
        let response = self.client.get(&url).await?;

        Ok(response
            .get("subnets")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| s.get("id").and_then(|v| v.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Port client
#[derive(Clone)]
pub struct Ports {
    client: ApiClient,
}

impl Ports {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Find the port carrying the given MAC address, if any
    pub async fn find_by_mac(&self, mac: &str) -> Result<Option<String>> {
        let url = self
            .client
            .network_url(&format!("ports?mac_address={}", urlencoding::encode(mac)));
        let response = self.client.get(&url).await?;

        let port_id = response
            .get("ports")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|port| port.get("id").and_then(|v| v.as_str()))
            .map(str::to_string);

        if port_id.is_none() {
            tracing::debug!("no port found for mac {}", mac);
        }
        Ok(port_id)
    }

    /// Attach a QoS policy to a port
    pub async fn attach_qos(&self, port_id: &str, policy_id: &str) -> Result<()> {
        let url = self.client.network_url(&format!("ports/{}", port_id));
        let payload = json!({
            "port": { "qos_policy_id": policy_id }
        });

        tracing::info!("attaching QoS policy {} to port {}", policy_id, port_id);
        self.client.put(&url, Some(&payload)).await?;
        Ok(())
    }

    /// Detach whatever QoS policy the port carries
    pub async fn detach_qos(&self, port_id: &str) -> Result<()> {
        let url = self.client.network_url(&format!("ports/{}", port_id));
        let payload = json!({
            "port": { "qos_policy_id": null }
        });

        tracing::info!("detaching QoS policy from port {}", port_id);
        self.client.put(&url, Some(&payload)).await?;
        Ok(())
    }
}

/// QoS policy client
#[derive(Clone)]
pub struct QosPolicies {
    client: ApiClient,
}

impl QosPolicies {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a policy; returns the policy ID
    pub async fn create(&self, name: &str) -> Result<String> {
        let url = self.client.network_url("qos/policies");
        let payload = json!({
            "policy": { "name": name }
        });

        tracing::info!("creating QoS policy {}", name);
        let response = self.client.post(&url, Some(&payload)).await?;
        response
            .pointer("/policy/id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .context("QoS policy create response carried no id")
    }

    /// Add a bandwidth-limit rule to a policy; rates are in Kbps
    pub async fn add_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        max_burst_kbps: u64,
        max_kbps: u64,
    ) -> Result<()> {
        let url = self
            .client
            .network_url(&format!("qos/policies/{}/bandwidth_limit_rules", policy_id));
        let payload = json!({
            "bandwidth_limit_rule": {
                "max_kbps": max_kbps,
                "max_burst_kbps": max_burst_kbps
            }
        });

        tracing::info!(
            "limiting policy {} to {} Kbps (burst {} Kbps)",
            policy_id,
            max_kbps,
            max_burst_kbps
        );
        self.client.post(&url, Some(&payload)).await?;
        Ok(())
    }

    /// List all policies
    pub async fn list(&self) -> Result<Vec<Value>> {
        let url = self.client.network_url("qos/policies");
        let response = self.client.get(&url).await?;
        Ok(response
            .get("policies")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// Delete a policy
    pub async fn delete(&self, policy_id: &str) -> Result<()> {
        let url = self.client.network_url(&format!("qos/policies/{}", policy_id));
        tracing::info!("deleting QoS policy {}", policy_id);
        self.client.delete(&url).await?;
        Ok(())
    }
}
