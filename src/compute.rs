//! Compute (nova) clients
//!
//! VM lifecycle and actions, floating-IP/interface lookups, and the
//! flavor catalog with best-match selection. VM creation goes through the
//! platform's composite endpoint (boot volume plus server in one
//! request); actions go straight to nova.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::api::client::ApiClient;
use crate::poll::{self, WaitOpts};

/// VM states reported by nova
pub const VM_STATE_ACTIVE: &str = "ACTIVE";
pub const VM_STATE_SHUTOFF: &str = "SHUTOFF";
pub const VM_STATE_SUSPENDED: &str = "SUSPENDED";
pub const VM_STATE_DELETED: &str = "DELETED";

/// VM listing entry
#[derive(Debug, Clone)]
pub struct VmSummary {
    pub id: String,
    pub name: String,
}

impl From<&Value> for VmSummary {
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

/// VM client for one project
#[derive(Clone)]
pub struct Vms {
    client: ApiClient,
    project_id: String,
    wait_opts: WaitOpts,
}

impl Vms {
    pub fn new(client: ApiClient, project_id: &str) -> Self {
        Self {
            client,
            project_id: project_id.to_string(),
            wait_opts: WaitOpts::default(),
        }
    }

    /// Override the polling budget used by `wait_for_state`
    pub fn with_wait_opts(mut self, opts: WaitOpts) -> Self {
        self.wait_opts = opts;
        self
    }

    fn servers_url(&self, path: &str) -> String {
        self.client
            .compute_url(&self.project_id, &format!("servers/{}", path))
    }

    /// List the project's VMs
    pub async fn list(&self) -> Result<Vec<VmSummary>> {
        let url = self
            .client
            .cluster_url(&format!("projects/{}/vms", self.project_id));
        let response = self.client.get(&url).await?;

        let vms = response
            .as_array()
            .map(|arr| arr.iter().map(VmSummary::from).collect())
            .unwrap_or_default();
        Ok(vms)
    }

    /// Resolve a VM ID by name. The composite create endpoint returns no
    /// server ID, so scenarios look the VM up by its name afterwards.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<String>> {
        let vms = self.list().await?;
        Ok(vms.into_iter().find(|vm| vm.name == name).map(|vm| vm.id))
    }

    /// Fetch a VM document
    pub async fn get(&self, vm_id: &str) -> Result<Value> {
        let url = self.client.cluster_url(&format!("vms/{}", vm_id));
        self.client.get(&url).await
    }

    /// Current VM state (`vm_state` field)
    pub async fn status(&self, vm_id: &str) -> Result<String> {
        let doc = self.get(vm_id).await?;
        Ok(doc
            .get("vm_state")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// Hypervisor host the VM runs on
    pub async fn host(&self, vm_id: &str) -> Result<String> {
        let doc = self.get(vm_id).await?;
        doc.get("host")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .with_context(|| format!("vm {} document carries no host", vm_id))
    }

    /// IDs of the volumes attached to a VM
    pub async fn volumes_attached(&self, vm_id: &str) -> Result<Vec<String>> {
        let doc = self.get(vm_id).await?;
        let volumes = doc
            .get("volumes")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|vol| vol.get("id").and_then(|v| v.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(volumes)
    }

    /// Create a VM booted from a fresh image-backed volume.
    ///
    /// The platform composes both resources from one request; the server
    /// references the volume through the `{{.bootVol}}` placeholder the
    /// composite endpoint resolves.
    pub async fn create(
        &self,
        name: &str,
        flavor_id: &str,
        network_id: &str,
        image_id: &str,
    ) -> Result<()> {
        let url = self
            .client
            .cluster_url(&format!("projects/{}/vm", self.project_id));
        let payload = json!({
            "name": name,
            "resources": {
                "server": {
                    "type": "OS::Nova::Server",
                    "os_req": {
                        "server": {
                            "name": name,
                            "flavorRef": flavor_id,
                            "block_device_mapping_v2": [
                                {
                                    "device_type": "disk",
                                    "disk_bus": "virtio",
                                    "device_name": "/dev/vda",
                                    "source_type": "volume",
                                    "destination_type": "volume",
                                    "delete_on_termination": true,
                                    "boot_index": "0",
                                    "uuid": "{{.bootVol}}"
                                }
                            ],
                            "networks": [
                                { "uuid": network_id }
                            ],
                            "security_groups": [
                                { "name": "default" }
                            ]
                        },
                        "os:scheduler_hints": {
                            "volume_id": "{{.bootVol}}"
                        }
                    }
                },
                "bootVol": {
                    "type": "OS::Cinder::Volume",
                    "os_req": {
                        "volume": {
                            "availability_zone": null,
                            "description": null,
                            "size": 1,
                            "name": format!("bootVolume-{}", name),
                            "volume_type": "highiops",
                            "disk_bus": "virtio",
                            "device_type": "disk",
                            "source_type": "image",
                            "device_name": "/dev/vda",
                            "bootable": true,
                            "tenant_id": self.project_id,
                            "imageRef": image_id,
                            "enabled": "true"
                        }
                    }
                }
            }
        });

        tracing::info!("creating vm {}", name);
        self.client.post(&url, Some(&payload)).await?;
        tracing::info!("creating vm {}: OK", name);
        Ok(())
    }

    /// Delete a VM
    pub async fn delete(&self, vm_id: &str) -> Result<()> {
        let url = self
            .client
            .cluster_url(&format!("projects/{}/vm/{}", self.project_id, vm_id));

        tracing::info!("deleting vm {}", vm_id);
        self.client.delete(&url).await?;
        Ok(())
    }

    async fn action(&self, vm_id: &str, what: &str, payload: Value) -> Result<Value> {
        let url = self.servers_url(&format!("{}/action", vm_id));
        tracing::info!("{} vm {}", what, vm_id);
        self.client.post(&url, Some(&payload)).await
    }

    /// Soft-reboot a VM
    pub async fn reboot(&self, vm_id: &str) -> Result<()> {
        self.action(vm_id, "rebooting", json!({"reboot": {"type": "SOFT"}}))
            .await?;
        Ok(())
    }

    /// Power a VM off (os-stop)
    pub async fn power_off(&self, vm_id: &str) -> Result<()> {
        self.action(vm_id, "powering off", json!({"os-stop": ""})).await?;
        Ok(())
    }

    /// Power a VM on (os-start)
    pub async fn power_on(&self, vm_id: &str) -> Result<()> {
        self.action(vm_id, "powering on", json!({"os-start": ""})).await?;
        Ok(())
    }

    /// Suspend a VM
    pub async fn suspend(&self, vm_id: &str) -> Result<()> {
        self.action(vm_id, "suspending", json!({"suspend": ""})).await?;
        Ok(())
    }

    /// Resume a suspended VM
    pub async fn resume(&self, vm_id: &str) -> Result<()> {
        self.action(vm_id, "resuming", json!({"resume": ""})).await?;
        Ok(())
    }

    /// Live-migrate a VM, optionally pinning the target host
    pub async fn live_migrate(
        &self,
        vm_id: &str,
        host: Option<&str>,
        block_migration: bool,
        disk_over_commit: bool,
    ) -> Result<()> {
        self.action(
            vm_id,
            "migrating",
            json!({
                "os-migrateLive": {
                    "host": host,
                    "block_migration": block_migration,
                    "disk_over_commit": disk_over_commit
                }
            }),
        )
        .await?;
        Ok(())
    }

    /// URL of the VM's noVNC console
    pub async fn console_url(&self, vm_id: &str) -> Result<String> {
        let response = self
            .action(vm_id, "getting console for", json!({"os-getVNCConsole": {"type": "novnc"}}))
            .await?;
        response
            .pointer("/console/url")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .with_context(|| format!("console response for vm {} carried no url", vm_id))
    }

    /// Floating IP assigned to a VM, if any
    pub async fn floating_ip_of(&self, vm_id: &str) -> Result<Option<String>> {
        let url = self.client.compute_url(&self.project_id, "os-floating-ips");
        let response = self.client.get(&url).await?;

        let ip = response
            .get("floating_ips")
            .and_then(|v| v.as_array())
            .and_then(|arr| {
                arr.iter().find(|fip| {
                    fip.get("instance_id").and_then(|v| v.as_str()) == Some(vm_id)
                })
            })
            .and_then(|fip| fip.get("ip").and_then(|v| v.as_str()))
            .map(str::to_string);

        if ip.is_none() {
            tracing::debug!("no floating IP assigned to {}", vm_id);
        }
        Ok(ip)
    }

    /// VM holding the given floating IP, if any
    pub async fn vm_of_floating_ip(&self, ip: &str) -> Result<Option<String>> {
        let url = self.client.compute_url(&self.project_id, "os-floating-ips");
        let response = self.client.get(&url).await?;

        let vm_id = response
            .get("floating_ips")
            .and_then(|v| v.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find(|fip| fip.get("ip").and_then(|v| v.as_str()) == Some(ip))
            })
            .and_then(|fip| fip.get("instance_id").and_then(|v| v.as_str()))
            .map(str::to_string);

        if vm_id.is_none() {
            tracing::debug!("no VM assigned floating IP {}", ip);
        }
        Ok(vm_id)
    }

    /// Raw os-interface listing for a VM
    pub async fn interfaces(&self, vm_id: &str) -> Result<Value> {
        let url = self.servers_url(&format!("{}/os-interface", vm_id));
        self.client.get(&url).await
    }

    /// Port the VM has on the given network, if any
    pub async fn port_of_network(&self, vm_id: &str, network_id: &str) -> Result<Option<String>> {
        let response = self.interfaces(vm_id).await?;

        let port = response
            .get("interfaceAttachments")
            .and_then(|v| v.as_array())
            .and_then(|arr| {
                arr.iter().find(|iface| {
                    iface.get("net_id").and_then(|v| v.as_str()) == Some(network_id)
                })
            })
            .and_then(|iface| iface.get("port_id").and_then(|v| v.as_str()))
            .map(str::to_string);
        Ok(port)
    }

    /// MAC address behind one of the VM's fixed/floating IPs, if present
    /// in the VM's address map
    pub async fn mac_of_ip(&self, vm_id: &str, ip: &str) -> Result<Option<String>> {
        let doc = self.get(vm_id).await?;

        let Some(addresses) = doc.get("addresses").and_then(|v| v.as_object()) else {
            return Ok(None);
        };

        for entries in addresses.values() {
            let Some(entries) = entries.as_array() else {
                continue;
            };
            for entry in entries {
                if entry.get("Addr").and_then(|v| v.as_str()) == Some(ip) {
                    return Ok(entry
                        .get("OS-EXT-IPS-MAC:mac_addr")
                        .and_then(|v| v.as_str())
                        .map(str::to_string));
                }
            }
        }

        tracing::debug!("no mac address found for {}", ip);
        Ok(None)
    }

    /// Poll until the VM reaches `target`
    pub async fn wait_for_state(&self, vm_id: &str, target: &str) -> Result<()> {
        let opts = WaitOpts {
            missing_matches: target == VM_STATE_DELETED,
            ..self.wait_opts
        };
        poll::wait_until(&format!("vm {}", vm_id), target, opts, || self.status(vm_id)).await
    }
}

/// Flavor catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub vcpus: u64,
    pub ram_mb: u64,
}

impl From<&Value> for Flavor {
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
            vcpus: value.get("vcpus").and_then(|v| v.as_u64()).unwrap_or(0),
            ram_mb: value.get("ram").and_then(|v| v.as_u64()).unwrap_or(0),
        }
    }
}

/// Select the smallest flavor satisfying both minimums: minimal vCPU
/// count first, minimal RAM as the tie-break. One linear pass.
pub fn best_matching(flavors: &[Flavor], min_cpu: u64, min_ram_mb: u64) -> Option<&Flavor> {
    let mut best: Option<&Flavor> = None;
    for flavor in flavors {
        if flavor.vcpus < min_cpu || flavor.ram_mb < min_ram_mb {
            continue;
        }
        best = match best {
            None => Some(flavor),
            Some(current)
                if (flavor.vcpus, flavor.ram_mb) < (current.vcpus, current.ram_mb) =>
            {
                Some(flavor)
            }
            Some(current) => Some(current),
        };
    }
    best
}

/// Flavor client for one project
#[derive(Clone)]
pub struct Flavors {
    client: ApiClient,
    project_id: String,
}

impl Flavors {
    pub fn new(client: ApiClient, project_id: &str) -> Self {
        Self {
            client,
            project_id: project_id.to_string(),
        }
    }

    /// Fetch the flavor catalog
    pub async fn list_detail(&self) -> Result<Vec<Flavor>> {
        let url = self.client.compute_url(&self.project_id, "flavors/detail");
        let response = self.client.get(&url).await?;

        let flavors = response
            .get("flavors")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(Flavor::from).collect())
            .unwrap_or_default();
        Ok(flavors)
    }

    /// ID of the best flavor for the given minimums, if any qualifies
    pub async fn best_match(&self, min_cpu: u64, min_ram_mb: u64) -> Result<Option<String>> {
        let flavors = self.list_detail().await?;
        let best = best_matching(&flavors, min_cpu, min_ram_mb).map(|f| f.id.clone());
        if best.is_none() {
            tracing::warn!(
                "no flavor satisfies {} vCPU / {} MB RAM",
                min_cpu,
                min_ram_mb
            );
        }
        Ok(best)
    }
}
