//! Integration tests for the Strato REST clients using wiremock
//!
//! Each client runs against mocked endpoints to verify URL layout,
//! payload shape, token plumbing and response handling.

mod common;

use common::{fast_wait, mock_config, mount_token_endpoint, TEST_TOKEN};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stratoqa::api::auth::{Credentials, TokenIssuer, TokenScope};
use stratoqa::api::client::ApiClient;
use stratoqa::compute::{Flavors, Vms};
use stratoqa::identity::{Domains, Roles, Users};
use stratoqa::image::Images;
use stratoqa::network::{Networks, Ports, QosPolicies};
use stratoqa::orgs::BusinessUnits;

fn issuer(server: &MockServer, scope: TokenScope) -> TokenIssuer {
    let credentials = Credentials {
        domain_name: "qa.local".to_string(),
        user: "qa-admin".to_string(),
        password: "qa-password".to_string(),
        project_name: Some("qa-project".to_string()),
    };
    TokenIssuer::new(&format!("{}/keystone/v3", server.uri()), credentials, scope).unwrap()
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn token_comes_from_subject_token_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/auth/tokens"))
            .and(body_partial_json(json!({
                "auth": {
                    "identity": { "methods": ["password"] },
                    "scope": { "domain": { "name": "qa.local" } }
                }
            })))
            .respond_with(
                ResponseTemplate::new(201).insert_header("X-Subject-Token", "issued-token"),
            )
            .mount(&server)
            .await;

        let token = issuer(&server, TokenScope::Domain).token().await.unwrap();
        assert_eq!(token, "issued-token");
    }

    #[tokio::test]
    async fn project_scope_names_the_project() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/auth/tokens"))
            .and(body_partial_json(json!({
                "auth": {
                    "scope": {
                        "project": {
                            "name": "qa-project",
                            "domain": { "name": "qa.local" }
                        }
                    }
                }
            })))
            .respond_with(
                ResponseTemplate::new(201).insert_header("X-Subject-Token", "project-token"),
            )
            .mount(&server)
            .await;

        let token = issuer(&server, TokenScope::Project).token().await.unwrap();
        assert_eq!(token, "project-token");
    }

    #[tokio::test]
    async fn cached_token_is_reused() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/auth/tokens"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("X-Subject-Token", "cached-token"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let issuer = issuer(&server, TokenScope::Domain);
        assert_eq!(issuer.token().await.unwrap(), "cached-token");
        assert_eq!(issuer.token().await.unwrap(), "cached-token");
    }

    #[tokio::test]
    async fn rejected_credentials_are_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/auth/tokens"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": 401, "message": "invalid credentials" }
            })))
            .mount(&server)
            .await;

        let err = issuer(&server, TokenScope::Domain).token().await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn missing_subject_token_header_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/auth/tokens"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let err = issuer(&server, TokenScope::Domain).token().await.unwrap_err();
        assert!(err.to_string().contains("X-Subject-Token"));
    }
}

mod business_unit_tests {
    use super::*;

    #[tokio::test]
    async fn create_returns_the_bu_id() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/clusters/test-cluster/business_units"))
            .and(bearer_token(TEST_TOKEN))
            .and(body_partial_json(json!({
                "name": "qa-bu",
                "admin": { "name": "bu-admin" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "bu-123", "name": "qa-bu", "state": "creating"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        let bu_id = bus.create("qa-bu", "bu-admin", "bu-pass").await.unwrap();
        assert_eq!(bu_id, "bu-123");
    }

    #[tokio::test]
    async fn create_without_id_is_an_error() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/clusters/test-cluster/business_units"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "qa-bu"})))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        assert!(bus.create("qa-bu", "bu-admin", "bu-pass").await.is_err());
    }

    #[tokio::test]
    async fn quota_template_update_round_trips() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("PUT"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-123/quotas"))
            .and(body_partial_json(json!({
                "quota_sets": { "selected_template": "Medium" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quota_sets": { "selected_template": "Medium" }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        let updated = bus.update_quota("bu-123", "Medium").await.unwrap();
        assert_eq!(updated["quota_sets"]["selected_template"], "Medium");
    }

    #[tokio::test]
    async fn force_delete_sets_the_query_flag() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-123"))
            .and(query_param("force", "true"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        bus.delete("bu-123", true).await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_state_sees_the_transition() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bu-123", "state": "creating"
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bu-123", "state": "created"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client).with_wait_opts(fast_wait());
        bus.wait_for_state("bu-123", "created").await.unwrap();
    }
}

mod identity_tests {
    use super::*;

    #[tokio::test]
    async fn user_create_parses_the_envelope() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/users"))
            .and(body_partial_json(json!({
                "user": { "name": "qa-user", "domain_id": "dom-1", "enabled": true }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user": { "id": "user-9", "name": "qa-user" }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::cloud_admin(&mock_config(&server)).unwrap();
        let users = Users::new(client);
        let user_id = users.create("dom-1", "qa-user", "pw").await.unwrap();
        assert_eq!(user_id, "user-9");
    }

    #[tokio::test]
    async fn user_listing_filters_by_domain() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/keystone/v3/users"))
            .and(query_param("domain_id", "dom-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [ {"id": "user-1"}, {"id": "user-2"} ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::cloud_admin(&mock_config(&server)).unwrap();
        let users = Users::new(client);
        let listed = users.list(Some("dom-1")).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn domain_lifecycle_round_trips() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/keystone/v3/domains"))
            .and(body_partial_json(json!({
                "domain": { "name": "qa-domain", "ldapSet": false }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "domain": { "id": "dom-7", "name": "qa-domain" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/keystone/v3/domains/dom-7"))
            .and(body_partial_json(json!({"domain": {"enabled": false}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "domain": { "id": "dom-7", "enabled": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/keystone/v3/domains/dom-7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::cloud_admin(&mock_config(&server)).unwrap();
        let domains = Domains::new(client);
        let domain_id = domains
            .create("qa-domain", Some("created by stratoqa"), false)
            .await
            .unwrap();
        assert_eq!(domain_id, "dom-7");

        // keystone wants the domain disabled before deletion
        domains.update(&domain_id, None, false).await.unwrap();
        domains.delete(&domain_id).await.unwrap();
    }

    #[tokio::test]
    async fn role_assignment_puts_the_grant_path() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("PUT"))
            .and(path("/keystone/v3/domains/dom-1/users/user-9/roles/role-3"))
            .and(bearer_token(TEST_TOKEN))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::cloud_admin(&mock_config(&server)).unwrap();
        let roles = Roles::new(client);
        roles.assign("dom-1", "user-9", "role-3").await.unwrap();
    }
}

mod compute_tests {
    use super::*;

    #[tokio::test]
    async fn flavor_best_match_scans_the_catalog() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/nova/v2.1/proj-1/flavors/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "flavors": [
                    { "id": "f-xl", "name": "m1.xlarge", "vcpus": 16, "ram": 32768 },
                    { "id": "f-s", "name": "m1.small", "vcpus": 2, "ram": 2048 },
                    { "id": "f-m", "name": "m1.medium", "vcpus": 2, "ram": 4096 }
                ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let flavors = Flavors::new(client, "proj-1");
        let best = flavors.best_match(2, 2048).await.unwrap();
        assert_eq!(best.as_deref(), Some("f-s"));

        let none = flavors.best_match(64, 2048).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn vm_create_composes_volume_and_server() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/clusters/test-cluster/projects/proj-1/vm"))
            .and(body_partial_json(json!({
                "name": "qa-vm",
                "resources": {
                    "server": {
                        "type": "OS::Nova::Server",
                        "os_req": { "server": { "flavorRef": "f-s" } }
                    },
                    "bootVol": {
                        "type": "OS::Cinder::Volume",
                        "os_req": { "volume": { "imageRef": "img-1", "bootable": true } }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let vms = Vms::new(client, "proj-1");
        vms.create("qa-vm", "f-s", "net-1", "img-1").await.unwrap();
    }

    #[tokio::test]
    async fn vm_actions_post_the_nova_verbs() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        for body in [
            json!({"reboot": {"type": "SOFT"}}),
            json!({"os-stop": ""}),
            json!({"os-start": ""}),
            json!({"suspend": ""}),
            json!({"resume": ""}),
            json!({"os-migrateLive": {"host": "compute-2", "block_migration": false}}),
        ] {
            Mock::given(method("POST"))
                .and(path("/nova/v2.1/proj-1/servers/vm-1/action"))
                .and(body_partial_json(body))
                .respond_with(ResponseTemplate::new(202))
                .up_to_n_times(1)
                .mount(&server)
                .await;
        }

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let vms = Vms::new(client, "proj-1");
        vms.reboot("vm-1").await.unwrap();
        vms.power_off("vm-1").await.unwrap();
        vms.power_on("vm-1").await.unwrap();
        vms.suspend("vm-1").await.unwrap();
        vms.resume("vm-1").await.unwrap();
        vms.live_migrate("vm-1", Some("compute-2"), false, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn console_url_is_extracted() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/nova/v2.1/proj-1/servers/vm-1/action"))
            .and(body_partial_json(json!({"os-getVNCConsole": {"type": "novnc"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "console": { "type": "novnc", "url": "https://console.example/vnc?token=abc" }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let vms = Vms::new(client, "proj-1");
        let url = vms.console_url("vm-1").await.unwrap();
        assert!(url.starts_with("https://console.example/vnc"));
    }

    #[tokio::test]
    async fn floating_ip_lookups_scan_both_directions() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/nova/v2.1/proj-1/os-floating-ips"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "floating_ips": [
                    { "instance_id": "vm-1", "ip": "203.0.113.7" },
                    { "instance_id": "vm-2", "ip": "203.0.113.8" }
                ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let vms = Vms::new(client, "proj-1");

        let ip = vms.floating_ip_of("vm-1").await.unwrap();
        assert_eq!(ip.as_deref(), Some("203.0.113.7"));

        let vm = vms.vm_of_floating_ip("203.0.113.8").await.unwrap();
        assert_eq!(vm.as_deref(), Some("vm-2"));

        assert!(vms.floating_ip_of("vm-9").await.unwrap().is_none());
        assert!(vms.vm_of_floating_ip("198.51.100.1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn interface_and_address_lookups() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/nova/v2.1/proj-1/servers/vm-1/os-interface"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "interfaceAttachments": [
                    { "net_id": "net-1", "port_id": "port-1" },
                    { "net_id": "net-2", "port_id": "port-2" }
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/clusters/test-cluster/vms/vm-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "vm-1",
                "vm_state": "ACTIVE",
                "host": "compute-3",
                "addresses": {
                    "Auto-Net1": [
                        { "Addr": "10.0.0.12", "OS-EXT-IPS-MAC:mac_addr": "fa:16:3e:aa:bb:cc" }
                    ]
                },
                "volumes": [ { "id": "vol-1" } ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let vms = Vms::new(client, "proj-1");

        let port = vms.port_of_network("vm-1", "net-2").await.unwrap();
        assert_eq!(port.as_deref(), Some("port-2"));

        let mac = vms.mac_of_ip("vm-1", "10.0.0.12").await.unwrap();
        assert_eq!(mac.as_deref(), Some("fa:16:3e:aa:bb:cc"));
        assert!(vms.mac_of_ip("vm-1", "10.0.0.99").await.unwrap().is_none());

        assert_eq!(vms.host("vm-1").await.unwrap(), "compute-3");
        assert_eq!(vms.volumes_attached("vm-1").await.unwrap(), vec!["vol-1"]);
    }
}

mod network_tests {
    use super::*;

    #[tokio::test]
    async fn internal_network_creates_network_then_subnet() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/neutron/v2.0/networks"))
            .and(body_partial_json(json!({
                "network": { "name": "Auto-Net1", "admin_state_up": true }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "network": { "id": "net-1", "name": "Auto-Net1" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/neutron/v2.0/subnets"))
            .and(body_partial_json(json!({
                "subnet": { "network_id": "net-1", "name": "Auto-SubNet1", "ip_version": 4 }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "subnet": { "id": "sub-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let networks = Networks::new(client);
        let net_id = networks
            .create_internal("Auto-Net1", "Auto-SubNet1")
            .await
            .unwrap();
        assert_eq!(net_id, "net-1");
    }

    #[tokio::test]
    async fn internal_network_delete_removes_subnets_first() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/neutron/v2.0/subnets"))
            .and(query_param("network_id", "net-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subnets": [ { "id": "sub-1" }, { "id": "sub-2" } ]
            })))
            .mount(&server)
            .await;

        for subnet in ["sub-1", "sub-2"] {
            Mock::given(method("DELETE"))
                .and(path(format!("/neutron/v2.0/subnets/{}", subnet)))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("DELETE"))
            .and(path("/neutron/v2.0/networks/net-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let networks = Networks::new(client);
        networks.delete_internal("net-1").await.unwrap();
    }

    #[tokio::test]
    async fn network_get_and_list_unwrap_the_envelope() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/neutron/v2.0/networks/net-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "network": { "id": "net-1", "name": "Auto-Net1", "status": "ACTIVE" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/neutron/v2.0/networks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "networks": [ { "id": "net-1" }, { "id": "net-2" } ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let networks = Networks::new(client);

        let network = networks.get("net-1").await.unwrap();
        assert_eq!(network["name"], "Auto-Net1");

        let listed = networks.list().await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn port_lookup_by_mac_uses_the_query_filter() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/neutron/v2.0/ports"))
            .and(query_param("mac_address", "fa:16:3e:aa:bb:cc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ports": [ { "id": "port-1", "mac_address": "fa:16:3e:aa:bb:cc" } ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let ports = Ports::new(client);
        let port = ports.find_by_mac("fa:16:3e:aa:bb:cc").await.unwrap();
        assert_eq!(port.as_deref(), Some("port-1"));
    }

    #[tokio::test]
    async fn qos_policy_lifecycle() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("POST"))
            .and(path("/neutron/v2.0/qos/policies"))
            .and(body_partial_json(json!({"policy": {"name": "1000kbps-limit"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "policy": { "id": "pol-1", "name": "1000kbps-limit" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/neutron/v2.0/qos/policies/pol-1/bandwidth_limit_rules"))
            .and(body_partial_json(json!({
                "bandwidth_limit_rule": { "max_kbps": 1000, "max_burst_kbps": 100 }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "bandwidth_limit_rule": { "id": "rule-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/neutron/v2.0/ports/port-1"))
            .and(body_partial_json(json!({"port": {"qos_policy_id": "pol-1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "port": { "id": "port-1", "qos_policy_id": "pol-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/neutron/v2.0/ports/port-1"))
            .and(body_partial_json(json!({"port": {"qos_policy_id": null}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "port": { "id": "port-1", "qos_policy_id": null }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/neutron/v2.0/qos/policies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "policies": [ { "id": "pol-1", "name": "1000kbps-limit" } ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/neutron/v2.0/qos/policies/pol-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let qos = QosPolicies::new(client.clone());
        let ports = Ports::new(client);

        let policy_id = qos.create("1000kbps-limit").await.unwrap();
        assert_eq!(policy_id, "pol-1");
        assert_eq!(qos.list().await.unwrap().len(), 1);
        qos.add_bandwidth_limit_rule(&policy_id, 100, 1000).await.unwrap();
        ports.attach_qos("port-1", &policy_id).await.unwrap();
        ports.detach_qos("port-1").await.unwrap();
        qos.delete(&policy_id).await.unwrap();
    }
}

mod image_tests {
    use super::*;

    #[tokio::test]
    async fn visibility_listing_and_os_match() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/glance/v2/images"))
            .and(query_param("visibility", "public"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [
                    { "id": "img-1", "name": "centos-8", "os": "centos 8", "status": "queued", "visibility": "public" },
                    { "id": "img-2", "name": "centos-8-ga", "os": "centos 8", "status": "active", "visibility": "public" }
                ]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::project_scoped(&mock_config(&server), "qa-project").unwrap();
        let images = Images::new(client);

        let listed = images.list_by_visibility("public").await.unwrap();
        assert_eq!(listed.len(), 2);

        let image = images.find("centos 8", "active").await.unwrap().unwrap();
        assert_eq!(image.id, "img-2");

        assert!(images.find("debian 12", "active").await.unwrap().is_none());
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn server_errors_surface_the_status() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-500"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "internal error"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        let err = bus.get("bu-500").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn missing_resource_is_an_error() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/clusters/test-cluster/business_units/bu-gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::domain_scoped(&mock_config(&server)).unwrap();
        let bus = BusinessUnits::new(client);
        assert!(bus.get("bu-gone").await.is_err());
    }
}
