// Integration tests for `DashboardClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netrefit_api::models::{DeviceUpdate, ManagementInterface, VlanUpdate, WanInterface};
use netrefit_api::{DashboardClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let base = format!("{}/", server.uri()).parse().unwrap();
    let client = DashboardClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_network_devices() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "serial": "Q2QN-AAAA-0001",
            "model": "MX64",
            "mac": "00:18:0a:11:22:33",
            "name": "Edge-1",
            "networkId": "N_100",
        },
        {
            "serial": "Q2QN-AAAA-0002",
            "model": "MS120-8",
            "mac": "00:18:0a:44:55:66",
        },
    ]);

    Mock::given(method("GET"))
        .and(path("/networks/N_100/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.list_network_devices("N_100").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].serial, "Q2QN-AAAA-0001");
    assert_eq!(devices[0].model.as_deref(), Some("MX64"));
    assert_eq!(devices[0].name.as_deref(), Some("Edge-1"));
    assert!(devices[1].name.is_none());
    assert!(devices[1].network_id.is_none());
}

#[tokio::test]
async fn test_claim_device_sends_serial_list() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/devices/claim"))
        .and(body_json(json!({ "serials": ["Q2QN-AAAA-0003"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.claim_device("N_100", "Q2QN-AAAA-0003").await.unwrap();
}

#[tokio::test]
async fn test_remove_device_posts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/devices/Q2QN-AAAA-0001/remove"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client
        .remove_device("N_100", "Q2QN-AAAA-0001")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_device_omits_unset_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/devices/Q2QN-AAAA-0001"))
        .and(body_json(json!({ "name": "Edge-1A" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let update = DeviceUpdate {
        name: Some("Edge-1A".into()),
        address: None,
    };
    client.update_device("Q2QN-AAAA-0001", &update).await.unwrap();
}

#[tokio::test]
async fn test_get_vlan_parses_assignment_table() {
    let (server, client) = setup().await;

    let body = json!({
        "id": 1,
        "name": "Management",
        "subnet": "10.1.1.0/27",
        "applianceIp": "10.1.1.1",
        "fixedIpAssignments": {
            "00:18:0a:44:55:66": { "ip": "10.1.1.93", "name": "SW1" },
        },
        "reservedIpRanges": [
            { "start": "10.1.1.20", "end": "10.1.1.24", "comment": "iBoot" },
        ],
    });

    Mock::given(method("GET"))
        .and(path("/networks/N_100/appliance/vlans/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let vlan = client.get_vlan("N_100", 1).await.unwrap();

    assert_eq!(vlan.id, 1);
    assert_eq!(vlan.subnet.as_deref(), Some("10.1.1.0/27"));
    assert_eq!(vlan.fixed_ip_assignments.len(), 1);
    let entry = &vlan.fixed_ip_assignments["00:18:0a:44:55:66"];
    assert_eq!(entry.ip, "10.1.1.93");
    assert_eq!(entry.name.as_deref(), Some("SW1"));
    assert_eq!(vlan.reserved_ip_ranges[0].comment.as_deref(), Some("iBoot"));
}

#[tokio::test]
async fn test_update_vlan_sends_only_present_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/networks/N_100/appliance/vlans/1"))
        .and(body_json(json!({ "fixedIpAssignments": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let update = VlanUpdate {
        fixed_ip_assignments: Some(std::collections::BTreeMap::new()),
        ..VlanUpdate::default()
    };
    client.update_vlan("N_100", 1, &update).await.unwrap();
}

#[tokio::test]
async fn test_get_management_interface() {
    let (server, client) = setup().await;

    let body = json!({
        "wan1": {
            "wanEnabled": "enabled",
            "usingStaticIp": true,
            "staticIp": "198.51.100.10",
            "staticSubnetMask": "255.255.255.248",
            "staticGatewayIp": "198.51.100.9",
            "staticDns": ["198.51.100.2", "198.51.100.3"],
        },
        "wan2": { "wanEnabled": "not configured" },
    });

    Mock::given(method("GET"))
        .and(path("/devices/Q2QN-AAAA-0001/managementInterface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let mgmt = client
        .get_management_interface("Q2QN-AAAA-0001")
        .await
        .unwrap();

    let wan1 = mgmt.wan1.unwrap();
    assert_eq!(wan1.using_static_ip, Some(true));
    assert_eq!(wan1.static_ip.as_deref(), Some("198.51.100.10"));
    assert_eq!(wan1.static_dns.as_deref().map(<[String]>::len), Some(2));
    assert_eq!(mgmt.wan2.unwrap().wan_enabled.as_deref(), Some("not configured"));
}

#[tokio::test]
async fn test_update_management_interface_wan2_only() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/devices/Q2QN-AAAA-0001/managementInterface"))
        .and(body_json(json!({ "wan2": { "wanEnabled": "enabled" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let update = ManagementInterface {
        wan1: None,
        wan2: Some(WanInterface {
            wan_enabled: Some("enabled".into()),
            ..WanInterface::default()
        }),
    };
    client
        .update_management_interface("Q2QN-AAAA-0001", &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bind_and_unbind() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/unbind"))
        .and(body_json(json!({ "retainConfigs": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/bind"))
        .and(body_json(json!({ "configTemplateId": "N_TPL_9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.unbind_network("N_100", true).await.unwrap();
    client.bind_network("N_100", "N_TPL_9").await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_network_devices("N_100").await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_404_carries_envelope_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/networks/N_100/appliance/vlans/7"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "errors": ["VLAN 7 not found"] })),
        )
        .mount(&server)
        .await;

    let result = client.get_vlan("N_100", 7).await;

    match &result {
        Err(Error::Api { status, message }) => {
            assert_eq!(*status, 404);
            assert_eq!(message, "VLAN 7 not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_error_429_maps_to_rate_limited() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/devices/claim"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .mount(&server)
        .await;

    let result = client.claim_device("N_100", "Q2QN-AAAA-0001").await;

    match result {
        Err(Error::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 5),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_400_falls_back_to_raw_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/networks/N_100/devices/claim"))
        .respond_with(ResponseTemplate::new(400).set_body_string("device undergoing firmware upgrade"))
        .mount(&server)
        .await;

    let result = client.claim_device("N_100", "Q2QN-AAAA-0001").await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("firmware upgrade"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
