//! Tests the serialized shape of instance snapshots.

use serde_json::json;
use unidash_core::{ConnectionState, Instance, InstanceStatus, PairingArtifact, PhoneNumber, Profile};

#[test]
fn instance_wire_format_tests_pairing_state_uses_qr_code_label() {
    let mut instance = Instance::new("inst-1", "sales-bot").with_token("tok-1");
    instance.state = ConnectionState::AwaitingPairing {
        artifact: PairingArtifact::QrCode {
            payload: "data:image/png;base64,AAAA".to_string(),
            expires_at_ms: 10,
        },
    };

    let encoded = serde_json::to_value(&instance).expect("instance should serialize");
    assert_eq!(encoded["status"], "qr_code");
    assert_eq!(encoded["artifact"]["kind"], "qr_code");
    assert_eq!(instance.status(), InstanceStatus::QrCode);
}

#[test]
fn instance_wire_format_tests_connected_snapshot_round_trips() {
    let mut instance = Instance::new("inst-2", "support").with_token("tok-2");
    instance.state = ConnectionState::Connected {
        phone: PhoneNumber::parse("5511999999999").expect("phone should parse"),
        profile: Profile {
            name: Some("Support".to_string()),
            picture_url: None,
        },
    };

    let encoded = serde_json::to_string(&instance).expect("instance should serialize");
    let decoded: Instance = serde_json::from_str(&encoded).expect("instance should deserialize");
    assert_eq!(decoded, instance);
    assert_eq!(decoded.phone().map(PhoneNumber::as_str), Some("5511999999999"));
}

#[test]
fn instance_wire_format_tests_rejects_connected_without_phone() {
    let raw = json!({
        "id": "inst-3",
        "token": null,
        "name": "broken",
        "system_name": null,
        "status": "connected",
        "phone": "",
        "created_at": null,
        "updated_at": null
    });
    assert!(serde_json::from_value::<Instance>(raw).is_err());
}
