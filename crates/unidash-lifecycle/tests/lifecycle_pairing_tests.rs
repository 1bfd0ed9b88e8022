//! Tests pairing artifacts: QR, pairing codes and expiry.

mod common;

use std::sync::Arc;

use serde_json::json;
use unidash_core::{ConnectionState, Instance, InstanceStatus};
use unidash_lifecycle::DEFAULT_PAIRING_TTL_MS;

use common::ScriptedTransport;

#[tokio::test]
async fn lifecycle_pairing_tests_phone_connect_returns_a_pairing_code() {
    let transport = Arc::new(ScriptedTransport::new([Ok(common::fixture(include_str!(
        "../../../contracts/fixtures/connect-response.paircode.valid.json"
    )))]));
    let (lifecycle, _clock) = common::lifecycle(transport.clone(), None);
    let instance = Instance::new("r3f9a1", "sales-bot").with_token("tok");

    let result = lifecycle
        .connect_with_phone(&instance, "+55 (11) 99999-9999")
        .await
        .expect("connect should succeed");
    assert_eq!(result.pairing_code(), Some("KX7T-93QD"));
    assert_eq!(result.qr_code(), None);
    assert_eq!(
        transport.calls()[0].payload,
        Some(json!({"phone": "5511999999999"}))
    );
}

#[tokio::test]
async fn lifecycle_pairing_tests_qr_payload_wins_when_both_are_returned() {
    let transport = Arc::new(ScriptedTransport::new([Ok(json!({
        "instance": {"qrcode": "QR", "paircode": "1234-5678"}
    }))]));
    let (lifecycle, _clock) = common::lifecycle(transport, None);
    let instance = Instance::new("i-1", "bot").with_token("tok");

    let result = lifecycle.connect(&instance).await.expect("connect should succeed");
    assert_eq!(result.qr_code(), Some("QR"));
    assert_eq!(result.pairing_code(), None);
}

#[tokio::test]
async fn lifecycle_pairing_tests_response_without_artifact_stays_connecting() {
    let transport = Arc::new(ScriptedTransport::new([Ok(json!({"connected": false}))]));
    let (lifecycle, _clock) = common::lifecycle(transport, None);
    let instance = Instance::new("i-1", "bot").with_token("tok");

    let result = lifecycle.connect(&instance).await.expect("connect should succeed");
    assert_eq!(result.instance.state, ConnectionState::Connecting);
    assert_eq!(result.qr_code(), None);
    assert_eq!(result.pairing_code(), None);
}

#[tokio::test]
async fn lifecycle_pairing_tests_stale_artifact_expires_on_poll() {
    let transport = Arc::new(ScriptedTransport::new([
        Ok(json!({"qrcode": "QR"})),
        Ok(json!({"status": {"connected": false}, "instance": {"status": "connecting"}})),
    ]));
    let (lifecycle, clock) = common::lifecycle(transport, None);
    let instance = Instance::new("i-1", "bot").with_token("tok");

    let pending = lifecycle.connect(&instance).await.expect("connect should succeed");
    assert_eq!(pending.instance.status(), InstanceStatus::QrCode);

    clock.advance(DEFAULT_PAIRING_TTL_MS);
    let polled = lifecycle
        .fetch_status(&pending.instance)
        .await
        .expect("status should succeed");
    assert_eq!(polled.state, ConnectionState::Connecting);
}

#[tokio::test]
async fn lifecycle_pairing_tests_reconnect_refreshes_the_artifact() {
    let transport = Arc::new(ScriptedTransport::new([
        Ok(json!({"qrcode": "QR-1"})),
        Ok(json!({"qrcode": "QR-2"})),
    ]));
    let (lifecycle, _clock) = common::lifecycle(transport, None);
    let instance = Instance::new("i-1", "bot").with_token("tok");

    let first = lifecycle.connect(&instance).await.expect("connect should succeed");
    let second = lifecycle
        .connect(&first.instance)
        .await
        .expect("reconnect should succeed");
    assert_eq!(second.qr_code(), Some("QR-2"));
}
