//! Dashboard projection of instance lists.

use serde::Serialize;
use unidash_core::{Instance, InstanceStatus};

/// Headline counts shown above the instance list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Number of instances.
    pub total: usize,
    /// Instances paired with a device.
    pub connected: usize,
    /// Every other instance, pending pairings included.
    pub not_connected: usize,
}

impl DashboardSummary {
    /// Counts `instances` by connection status.
    pub fn from_instances(instances: &[Instance]) -> Self {
        let connected = instances
            .iter()
            .filter(|instance| instance.status() == InstanceStatus::Connected)
            .count();
        Self {
            total: instances.len(),
            connected,
            not_connected: instances.len() - connected,
        }
    }
}

/// Human-readable status label.
pub fn status_label(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::Connected => "Connected",
        InstanceStatus::Disconnected => "Disconnected",
        InstanceStatus::Connecting => "Connecting...",
        InstanceStatus::QrCode => "Awaiting QR",
    }
}

/// Flat, secret-free view of one instance for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRow {
    /// Gateway identifier.
    pub id: String,
    /// Instance name.
    pub name: String,
    /// Machine status label.
    pub status: InstanceStatus,
    /// Display label for `status`.
    pub label: &'static str,
    /// Paired phone.
    pub phone: Option<String>,
    /// WhatsApp profile name.
    pub profile_name: Option<String>,
    /// Owning system.
    pub system_name: Option<String>,
    /// Outstanding QR payload.
    pub qr_code: Option<String>,
    /// Outstanding pairing code.
    pub pairing_code: Option<String>,
}

impl From<&Instance> for InstanceRow {
    fn from(instance: &Instance) -> Self {
        let artifact = instance.pairing_artifact();
        Self {
            id: instance.id.clone(),
            name: instance.name.clone(),
            status: instance.status(),
            label: status_label(instance.status()),
            phone: instance.phone().map(ToString::to_string),
            profile_name: instance.profile().and_then(|profile| profile.name.clone()),
            system_name: instance.system_name.clone(),
            qr_code: artifact.and_then(|artifact| artifact.qr_code()).map(str::to_string),
            pairing_code: artifact
                .and_then(|artifact| artifact.pairing_code())
                .map(str::to_string),
        }
    }
}
