//! Connection state machine for one instance.

use unidash_core::{ConnectionState, ConsoleError, InstanceStatus, PairingArtifact, PhoneNumber, Profile};

use crate::remote::RemoteReport;

/// Drives [`ConnectionState`] transitions.
///
/// Every transition consumes the previous state, so a state can only be
/// reached through the methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceStateMachine {
    state: ConnectionState,
}

impl InstanceStateMachine {
    /// Creates a machine in `Disconnected`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a known state.
    pub fn from_state(state: ConnectionState) -> Self {
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Consumes the machine, returning its state.
    pub fn into_state(self) -> ConnectionState {
        self.state
    }

    /// Enters `Connecting` ahead of a connect call.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Validation`] when already connected.
    pub fn begin_connect(&mut self) -> Result<(), ConsoleError> {
        if matches!(self.state, ConnectionState::Connected { .. }) {
            return Err(ConsoleError::Validation(
                "instance is already connected; disconnect first".to_string(),
            ));
        }
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Stores a freshly issued pairing artifact.
    ///
    /// Ignored unless a connect is in progress.
    pub fn on_pairing_artifact(&mut self, artifact: PairingArtifact) {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::AwaitingPairing { .. }
        ) {
            self.state = ConnectionState::AwaitingPairing { artifact };
        }
    }

    /// Records a confirmed pairing.
    pub fn on_paired(&mut self, phone: PhoneNumber, profile: Profile) {
        self.state = ConnectionState::Connected { phone, profile };
    }

    /// Records a torn-down session.
    pub fn on_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Folds the response to a connect call.
    ///
    /// Stays in `Connecting` when the response carries neither an artifact
    /// nor a confirmed pairing.
    pub fn on_connect_response(&mut self, report: &RemoteReport, now_ms: u64, pairing_ttl_ms: u64) {
        if report.is_connected()
            && let Some(phone) = report.phone.clone()
        {
            self.on_paired(phone, report.profile.clone());
        } else if let Some(artifact) = report.artifact(now_ms, pairing_ttl_ms) {
            self.on_pairing_artifact(artifact);
        }
    }

    /// Reconciles local state with a status report.
    ///
    /// The remote is the source of truth. A report of "connected" without a
    /// phone leaves an unpaired instance in `Connecting` until a later poll
    /// carries it. An unchanged artifact keeps its original expiry.
    pub fn reconcile(&mut self, report: &RemoteReport, now_ms: u64, pairing_ttl_ms: u64) {
        let current = std::mem::take(&mut self.state);

        self.state = if report.is_connected() {
            match (report.phone.clone(), current) {
                (Some(phone), ConnectionState::Connected { profile, .. }) => ConnectionState::Connected {
                    phone,
                    profile: merge_profile(profile, &report.profile),
                },
                (Some(phone), _) => ConnectionState::Connected {
                    phone,
                    profile: report.profile.clone(),
                },
                (None, connected @ ConnectionState::Connected { .. }) => connected,
                (None, _) => ConnectionState::Connecting,
            }
        } else if let Some(artifact) = report.artifact(now_ms, pairing_ttl_ms) {
            match current {
                ConnectionState::AwaitingPairing { artifact: existing }
                    if existing.same_payload(&artifact) && !existing.is_expired(now_ms) =>
                {
                    ConnectionState::AwaitingPairing { artifact: existing }
                }
                _ => ConnectionState::AwaitingPairing { artifact },
            }
        } else {
            match report.status {
                Some(InstanceStatus::Disconnected) => ConnectionState::Disconnected,
                Some(InstanceStatus::Connecting | InstanceStatus::QrCode) => match current {
                    pending @ ConnectionState::AwaitingPairing { .. } => pending,
                    _ => ConnectionState::Connecting,
                },
                Some(InstanceStatus::Connected) | None if report.connected == Some(false) => {
                    ConnectionState::Disconnected
                }
                Some(InstanceStatus::Connected) | None => current,
            }
        };
    }

    /// Expires a stale pairing artifact, falling back to `Connecting`.
    pub fn on_tick(&mut self, now_ms: u64) {
        if let ConnectionState::AwaitingPairing { artifact } = &self.state
            && artifact.is_expired(now_ms)
        {
            self.state = ConnectionState::Connecting;
        }
    }
}

fn merge_profile(previous: Profile, reported: &Profile) -> Profile {
    Profile {
        name: reported.name.clone().or(previous.name),
        picture_url: reported.picture_url.clone().or(previous.picture_url),
    }
}
