#![warn(missing_docs)]
//! # unidash-lifecycle
//!
//! ## Purpose
//! Models gateway instances as a finite state machine and mediates every
//! transition through the gateway.
//!
//! ## Responsibilities
//! - Drive `Disconnected -> Connecting -> AwaitingPairing -> Connected`
//!   transitions with [`InstanceStateMachine`].
//! - Read the loosely shaped gateway responses into [`RemoteReport`] and
//!   [`RemoteInstance`].
//! - Serialize state-changing calls per instance with [`InstanceLocks`].
//! - Expose create, connect, disconnect, status and listing operations on
//!   [`InstanceLifecycle`].
//!
//! ## Data flow
//! Caller passes an [`unidash_core::Instance`] snapshot -> lifecycle checks
//! the token and the lock -> [`unidash_gateway::GatewayClient`] performs the
//! call -> the response is folded into a new snapshot returned to the caller.
//!
//! ## Ownership and lifetimes
//! Instances are borrowed on input and cloned into the returned snapshot.
//! Lock guards live for the duration of one remote call.
//!
//! ## Error model
//! All failures are [`unidash_core::ConsoleError`] values. Credential and
//! input checks run before any lock or remote call.
//!
//! ## Security and privacy notes
//! Instance tokens are only handed to the gateway client and never logged.
//!
//! ## Example
//! ```rust
//! use unidash_core::ConnectionState;
//! use unidash_lifecycle::InstanceStateMachine;
//!
//! let mut machine = InstanceStateMachine::new();
//! machine.begin_connect().expect("disconnected instances can connect");
//! assert_eq!(machine.state(), &ConnectionState::Connecting);
//! ```

mod lifecycle;
mod locks;
mod machine;
mod remote;

pub use lifecycle::{ConnectResult, DEFAULT_PAIRING_TTL_MS, InstanceLifecycle};
pub use locks::{InstanceGuard, InstanceLocks};
pub use machine::InstanceStateMachine;
pub use remote::{RemoteInstance, RemoteReport};
