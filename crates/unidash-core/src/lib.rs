#![warn(missing_docs)]
//! # unidash-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `unidash` workspace.
//!
//! ## Responsibilities
//! - Represent gateway instances and their connection state as a closed
//!   tagged variant, so invalid combinations cannot be built.
//! - Represent the active gateway configuration and its provenance.
//! - Describe the persisted settings catalogue and its sensitivity flags.
//! - Provide secret masking and log redaction helpers.
//! - Define the error taxonomy surfaced by every component.
//!
//! ## Data flow
//! Config providers produce [`Configuration`] values -> the gateway client
//! uses them to reach the remote service -> lifecycle code folds remote
//! responses into [`Instance`] snapshots that callers render.
//!
//! ## Ownership and lifetimes
//! All model values own their strings. Instances are returned as fresh
//! snapshots by every lifecycle operation instead of being mutated in place.
//!
//! ## Error model
//! [`ConsoleError`] is the only error that crosses crate boundaries towards
//! callers. Collaborator-specific errors are converted into it at the edge.
//!
//! ## Security and privacy notes
//! `Debug` output for [`Instance`] and [`Configuration`] masks secrets.
//! Sensitive settings are masked on read unless a raw read is requested.
//!
//! ## Example
//! ```rust
//! use unidash_core::{is_masked, mask};
//!
//! let masked = mask("secret-admin-token", 4);
//! assert_eq!(masked, "**************oken");
//! assert!(is_masked(&masked));
//! ```

mod config;
mod error;
mod instance;
mod secret;
mod settings;

pub use config::{ConfigSource, Configuration, DEFAULT_ENDPOINT_URL};
pub use error::ConsoleError;
pub use instance::{
    ConnectionState, Instance, InstanceStatus, PairingArtifact, PhoneNumber, Profile,
};
pub use secret::{
    DEFAULT_VISIBLE_SUFFIX, MASK_CHAR, SHORT_VALUE_MASK, is_masked, mask, redact_sensitive,
};
pub use settings::{AppSettings, SettingKey, SettingRecord};
