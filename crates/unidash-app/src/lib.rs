#![warn(missing_docs)]
//! # unidash-app
//!
//! ## Purpose
//! Wires configuration, settings and instance lifecycle into the `unidash`
//! management console.
//!
//! ## Responsibilities
//! - Read application settings from the environment ([`ConsoleConfig`]).
//! - Initialise structured logging ([`init_logging`]).
//! - Assemble the resolver, settings service, gateway and lifecycle behind
//!   the [`Console`] facade.
//! - Project instance lists into dashboard counts and display rows.
//!
//! ## Data flow
//! Environment -> [`ConsoleConfig`] -> [`Console::open`] builds file-backed
//! stores, the provider chain and an HTTP gateway -> CLI commands call the
//! facade -> results are projected by [`DashboardSummary`] and
//! [`InstanceRow`].
//!
//! ## Ownership and lifetimes
//! The console owns its collaborators behind `Arc`s; the resolver is shared
//! between the gateway client and the settings service so writes invalidate
//! the same cache reads go through.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`].
//!
//! ## Security and privacy notes
//! - Settings are shown masked unless a raw read is requested explicitly.
//! - Error text printed by the binary passes through [`redact_sensitive`].

mod config;
mod console;
mod dashboard;
mod error;
mod logging;

pub use config::ConsoleConfig;
pub use console::Console;
pub use dashboard::{DashboardSummary, InstanceRow, status_label};
pub use error::AppError;
pub use logging::{LOG_FILE_PREFIX, init_logging};
pub use unidash_core::redact_sensitive;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("UNIDASH_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}
