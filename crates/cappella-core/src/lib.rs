//! Cappella Core - Baby profile transport and sync controller
//!
//! This crate provides the profile data model, the HTTP transport for the
//! profile endpoint, and the controller that owns the published sync state.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod controller;
pub mod error;
pub mod profile;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use controller::{ControllerOptions, ProfileSyncController};
pub use error::{ControllerError, TransportError};
pub use profile::{DobFormat, Gender, Profile, ProfileUpdate, SyncState};
pub use transport::{HttpTransport, ProfileTransport};
