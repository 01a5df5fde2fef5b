//! # apsema - APsystems EMA cloud poller
//!
//! Polls the APsystems EMA OpenAPI on a fixed interval and exposes the
//! returned energy figures as named readings. The crate is host-agnostic:
//! an embedding application hands over credentials and (optionally) its own
//! pooled HTTP client, then consumes snapshots from the coordinator.
//!
//! ## Architecture
//!
//! - `api`: request signing, the HTTP client and response types
//! - `coordinator`: timer-driven refresh with a shared latest snapshot
//! - `readings`: flattening snapshots into named readouts
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `error`: the crate-wide error type

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod readings;

// Re-export commonly used types
pub use api::{ApsClient, Credentials, EcuMinutelyEnergyData, SystemData, SystemSummaryData};
pub use config::Config;
pub use coordinator::{DataUpdateCoordinator, SystemDataSource};
pub use error::{ApsError, Result};
