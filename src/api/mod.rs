//! APsystems EMA OpenAPI client
//!
//! Signing lives in [`signer`], the HTTP wrapper and endpoint calls in
//! [`client`], and the response shapes in [`types`].

pub mod client;
pub mod signer;
pub mod types;

pub use client::{ApsClient, check_envelope};
pub use signer::SignedHeaders;
pub use types::{Credentials, EcuMinutelyEnergyData, SystemData, SystemSummaryData};
