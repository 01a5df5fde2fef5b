//! Named readouts derived from a [`SystemData`] snapshot
//!
//! Adapters that publish sensor values (MQTT, a home-automation host, logs)
//! iterate these instead of reaching into the DTOs.

use serde::Serialize;

use crate::api::SystemData;
use crate::api::types::parse_reading;

/// Prefix for stable readout identifiers
pub const ENTITY_PREFIX: &str = "apsystems_api_sensor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "kWh")]
    KilowattHour,
    #[serde(rename = "W")]
    Watt,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KilowattHour => "kWh",
            Self::Watt => "W",
        }
    }
}

/// One readout. `raw` is `None` when the backing data is missing this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub key: &'static str,
    pub raw: Option<String>,
    pub value: Option<f64>,
    pub unit: Unit,
}

impl Reading {
    fn new(key: &'static str, raw: Option<&str>, unit: Unit) -> Self {
        Self {
            key,
            raw: raw.map(str::to_string),
            value: raw.and_then(parse_reading),
            unit,
        }
    }

    pub fn is_available(&self) -> bool {
        self.raw.is_some()
    }

    pub fn entity_name(&self) -> String {
        entity_name(self.key)
    }
}

pub fn entity_name(key: &str) -> String {
    format!("{}_{}", ENTITY_PREFIX, key)
}

/// Flatten a snapshot into its six readouts, in a fixed order.
///
/// When the last cycle failed every readout is unavailable, even though the
/// previous snapshot is still held.
pub fn readings(data: Option<&SystemData>, last_update_success: bool) -> Vec<Reading> {
    let data = data.filter(|_| last_update_success);
    let summary = data.and_then(|d| d.system_summary.as_ref());
    let minutely = data.and_then(|d| d.ecu_minutely_energy.as_ref());

    vec![
        Reading::new("today", summary.map(|s| s.today.as_str()), Unit::KilowattHour),
        Reading::new("month", summary.map(|s| s.month.as_str()), Unit::KilowattHour),
        Reading::new("year", summary.map(|s| s.year.as_str()), Unit::KilowattHour),
        Reading::new(
            "lifetime",
            summary.map(|s| s.lifetime.as_str()),
            Unit::KilowattHour,
        ),
        Reading::new(
            "latest_power",
            minutely.and_then(|m| m.latest_power().ok()),
            Unit::Watt,
        ),
        Reading::new(
            "latest_energy",
            minutely.and_then(|m| m.latest_energy().ok()),
            Unit::KilowattHour,
        ),
    ]
}

/// Connectivity readout: "on" while the last cycle succeeded
pub fn connectivity(last_update_success: bool) -> &'static str {
    if last_update_success { "on" } else { "off" }
}
