use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApsError, Result};

/// App credentials and installation identifiers for the EMA OpenAPI
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    app_id: String,
    app_secret: String,
    sid: String,
    ecu_id: String,
}

impl Credentials {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        sid: impl Into<String>,
        ecu_id: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            sid: sid.into(),
            ecu_id: ecu_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// System (site) identifier
    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn ecu_id(&self) -> &str {
        &self.ecu_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("sid", &self.sid)
            .field("ecu_id", &self.ecu_id)
            .finish()
    }
}

/// The vendor mostly sends readings as strings but occasionally as bare numbers.
/// Either way the JSON text is kept verbatim.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

fn scalar<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    Scalar::deserialize(de).map(String::from)
}

fn scalar_seq<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Vec<String>, D::Error> {
    let raw: Vec<Scalar> = Vec::deserialize(de)?;
    Ok(raw.into_iter().map(String::from).collect())
}

/// Parse a vendor numeric string. Non-finite values count as missing.
pub(crate) fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Energy totals for the whole system, as returned by the summary endpoint (kWh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummaryData {
    #[serde(deserialize_with = "scalar")]
    pub today: String,
    #[serde(deserialize_with = "scalar")]
    pub month: String,
    #[serde(deserialize_with = "scalar")]
    pub year: String,
    #[serde(deserialize_with = "scalar")]
    pub lifetime: String,
}

impl SystemSummaryData {
    pub fn today_kwh(&self) -> Option<f64> {
        parse_reading(&self.today)
    }

    pub fn month_kwh(&self) -> Option<f64> {
        parse_reading(&self.month)
    }

    pub fn year_kwh(&self) -> Option<f64> {
        parse_reading(&self.year)
    }

    pub fn lifetime_kwh(&self) -> Option<f64> {
        parse_reading(&self.lifetime)
    }
}

#[derive(Deserialize)]
struct RawMinutelyEnergy {
    #[serde(default, deserialize_with = "scalar_opt")]
    today: Option<String>,
    #[serde(deserialize_with = "scalar_seq")]
    time: Vec<String>,
    #[serde(deserialize_with = "scalar_seq")]
    power: Vec<String>,
    #[serde(deserialize_with = "scalar_seq")]
    energy: Vec<String>,
}

fn scalar_opt<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(de).map(|v| v.map(String::from))
}

/// Minute-resolution power and energy series for one ECU and one day.
///
/// The three series are parallel: index `i` of `time`, `power` and `energy`
/// describe the same sampling instant. Construction rejects series of unequal
/// length, so the invariant holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMinutelyEnergy")]
pub struct EcuMinutelyEnergyData {
    today: String,
    time: Vec<String>,
    power: Vec<String>,
    energy: Vec<String>,
}

impl TryFrom<RawMinutelyEnergy> for EcuMinutelyEnergyData {
    type Error = ApsError;

    fn try_from(raw: RawMinutelyEnergy) -> Result<Self> {
        Self::new(
            raw.today.unwrap_or_default(),
            raw.time,
            raw.power,
            raw.energy,
        )
    }
}

impl EcuMinutelyEnergyData {
    pub fn new(
        today: impl Into<String>,
        time: Vec<String>,
        power: Vec<String>,
        energy: Vec<String>,
    ) -> Result<Self> {
        if time.len() != power.len() || time.len() != energy.len() {
            return Err(ApsError::parse(format!(
                "minutely series length mismatch: time={}, power={}, energy={}",
                time.len(),
                power.len(),
                energy.len()
            )));
        }
        Ok(Self {
            today: today.into(),
            time,
            power,
            energy,
        })
    }

    /// Day-level figure reported alongside the series
    pub fn today(&self) -> &str {
        &self.today
    }

    pub fn time(&self) -> &[String] {
        &self.time
    }

    pub fn power(&self) -> &[String] {
        &self.power
    }

    pub fn energy(&self) -> &[String] {
        &self.energy
    }

    /// Number of sampling instants (shared by all three series)
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Most recent power sample (W)
    pub fn latest_power(&self) -> Result<&str> {
        self.power
            .last()
            .map(String::as_str)
            .ok_or_else(|| ApsError::empty_sequence("power"))
    }

    /// Most recent energy sample (kWh)
    pub fn latest_energy(&self) -> Result<&str> {
        self.energy
            .last()
            .map(String::as_str)
            .ok_or_else(|| ApsError::empty_sequence("energy"))
    }
}

/// One poll cycle's worth of data. Each slot is present only if its fetch
/// succeeded during that cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemData {
    pub system_summary: Option<SystemSummaryData>,
    pub ecu_minutely_energy: Option<EcuMinutelyEnergyData>,
    pub fetched_at: DateTime<Utc>,
}

impl SystemData {
    pub fn new(
        system_summary: Option<SystemSummaryData>,
        ecu_minutely_energy: Option<EcuMinutelyEnergyData>,
    ) -> Self {
        Self {
            system_summary,
            ecu_minutely_energy,
            fetched_at: Utc::now(),
        }
    }

    /// True when neither sub-result is present
    pub fn is_empty(&self) -> bool {
        self.system_summary.is_none() && self.ecu_minutely_energy.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn summary_accepts_strings_and_numbers() {
        let summary: SystemSummaryData = serde_json::from_value(json!({
            "today": "1.2",
            "month": 10,
            "year": 50.5,
            "lifetime": "500"
        }))
        .unwrap();
        assert_eq!(summary.today, "1.2");
        assert_eq!(summary.month, "10");
        assert_eq!(summary.year, "50.5");
        assert_eq!(summary.lifetime_kwh(), Some(500.0));
    }

    #[test]
    fn summary_missing_field_is_rejected() {
        let res = serde_json::from_value::<SystemSummaryData>(json!({"today": "1"}));
        assert!(res.is_err());
    }

    #[test]
    fn minutely_latest_values() {
        let data = EcuMinutelyEnergyData::new(
            "3.4",
            strings(&["08:00", "08:05", "08:10"]),
            strings(&["120", "180", "240"]),
            strings(&["0.01", "0.015", "0.02"]),
        )
        .unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.latest_power().unwrap(), "240");
        assert_eq!(data.latest_energy().unwrap(), "0.02");
        assert_eq!(data.time().last().map(String::as_str), Some("08:10"));
    }

    #[test]
    fn minutely_empty_sequences_report_error() {
        let data = EcuMinutelyEnergyData::new("0", vec![], vec![], vec![]).unwrap();
        assert!(data.is_empty());
        assert!(matches!(
            data.latest_power(),
            Err(ApsError::EmptySequence { series: "power" })
        ));
        assert!(matches!(
            data.latest_energy(),
            Err(ApsError::EmptySequence { series: "energy" })
        ));
    }

    #[test]
    fn minutely_mismatched_lengths_rejected() {
        let res = EcuMinutelyEnergyData::new(
            "0",
            strings(&["08:00", "08:05"]),
            strings(&["1"]),
            strings(&["0.1", "0.2"]),
        );
        assert!(matches!(res, Err(ApsError::Parse { .. })));

        let res = serde_json::from_value::<EcuMinutelyEnergyData>(json!({
            "time": ["08:00"],
            "power": ["1", "2"],
            "energy": ["0.1"]
        }));
        assert!(res.is_err());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("A", "topsecret", "123", "456");
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("topsecret"));
        assert!(dbg.contains("123"));
    }
}
