use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::signer::SignedHeaders;
use crate::api::types::{Credentials, EcuMinutelyEnergyData, SystemSummaryData};
use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{ApsError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Signed HTTP client for the APsystems EMA OpenAPI
#[derive(Clone)]
pub struct ApsClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
    timeout: Duration,
    timezone: chrono_tz::Tz,
    logger: StructuredLogger,
}

impl std::fmt::Debug for ApsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApsClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl ApsClient {
    /// Create a client with its own connection pool
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("apsema/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApsError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(credentials, http))
    }

    /// Create a client on top of a pooled HTTP client owned by the caller
    pub fn with_http_client(credentials: Credentials, http: reqwest::Client) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("client").with_field("sid", credentials.sid().to_string()),
        );
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            http,
            timeout: DEFAULT_TIMEOUT,
            timezone: chrono_tz::UTC,
            logger,
        }
    }

    /// Build a client from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.credentials.clone())?
            .with_base_url(config.api.base_url.clone())
            .with_timeout(Duration::from_secs(config.api.timeout_secs))
            .with_timezone(config.tz()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timezone used to pick "today" for the minutely endpoint
    pub fn with_timezone(mut self, timezone: chrono_tz::Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a signed request and return the vendor envelope.
    ///
    /// GET sends `params` as the query string, PUT/PATCH/POST as a JSON body.
    /// The returned value always has `code == 0`; a non-zero code is an
    /// [`ApsError::Application`]. Failures are only traced at debug level
    /// here; the caller reports them.
    pub async fn request(&self, method: Method, path: &str, params: Option<&Value>) -> Result<Value> {
        let result = self.send(&method, path, params).await;
        match &result {
            Ok(_) => self.logger.debug(&format!("{} {} ok", method, path)),
            Err(e) => self
                .logger
                .debug(&format!("{} {} failed: {}", method, path, e)),
        }
        result
    }

    async fn send(&self, method: &Method, path: &str, params: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let headers = SignedHeaders::new(&self.credentials, method.as_str(), path)?.to_header_map()?;

        let builder = match *method {
            Method::GET => {
                let builder = self.http.get(&url);
                match params {
                    Some(p) => builder.query(p),
                    None => builder,
                }
            }
            Method::PUT | Method::PATCH | Method::POST => self
                .http
                .request(method.clone(), &url)
                .json(params.unwrap_or(&json!({}))),
            _ => {
                return Err(ApsError::validation(
                    "method",
                    format!("Unsupported HTTP method: {}", method),
                ));
            }
        };

        let resp = builder
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApsError::transport(format!("HTTP {} from {}", status, path)));
        }

        let text = resp.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        check_envelope(body)
    }

    /// Issue a signed GET and deserialize the envelope's `data` member
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str, params: Option<&Value>) -> Result<T> {
        let body = self.request(Method::GET, path, params).await?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| {
            let err = ApsError::parse(format!("Unexpected data shape from {}: {}", path, e));
            self.logger.debug(&err.to_string());
            err
        })
    }

    pub fn summary_path(&self) -> String {
        format!("/user/api/v2/systems/summary/{}", self.credentials.sid())
    }

    pub fn ecu_energy_path(&self) -> String {
        format!(
            "/user/api/v2/systems/{}/devices/ecu/energy/{}",
            self.credentials.sid(),
            self.credentials.ecu_id()
        )
    }

    /// Today / month / year / lifetime energy for the system
    pub async fn system_summary(&self) -> Result<SystemSummaryData> {
        self.get_data(&self.summary_path(), None).await
    }

    /// Minutely power and energy of the ECU for one day
    pub async fn ecu_minutely_energy(&self, date: NaiveDate) -> Result<EcuMinutelyEnergyData> {
        let params = json!({
            "energy_level": "minutely",
            "date_range": date.format("%Y-%m-%d").to_string(),
        });
        self.get_data(&self.ecu_energy_path(), Some(&params)).await
    }

    /// Minutely data for the current day in the installation's timezone
    pub async fn ecu_minutely_energy_today(&self) -> Result<EcuMinutelyEnergyData> {
        self.ecu_minutely_energy(self.today()).await
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Check the credentials with one summary call; any failure means invalid
    pub async fn validate_credentials(&self) -> bool {
        match self.system_summary().await {
            Ok(_) => true,
            Err(e) => {
                self.logger
                    .warn(&format!("Credential check failed: {}", e));
                false
            }
        }
    }
}

/// Validate a vendor envelope `{"code": int, "data": ...}`
pub fn check_envelope(body: Value) -> Result<Value> {
    let Some(code) = body.get("code").and_then(Value::as_i64) else {
        return Err(ApsError::parse("Response has no integer `code` field"));
    };
    if code != 0 {
        let message = body
            .get("message")
            .or_else(|| body.get("msg"))
            .and_then(Value::as_str)
            .map_or_else(|| body.to_string(), str::to_string);
        return Err(ApsError::application(code, message));
    }
    Ok(body)
}
