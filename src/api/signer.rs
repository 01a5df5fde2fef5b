//! Request signing for the EMA OpenAPI
//!
//! Every request carries an app id, a timestamp, a nonce and an HMAC-SHA256
//! signature over those values plus the last path segment and the HTTP
//! method. Signing is stateless; a fresh timestamp and nonce are drawn for
//! each request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;

use crate::api::types::Credentials;
use crate::error::{ApsError, Result};

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

pub const HEADER_APP_ID: &str = "x-ca-appid";
pub const HEADER_TIMESTAMP: &str = "x-ca-timestamp";
pub const HEADER_NONCE: &str = "x-ca-nonce";
pub const HEADER_SIGNATURE_METHOD: &str = "x-ca-signature-method";
pub const HEADER_SIGNATURE: &str = "x-ca-signature";

type HmacSha256 = Hmac<Sha256>;

/// Final segment of a request path ("/a/b/123" gives "123")
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// String-to-sign: `timestamp/nonce/app_id/last_segment/METHOD/HmacSHA256`
pub fn canonical_message(
    method: &str,
    path: &str,
    app_id: &str,
    timestamp: i64,
    nonce: &str,
) -> String {
    [
        timestamp.to_string().as_str(),
        nonce,
        app_id,
        last_path_segment(path),
        method.to_uppercase().as_str(),
        SIGNATURE_METHOD,
    ]
    .join("/")
}

/// base64(HMAC-SHA256(secret, message))
pub fn sign(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApsError::config(format!("Invalid signing key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Fresh 128-bit random nonce as 32 lowercase hex characters
pub fn new_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// The complete signature header set for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub app_id: String,
    pub timestamp: i64,
    pub nonce: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Sign a request using the current time and a fresh nonce
    pub fn new(credentials: &Credentials, method: &str, path: &str) -> Result<Self> {
        Self::with_parts(
            credentials,
            method,
            path,
            chrono::Utc::now().timestamp(),
            new_nonce(),
        )
    }

    /// Sign a request with an explicit timestamp and nonce
    pub fn with_parts(
        credentials: &Credentials,
        method: &str,
        path: &str,
        timestamp: i64,
        nonce: impl Into<String>,
    ) -> Result<Self> {
        let nonce = nonce.into();
        let message = canonical_message(method, path, credentials.app_id(), timestamp, &nonce);
        let signature = sign(credentials.app_secret(), &message)?;
        Ok(Self {
            app_id: credentials.app_id().to_string(),
            timestamp,
            nonce,
            signature,
        })
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let value = |field: &str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|e| ApsError::validation(field, e.to_string()))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(
            HeaderName::from_static(HEADER_APP_ID),
            value("credentials.app_id", &self.app_id)?,
        );
        headers.insert(
            HeaderName::from_static(HEADER_TIMESTAMP),
            HeaderValue::from(self.timestamp),
        );
        headers.insert(
            HeaderName::from_static(HEADER_NONCE),
            value("nonce", &self.nonce)?,
        );
        headers.insert(
            HeaderName::from_static(HEADER_SIGNATURE_METHOD),
            HeaderValue::from_static(SIGNATURE_METHOD),
        );
        headers.insert(
            HeaderName::from_static(HEADER_SIGNATURE),
            value("signature", &self.signature)?,
        );
        Ok(headers)
    }
}
