//! Uniform response envelope
//!
//! Every call returns a [`ResponseEnvelope`], whichever path it took. The
//! envelope echoes the request and configuration it was produced from and,
//! unless the request was rejected up front, carries a normalized
//! [`ResultData`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::body::Body;
use crate::http::config::ConfigSnapshot;
use crate::http::headers::Headers;
use crate::http::status::StatusCode;
use crate::http::transport::{Method, ResponseHeaders, TransportErrorKind, TransportResponse};

/// Response header carrying the zero-based attempt number
pub const RETRY_COUNT_HEADER: &str = "WH-RETRY-COUNT";

/// Protocol version reported when no response was received
pub const FALLBACK_PROTOCOL_VERSION: &str = "1.1";

/// The request as it was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub url: String,
    pub method: Method,
    pub body: Body,
    pub headers: Headers,
}

/// Normalized outcome of an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultData {
    pub status_code: u16,
    pub status_text: String,
    pub protocol_version: String,
    pub body: String,
    pub body_size: u64,
    pub headers: ResponseHeaders,
}

impl ResultData {
    /// Result built from a server response
    pub fn from_response(response: TransportResponse) -> Self {
        Self {
            status_code: response.status,
            status_text: response.reason,
            protocol_version: response.protocol_version,
            body: response.body,
            body_size: response.body_size,
            headers: response.headers,
        }
    }

    /// Result synthesized for a failure that produced no response
    pub fn synthesized(kind: TransportErrorKind, message: &str, status: Option<StatusCode>) -> Self {
        let status = status.unwrap_or(StatusCode::Unknown);
        Self {
            status_code: status.code(),
            status_text: status.text().to_string(),
            protocol_version: FALLBACK_PROTOCOL_VERSION.to_string(),
            body: format!("{} {}", kind, message),
            body_size: 0,
            headers: ResponseHeaders::new(),
        }
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Well-known status for this result's code
    pub fn status(&self) -> StatusCode {
        StatusCode::from_code(self.status_code)
    }

    /// Record the attempt number and settle `body_size`
    pub(crate) fn normalize(&mut self, retry_count: u32) {
        self.headers
            .insert(RETRY_COUNT_HEADER.to_string(), vec![retry_count.to_string()]);
        self.body_size = reconcile_body_size(self);
    }
}

/// Pick the body size from the length headers, `x-encoded-content-length`
/// taking precedence over `Content-Length`. A missing or zero header size
/// falls back to the transport-reported size, then to the body's byte length.
pub fn reconcile_body_size(result: &ResultData) -> u64 {
    let from_header = |name: &str| {
        result
            .header(name)
            .and_then(|value| value.trim().parse::<u64>().ok())
    };

    from_header("x-encoded-content-length")
        .or_else(|| from_header("Content-Length"))
        .filter(|size| *size > 0)
        .or(Some(result.body_size).filter(|size| *size > 0))
        .unwrap_or(result.body.len() as u64)
}

/// The value returned from every request call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Failure description; empty on success
    pub message: String,
    /// Whether the transport delivered a response without reporting a failure
    pub success: bool,
    /// `None` only when the request was rejected before sending; serialized as `{}`
    #[serde(default, with = "empty_result")]
    pub result: Option<ResultData>,
    pub config: ConfigSnapshot,
    pub request: RequestSnapshot,
}

impl ResponseEnvelope {
    pub(crate) fn new(config: ConfigSnapshot, request: RequestSnapshot) -> Self {
        Self {
            message: String::new(),
            success: false,
            result: None,
            config,
            request,
        }
    }

    /// Status code of the result; `0` when there is none
    pub fn status_code(&self) -> u16 {
        self.result.as_ref().map_or(0, |result| result.status_code)
    }

    /// Attempt number recorded in the result headers
    pub fn retry_count(&self) -> Option<u32> {
        self.result
            .as_ref()
            .and_then(|result| result.header(RETRY_COUNT_HEADER))
            .and_then(|value| value.parse().ok())
    }

    /// Result body, or an empty string when there is no result
    pub fn body(&self) -> &str {
        self.result.as_ref().map_or("", |result| result.body.as_str())
    }

    /// Convert into the result data, or an error describing the failure
    pub fn into_result(self) -> Result<ResultData> {
        match self.result {
            Some(result) if self.success => Ok(result),
            Some(result) => Err(Error::Http {
                message: self.message,
                status_code: Some(result.status_code),
            }),
            None => Err(Error::Precondition {
                message: self.message,
            }),
        }
    }

    /// Decode the result body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let result = self.result.as_ref().ok_or_else(|| Error::Precondition {
            message: self.message.clone(),
        })?;
        Ok(serde_json::from_str(&result.body)?)
    }

    /// Serialize the whole envelope
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serializes a missing result as an empty object
mod empty_result {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::ResultData;

    pub fn serialize<S: Serializer>(
        result: &Option<ResultData>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match result {
            Some(result) => result.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ResultData>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        }
    }
}
