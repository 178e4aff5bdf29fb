//! Well-known status codes and status synthesis for transport failures
//!
//! When a request fails before any HTTP response arrives there is no real
//! status to report. The [`StatusClassifier`] scans the failure message
//! against an ordered rule table and picks a synthetic status; the last
//! matching rule wins so later, more specific rules override generic ones.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Well-known HTTP status codes with fixed reason text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", from = "u16")]
pub enum StatusCode {
    Ok,
    Created,
    NoContent,
    MovedPermanently,
    Found,
    NotModified,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
    /// No real HTTP status is available
    Unknown,
}

impl StatusCode {
    /// Every known status, `Unknown` last
    pub const ALL: [StatusCode; 13] = [
        StatusCode::Ok,
        StatusCode::Created,
        StatusCode::NoContent,
        StatusCode::MovedPermanently,
        StatusCode::Found,
        StatusCode::NotModified,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::Conflict,
        StatusCode::InternalServerError,
        StatusCode::Unknown,
    ];

    /// Look up a status by numeric code, falling back to `Unknown`
    pub fn from_code(code: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .unwrap_or(StatusCode::Unknown)
    }

    /// Numeric code; `0` for `Unknown`
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::Conflict => 409,
            StatusCode::InternalServerError => 500,
            StatusCode::Unknown => 0,
        }
    }

    /// Fixed reason text
    pub fn text(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::Conflict => "Conflict",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::Unknown => "Unknown Code",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, StatusCode::Unknown)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.text())
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode::from_code(code)
    }
}

/// A substring match that maps a failure message to a status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    pub needle: Cow<'static, str>,
    pub status: StatusCode,
}

impl StatusRule {
    pub const fn new(needle: &'static str, status: StatusCode) -> Self {
        Self {
            needle: Cow::Borrowed(needle),
            status,
        }
    }

    /// Build a rule from an owned needle
    pub fn owned(needle: impl Into<String>, status: StatusCode) -> Self {
        Self {
            needle: Cow::Owned(needle.into()),
            status,
        }
    }

    pub fn matches(&self, message: &str) -> bool {
        message.contains(self.needle.as_ref())
    }
}

/// Built-in rule table, consulted in order
pub static DEFAULT_STATUS_RULES: &[StatusRule] = &[
    StatusRule::new("error sending request", StatusCode::InternalServerError),
    StatusRule::new("connection closed", StatusCode::InternalServerError),
    StatusRule::new("Connection refused", StatusCode::InternalServerError),
    StatusRule::new("operation timed out", StatusCode::InternalServerError),
    StatusRule::new("dns error", StatusCode::NotFound),
    StatusRule::new("failed to lookup address", StatusCode::NotFound),
    StatusRule::new("builder error", StatusCode::BadRequest),
    StatusRule::new("relative URL without a base", StatusCode::BadRequest),
    StatusRule::new("invalid", StatusCode::BadRequest),
    StatusRule::new("certificate", StatusCode::Forbidden),
    StatusRule::new("too many redirects", StatusCode::Found),
    StatusRule::new("401 Unauthorized", StatusCode::Unauthorized),
    StatusRule::new("403 Forbidden", StatusCode::Forbidden),
    StatusRule::new("409 Conflict", StatusCode::Conflict),
];

/// Maps transport failure messages to synthetic statuses
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    rules: Cow<'static, [StatusRule]>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self {
            rules: Cow::Borrowed(DEFAULT_STATUS_RULES),
        }
    }
}

impl StatusClassifier {
    /// Create a classifier with a custom rule table
    pub fn new(rules: Vec<StatusRule>) -> Self {
        Self {
            rules: Cow::Owned(rules),
        }
    }

    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    /// Return the status of the last rule whose needle occurs in `message`
    pub fn classify(&self, message: &str) -> Option<StatusCode> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(message))
            .map(|rule| rule.status)
    }
}

/// Classify with the built-in rule table
pub fn classify(message: &str) -> Option<StatusCode> {
    StatusClassifier::default().classify(message)
}
