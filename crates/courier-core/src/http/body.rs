//! Request bodies and content-type negotiation

use serde::{Deserialize, Serialize};

use crate::http::headers::Headers;
use crate::http::transport::Method;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Request body: raw text or form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    /// Sent verbatim
    Raw(String),
    /// Sent url-encoded as form parameters
    Form(Vec<(String, String)>),
}

impl Default for Body {
    fn default() -> Self {
        Body::Raw(String::new())
    }
}

impl Body {
    /// Build a form body from `(name, value)` pairs
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Whether this is a raw body holding valid JSON text
    pub fn is_json(&self) -> bool {
        match self {
            Body::Raw(text) => serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok(),
            Body::Form(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Raw(text) => text.is_empty(),
            Body::Form(fields) => fields.is_empty(),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Raw(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Raw(text.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Raw(value.to_string())
    }
}

impl From<Vec<(String, String)>> for Body {
    fn from(fields: Vec<(String, String)>) -> Self {
        Body::Form(fields)
    }
}

/// Pick the content type a body would be sent with, if the method carries one
pub fn detect_content_type(method: Method, body: &Body) -> Option<&'static str> {
    if matches!(method, Method::Get | Method::Delete) {
        return None;
    }

    if body.is_json() {
        Some(CONTENT_TYPE_JSON)
    } else {
        Some(CONTENT_TYPE_FORM)
    }
}

/// Add a default `Content-Type` header unless the caller already set one
pub fn negotiate_content_type(method: Method, body: &Body, headers: &mut Headers) {
    if let Some(content_type) = detect_content_type(method, body) {
        headers.insert_default(HEADER_CONTENT_TYPE, content_type);
    }
}
