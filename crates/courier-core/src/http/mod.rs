//! HTTP request client with uniform response envelopes
//!
//! This module provides:
//! - Client configuration (default headers, TLS, redirects, proxy, retries)
//! - Content-type negotiation for request bodies
//! - Status synthesis for failures that never reached a server
//! - Needle-based retries
//! - A pluggable transport with a blocking reqwest default

pub mod blocking;
pub mod body;
pub mod client;
pub mod config;
pub mod envelope;
pub mod headers;
pub mod retry;
pub mod status;
pub mod transport;

pub use blocking::ReqwestTransport;
pub use body::{negotiate_content_type, Body, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
pub use client::HttpClient;
pub use config::{AuthScheme, ClientConfig, ConfigSnapshot, ProxyConfig};
pub use envelope::{RequestSnapshot, ResponseEnvelope, ResultData, RETRY_COUNT_HEADER};
pub use headers::Headers;
pub use retry::{RetryDecision, RetryPolicy};
pub use status::{StatusClassifier, StatusCode, StatusRule};
pub use transport::{
    Method, ResponseHeaders, Transport, TransportError, TransportErrorKind, TransportRequest,
    TransportResponse,
};
