//! Courier Core - normalizing HTTP request client
//!
//! Issues HTTP requests and reports every outcome through one envelope
//! shape, whether the server answered, answered with an error status, or
//! was never reached.
//!
//! # Main Components
//!
//! - **Configuration**: default headers, TLS verification, redirects, proxy and retry policy
//! - **Content negotiation**: `Content-Type` defaults for JSON and form bodies
//! - **Status synthesis**: status codes for failures that produced no response
//! - **Execution**: send, normalize and retry on a configurable failure needle
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{ClientConfig, Headers, HttpClient};
//!
//! let mut client = HttpClient::new(ClientConfig::default());
//! client.set_retry_max_count(2);
//! client.set_retry_msg_needle("timed out");
//!
//! let envelope = client.post("https://httpbin.org/post", r#"{"a":1}"#, Headers::new());
//! if !envelope.success {
//!     eprintln!("request failed: {}", envelope.message);
//! }
//! ```

pub mod error;
pub mod http;

pub use error::{Error, Result};
pub use http::{
    AuthScheme, Body, ClientConfig, Headers, HttpClient, Method, ProxyConfig, ResponseEnvelope,
    ResultData, RetryPolicy, StatusCode, Transport, TransportError, TransportResponse,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
