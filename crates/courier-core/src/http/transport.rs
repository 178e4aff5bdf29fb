//! Transport seam
//!
//! The executor never touches sockets itself. It hands a [`TransportRequest`]
//! to a [`Transport`] and gets back either a [`TransportResponse`] or a
//! [`TransportError`] telling it which failure path to normalize.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::http::body::Body;
use crate::http::config::ProxyConfig;
use crate::http::headers::Headers;

/// Response header map: name to ordered values
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// HTTP methods supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transport needs to perform one attempt
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a Headers,
    pub body: &'a Body,
    pub follow_redirects: bool,
    pub verify_tls: bool,
    pub proxy: Option<&'a ProxyConfig>,
}

/// A response received from a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`
    pub reason: String,
    /// Protocol version without the `HTTP/` prefix, e.g. `1.1`
    pub protocol_version: String,
    pub body: String,
    /// Body length in bytes as reported by the transport
    pub body_size: u64,
    pub headers: ResponseHeaders,
}

impl TransportResponse {
    /// Build a response with the given status and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status,
            reason: crate::http::status::StatusCode::from_code(status)
                .text()
                .to_string(),
            protocol_version: "1.1".to_string(),
            body_size: body.len() as u64,
            body,
            headers: ResponseHeaders::new(),
        }
    }

    /// Append a header value
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Override the transport-reported body size
    pub fn with_body_size(mut self, body_size: u64) -> Self {
        self.body_size = body_size;
        self
    }
}

/// Category of a failure that produced no HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportErrorKind {
    /// Could not connect, including DNS failures
    Connect,
    /// The transport gave up waiting
    Timeout,
    /// Redirect loop or redirect limit exceeded
    Redirect,
    /// The request could not be built, e.g. a malformed URL or proxy
    Builder,
    /// The response body could not be read
    Decode,
    /// Failure while sending the request
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "ConnectError",
            TransportErrorKind::Timeout => "TimeoutError",
            TransportErrorKind::Redirect => "RedirectError",
            TransportErrorKind::Builder => "BuilderError",
            TransportErrorKind::Decode => "DecodeError",
            TransportErrorKind::Request => "RequestError",
            TransportErrorKind::Other => "TransportError",
        };
        f.write_str(name)
    }
}

/// Failure reported by a transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a status the transport treats as a failure
    #[error("{message}")]
    Status {
        message: String,
        response: Option<Box<TransportResponse>>,
    },

    /// No response was received
    #[error("{message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
}

impl TransportError {
    /// Failure that carries the server's response
    pub fn status(message: impl Into<String>, response: TransportResponse) -> Self {
        TransportError::Status {
            message: message.into(),
            response: Some(Box::new(response)),
        }
    }

    /// Failure with no response at all
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        TransportError::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TransportError::Status { message, .. } | TransportError::Transport { message, .. } => {
                message
            }
        }
    }
}

/// Sends one request attempt
pub trait Transport: Send + Sync {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).send(request)
    }
}
