//! Default transport backed by `reqwest`'s blocking client

use hyper::ext::ReasonPhrase;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{NoProxy, Proxy, Version};
use std::error::Error as StdError;
use std::time::Duration;

use crate::http::body::Body;
use crate::http::headers::Headers;
use crate::http::transport::{
    Method, ResponseHeaders, Transport, TransportError, TransportErrorKind, TransportRequest,
    TransportResponse,
};

/// Longest body excerpt quoted in a status error message
const BODY_SUMMARY_LIMIT: usize = 120;

/// Transport that performs real network I/O with `reqwest::blocking`
///
/// A client is built per attempt so the TLS, redirect and proxy settings of
/// the request always apply. Must not be called from inside an async runtime.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Total request timeout; `None` keeps reqwest's default
    timeout: Option<Duration>,
    /// Report 4xx/5xx responses as status errors
    http_errors: bool,
    /// Redirect hops followed when redirects are enabled
    max_redirects: usize,
    /// Honour `HTTP_PROXY`-style environment variables
    system_proxy: bool,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            timeout: None,
            http_errors: true,
            max_redirects: 5,
            system_proxy: true,
        }
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable reporting 4xx/5xx responses as failures
    pub fn with_http_errors(mut self, http_errors: bool) -> Self {
        self.http_errors = http_errors;
        self
    }

    /// Set the redirect limit
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Enable or disable proxies picked up from the environment
    pub fn with_system_proxy(mut self, system_proxy: bool) -> Self {
        self.system_proxy = system_proxy;
        self
    }

    fn build_client(&self, request: &TransportRequest<'_>) -> Result<Client, TransportError> {
        let redirect = if request.follow_redirects {
            Policy::limited(self.max_redirects)
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .danger_accept_invalid_certs(!request.verify_tls)
            .redirect(redirect);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(proxy) = request.proxy {
            let no_proxy = NoProxy::from_string(&proxy.no_proxy.join(","));
            builder = builder
                .proxy(Proxy::https(&proxy.https).map_err(from_reqwest)?.no_proxy(no_proxy.clone()))
                .proxy(Proxy::http(&proxy.http).map_err(from_reqwest)?.no_proxy(no_proxy));
        }

        builder.build().map_err(from_reqwest)
    }

    fn check_status(
        &self,
        request: &TransportRequest<'_>,
        response: TransportResponse,
    ) -> Result<TransportResponse, TransportError> {
        if !self.http_errors || response.status < 400 {
            return Ok(response);
        }

        let message = status_error_message(request.method, request.url, &response);
        Err(TransportError::status(message, response))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        let client = self.build_client(request)?;

        let builder = client.request(to_reqwest_method(request.method), request.url);
        let builder = attach_body(builder, request.body).headers(to_header_map(request.headers));

        let response = builder.send().map_err(from_reqwest)?;
        let response = read_response(response)?;

        self.check_status(request, response)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

// Headers are attached after the body so caller headers replace the
// Content-Type that `form` sets.
fn attach_body(builder: RequestBuilder, body: &Body) -> RequestBuilder {
    match body {
        Body::Form(fields) => builder.form(fields),
        Body::Raw(text) if text.is_empty() => builder,
        Body::Raw(text) => builder.body(text.clone()),
    }
}

fn to_header_map(headers: &Headers) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = name, "skipping invalid request header"),
        }
    }
    map
}

fn read_response(response: Response) -> Result<TransportResponse, TransportError> {
    let status = response.status();
    let protocol_version = protocol_version(response.version()).to_string();

    let mut headers = ResponseHeaders::new();
    for (name, value) in response.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    // hyper only records the phrase when it differs from the canonical one
    let reason = response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

    let bytes = response.bytes().map_err(from_reqwest)?;

    Ok(TransportResponse {
        status: status.as_u16(),
        reason,
        protocol_version,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        body_size: bytes.len() as u64,
        headers,
    })
}

fn protocol_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

/// `Client error: `GET url` resulted in a `404 Not Found` response`
fn status_error_message(method: Method, url: &str, response: &TransportResponse) -> String {
    let label = if response.status >= 500 {
        "Server error"
    } else {
        "Client error"
    };

    let mut message = format!(
        "{}: `{} {}` resulted in a `{} {}` response",
        label, method, url, response.status, response.reason
    );

    if let Some(summary) = body_summary(&response.body) {
        message.push_str(":\n");
        message.push_str(&summary);
    }

    message
}

fn body_summary(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if body.len() <= BODY_SUMMARY_LIMIT {
        return Some(body.to_string());
    }

    let mut end = BODY_SUMMARY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    Some(format!("{} (truncated...)", &body[..end]))
}

fn from_reqwest(error: reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_redirect() {
        TransportErrorKind::Redirect
    } else if error.is_builder() {
        TransportErrorKind::Builder
    } else if error.is_decode() || error.is_body() {
        TransportErrorKind::Decode
    } else if error.is_request() {
        TransportErrorKind::Request
    } else {
        TransportErrorKind::Other
    };

    TransportError::transport(kind, error_chain(&error))
}

/// Render an error and all of its sources, joined by `": "`
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let response = TransportResponse::new(404, "");
        assert_eq!(
            status_error_message(Method::Get, "http://example.com/a", &response),
            "Client error: `GET http://example.com/a` resulted in a `404 Not Found` response"
        );

        let response = TransportResponse::new(500, "boom");
        assert_eq!(
            status_error_message(Method::Post, "http://example.com/", &response),
            "Server error: `POST http://example.com/` resulted in a `500 Internal Server Error` response:\nboom"
        );
    }

    #[test]
    fn test_body_summary_truncates_on_char_boundary() {
        assert_eq!(body_summary("   "), None);

        let long = "é".repeat(100);
        let summary = body_summary(&long).unwrap();
        assert!(summary.ends_with(" (truncated...)"));
        assert!(summary.len() <= BODY_SUMMARY_LIMIT + " (truncated...)".len());
    }

    #[test]
    fn test_invalid_headers_are_skipped() {
        let headers = Headers::from([("Bad Name", "x"), ("X-Ok", "1"), ("X-Bad-Value", "a\nb")]);
        let map = to_header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map["x-ok"], "1");
    }

    #[test]
    fn test_protocol_versions() {
        assert_eq!(protocol_version(Version::HTTP_11), "1.1");
        assert_eq!(protocol_version(Version::HTTP_2), "2.0");
        assert_eq!(protocol_version(Version::HTTP_10), "1.0");
    }

    #[test]
    fn test_error_chain_skips_repeated_text() {
        #[derive(Debug)]
        struct Leaf;
        impl std::fmt::Display for Leaf {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "Connection refused")
            }
        }
        impl StdError for Leaf {}

        #[derive(Debug)]
        struct Outer(Leaf);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "error sending request")
            }
        }
        impl StdError for Outer {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        assert_eq!(
            error_chain(&Outer(Leaf)),
            "error sending request: Connection refused"
        );
    }
}
