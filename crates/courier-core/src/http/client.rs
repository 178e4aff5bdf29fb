//! Request executor
//!
//! Builds each attempt from the client configuration, hands it to the
//! transport, normalizes whatever comes back into a [`ResponseEnvelope`] and
//! retries while the failure message contains the configured needle.

use crate::http::blocking::ReqwestTransport;
use crate::http::body::{negotiate_content_type, Body};
use crate::http::config::{AuthScheme, ClientConfig, ConfigSnapshot, ProxyConfig};
use crate::http::envelope::{RequestSnapshot, ResponseEnvelope, ResultData};
use crate::http::headers::Headers;
use crate::http::retry::RetryDecision;
use crate::http::status::StatusClassifier;
use crate::http::transport::{
    Method, Transport, TransportError, TransportErrorKind, TransportRequest,
};

/// Message prefix for requests rejected because the URL is empty
pub const EMPTY_URL_MESSAGE: &str = "(url) param is empty ";

/// Normalizing HTTP client
///
/// Verb methods never fail: every outcome, including transport failures and
/// rejected input, is reported through the returned envelope.
#[derive(Debug, Clone)]
pub struct HttpClient<T = ReqwestTransport> {
    config: ClientConfig,
    classifier: StatusClassifier,
    transport: T,
}

impl Default for HttpClient<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl HttpClient<ReqwestTransport> {
    /// Create a client backed by the default reqwest transport
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::default())
    }
}

impl<T: Transport> HttpClient<T> {
    /// Create a client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            classifier: StatusClassifier::default(),
            transport,
        }
    }

    /// Replace the status table used for transport failures
    pub fn with_classifier(mut self, classifier: StatusClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.config.set_content_type(content_type);
    }

    pub fn set_authorization(&mut self, credentials: &str, scheme: AuthScheme) {
        self.config.set_authorization(credentials, scheme);
    }

    pub fn set_default_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.config.default_headers.insert(name, value);
    }

    pub fn set_retry_max_count(&mut self, max_count: u32) {
        self.config.retry.max_count = max_count;
    }

    pub fn set_retry_msg_needle(&mut self, needle: impl Into<String>) {
        self.config.retry.needle = Some(needle.into());
    }

    /// Route requests through a proxy; see [`ClientConfig::set_proxy_config`]
    pub fn set_proxy_config(
        &mut self,
        https: impl Into<String>,
        http: Option<String>,
        no_proxy: Option<Vec<String>>,
    ) {
        self.config.set_proxy_config(https, http, no_proxy);
    }

    pub fn set_proxy(&mut self, proxy: Option<ProxyConfig>) {
        self.config.proxy = proxy;
    }

    pub fn set_verify_ssl(&mut self, verify_ssl: bool) {
        self.config.verify_ssl = verify_ssl;
    }

    pub fn allow_redirects(&mut self, follow: bool) {
        self.config.follow_redirects = follow;
    }

    pub fn get(&self, url: &str, headers: Headers) -> ResponseEnvelope {
        self.request(Method::Get, url, Body::default(), headers)
    }

    pub fn post(&self, url: &str, body: impl Into<Body>, headers: Headers) -> ResponseEnvelope {
        self.request(Method::Post, url, body.into(), headers)
    }

    pub fn put(&self, url: &str, body: impl Into<Body>, headers: Headers) -> ResponseEnvelope {
        self.request(Method::Put, url, body.into(), headers)
    }

    pub fn patch(&self, url: &str, body: impl Into<Body>, headers: Headers) -> ResponseEnvelope {
        self.request(Method::Patch, url, body.into(), headers)
    }

    pub fn delete(&self, url: &str, headers: Headers) -> ResponseEnvelope {
        self.request(Method::Delete, url, Body::default(), headers)
    }

    /// Run a request through the full retry chain
    ///
    /// Only the envelope of the last attempt is returned.
    pub fn request(&self, method: Method, url: &str, body: Body, headers: Headers) -> ResponseEnvelope {
        let mut retry_count = 0;

        loop {
            let envelope = self.attempt(method, url, &body, &headers, retry_count);

            // Rejected input and successes never retry
            if envelope.success || envelope.result.is_none() {
                return envelope;
            }

            match self.config.retry.decide(&envelope.message, retry_count) {
                RetryDecision::Retry { next_count } => {
                    tracing::warn!(
                        method = %method,
                        url,
                        attempt = retry_count,
                        message = %envelope.message,
                        "request failed, retrying"
                    );
                    retry_count = next_count;
                }
                RetryDecision::Done => {
                    tracing::info!(
                        method = %method,
                        url,
                        attempts = retry_count + 1,
                        status = envelope.status_code(),
                        message = %envelope.message,
                        "request failed"
                    );
                    return envelope;
                }
            }
        }
    }

    fn attempt(
        &self,
        method: Method,
        url: &str,
        body: &Body,
        headers: &Headers,
        retry_count: u32,
    ) -> ResponseEnvelope {
        let mut headers = self.config.default_headers.merged(headers);
        negotiate_content_type(method, body, &mut headers);

        let mut envelope = ResponseEnvelope::new(
            ConfigSnapshot::from(&self.config),
            RequestSnapshot {
                url: url.to_string(),
                method,
                body: body.clone(),
                headers,
            },
        );

        if url.is_empty() {
            envelope.message = format!("{}{}", EMPTY_URL_MESSAGE, url);
            return envelope;
        }

        let request = TransportRequest {
            method,
            url,
            headers: &envelope.request.headers,
            body,
            follow_redirects: self.config.follow_redirects,
            verify_tls: self.config.verify_ssl,
            proxy: self.config.proxy.as_ref(),
        };

        tracing::debug!(method = %method, url, attempt = retry_count, "sending request");

        let outcome = self.transport.send(&request);

        let mut result = match outcome {
            Ok(response) => {
                envelope.success = true;
                ResultData::from_response(response)
            }
            Err(error) => {
                envelope.message = error.message().to_string();
                self.failure_result(error)
            }
        };

        result.normalize(retry_count);
        envelope.result = Some(result);
        envelope
    }

    fn failure_result(&self, error: TransportError) -> ResultData {
        match error {
            TransportError::Status {
                response: Some(response),
                ..
            } => ResultData::from_response(*response),
            TransportError::Status {
                message,
                response: None,
            } => ResultData::synthesized(
                TransportErrorKind::Other,
                &message,
                self.classifier.classify(&message),
            ),
            TransportError::Transport { kind, message } => {
                ResultData::synthesized(kind, &message, self.classifier.classify(&message))
            }
        }
    }
}
