//! End-to-end tests for the reqwest transport against a loopback server


use courier_core::http::{
    Body, ClientConfig, Headers, HttpClient, ReqwestTransport, TransportErrorKind,
    RETRY_COUNT_HEADER,
};
use std::time::Duration;
use test_support::{http_response, refused_url, serve};

fn client() -> HttpClient {
    HttpClient::with_transport(ClientConfig::default(), transport())
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new()
        .with_timeout(Duration::from_secs(5))
        .with_system_proxy(false)
}

#[test]
fn test_successful_get() {
    let (url, server) = serve(vec![http_response(
        "200 OK",
        &[("X-Served-By", "loopback")],
        "hello",
    )]);

    let envelope = client().get(&format!("{}/greeting", url), Headers::new());
    let captured = server.join().unwrap();

    assert!(envelope.success, "unexpected failure: {}", envelope.message);
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(result.status_text, "OK");
    assert_eq!(result.protocol_version, "1.1");
    assert_eq!(result.body, "hello");
    assert_eq!(result.body_size, 5);
    assert_eq!(result.headers["x-served-by"], vec!["loopback"]);
    assert_eq!(result.headers[RETRY_COUNT_HEADER], vec!["0"]);

    assert_eq!(captured[0].request_line, "GET /greeting HTTP/1.1");
    assert!(captured[0]
        .header("user-agent")
        .is_some_and(|agent| agent.starts_with("Mozilla/5.0")));
}

#[test]
fn test_json_post_sends_body_and_content_type() {
    let (url, server) = serve(vec![http_response("201 Created", &[], r#"{"id":1}"#)]);

    let envelope = client().post(&url, r#"{"name":"courier"}"#, Headers::new());
    let captured = server.join().unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.status_code(), 201);
    assert_eq!(captured[0].header("content-type"), Some("application/json"));
    assert_eq!(captured[0].body, r#"{"name":"courier"}"#);

    let value: serde_json::Value = envelope.json().unwrap();
    assert_eq!(value["id"], 1);
}

#[test]
fn test_form_post_is_url_encoded() {
    let (url, server) = serve(vec![http_response("200 OK", &[], "")]);

    let body = Body::form([("q", "a b"), ("lang", "rust")]);
    let envelope = client().post(&url, body, Headers::new());
    let captured = server.join().unwrap();

    assert!(envelope.success);
    assert_eq!(
        captured[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(captured[0].body, "q=a+b&lang=rust");
}

#[test]
fn test_caller_content_type_reaches_server() {
    let (url, server) = serve(vec![http_response("200 OK", &[], "")]);

    let body = Body::form([("a", "1")]);
    client().put(&url, body, Headers::from([("Content-Type", "text/plain")]));
    let captured = server.join().unwrap();

    assert_eq!(captured[0].request_line.split(' ').next(), Some("PUT"));
    assert_eq!(captured[0].header("content-type"), Some("text/plain"));
}

#[test]
fn test_client_error_status_is_http_error() {
    let (url, server) = serve(vec![http_response("404 Not Found", &[], "no such thing")]);

    let envelope = client().get(&format!("{}/missing", url), Headers::new());
    server.join().unwrap();

    assert!(!envelope.success);
    assert!(envelope.message.starts_with("Client error: `GET "));
    assert!(envelope.message.contains("resulted in a `404 Not Found` response"));
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 404);
    assert_eq!(result.body, "no such thing");
}

#[test]
fn test_http_errors_disabled_reports_success() {
    let (url, server) = serve(vec![http_response("500 Internal Server Error", &[], "")]);

    let client =
        HttpClient::with_transport(ClientConfig::default(), transport().with_http_errors(false));
    let envelope = client.delete(&url, Headers::new());
    server.join().unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.status_code(), 500);
}

#[test]
fn test_server_error_retried_on_needle() {
    let (url, server) = serve(vec![
        http_response("500 Internal Server Error", &[], "busy"),
        http_response("200 OK", &[], "done"),
    ]);

    let mut client = client();
    client.set_retry_msg_needle("Server error");
    let envelope = client.get(&url, Headers::new());
    let captured = server.join().unwrap();

    assert_eq!(captured.len(), 2);
    assert!(envelope.success);
    assert_eq!(envelope.body(), "done");
    assert_eq!(envelope.retry_count(), Some(1));
}

#[test]
fn test_redirect_not_followed_when_disabled() {
    let (url, server) = serve(vec![http_response(
        "302 Found",
        &[("Location", "/elsewhere")],
        "",
    )]);

    let mut client = client();
    client.allow_redirects(false);
    let envelope = client.get(&url, Headers::new());
    server.join().unwrap();

    assert!(envelope.success);
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 302);
    assert_eq!(result.headers["location"], vec!["/elsewhere"]);
}

#[test]
fn test_redirect_followed_by_default() {
    let (url, server) = serve(vec![
        http_response("301 Moved Permanently", &[("Location", "/new")], ""),
        http_response("200 OK", &[], "moved here"),
    ]);

    let envelope = client().get(&url, Headers::new());
    let captured = server.join().unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.body(), "moved here");
    assert_eq!(captured[1].request_line, "GET /new HTTP/1.1");
}

#[test]
fn test_connection_refused_is_transport_error() {
    let mut client = client();
    client.set_retry_max_count(2);
    client.set_retry_msg_needle("Connection refused");

    let envelope = client.get(&refused_url(), Headers::new());

    assert!(!envelope.success);
    assert!(envelope.message.contains("Connection refused"), "{}", envelope.message);
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 500);
    assert_eq!(result.protocol_version, "1.1");
    assert!(result
        .body
        .starts_with(&format!("{} ", TransportErrorKind::Connect)));
    assert_eq!(result.headers[RETRY_COUNT_HEADER], vec!["2"]);
}

#[test]
fn test_malformed_url_is_builder_error() {
    let envelope = client().get("not a url", Headers::new());

    assert!(!envelope.success);
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 400);
    assert!(result.body.starts_with("BuilderError "));
}

#[test]
fn test_empty_proxy_url_is_reported_by_transport() {
    let mut client = client();
    client.set_proxy_config("", None, None);

    let envelope = client.get("http://127.0.0.1:9/", Headers::new());

    assert!(!envelope.success);
    assert!(!envelope.message.is_empty());
    assert!(envelope.result.is_some());
}

#[test]
fn test_redirect_limit_is_classified() {
    let (url, server) = serve(vec![
        http_response("302 Found", &[("Location", "/loop")], ""),
        http_response("302 Found", &[("Location", "/loop")], ""),
    ]);

    let client =
        HttpClient::with_transport(ClientConfig::default(), transport().with_max_redirects(1));
    let envelope = client.get(&url, Headers::new());
    let captured = server.join().unwrap();

    assert_eq!(captured.len(), 2);
    assert!(!envelope.success);
    assert!(envelope.message.contains("too many redirects"), "{}", envelope.message);
    let result = envelope.result.unwrap();
    assert_eq!(result.status_code, 302);
    assert!(result
        .body
        .starts_with(&format!("{} ", TransportErrorKind::Redirect)));
}

#[test]
fn test_server_reason_phrase_is_kept() {
    let (url, server) = serve(vec![
        http_response("299 Mostly Fine", &[], "ok"),
        http_response("404 Nowhere To Be Found", &[], ""),
    ]);

    let client = client();
    let custom = client.get(&url, Headers::new());
    let missing = client.get(&url, Headers::new());
    server.join().unwrap();

    assert!(custom.success);
    let result = custom.result.unwrap();
    assert_eq!(result.status_code, 299);
    assert_eq!(result.status_text, "Mostly Fine");

    assert!(!missing.success);
    assert!(missing
        .message
        .contains("resulted in a `404 Nowhere To Be Found` response"));
    assert_eq!(missing.result.unwrap().status_text, "Nowhere To Be Found");
}

#[test]
fn test_canonical_reason_when_server_matches_it() {
    let (url, server) = serve(vec![http_response("201 Created", &[], "")]);

    let envelope = client().post(&url, "a=1", Headers::new());
    server.join().unwrap();

    assert_eq!(envelope.result.unwrap().status_text, "Created");
}
