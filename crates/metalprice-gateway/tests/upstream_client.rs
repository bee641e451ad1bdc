#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Query;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use metalprice_core::Metal;
use metalprice_gateway::upstream::{MetalPriceClient, Upstream};

async fn latest(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    if q.get("api_key").map(String::as_str) != Some("good-key") {
        return (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"success":false,"error":{"statusCode":101,"message":"Invalid API Key."}}"#.to_string(),
        );
    }
    let body = format!(
        r#"{{"success":true,"base":"{}","rates":{{"XAU":0.0005,"XAG":0.04,"echo":"{}"}}}}"#,
        q.get("base").cloned().unwrap_or_default(),
        q.get("currencies").cloned().unwrap_or_default(),
    );
    ([(header::CONTENT_TYPE, "application/json; charset=utf-8")], body)
}

async fn gateway_error() -> impl IntoResponse {
    (
        axum::http::StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        format!("<html>{}</html>", "x".repeat(1000)),
    )
}

async fn garbled() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{\"success\":tru")
}

async fn hang() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(30)).await;
    "too late"
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/v1/latest", get(latest))
        .route("/html", get(gateway_error))
        .route("/garbled", get(garbled))
        .route("/hang", get(hang));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, path: &str, key: &str, timeout: Duration) -> MetalPriceClient {
    MetalPriceClient::new(format!("http://{addr}{path}"), key, timeout, "metalprice-test", 50).unwrap()
}

#[tokio::test]
async fn sends_key_base_and_joined_codes() {
    let addr = spawn_upstream().await;
    let c = client(addr, "/v1/latest", "good-key", Duration::from_secs(5));

    let resp = c.fetch("USD", &[Metal::Xau, Metal::Xag]).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.rate("XAU"), Some(0.0005));
    assert_eq!(resp.rates["echo"], "XAU,XAG");
}

#[tokio::test]
async fn business_error_is_returned_as_body() {
    let addr = spawn_upstream().await;
    let c = client(addr, "/v1/latest", "bad-key", Duration::from_secs(5));

    let resp = c.fetch("USD", &Metal::ALL).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.error_message(), "Invalid API Key.");
}

#[tokio::test]
async fn html_body_is_contract_error_with_capped_snippet() {
    let addr = spawn_upstream().await;
    let c = client(addr, "/html", "good-key", Duration::from_secs(5));

    let err = c.fetch("USD", &Metal::ALL).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "UPSTREAM_CONTRACT");
    match err {
        metalprice_core::PriceProxyError::UpstreamContract { body: Some(snippet), .. } => {
            assert_eq!(snippet.chars().count(), 50);
            assert!(snippet.starts_with("<html>"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Chunked `text/html` response that never ends.
async fn spawn_endless_html() -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut req = [0u8; 2048];
        let _ = sock.read(&mut req).await;
        let head = "HTTP/1.1 502 Bad Gateway\r\ncontent-type: text/html\r\ntransfer-encoding: chunked\r\n\r\n";
        if sock.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let chunk = format!("400\r\n{}\r\n", "x".repeat(1024));
        while sock.write_all(chunk.as_bytes()).await.is_ok() {}
    });
    addr
}

#[tokio::test]
async fn endless_html_body_is_cut_to_a_prefix() {
    let addr = spawn_endless_html().await;
    let c = client(addr, "/", "good-key", Duration::from_secs(3));

    let err = c.fetch("USD", &Metal::ALL).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "UPSTREAM_CONTRACT");
    match err {
        metalprice_core::PriceProxyError::UpstreamContract { body: Some(snippet), .. } => {
            assert_eq!(snippet, "x".repeat(50));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_contract_error() {
    let addr = spawn_upstream().await;
    let c = client(addr, "/garbled", "good-key", Duration::from_secs(5));

    let err = c.fetch("USD", &Metal::ALL).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "UPSTREAM_CONTRACT");
}

#[tokio::test]
async fn timeout_is_network_error_without_key() {
    let addr = spawn_upstream().await;
    let c = client(addr, "/hang", "good-key", Duration::from_millis(200));

    let err = c.fetch("USD", &Metal::ALL).await.unwrap_err();
    assert!(err.is_recoverable());
    assert!(!err.to_string().contains("good-key"));
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = client(addr, "/v1/latest", "good-key", Duration::from_secs(2));
    let err = c.fetch("USD", &Metal::ALL).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "UPSTREAM_UNAVAILABLE");
}
