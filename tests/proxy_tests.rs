// tests/proxy_tests.rs
use hyper::{Body, Request, Response, StatusCode};
use lemlist_proxy::config::{ApiKey, ProxyConfig};
use lemlist_proxy::proxy::{HttpUpstream, Proxy};
use lemlist_proxy::server::{serve_listener, RequestHandler};
use mockito::Matcher;
use std::sync::Arc;
use tower::ServiceExt;

const ALLOWED: &str = "https://dashboard-internal.privacy-safe.io";

fn handler(upstream_base: String, key: Option<&str>) -> RequestHandler {
    let config = ProxyConfig {
        upstream_base,
        ..ProxyConfig::default()
    };
    let upstream = HttpUpstream::new(None).unwrap();
    RequestHandler::new(Arc::new(Proxy::new(
        config,
        key.map(ApiKey::new),
        Arc::new(upstream),
    )))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Origin", ALLOWED)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_get_forwards_with_credentials() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/campaigns/123")
        .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
        .match_header("authorization", "Basic OmtleQ==")
        .match_header("content-type", "application/json")
        .match_header("x-requested-with", "XMLHttpRequest")
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"_id":"123"}"#)
        .create_async()
        .await;

    let handler = handler(format!("{}/api/", server.url()), Some("key"));
    let resp = handler
        .oneshot(get("/api/lemlist/campaigns/123?limit=10"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers().clone();
    assert_eq!(headers["access-control-allow-origin"], ALLOWED);
    assert_eq!(headers["vary"], "Origin");
    assert_eq!(headers["cache-control"], "public, max-age=60");
    assert_eq!(headers["content-type"], "application/json; charset=utf-8");
    assert_eq!(body_string(resp).await, r#"{"_id":"123"}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_404_is_relayed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/campaigns/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"msg":"not found"}"#)
        .create_async()
        .await;

    let handler = handler(format!("{}/api/", server.url()), Some("key"));
    let resp = handler
        .oneshot(get("/api/lemlist/campaigns/missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(resp).await, r#"{"msg":"not found"}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_utf8_body_is_relayed_byte_for_byte() {
    let latin1: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/export")
        .with_status(200)
        .with_header("content-type", "text/plain; charset=iso-8859-1")
        .with_body(latin1)
        .create_async()
        .await;

    let handler = handler(format!("{}/api/", server.url()), Some("key"));
    let resp = handler.oneshot(get("/api/lemlist/export")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "text/plain; charset=iso-8859-1"
    );
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(&bytes[..], latin1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_key_never_calls_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let handler = handler(format!("{}/api/", server.url()), None);
    let resp = handler.oneshot(get("/api/lemlist/team")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers()["access-control-allow-origin"], ALLOWED);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["error"], "LEMLIST_API_KEY missing");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Nothing listens on port 1.
    let handler = handler("http://127.0.0.1:1/api/".to_string(), Some("key"));
    let resp = handler.oneshot(get("/api/lemlist/team")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_preflight_from_unknown_origin() {
    let handler = handler("http://127.0.0.1:1/api/".to_string(), Some("key"));
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/lemlist/team")
        .header("Origin", "https://example.com")
        .body(Body::empty())
        .unwrap();

    let resp = handler.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "null");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(
        resp.headers()["access-control-allow-headers"],
        "Authorization, Content-Type, X-Requested-With"
    );
    assert_eq!(resp.headers()["access-control-max-age"], "86400");
    assert!(body_string(resp).await.is_empty());
}

#[tokio::test]
async fn test_post_is_rejected() {
    let handler = handler("http://127.0.0.1:1/api/".to_string(), Some("key"));
    let req = Request::builder()
        .method("POST")
        .uri("/api/lemlist/team")
        .body(Body::from("{}"))
        .unwrap();

    let resp = handler.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()["access-control-allow-origin"], "null");
    assert_eq!(body_string(resp).await, r#"{"error":"Method not allowed"}"#);
}

#[tokio::test]
async fn test_served_over_tcp() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/team")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let serving = tokio::spawn(serve_listener(
        listener,
        handler(format!("{}/api/", server.url()), Some("key")),
        async {
            let _ = stop_rx.await;
        },
    ));

    let resp = reqwest::get(format!("http://{}/api/lemlist/team", addr))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "null");
    assert_eq!(resp.text().await.unwrap(), "{}");
    mock.assert_async().await;

    stop_tx.send(()).unwrap();
    serving.await.unwrap().unwrap();
}
