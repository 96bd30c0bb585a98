use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use kdc_proxy_api::{create_api_routes, AppState};
use kdc_proxy_application::{
    ports::{KdcTransport, RealmProvider},
    services::{ResolverChain, TransportDispatcher},
    use_cases::HandleProxyRequestUseCase,
};
use kdc_proxy_domain::{DomainError, EnvelopeCodec, ProxyMessage, ServerSpec, ServiceKind};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const MAX_REQUEST_SIZE: usize = 4096;

struct SingleRealm;

#[async_trait]
impl RealmProvider for SingleRealm {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        if realm != "EXAMPLE.COM" {
            return Ok(vec![]);
        }
        let host = match service {
            ServiceKind::Kdc => "kdc.internal.example.com",
            ServiceKind::Kpasswd => "kpasswd.internal.example.com",
        };
        Ok(vec![ServerSpec::tcp(host, None)])
    }
}

/// Echoes the request back, or refuses every exchange when `down`.
struct EchoTransport {
    down: bool,
    seen: Mutex<Vec<(String, ServiceKind)>>,
}

#[async_trait]
impl KdcTransport for EchoTransport {
    async fn exchange(
        &self,
        server: &ServerSpec,
        service: ServiceKind,
        message: &[u8],
        _timeout: Duration,
    ) -> Result<Bytes, DomainError> {
        self.seen
            .lock()
            .unwrap()
            .push((server.host.to_string(), service));
        if self.down {
            return Err(DomainError::TransportConnectionRefused {
                server: server.to_string(),
            });
        }
        let mut reply = b"REP:".to_vec();
        reply.extend_from_slice(message);
        Ok(Bytes::from(reply))
    }
}

fn create_app(down: bool) -> (Router, Arc<EchoTransport>) {
    let transport = Arc::new(EchoTransport {
        down,
        seen: Mutex::new(Vec::new()),
    });
    let chain = ResolverChain::new(vec![Arc::new(SingleRealm) as Arc<dyn RealmProvider>]);
    let dispatcher = TransportDispatcher::new(transport.clone(), Duration::from_millis(100));
    let use_case = HandleProxyRequestUseCase::new(Arc::new(chain), Arc::new(dispatcher));

    let state = AppState {
        handle_proxy: Arc::new(use_case),
        max_request_size: MAX_REQUEST_SIZE,
    };
    (create_api_routes(state), transport)
}

fn envelope(realm: &str) -> Vec<u8> {
    EnvelopeCodec::encode_message(&ProxyMessage::new(&b"AS-REQ"[..]).with_realm(realm))
        .unwrap()
        .to_vec()
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/kerberos")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn test_proxy_kdc_returns_wrapped_reply() {
    let (app, transport) = create_app(false);

    let response = app.oneshot(post("/KdcProxy", envelope("EXAMPLE.COM"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/kerberos"
    );
    let body = body_bytes(response).await;
    let decoded = EnvelopeCodec::decode(&body).unwrap();
    assert_eq!(&decoded.kerberos_message[..], b"REP:AS-REQ");
    assert_eq!(
        transport.seen.lock().unwrap()[0],
        ("kdc.internal.example.com".to_string(), ServiceKind::Kdc)
    );
}

#[tokio::test]
async fn test_proxy_kpasswd_route_selects_kpasswd_service() {
    let (app, transport) = create_app(false);

    let response = app
        .oneshot(post("/KdcProxy/kpasswd", envelope("EXAMPLE.COM")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        transport.seen.lock().unwrap()[0],
        ("kpasswd.internal.example.com".to_string(), ServiceKind::Kpasswd)
    );
}

#[tokio::test]
async fn test_proxy_malformed_body_is_bad_request() {
    let (app, transport) = create_app(false);

    let response = app
        .oneshot(post("/KdcProxy", b"\x30\x10garbage".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_proxy_empty_body_is_bad_request() {
    let (app, _) = create_app(false);

    let response = app.oneshot(post("/KdcProxy", Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_unknown_realm_is_unavailable() {
    let (app, _) = create_app(false);

    let response = app
        .oneshot(post("/KdcProxy", envelope("NOPE.EXAMPLE")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_proxy_unreachable_backend_hides_addresses() {
    let (app, _) = create_app(true);

    let response = app.oneshot(post("/KdcProxy", envelope("EXAMPLE.COM"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_bytes(response).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("internal.example.com"));
}

#[tokio::test]
async fn test_proxy_rejects_oversized_body() {
    let (app, transport) = create_app(false);

    let response = app
        .oneshot(post("/KdcProxy", vec![0u8; MAX_REQUEST_SIZE + 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(transport.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_proxy_get_is_method_not_allowed() {
    let (app, _) = create_app(false);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/KdcProxy")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_app(false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}
