use crate::{errors::ApiError, state::AppState};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use kdc_proxy_application::use_cases::ProxyReply;
use kdc_proxy_domain::ServiceKind;
use tracing::instrument;

const KERBEROS_CONTENT_TYPE: &str = "application/kerberos";

#[instrument(skip_all, name = "api_proxy_kdc")]
pub async fn proxy_kdc(State(state): State<AppState>, body: Bytes) -> Response {
    proxy(&state, ServiceKind::Kdc, &body).await
}

#[instrument(skip_all, name = "api_proxy_kpasswd")]
pub async fn proxy_kpasswd(State(state): State<AppState>, body: Bytes) -> Response {
    proxy(&state, ServiceKind::Kpasswd, &body).await
}

async fn proxy(state: &AppState, service: ServiceKind, body: &[u8]) -> Response {
    match state.handle_proxy.execute(service, body).await {
        ProxyReply::Success(reply) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(KERBEROS_CONTENT_TYPE),
            )],
            reply,
        )
            .into_response(),
        ProxyReply::ClientError(e) | ProxyReply::ServerError(e) => ApiError(e).into_response(),
    }
}
