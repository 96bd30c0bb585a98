use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kdc_proxy_domain::DomainError;

/// Failure returned to the HTTP client. Bodies stay generic; the details are
/// logged by the use case.
pub struct ApiError(pub DomainError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, "Malformed request")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
        };

        (status, message).into_response()
    }
}
