//! Correlation ids for HTTP requests.
//!
//! Every request gets an `x-request-id`: the caller's own when it sent a usable one, a fresh
//! uuid otherwise. The id is echoed on the response, tagged onto the access log lines and
//! handed to handlers through the [`RequestId`] extractor.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use std::{fmt, time::Instant};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client ids longer than this are replaced
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the request being handled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Take the caller's id if it is printable and short enough, else mint one.
    fn resolve(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN);

        match supplied {
            Some(id) => Self(id.to_owned()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    /// Only fails on routes mounted outside [`request_id_middleware`].
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}

/// Tag the request with its [`RequestId`], log it and count it in the HTTP metrics.
///
/// ```no_run
/// use axum::{Router, middleware, routing::get};
/// use cf_server::api::request_id::{RequestId, request_id_middleware};
///
/// let app: Router = Router::new()
///     .route("/", get(|id: RequestId| async move { id.to_string() }))
///     .layer(middleware::from_fn(request_id_middleware));
/// ```
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::resolve(request.headers());
    let method = request.method().clone();

    tracing::debug!(
        request_id = %request_id,
        %method,
        uri = %request.uri(),
        "Request started"
    );

    request.extensions_mut().insert(request_id.clone());
    let started = Instant::now();
    let mut response = next.run(request).await;

    // Ids come from a visible-ASCII header or a uuid, so this only fails on a bug
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        %method,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );
    crate::metrics::http_requests_total(method.as_str(), status.as_u16());

    response
}
