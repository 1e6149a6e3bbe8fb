//! Pass-through to the real service.
//!
//! Requests that bypass maintenance mode land here and are relayed to the
//! single configured upstream. There is no balancing and no retry; an
//! upstream failure is answered with 502.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::http::client::{new_client, outbound_request, HttpClient};
use crate::http::headers::strip_hop_by_hop;

/// The service behind the warden.
#[derive(Debug, Clone)]
pub struct Upstream {
    target: Url,
    client: HttpClient,
}

impl Upstream {
    pub fn new(target: Url) -> Self {
        Self {
            target,
            client: new_client(),
        }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }
}

/// Fallback handler forwarding every request to the upstream.
pub async fn proxy_handler(
    State(upstream): State<Arc<Upstream>>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();

    tracing::debug!(
        method = %parts.method,
        path = %parts.uri.path(),
        "Proxying request"
    );

    let req = match outbound_request(&parts, body, &upstream.target) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build upstream request");
            return (StatusCode::BAD_REQUEST, "Invalid request").into_response();
        }
    };

    match upstream.client.request(req).await {
        Ok(response) => {
            tracing::debug!(
                status = %response.status(),
                elapsed = ?start_time.elapsed(),
                "Upstream responded"
            );
            let (mut head, body) = response.into_parts();
            strip_hop_by_hop(&mut head.headers);
            Response::from_parts(head, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream.target, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
