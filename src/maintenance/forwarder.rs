//! Status-override forwarder.
//!
//! Relays a request to the maintenance service and pins the status code the
//! client sees to the configured maintenance status, whatever the service
//! answers. One attempt per request, bounded by a deadline on the response
//! head; no retries, no pooling policy beyond the client's defaults.

use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::{request, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use thiserror::Error;
use tower::{Service, ServiceExt};
use url::Url;

use crate::http::client::{new_client, outbound_request, HttpClient};
use crate::http::headers::strip_hop_by_hop;

/// Why a round trip to the maintenance service failed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build maintenance request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("maintenance service error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("maintenance service did not respond within {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Request(_) => "request",
            ForwardError::Transport(_) => "transport",
            ForwardError::Timeout(_) => "timeout",
        }
    }
}

/// Service decorator that commits a fixed status code on every response.
///
/// The status is written once, on the response head; headers and the
/// streaming body of the inner response pass through unchanged.
#[derive(Debug, Clone)]
pub struct OverrideStatus<S> {
    inner: S,
    status: StatusCode,
}

impl<S> OverrideStatus<S> {
    pub fn new(inner: S, status: StatusCode) -> Self {
        Self { inner, status }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for OverrideStatus<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let status = self.status;
        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await?;
            *response.status_mut() = status;
            Ok(response)
        })
    }
}

/// Forwards requests to one maintenance service under a fixed status code.
#[derive(Debug, Clone)]
pub struct StatusOverrideForwarder {
    target: Url,
    status: StatusCode,
    timeout: Duration,
    client: HttpClient,
}

impl StatusOverrideForwarder {
    pub fn new(target: Url, status: StatusCode, timeout: Duration) -> Self {
        Self {
            target,
            status,
            timeout,
            client: new_client(),
        }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Relay the request described by `parts` and `body`.
    ///
    /// `parts` is only read; the outbound request is an independent copy.
    pub async fn forward(
        &self,
        parts: &request::Parts,
        body: Body,
    ) -> Result<Response<Body>, ForwardError> {
        let req = outbound_request(parts, body, &self.target)?;
        let svc = OverrideStatus::new(self.client.clone(), self.status);

        let response = tokio::time::timeout(self.timeout, svc.oneshot(req))
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))??;

        let (mut head, body) = response.into_parts();
        strip_hop_by_hop(&mut head.headers);
        Ok(Response::from_parts(head, Body::new(body)))
    }
}
