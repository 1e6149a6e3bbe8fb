//! Single-target outbound requests.
//!
//! # Responsibilities
//! - Build the HTTP client shared by forwarders
//! - Build an independent outbound copy of an inbound request, rewritten
//!   to point at a fixed target
//!
//! # Design Decisions
//! - The inbound request head is only borrowed; the copy owns its headers
//! - Target path and request path are joined with a single slash; query
//!   strings are concatenated with `&`
//! - The outbound request always uses HTTP/1.1 framing chosen by the client
//! - `https` targets are reached over rustls with the webpki root store

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, request, HeaderValue, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::{Position, Url};

use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};

/// Client used for every outbound request, plain or TLS.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build a new HTTP/1.1 client for `http` and `https` targets.
pub fn new_client() -> HttpClient {
    let connector = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Build the URI a request for `original` takes on `target`.
pub fn join_uri(target: &Url, original: &Uri) -> Result<Uri, axum::http::Error> {
    let base = target.path();
    let path = original.path();
    let joined = match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    };

    let path_and_query = match (target.query().filter(|q| !q.is_empty()), original.query()) {
        (Some(a), Some(b)) if !b.is_empty() => format!("{}?{}&{}", joined, a, b),
        (Some(q), _) | (None, Some(q)) => format!("{}?{}", joined, q),
        (None, None) => joined,
    };

    let uri = Uri::builder()
        .scheme(target.scheme())
        .authority(&target[Position::BeforeHost..Position::AfterPort])
        .path_and_query(path_and_query)
        .build()?;
    Ok(uri)
}

/// Build the outbound copy of an inbound request for `target`.
///
/// Method, headers (minus hop-by-hop) and body are carried over; `Host`
/// becomes the target authority. `parts` is left untouched.
pub fn outbound_request(
    parts: &request::Parts,
    body: Body,
    target: &Url,
) -> Result<Request<Body>, axum::http::Error> {
    let uri = join_uri(target, &parts.uri)?;

    let mut headers = parts.headers.clone();
    strip_hop_by_hop(&mut headers);
    if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        append_forwarded_for(&mut headers, peer.ip());
    }
    if let Some(authority) = uri.authority() {
        if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
            headers.insert(header::HOST, host);
        }
    }

    let mut req = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(body)?;
    *req.headers_mut() = headers;
    Ok(req)
}
