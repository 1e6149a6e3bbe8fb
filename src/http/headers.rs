//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Append X-Forwarded-For when the peer address is known
//! - Stamp maintenance-mode response headers
//!
//! # Design Decisions
//! - Names listed in `Connection` are treated as hop-by-hop too
//! - Maintenance headers are inserted, replacing any upstream value

use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// `X-Maintenance-Mode` response header.
pub const X_MAINTENANCE_MODE: HeaderName = HeaderName::from_static("x-maintenance-mode");

/// `X-Forwarded-For` request header.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Seconds clients are told to wait before retrying.
pub const RETRY_AFTER_SECS: &str = "3600";

/// Value of `Cache-Control` on file and inline maintenance responses.
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Append the peer address to `X-Forwarded-For`.
pub fn append_forwarded_for(headers: &mut HeaderMap, peer: IpAddr) {
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, peer),
        None => peer.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Mark a response as a maintenance response.
pub fn stamp_maintenance(headers: &mut HeaderMap) {
    headers.insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
    headers.insert(X_MAINTENANCE_MODE, HeaderValue::from_static("true"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-session"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session", HeaderValue::from_static("abc"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "text/html");
    }

    #[test]
    fn test_append_forwarded_for() {
        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, "10.0.0.1".parse().unwrap());
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "10.0.0.1");

        append_forwarded_for(&mut headers, "10.0.0.2".parse().unwrap());
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "10.0.0.1, 10.0.0.2");
    }

    #[test]
    fn test_stamp_maintenance_replaces_upstream_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("5"));

        stamp_maintenance(&mut headers);

        assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "3600");
        assert_eq!(headers.get(&X_MAINTENANCE_MODE).unwrap(), "true");
    }
}
