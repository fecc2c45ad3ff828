//! Lets clients that can only send `POST` reach the `PUT` and `DELETE` routes.
//!
//! The real verb may come from the `X-HTTP-Method`, `X-HTTP-Method-Override`
//! or `X-Method-Override` headers, a `_method` query parameter, or a
//! `_method` field of a JSON object body. Sources are read in that order and
//! the last valid one wins. This must wrap the router, not be layered onto
//! it, so the rewritten method takes part in routing.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body::{LengthLimitError, Limited};
use tracing::{debug, warn};

use crate::error::ApiError;

pub const HEADERS: [&str; 3] = ["x-http-method", "x-http-method-override", "x-method-override"];
pub const FIELD: &str = "_method";
/// Largest JSON body buffered here; matches the `Json` extractor's default.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

const ALLOWED: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

fn parse_method(value: &str) -> Option<Method> {
    let upper = value.trim().to_ascii_uppercase();
    ALLOWED.into_iter().find(|m| m.as_str() == upper)
}

fn from_headers(headers: &HeaderMap) -> Option<Method> {
    HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_method)
        .last()
}

fn from_query(query: Option<&str>) -> Option<Method> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == FIELD)
        .filter_map(|(_, value)| parse_method(value))
        .last()
}

fn from_body(bytes: &Bytes) -> Option<Method> {
    let value = serde_json::from_slice::<serde_json::Value>(bytes).ok()?;
    value.get(FIELD)?.as_str().and_then(parse_method)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false)
}

pub async fn method_override(request: Request<Body>, next: Next<Body>) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let mut method = from_headers(&parts.headers);
    if let Some(m) = from_query(parts.uri.query()) {
        method = Some(m);
    }

    let body = if is_json(&parts.headers) {
        let bytes = match hyper::body::to_bytes(Limited::new(body, BODY_LIMIT)).await {
            Ok(bytes) => bytes,
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(limit = BODY_LIMIT, "request body too large");
                return ApiError::TooLarge.into_response();
            }
            Err(e) => {
                warn!(error = %e, "failed to buffer request body");
                return ApiError::Validation(e.to_string()).into_response();
            }
        };
        if let Some(m) = from_body(&bytes) {
            method = Some(m);
        }
        Body::from(bytes)
    } else {
        body
    };

    if let Some(method) = method {
        debug!(%method, path = %parts.uri.path(), "method overridden");
        parts.method = method;
    }
    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("put"), Some(Method::PUT));
        assert_eq!(parse_method(" Delete "), Some(Method::DELETE));
        assert_eq!(parse_method("BREW"), None);
    }

    #[test]
    fn test_last_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-http-method", "PUT".parse().unwrap());
        headers.insert("x-method-override", "DELETE".parse().unwrap());
        assert_eq!(from_headers(&headers), Some(Method::DELETE));

        headers.insert("x-method-override", "nonsense".parse().unwrap());
        assert_eq!(from_headers(&headers), Some(Method::PUT));
    }

    #[test]
    fn test_from_query() {
        assert_eq!(from_query(Some("a=1&_method=delete")), Some(Method::DELETE));
        assert_eq!(from_query(Some("method=delete")), None);
        assert_eq!(from_query(None), None);
    }

    #[test]
    fn test_from_body() {
        assert_eq!(
            from_body(&Bytes::from_static(br#"{"_method":"PUT","Nome":"Ana"}"#)),
            Some(Method::PUT)
        );
        assert_eq!(from_body(&Bytes::from_static(br#"{"Nome":"Ana"}"#)), None);
        assert_eq!(from_body(&Bytes::from_static(b"[1,2]")), None);
    }
}
