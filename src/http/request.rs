//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID request id for every inbound request
//! - Expose the id to the trace span and echo it on the response
//! - Read the request facts the mounts cannot see in the URL (AJAX, a listener
//!   callback sent as a header)
//!
//! # Design Decisions
//! - A client-supplied `x-request-id` is kept, not replaced
//! - Request id added as early as possible for tracing

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Listener callback token for the page addressed by the URL.
pub const X_UI_INTERFACE: HeaderName = HeaderName::from_static("x-ui-interface");

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request id header of `request`, or `-`.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

/// Whether the request was sent by client-side script.
pub fn is_ajax<B>(request: &Request<B>) -> bool {
    request
        .headers()
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Raw `x-ui-interface` token, if the client sent one.
pub fn interface_header<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(&X_UI_INTERFACE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_uuid() {
        let request = Request::new(());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }

    #[test]
    fn test_request_id_header() {
        let request = Request::builder()
            .header("x-request-id", "abc")
            .body(())
            .unwrap();
        assert_eq!(request_id(&request), "abc");
        assert_eq!(request_id(&Request::new(())), "-");
    }

    #[test]
    fn test_ajax_detection() {
        let request = Request::builder()
            .header("X-Requested-With", "XMLHttpRequest")
            .body(())
            .unwrap();
        assert!(is_ajax(&request));
        assert!(!is_ajax(&Request::new(())));
    }

    #[test]
    fn test_interface_header() {
        let request = Request::builder()
            .header("x-ui-interface", ":link:0:ILinkListener::")
            .body(())
            .unwrap();
        assert_eq!(interface_header(&request), Some(":link:0:ILinkListener::"));
        assert_eq!(interface_header(&Request::new(())), None);
    }
}
