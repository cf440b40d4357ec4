//! Outcome → HTTP response.
//!
//! | Outcome  | Status | Body             |
//! |----------|--------|------------------|
//! | Render   | 200    | page view JSON   |
//! | Redirect | 302    | `Location` header |
//! | NotFound | 404    | error JSON       |
//! | Expired  | 410    | error JSON       |
//! | Error    | 500    | error JSON       |

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::dispatch::Outcome;

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Render(_) => StatusCode::OK,
            Outcome::Redirect(_) => StatusCode::FOUND,
            Outcome::NotFound(_) => StatusCode::NOT_FOUND,
            Outcome::Expired(_) => StatusCode::GONE,
            Outcome::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Outcome::Render(view) => (status, Json(*view)).into_response(),
            Outcome::Redirect(location) => (status, [(header::LOCATION, location)]).into_response(),
            Outcome::NotFound(message) | Outcome::Expired(message) | Outcome::Error(message) => {
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_response() {
        let response = Outcome::Redirect("/wizard.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/wizard.3");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(Outcome::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Outcome::Expired(String::new()).status(), StatusCode::GONE);
        assert_eq!(
            Outcome::Error(String::new()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
