//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request id, AJAX detection, callback header)
//!     → dispatch.rs (mount table decode → page creation or resume)
//!     → response.rs (Outcome → status, JSON body, Location)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{ListenerView, Outcome, PageView, RequestCycle};
pub use request::{UuidRequestId, X_REQUEST_ID, X_UI_INTERFACE};
pub use server::{AppState, HttpServer};
