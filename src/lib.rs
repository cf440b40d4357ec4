//! Page mounts: bookmarkable and hybrid URL coding for server-side page
//! instances.
//!
//! A mount table maps path prefixes to URL coding strategies. Each strategy
//! turns an inbound URL into a request target (construct a page, resume a
//! stored one, invoke a listener) and turns targets back into URLs.

// URL coding core
pub mod coding;
pub mod page;
pub mod request;
pub mod routing;

// Hosting
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use coding::{CodingError, HybridStrategy, UrlCodingStrategy};
pub use config::schema::MountsConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{MountRegistry, MountTable};
