//! URL coding subsystem.
//!
//! # Data Flow
//! ```text
//! Decode:
//!     RequestParameters (path below the mount + query)
//!     → hybrid.rs (page_info.rs: split off the page info token)
//!     → parameters.rs (named / indexed / mixed segments → PageParameters)
//!     → strategy.rs (page-map, listener callback → RequestTarget)
//!
//! Encode:
//!     RequestTarget
//!     → strategy.rs (matches_target check)
//!     → parameters.rs (PageParameters → path suffix + query)
//!     → hybrid.rs (page info token, trailing slashes)
//!     → URL
//! ```
//!
//! # Responsibilities
//! - The `UrlCodingStrategy` contract and its implementations
//! - The URL grammar: parameter segments, page info tokens, percent-encoding
//! - Classifying failures as client input, page expiry or programmer error
//!
//! # Design Decisions
//! - Strategies are pure: no I/O, no locking; page lookup goes through the
//!   `PageStore` passed to `decode`
//! - Parameter policies are an enum, composed into strategies rather than
//!   expressed as one strategy type per policy

pub mod encoding;
pub mod error;
pub mod hybrid;
pub mod package;
pub mod page_info;
pub mod parameters;
pub mod strategy;

pub use error::{CodingError, ErrorKind};
pub use hybrid::{ExpiredPagePolicy, HybridStrategy};
pub use package::PackageStrategy;
pub use page_info::{PageInfo, PageInfoCodec, PageInfoExtraction};
pub use parameters::{EncodedParameters, MixedParameters, ParameterEncoding};
pub use strategy::{BookmarkableStrategy, UrlCodingStrategy};
