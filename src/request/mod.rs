//! Request model shared by the coding strategies.
//!
//! # Data Flow
//! ```text
//! Inbound URL (path + query)
//!     → parameters.rs (RequestParameters)
//!     → strategy decode
//!     → target.rs (RequestTarget)
//!
//! Link rendering:
//!     RequestTarget
//!     → strategy encode
//!     → URL string
//! ```

pub mod interface;
pub mod page_parameters;
pub mod parameters;
pub mod target;

pub use interface::InterfaceParameter;
pub use page_parameters::{PageParameters, ParamValue};
pub use parameters::RequestParameters;
pub use target::{
    BookmarkablePageTarget, HybridOptions, ListenerInterfaceTarget, RequestTarget,
    StatelessListenerTarget,
};

/// Parameter carrying a listener callback token.
pub const INTERFACE_PARAMETER_NAME: &str = "ui:interface";

/// Parameter carrying a page-map name in named and indexed URLs.
pub const PAGE_MAP_PARAMETER_NAME: &str = "ui:pageMapName";

/// Interface that re-renders an existing page instance.
pub const REDIRECT_LISTENER: &str = "IRedirectListener";
