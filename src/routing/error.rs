//! Mount configuration errors.
//!
//! All of these are programmer errors: they are raised while the mount table
//! is built and abort startup (or reject a reload).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("mount path cannot be empty")]
    EmptyPath,

    #[error("mount path `/` is reserved for the home page")]
    HomePath,

    #[error("mount path `{0}` is under the reserved `resources` segment")]
    ReservedPath(String),

    #[error("`{0}` is already mounted")]
    AlreadyMounted(String),

    #[error("nothing is mounted at `{0}`")]
    NotMounted(String),

    #[error("mixed parameter mounts need at least one parameter name")]
    NoParameterNames,

    #[error("parameter names cannot be empty")]
    EmptyParameterName,

    #[error("parameter name `{0}` is declared twice")]
    DuplicateParameterName(String),

    #[error("invalid page info separators `{begin}` / `{end}`")]
    InvalidSeparator { begin: String, end: String },

    #[error("page type `{0}` is not registered")]
    UnknownPage(String),

    #[error("package mount `{0}` needs a package name")]
    MissingPackage(String),

    #[error("package `{0}` has no registered pages")]
    EmptyPackage(String),

    #[error("mount `{path}` does not support option `{option}`")]
    UnsupportedOption { path: String, option: &'static str },
}
