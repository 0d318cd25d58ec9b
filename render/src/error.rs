//! Shared status type.
//!
//! Every fallible operation in the command stream, the resource
//! registries and the shader front-end reports through this one enum.
//! The message is the sole diagnostic surface: it is a complete,
//! human-readable sentence naming the offending resource or range.

use thiserror::Error;

/// Failure kinds surfaced by command execution, resource registration
/// and the shader front-end.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A named shader module or program is not present in its registry.
    #[error("unknown name: {0}")]
    UnknownName(String),
    /// A referenced buffer or vertex specification is not registered.
    #[error("unknown source: {0}")]
    UnknownSource(String),
    /// The referenced resource exists but is not in a usable state.
    #[error("broken source: {0}")]
    BrokenSource(String),
    /// A requested range does not fit inside the target buffer.
    #[error("range overflow: {0}")]
    RangeOverflow(String),
    /// The requested value or API has no mapping on this backend.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// The GPU driver or the shader compiler reported a failure.
    #[error("backend failure: {0}")]
    BackendFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
