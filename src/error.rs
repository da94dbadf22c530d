//! Error taxonomy (SPEC_FULL.md §7). Grounded on `GenericError` here and on
//! `decider.rs`'s `DeciderError`: plain structs implementing
//! `std::error::Error` + `Display`, no `thiserror`/`anyhow` (the teacher's
//! dependency table carries neither).

use std::fmt::Display;

/// Malformed transition table, inconsistent (state, symbol) counts,
/// out-of-range symbol/state in a transition. Fatal at startup; no partial
/// state is emitted.
#[derive(Debug, Clone)]
pub struct InputError {
    message: String,
}

impl InputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::error::Error for InputError {}

impl Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input error: {}", self.message)
    }
}

/// Allocation failure for the work stack, tape, or proof maps. Fatal; the
/// worker attempts to flush its stack snapshot before exit (`engine.rs`).
#[derive(Debug, Clone)]
pub struct ResourceError {
    message: String,
}

impl ResourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::error::Error for ResourceError {}

impl Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resource error: {}", self.message)
    }
}

/// Union of the fatal error kinds an enumeration run can terminate with.
/// Budget exhaustion and detected-infinite outcomes are not errors (they are
/// `outcome.rs` values); only genuinely exceptional conditions construct
/// this type.
#[derive(Debug, Clone)]
pub enum EnumerationError {
    Input(InputError),
    Resource(ResourceError),
    Io(String),
}

impl std::error::Error for EnumerationError {}

impl Display for EnumerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumerationError::Input(e) => write!(f, "{e}"),
            EnumerationError::Resource(e) => write!(f, "{e}"),
            EnumerationError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl From<InputError> for EnumerationError {
    fn from(e: InputError) -> Self {
        EnumerationError::Input(e)
    }
}

impl From<ResourceError> for EnumerationError {
    fn from(e: ResourceError) -> Self {
        EnumerationError::Resource(e)
    }
}

impl From<std::io::Error> for EnumerationError {
    fn from(e: std::io::Error) -> Self {
        EnumerationError::Io(e.to_string())
    }
}
