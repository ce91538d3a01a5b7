//! Bridge usage errors.

use thiserror::Error;

/// Returned when a bridge entry point is used outside the window in which it
/// is valid. Lookup misses (unknown channel, unknown entity id) are never
/// errors; they degrade to empty results by design of the host surface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// The bridge has not been bound to an engine yet.
    #[error("bridge is not initialized")]
    NotInitialized,

    /// A second `initialize` call on an already-bound bridge.
    #[error("bridge is already initialized")]
    AlreadyInitialized,

    /// The bridge was shut down; it cannot be revived.
    #[error("bridge is torn down")]
    TornDown,
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
