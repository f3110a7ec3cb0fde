//! Error types.
//!
//! Nothing in the reveal path is fallible from the caller's point of view:
//! malformed envelopes fall back to plain text and duplicate claims are
//! no-ops. Errors only come from the edges: spawning actor threads and the
//! persistence collaborator that records revealed messages.

use crate::message::MessageId;
use thiserror::Error;

/// Errors returned by a [`RevealStore`](crate::actor::RevealStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the write (missing record, permission denied, ...).
    #[error("store rejected write: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS failed to spawn an actor thread.
    #[error("failed to spawn {name} thread")]
    Spawn {
        /// Thread name.
        name: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The notifier worker has shut down.
    #[error("notifier channel closed")]
    NotifierClosed,

    /// Marking a message revealed failed.
    #[error("failed to mark {id} revealed")]
    Store {
        /// The message that could not be marked.
        id: MessageId,
        /// Store failure.
        #[source]
        source: StoreError,
    },
}

/// Convenience alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
