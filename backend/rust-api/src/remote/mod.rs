//! Calls into peer services.
//!
//! A [`RemoteClient`] talks to exactly one named peer. The peer's address is
//! looked up through an injected [`ServiceResolver`] on every call, and every
//! response is translated into a typed result or a [`RemoteError`].

pub mod client;
pub mod peers;
pub mod resolver;

pub use client::RemoteClient;
pub use peers::{
    AuthPeer, CategoryPeer, HttpAuthPeer, HttpCategoryPeer, HttpQuestionPeer, HttpQuizPeer,
    HttpRegistrationPeer, QuestionPeer, QuizPeer, RegistrationPeer,
};
pub use resolver::{ServiceResolver, StaticResolver};

/// Message used when a failing peer does not say what went wrong.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error occurred!! please try again.";

/// Outcome of a failed peer call.
///
/// `NotFound` and `Unavailable` are kept apart so callers can tell a missing
/// record from a peer that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The peer answered 404 or 500.
    #[error("{service}: {message}")]
    NotFound { service: String, message: String },

    /// Transport failure, unresolvable peer name, or an unmapped status.
    #[error("{service} is unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    /// The peer answered 2xx with a body that does not fit the expected shape.
    #[error("{service} returned an undecodable response: {reason}")]
    Decode { service: String, reason: String },
}

impl RemoteError {
    pub fn outcome(&self) -> &'static str {
        match self {
            RemoteError::NotFound { .. } => "not_found",
            RemoteError::Unavailable { .. } => "unavailable",
            RemoteError::Decode { .. } => "decode_error",
        }
    }
}
