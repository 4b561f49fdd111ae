//! Error types for composing and publishing threads.

use thiserror::Error;

use crate::thread::SessionState;

/// Errors that can occur while composing, resolving attachments for, or
/// publishing a thread, and while talking to the Twitter API.
///
/// Every variant is fatal to the current publish run. Nothing is retried.
#[derive(Debug, Error)]
pub enum ThreadError {
    /// The batch cannot form a thread (too few messages, a post too long,
    /// unknown mention user).
    #[error("Invalid thread: {0}")]
    Validation(String),

    /// Downloading linked content failed.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Linked content was downloaded but is not a valid image.
    #[error("Content at {url} is not a valid image: {reason}")]
    Decode { url: String, reason: String },

    /// The media endpoint answered with a non-success status.
    #[error("Media upload failed ({status}): {body}")]
    Upload { status: u16, body: String },

    /// A success response is missing a field we rely on.
    #[error("Malformed {endpoint} response: missing `{field}`")]
    MalformedResponse {
        endpoint: &'static str,
        field: &'static str,
    },

    /// The platform rejected a post. Carries the first reported error as sent.
    #[error("Error in posting thread: {0}")]
    PostRejected(serde_json::Value),

    /// The session has already been published (or is being published).
    #[error("Thread already {0}; create a new session to send more")]
    AlreadySent(SessionState),

    /// A read endpoint (search, user lookup) answered with a non-success status.
    #[error("Twitter API error for operation '{operation}' ({status})")]
    Api { operation: &'static str, status: u16 },

    /// Request signing failed.
    #[error("Failed to sign request: {0}")]
    Auth(String),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failure (output file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
