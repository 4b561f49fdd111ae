//! # Threadcast Library
//!
//! A bot that polls the Twitter/X recent search API for a keyword, cleans the
//! matching posts, and republishes them as a thread: a chain of posts where
//! each one replies to the previous, numbered `1/`, `2/`, ... `nx`. Links to
//! images inside a post are downloaded and attached as media.
//!
//! ## Features
//!
//! - Thread composer with mention prefix, position markers and all-or-nothing length checks
//! - Image attachments resolved from links and uploaded before their post
//! - One-shot thread sessions with an explicit state machine
//! - OAuth 1.0a User Context signing for every request
//! - Cancellable poll loop with a health/status HTTP surface
//! - Structured logging
//!
//! ## Configuration
//!
//! The following environment variables are required (a `.env` file is honored):
//! - `CONSUMER_KEY`, `CONSUMER_SECRET`, `ACCESS_TOKEN_KEY`, `ACCESS_TOKEN_SECRET`
//! - `SEARCH_KEYWORD`
//!
//! Optional: `HASH_TAGS` (pipe-delimited), `MENTION_USER`,
//! `APPEND_POSITION_MARKER`, `MAX_CHARS`, `POST_DELAY_SECS`,
//! `POLL_INTERVAL_SECS`, `HTTP_TIMEOUT_SECS`, `OUTPUT_FILE`, `PORT`.
//!
//! ## API Endpoints
//!
//! - `GET /`: Returns a banner
//! - `GET /health`: Returns service health status
//! - `GET /status`: Returns the outcome of the last poll cycle

pub mod config;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod poller;
pub mod sanitizer;
pub mod thread;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{get_server_port, BotConfig};
pub use error::ThreadError;
pub use handlers::{handle_health, handle_root, handle_status};
pub use oauth::{build_oauth1_header, OAuth1Credentials};
pub use poller::{CycleReport, PollSettings, PollStatus, Poller, SharedStatus};
pub use thread::{
    compose, Attachment, AttachmentResolver, ComposeOptions, ComposedPost, PublishedPost,
    SessionState, ThreadSession,
};
pub use twitter::{PlatformApi, PostRequest, TwitterClient};

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;
