//! Twitter/X API integration module.
//!
//! This module contains the client for the Twitter/X API endpoints the bot
//! uses (recent search, post creation, media upload, user lookup), all signed
//! with OAuth 1.0a User Context credentials.

mod api;
mod media;
mod search;
mod tweets;
mod types;


// Re-export public API
pub use api::{PlatformApi, TwitterClient};
pub use types::{
    CreatePostResponse, CreatedPost, MediaSettings, PlatformUser, PostRequest, ReplySettings,
    SearchedPost,
};

// Crate-internal re-exports
pub(crate) use api::sanitize_for_logging;
