//! Post search functionality for the Twitter API.
//!
//! This module queries the v2 recent search endpoint for posts matching the
//! bot's keyword.

use log::{debug, info};
use reqwest::Method;

use crate::error::ThreadError;

use super::api::{make_authenticated_request, sanitize_for_logging, TwitterClient};
use super::types::{SearchResponse, SearchedPost};

/// Searches recent posts matching `query` using the Twitter API v2.
///
/// The request asks for `author_id` on every post and expands the author
/// objects, mirroring what the bot logs about each match.
///
/// # Returns
///
/// - `Ok(Vec<SearchedPost>)`: The matching posts, newest first; empty when nothing matched
/// - `Err(ThreadError)`: Network failure, non-success status, or an undecodable body
pub(crate) async fn search_recent(
    client: &TwitterClient,
    query: &str,
) -> Result<Vec<SearchedPost>, ThreadError> {
    info!("Starting recent search for query: '{}'", query);

    let url = format!("{}/2/tweets/search/recent", client.api_base_url);
    let params = [
        ("query", query),
        ("tweet.fields", "author_id"),
        ("expansions", "author_id"),
    ];
    let request_builder = client.signed_request(Method::GET, &url, &params)?;

    let response_text = make_authenticated_request(request_builder, "search_recent").await?;
    debug!("Search response: {} bytes received", response_text.len());

    let search: SearchResponse = serde_json::from_str(&response_text)?;
    if search.data.is_empty() {
        info!("No posts found for query '{}'", query);
    } else {
        info!("Found {} posts for query '{}'", search.data.len(), query);
        for (i, post) in search.data.iter().enumerate() {
            debug!(
                "Post {} (ID: {}, author: {}): {}",
                i + 1,
                post.id,
                post.author_id.as_deref().unwrap_or("unknown"),
                sanitize_for_logging(&post.text, 140)
            );
        }
    }

    Ok(search.data)
}
