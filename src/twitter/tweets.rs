//! Post operations for the Twitter API.
//!
//! This module submits posts (optionally as replies, optionally with media)
//! using the Twitter API v2.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{json, Value};

use crate::error::ThreadError;

use super::api::{send_request, TwitterClient};
use super::types::{CreatePostResponse, PostRequest};

/// Submits a post to Twitter/X using the API v2 endpoint.
///
/// The body is decoded into a [`CreatePostResponse`] whatever the status, so
/// the publisher can surface the platform's own error list. A non-success
/// status whose body carries no `errors` list is reported as a single error
/// holding the whole body (v2 answers 4xx with a problem document).
///
/// # Parameters
///
/// - `request`: Text plus optional reply-to and media ids
///
/// # Errors
///
/// This function fails only for transport problems or a body that is not JSON;
/// platform rejections are returned inside the response.
pub(crate) async fn create_post(
    client: &TwitterClient,
    request: &PostRequest,
) -> Result<CreatePostResponse, ThreadError> {
    match request.reply_to() {
        Some(reply_to) => info!(
            "Starting reply operation to post {} with text: '{}'",
            reply_to, request.text
        ),
        None => info!("Starting post operation for text: '{}'", request.text),
    }

    let url = format!("{}/2/tweets", client.api_base_url);
    debug!("Post payload: {}", serde_json::to_string_pretty(request)?);

    let request_builder = client
        .signed_request(Method::POST, &url, &[])?
        .header("Content-Type", "application/json")
        .json(request);

    let (status, response_text) = send_request(request_builder, "create_post").await?;

    let body: Value = match serde_json::from_str(&response_text) {
        Ok(body) => body,
        Err(e) if !status.is_success() => {
            warn!("Non-JSON error body for create_post ({}): {}", status, e);
            json!({ "errors": [{ "status": status.as_u16(), "detail": response_text }] })
        }
        Err(e) => return Err(e.into()),
    };

    let mut response = CreatePostResponse::from_value(body)?;
    if !status.is_success() && response.errors.is_empty() {
        response.errors.push(response.raw.clone());
    }
    Ok(response)
}
