//! Core Twitter API utilities.
//!
//! This module contains the [`PlatformApi`] trait the thread publisher and the
//! poll loop talk to, the [`TwitterClient`] that implements it over `reqwest`,
//! and the low-level helper that signs and sends requests.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, Method, StatusCode};

use crate::config::BotConfig;
use crate::error::ThreadError;
use crate::oauth::{build_oauth1_header, OAuth1Credentials};
use crate::thread::Attachment;

use super::types::{
    CreatePostResponse, PlatformUser, PostRequest, SearchedPost, UserLookupResponse,
};

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let truncated: String = sanitized.chars().take(max_len).collect();
        format!(
            "{}... [truncated, {} total bytes]",
            truncated,
            text.len()
        )
    } else {
        sanitized
    }
}

/// The vendor operations the bot depends on.
///
/// The production implementation is [`TwitterClient`]; tests provide
/// in-memory fakes. Implementations are shared read-only between the poll loop
/// and any one-shot publisher.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Searches recent posts matching `query`.
    async fn search_recent(&self, query: &str) -> Result<Vec<SearchedPost>, ThreadError>;

    /// Submits a post and returns the decoded response, including any error list.
    async fn create_post(&self, request: &PostRequest) -> Result<CreatePostResponse, ThreadError>;

    /// Uploads an attachment and returns the platform media id.
    async fn upload_media(&self, attachment: &Attachment) -> Result<String, ThreadError>;

    /// Looks a user up by username. `Ok(None)` when the user does not exist.
    async fn lookup_user(&self, username: &str) -> Result<Option<PlatformUser>, ThreadError>;
}

/// Twitter/X API client signing every request with OAuth 1.0a.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    pub(crate) http: Client,
    pub(crate) credentials: OAuth1Credentials,
    pub(crate) api_base_url: String,
    pub(crate) upload_base_url: String,
}

impl TwitterClient {
    /// Creates a client from the bot configuration.
    pub fn new(config: &BotConfig) -> Result<Self, ThreadError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            http,
            credentials: config.credentials.clone(),
            api_base_url: config.api_base_url.clone(),
            upload_base_url: config.upload_base_url.clone(),
        })
    }

    /// Builds a signed request.
    ///
    /// `query` is appended to the URL and included in the signature; request
    /// bodies (JSON, multipart) are attached by the caller and are not signed.
    pub(crate) fn signed_request(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::RequestBuilder, ThreadError> {
        let auth_header = build_oauth1_header(&self.credentials, method.as_str(), url, query)?;
        debug!("Request URL: {} {}", method, url);
        debug!("Request headers: Authorization: OAuth [REDACTED]");

        let mut builder = self
            .http
            .request(method, url)
            .header("Authorization", auth_header);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Ok(builder)
    }
}

/// Sends a request and returns the status and body, whatever the status.
///
/// Callers decide what a non-success status means for their endpoint.
pub(crate) async fn send_request(
    request_builder: reqwest::RequestBuilder,
    operation_name: &str,
) -> Result<(StatusCode, String), ThreadError> {
    info!("Sending request for operation: {}", operation_name);

    let response = request_builder.send().await?;
    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    let response_text = response.text().await?;
    if status.is_success() {
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
    } else {
        error!("Operation '{}' failed - Status: {}", operation_name, status);
        debug!(
            "Error response for '{}': {}",
            operation_name,
            sanitize_for_logging(&response_text, 200)
        );
    }

    Ok((status, response_text))
}

/// Sends a request to a read endpoint, turning any non-success status into
/// [`ThreadError::Api`].
pub(crate) async fn make_authenticated_request(
    request_builder: reqwest::RequestBuilder,
    operation_name: &'static str,
) -> Result<String, ThreadError> {
    let (status, response_text) = send_request(request_builder, operation_name).await?;
    if status.is_success() {
        info!("Operation '{}' completed successfully", operation_name);
        Ok(response_text)
    } else {
        Err(ThreadError::Api {
            operation: operation_name,
            status: status.as_u16(),
        })
    }
}

/// Looks up a user by username using the Twitter API v2.
///
/// # Returns
///
/// - `Ok(Some(user))`: User information if found
/// - `Ok(None)`: If the user does not exist
/// - `Err(ThreadError)`: If the API request fails
pub(crate) async fn lookup_user_by_username(
    client: &TwitterClient,
    username: &str,
) -> Result<Option<PlatformUser>, ThreadError> {
    info!("Looking up user by username: {}", username);

    let url = format!(
        "{}/2/users/by/username/{}",
        client.api_base_url,
        urlencoding::encode(username)
    );
    let request_builder = client.signed_request(Method::GET, &url, &[])?;

    let (status, response_text) = send_request(request_builder, "lookup_user").await?;
    if status == StatusCode::NOT_FOUND {
        warn!("User {} not found", username);
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ThreadError::Api {
            operation: "lookup_user",
            status: status.as_u16(),
        });
    }

    let lookup: UserLookupResponse = serde_json::from_str(&response_text)?;
    match lookup.data {
        Some(user) => {
            info!("Found user {}: {} (@{})", user.id, user.name, user.username);
            Ok(Some(user))
        }
        None => {
            warn!("User {} not found", username);
            Ok(None)
        }
    }
}

#[async_trait]
impl PlatformApi for TwitterClient {
    async fn search_recent(&self, query: &str) -> Result<Vec<SearchedPost>, ThreadError> {
        super::search::search_recent(self, query).await
    }

    async fn create_post(&self, request: &PostRequest) -> Result<CreatePostResponse, ThreadError> {
        super::tweets::create_post(self, request).await
    }

    async fn upload_media(&self, attachment: &Attachment) -> Result<String, ThreadError> {
        super::media::upload_media(self, attachment).await
    }

    async fn lookup_user(&self, username: &str) -> Result<Option<PlatformUser>, ThreadError> {
        lookup_user_by_username(self, username).await
    }
}
