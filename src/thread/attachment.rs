//! Image attachments taken from links inside a post's text.
//!
//! A post whose first link points at an image (judged by the path's file
//! extension) gets that image downloaded, checked, and uploaded as media; the
//! link itself is then dropped from the text.

use log::{debug, info};
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use crate::error::ThreadError;

/// File extensions treated as image links.
pub const IMAGE_SUFFIXES: [&str; 4] = [".gif", ".jpg", ".jpeg", ".png"];

/// Filename used when the URL path has no final segment.
const FALLBACK_FILENAME: &str = "attachment";

/// An image downloaded from a link, ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The link exactly as it appears in the post text
    pub source_url: String,
    /// Last segment of the URL path
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("source_url", &self.source_url)
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Returns the first `http://` or `https://` link in `text`, up to the next whitespace.
pub fn find_link(text: &str) -> Option<&str> {
    let re = Regex::new(r"https?://\S+").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// Whether the link's path ends with one of [`IMAGE_SUFFIXES`] (case-insensitive).
pub fn is_image_link(link: &str) -> bool {
    let path = match url::Url::parse(link) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => link.to_lowercase(),
    };
    IMAGE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Derives the upload filename from the URL's path component.
pub fn filename_from_url(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Finds, downloads and validates image attachments.
#[derive(Debug, Clone)]
pub struct AttachmentResolver {
    http: Client,
}

impl AttachmentResolver {
    /// Creates a resolver whose downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ThreadError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Creates a resolver over an existing HTTP client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Resolves the image attachment referenced by `text`, if any.
    ///
    /// Text without a link, or whose first link is not an image link, yields
    /// `Ok(None)` without any network traffic.
    ///
    /// # Errors
    ///
    /// - [`ThreadError::Fetch`]: the download failed or returned a non-success status
    /// - [`ThreadError::Decode`]: the downloaded bytes are not a valid image
    pub async fn resolve(&self, text: &str) -> Result<Option<Attachment>, ThreadError> {
        let Some(link) = find_link(text) else {
            return Ok(None);
        };
        if !is_image_link(link) {
            debug!("Link {} is not an image link, posting it as text", link);
            return Ok(None);
        }

        info!("Downloading image attachment from {}", link);
        let bytes = self.fetch(link).await?;

        let format = image::guess_format(&bytes).map_err(|e| ThreadError::Decode {
            url: link.to_string(),
            reason: e.to_string(),
        })?;
        image::load_from_memory_with_format(&bytes, format).map_err(|e| ThreadError::Decode {
            url: link.to_string(),
            reason: e.to_string(),
        })?;

        let attachment = Attachment {
            source_url: link.to_string(),
            filename: filename_from_url(link),
            bytes,
            mime_type: format.to_mime_type().to_string(),
        };
        info!(
            "Resolved attachment {} ({} bytes, {})",
            attachment.filename,
            attachment.bytes.len(),
            attachment.mime_type
        );
        Ok(Some(attachment))
    }

    async fn fetch(&self, link: &str) -> Result<Vec<u8>, ThreadError> {
        let fetch_error = |reason: String| ThreadError::Fetch {
            url: link.to_string(),
            reason,
        };

        let response = self
            .http
            .get(link)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("status {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
