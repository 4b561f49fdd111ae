//! Media upload for the Twitter API.

use log::{error, info};
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::error::ThreadError;
use crate::thread::Attachment;

use super::api::{sanitize_for_logging, send_request, TwitterClient};
use super::types::MediaUploadResponse;

/// Uploads an attachment to the v1.1 media endpoint as a multipart `media` field.
///
/// # Returns
///
/// - `Ok(String)`: The platform media id to attach to a post
/// - `Err(ThreadError::Upload)`: The endpoint answered with a non-success status
/// - `Err(ThreadError::MalformedResponse)`: Success without a media id
pub(crate) async fn upload_media(
    client: &TwitterClient,
    attachment: &Attachment,
) -> Result<String, ThreadError> {
    info!(
        "Uploading {} ({} bytes, {})",
        attachment.filename,
        attachment.bytes.len(),
        attachment.mime_type
    );

    let url = format!("{}/1.1/media/upload.json", client.upload_base_url);
    let part = Part::bytes(attachment.bytes.clone())
        .file_name(attachment.filename.clone())
        .mime_str(&attachment.mime_type)?;
    let form = Form::new().part("media", part);

    let request_builder = client
        .signed_request(Method::POST, &url, &[])?
        .multipart(form);

    let (status, response_text) = send_request(request_builder, "upload_media").await?;
    if !status.is_success() {
        error!("UPLOAD MEDIA FAILURE for {}", attachment.filename);
        return Err(ThreadError::Upload {
            status: status.as_u16(),
            body: sanitize_for_logging(&response_text, 200),
        });
    }

    let upload: MediaUploadResponse = serde_json::from_str(&response_text)?;
    let media_id = upload.media_id()?;
    info!("UPLOAD MEDIA SUCCESS: {} -> {}", attachment.filename, media_id);
    Ok(media_id)
}
