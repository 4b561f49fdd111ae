//! Request and response schemas for the Twitter API endpoints the bot uses.
//!
//! Each endpoint gets its own explicit schema. Responses are decoded into these
//! types and a missing field surfaces as [`ThreadError::MalformedResponse`]
//! instead of being silently indexed around.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ThreadError;

/// A post returned by the recent search endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchedPost {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// Body of `GET /2/tweets/search/recent`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchedPost>,
}

/// Reply settings of a post request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplySettings {
    pub in_reply_to_tweet_id: String,
}

/// Media settings of a post request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSettings {
    pub media_ids: Vec<String>,
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplySettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaSettings>,
}

impl PostRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: None,
            media: None,
        }
    }

    pub fn in_reply_to(mut self, post_id: impl Into<String>) -> Self {
        self.reply = Some(ReplySettings {
            in_reply_to_tweet_id: post_id.into(),
        });
        self
    }

    pub fn with_media(mut self, media_id: impl Into<String>) -> Self {
        self.media = Some(MediaSettings {
            media_ids: vec![media_id.into()],
        });
        self
    }

    /// The post this request replies to, if any.
    pub fn reply_to(&self) -> Option<&str> {
        self.reply
            .as_ref()
            .map(|reply| reply.in_reply_to_tweet_id.as_str())
    }

    /// The first attached media id, if any.
    pub fn media_id(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|media| media.media_ids.first())
            .map(String::as_str)
    }
}

/// `data` object of a successful post creation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePostEnvelope {
    #[serde(default)]
    data: Option<CreatedPost>,
    #[serde(default)]
    errors: Vec<Value>,
}

/// Decoded response of `POST /2/tweets`, with the raw body kept alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePostResponse {
    pub data: Option<CreatedPost>,
    pub errors: Vec<Value>,
    pub raw: Value,
}

impl CreatePostResponse {
    /// Decodes a response body.
    pub fn from_value(raw: Value) -> Result<Self, ThreadError> {
        let envelope: CreatePostEnvelope = serde_json::from_value(raw.clone())?;
        Ok(Self {
            data: envelope.data,
            errors: envelope.errors,
            raw,
        })
    }

    /// The created post's id, or a typed error when the platform reported one
    /// or left the id out.
    pub fn into_created(self) -> Result<(CreatedPost, Value), ThreadError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(ThreadError::PostRejected(first));
        }
        match self.data {
            Some(created) => Ok((created, self.raw)),
            None => Err(ThreadError::MalformedResponse {
                endpoint: "post",
                field: "data.id",
            }),
        }
    }
}

/// Body of `POST /1.1/media/upload.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct MediaUploadResponse {
    #[serde(default)]
    pub media_id: Option<u64>,
    #[serde(default)]
    pub media_id_string: Option<String>,
}

impl MediaUploadResponse {
    /// Prefers the string form, which does not lose precision in JSON consumers.
    pub fn media_id(self) -> Result<String, ThreadError> {
        self.media_id_string
            .or_else(|| self.media_id.map(|id| id.to_string()))
            .ok_or(ThreadError::MalformedResponse {
                endpoint: "media upload",
                field: "media_id",
            })
    }
}

/// A user returned by `GET /2/users/by/username/:username`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLookupResponse {
    #[serde(default)]
    pub data: Option<PlatformUser>,
}
