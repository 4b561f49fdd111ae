//! Shared fixtures for the crate's tests.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::config::BotConfig;
use crate::error::ThreadError;
use crate::thread::Attachment;
use crate::twitter::{CreatePostResponse, PlatformApi, PlatformUser, PostRequest, SearchedPost};

/// A complete set of variables accepted by [`BotConfig::from_vars`].
pub(crate) fn test_vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = [
        ("CONSUMER_KEY", "test-consumer-key-123"),
        ("CONSUMER_SECRET", "test-consumer-secret-456"),
        ("ACCESS_TOKEN_KEY", "test-access-token-789"),
        ("ACCESS_TOKEN_SECRET", "test-access-secret-000"),
        ("SEARCH_KEYWORD", "rust"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    vars
}

/// A configuration whose API endpoints point at `base_url` (a mock server).
pub(crate) fn test_config(base_url: &str) -> BotConfig {
    let vars = test_vars(&[("API_BASE_URL", base_url), ("UPLOAD_BASE_URL", base_url)]);
    BotConfig::from_vars(|name| vars.get(name).cloned()).unwrap()
}

/// A small valid PNG.
pub(crate) fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub(crate) fn searched(id: &str, text: &str) -> SearchedPost {
    SearchedPost {
        id: id.to_string(),
        text: text.to_string(),
        author_id: Some("42".to_string()),
    }
}

/// In-memory platform that records every call.
///
/// Post ids are `1000 + index`. A post can be set up to be rejected with a
/// duplicate-status error.
#[derive(Default)]
pub(crate) struct FakePlatform {
    search_results: Vec<SearchedPost>,
    known_users: Vec<String>,
    reject_post_at: Option<usize>,
    calls: AtomicUsize,
    pub(crate) requests: Mutex<Vec<PostRequest>>,
    pub(crate) uploads: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_search_results(mut self, results: Vec<SearchedPost>) -> Self {
        self.search_results = results;
        self
    }

    pub(crate) fn with_user(mut self, username: &str) -> Self {
        self.known_users.push(username.to_string());
        self
    }

    pub(crate) fn rejecting_post_at(mut self, index: usize) -> Self {
        self.reject_post_at = Some(index);
        self
    }

    pub(crate) fn rejection() -> serde_json::Value {
        json!({"message": "Status is a duplicate.", "code": 187})
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn sent_requests(&self) -> Vec<PostRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn search_recent(&self, _query: &str) -> Result<Vec<SearchedPost>, ThreadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.search_results.clone())
    }

    async fn create_post(&self, request: &PostRequest) -> Result<CreatePostResponse, ThreadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request.clone());

        let body = if self.reject_post_at == Some(index) {
            json!({ "errors": [Self::rejection(), {"message": "second error"}] })
        } else {
            json!({ "data": { "id": (1000 + index).to_string(), "text": request.text } })
        };
        CreatePostResponse::from_value(body)
    }

    async fn upload_media(&self, attachment: &Attachment) -> Result<String, ThreadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(attachment.filename.clone());
        Ok(format!("media-{}", uploads.len()))
    }

    async fn lookup_user(&self, username: &str) -> Result<Option<PlatformUser>, ThreadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .known_users
            .iter()
            .find(|known| known.as_str() == username)
            .map(|known| PlatformUser {
                id: "7".to_string(),
                name: known.clone(),
                username: known.clone(),
            }))
    }
}
