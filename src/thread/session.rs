//! Publishing a composed thread as a chain of replies.

use log::{error, info};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::error::ThreadError;
use crate::twitter::{PlatformApi, PostRequest};

use super::attachment::AttachmentResolver;
use super::composer::{compose, ComposeOptions, ComposedPost};

/// Lifecycle of a [`ThreadSession`].
///
/// `NotSent -> Publishing -> Sent | Failed`. Only `NotSent` may be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotSent,
    Publishing,
    Sent,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::NotSent => "not sent",
            SessionState::Publishing => "publishing",
            SessionState::Sent => "sent",
            SessionState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A post the platform accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPost {
    /// Platform-assigned post id
    pub id: String,
    /// Raw response body
    pub response: Value,
    /// Parameters that were sent
    pub request: PostRequest,
}

/// One publish run: the input messages, their composed posts, and the posts
/// published so far.
#[derive(Debug)]
pub struct ThreadSession {
    messages: Vec<String>,
    posts: Vec<ComposedPost>,
    published: Vec<PublishedPost>,
    state: SessionState,
}

impl ThreadSession {
    /// Composes `messages` and prepares an unsent session.
    ///
    /// # Errors
    ///
    /// [`ThreadError::Validation`] from [`compose`]; nothing is sent in that case.
    pub fn new(messages: Vec<String>, options: &ComposeOptions) -> Result<Self, ThreadError> {
        let posts = compose(&messages, options)?;
        Ok(Self {
            messages,
            posts,
            published: Vec::new(),
            state: SessionState::NotSent,
        })
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn posts(&self) -> &[ComposedPost] {
        &self.posts
    }

    pub fn published(&self) -> &[PublishedPost] {
        &self.published
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Publishes the thread, one post at a time.
    ///
    /// For each post: resolve and upload an image attachment (dropping its link
    /// from the text), submit the post as a reply to the previous one, record
    /// it, then wait `inter_post_delay` if more posts follow.
    ///
    /// The run stops at the first error. Posts already published stay published
    /// and remain available through [`ThreadSession::published`].
    ///
    /// # Errors
    ///
    /// - [`ThreadError::AlreadySent`] if this session left `NotSent`; no request is made
    /// - [`ThreadError::PostRejected`] with the platform's first reported error
    /// - any attachment, upload, transport or decoding error
    pub async fn publish(
        &mut self,
        api: &dyn PlatformApi,
        resolver: &AttachmentResolver,
        inter_post_delay: Option<Duration>,
    ) -> Result<&[PublishedPost], ThreadError> {
        if self.state != SessionState::NotSent {
            return Err(ThreadError::AlreadySent(self.state));
        }
        self.state = SessionState::Publishing;
        info!("Publishing thread of {} posts", self.posts.len());

        match self.publish_all(api, resolver, inter_post_delay).await {
            Ok(()) => {
                self.state = SessionState::Sent;
                info!("Thread of {} posts published", self.published.len());
                Ok(&self.published)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                error!(
                    "Thread publishing stopped after {} of {} posts: {}",
                    self.published.len(),
                    self.posts.len(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn publish_all(
        &mut self,
        api: &dyn PlatformApi,
        resolver: &AttachmentResolver,
        inter_post_delay: Option<Duration>,
    ) -> Result<(), ThreadError> {
        for post in &self.posts {
            let mut text = post.text.clone();
            let mut media_id = None;

            if let Some(attachment) = resolver.resolve(&text).await? {
                media_id = Some(api.upload_media(&attachment).await?);
                text = text.replace(&attachment.source_url, "");
            }

            let mut request = PostRequest::new(text);
            if let Some(previous) = self.published.last() {
                request = request.in_reply_to(previous.id.clone());
            }
            if let Some(media_id) = media_id {
                request = request.with_media(media_id);
            }

            let (created, response) = api.create_post(&request).await?.into_created()?;
            info!(
                "Posted {}/{} as {}",
                post.position + 1,
                post.total,
                created.id
            );
            self.published.push(PublishedPost {
                id: created.id,
                response,
                request,
            });

            if let Some(delay) = inter_post_delay {
                if post.position + 1 < post.total {
                    info!("Waiting {:?} before the next post", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ThreadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thread")?;
        write!(f, "------")?;
        for post in &self.posts {
            write!(f, "\n{}", post.text)?;
        }
        Ok(())
    }
}
