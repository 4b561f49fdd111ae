//! Poll loop: search, sanitize, and republish as a thread.
//!
//! Each cycle searches recent posts for the configured keyword, cleans every
//! match, appends the cleaned lines to the output file, suffixes the hashtags
//! and publishes the batch as a fresh [`ThreadSession`]. Cycles repeat on a
//! fixed interval until the shutdown signal fires.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{watch, RwLock};

use crate::config::BotConfig;
use crate::error::ThreadError;
use crate::sanitizer::sanitize;
use crate::thread::{AttachmentResolver, ComposeOptions, ThreadSession};
use crate::twitter::{sanitize_for_logging, PlatformApi};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Posts returned by the search
    pub found: usize,
    /// Messages handed to the thread session
    pub queued: usize,
    /// Posts published in the thread
    pub published: usize,
}

/// Summary of the poll loop, read by the `/status` endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollStatus {
    pub cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    pub last_error: Option<String>,
}

/// Shared handle to the poll loop status.
pub type SharedStatus = Arc<RwLock<PollStatus>>;

/// Everything a poll cycle needs, taken from [`BotConfig`].
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub search_keyword: String,
    pub hashtags: Vec<String>,
    pub compose: ComposeOptions,
    pub post_delay: Option<Duration>,
    pub poll_interval: Duration,
    pub output_file: String,
}

impl From<&BotConfig> for PollSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            search_keyword: config.search_keyword.clone(),
            hashtags: config.hashtags.clone(),
            compose: config.compose_options(),
            post_delay: config.post_delay,
            poll_interval: config.poll_interval,
            output_file: config.output_file.clone(),
        }
    }
}

/// Builds the message posted for a cleaned line: a leading space, the line
/// without trailing whitespace, a space, and the hashtags.
pub fn build_message(line: &str, hashtag_suffix: &str) -> String {
    format!(" {} {}", line.trim_end(), hashtag_suffix)
}

/// Runs poll cycles against a [`PlatformApi`].
pub struct Poller {
    api: Arc<dyn PlatformApi>,
    resolver: AttachmentResolver,
    settings: PollSettings,
    status: SharedStatus,
}

impl Poller {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        resolver: AttachmentResolver,
        settings: PollSettings,
        status: SharedStatus,
    ) -> Self {
        Self {
            api,
            resolver,
            settings,
            status,
        }
    }

    /// Verifies the configured mention user exists.
    ///
    /// # Errors
    ///
    /// [`ThreadError::Validation`] when the platform does not know the user.
    pub async fn check_mention_user(&self) -> Result<(), ThreadError> {
        let Some(user) = &self.settings.compose.mention_user else {
            return Ok(());
        };
        warn!(
            "Including users in threaded posts can get your API token banned. Use at your own risk!"
        );
        match self.api.lookup_user(user).await? {
            Some(found) => {
                info!("Mention user @{} resolved to id {}", found.username, found.id);
                Ok(())
            }
            None => Err(ThreadError::Validation(format!(
                "Error in finding username: {}",
                user
            ))),
        }
    }

    /// Appends cleaned lines to the output file, one per line.
    async fn append_lines(&self, lines: &[String]) -> Result<(), ThreadError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.settings.output_file)
            .await?;
        for line in lines {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }
        file.flush().await?;
        debug!(
            "Appended {} lines to {}",
            lines.len(),
            self.settings.output_file
        );
        Ok(())
    }

    /// Runs one search-sanitize-publish cycle.
    pub async fn poll_once(&self) -> Result<CycleReport, ThreadError> {
        let found = self.api.search_recent(&self.settings.search_keyword).await?;
        let mut report = CycleReport {
            found: found.len(),
            ..CycleReport::default()
        };

        let lines: Vec<String> = found
            .iter()
            .map(|post| sanitize(&post.text, &self.settings.hashtags))
            .collect();
        for line in &lines {
            debug!("Sanitized line: '{}'", sanitize_for_logging(line, 140));
        }
        self.append_lines(&lines).await?;

        let suffix = self.settings.hashtags.join(" ");
        let messages: Vec<String> = lines
            .iter()
            .map(|line| build_message(line, &suffix))
            .collect();
        report.queued = messages.len();
        info!("Queued {} messages for the next thread", messages.len());

        let mut session = ThreadSession::new(messages, &self.settings.compose)?;
        debug!("{}", session);

        let result = session
            .publish(self.api.as_ref(), &self.resolver, self.settings.post_delay)
            .await
            .map(|published| published.len());
        report.published = session.published().len();
        result?;

        Ok(report)
    }

    async fn record(&self, outcome: &Result<CycleReport, ThreadError>) {
        let mut status = self.status.write().await;
        status.cycles += 1;
        status.last_cycle_at = Some(Utc::now());
        match outcome {
            Ok(report) => {
                status.last_report = Some(report.clone());
                status.last_error = None;
            }
            Err(e) => {
                status.last_report = None;
                status.last_error = Some(e.to_string());
            }
        }
    }

    /// Runs cycles until `shutdown` turns `true` (or its sender is dropped).
    ///
    /// Cycle errors are logged and recorded; the loop moves on to the next
    /// cycle. Only a failed mention user check stops the loop before it starts.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ThreadError> {
        self.check_mention_user().await?;
        info!(
            "Polling for '{}' every {:?}",
            self.settings.search_keyword, self.settings.poll_interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.poll_once().await;
            match &outcome {
                Ok(report) => info!(
                    "Cycle completed: {} found, {} published",
                    report.found, report.published
                ),
                Err(ThreadError::Validation(reason)) => {
                    warn!("Skipping cycle: {}", reason)
                }
                Err(e) => error!("Cycle failed: {}", e),
            }
            self.record(&outcome).await;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Poll loop stopped");
        Ok(())
    }
}
