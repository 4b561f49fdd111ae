//! Configuration module for the threadcast bot.
//!
//! This module contains the configuration structure and environment variable
//! handling for the Twitter/X API integration, the poll loop and the thread
//! composer. The configuration is loaded once at startup and passed into each
//! component's constructor.

use log::{debug, error, info, warn};
use std::env;
use std::time::Duration;

use crate::oauth::OAuth1Credentials;
use crate::thread::ComposeOptions;

/// Default base URL for Twitter API v2 endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";
/// Default base URL for the v1.1 media upload endpoint.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://upload.twitter.com";
/// Default file the sanitized search results are appended to.
pub const DEFAULT_OUTPUT_FILE: &str = "new_tweets.txt";

/// Configuration for the bot.
///
/// Holds the OAuth 1.0a credentials, the search and hashtag settings, the
/// thread formatting options, and the timings of the poll loop.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// OAuth 1.0a User Context credentials (four keys)
    pub credentials: OAuth1Credentials,
    /// Free-text query sent to the recent search endpoint
    pub search_keyword: String,
    /// Hashtags stripped from scraped text and appended to every message
    pub hashtags: Vec<String>,
    /// Optional user mentioned at the start of every post
    pub mention_user: Option<String>,
    /// Whether to append `1/`, `2/`, ..., `nx` position markers
    pub append_position_marker: bool,
    /// Every composed post must be strictly shorter than this many characters
    pub max_chars: usize,
    /// Delay between two posts of a thread
    pub post_delay: Option<Duration>,
    /// Time between two poll cycles
    pub poll_interval: Duration,
    /// Timeout applied to every outgoing HTTP request
    pub http_timeout: Duration,
    /// File the sanitized lines are appended to
    pub output_file: String,
    /// Base URL for v2 endpoints
    pub api_base_url: String,
    /// Base URL for the media upload endpoint
    pub upload_base_url: String,
}

/// Masks a secret for logging, keeping at most the first and last eight characters.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let length = chars.len();

    if length > 16 {
        let prefix: String = chars[..8].iter().collect();
        let suffix: String = chars[length - 8..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else if length > 8 {
        let prefix: String = chars[..8].iter().collect();
        format!("{}...", prefix)
    } else {
        "...".to_string()
    }
}

/// Splits the pipe-delimited `HASH_TAGS` value into its tokens.
pub fn parse_hashtags(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("{} must be a boolean, got '{}'", name, other).into()),
    }
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T, Box<dyn std::error::Error + Send + Sync>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| format!("{} must be a valid number, got '{}': {}", name, raw, e).into())
}

impl BotConfig {
    /// Loads a required credential, logging only its masked form.
    fn require_secret<F>(
        lookup: &F,
        name: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(name) {
            Some(value) if !value.trim().is_empty() => {
                info!(
                    "Found {} environment variable with length: {}",
                    name,
                    value.len()
                );
                debug!("{} (masked): {}", name, mask_secret(&value));
                if value.len() < 10 {
                    warn!(
                        "{} seems unusually short ({} characters)",
                        name,
                        value.len()
                    );
                }
                Ok(value)
            }
            Some(_) => {
                error!("{} is empty", name);
                Err(format!("{} cannot be empty", name).into())
            }
            None => {
                error!("Make sure {} environment variable is set", name);
                Err(format!("Missing {} environment variable", name).into())
            }
        }
    }

    /// Creates a new `BotConfig` from an arbitrary variable lookup.
    ///
    /// This is the testable core of [`BotConfig::from_env`].
    ///
    /// # Required Variables
    ///
    /// - `CONSUMER_KEY`, `CONSUMER_SECRET`: the app's consumer key pair
    /// - `ACCESS_TOKEN_KEY`, `ACCESS_TOKEN_SECRET`: the posting account's token pair
    /// - `SEARCH_KEYWORD`: the recent search query
    ///
    /// # Optional Variables
    ///
    /// - `HASH_TAGS`: pipe-delimited hashtags (default: none)
    /// - `MENTION_USER`: user to mention in every post (default: none)
    /// - `APPEND_POSITION_MARKER`: `true`/`false` (default: `true`)
    /// - `MAX_CHARS`: post length limit (default: 280)
    /// - `POST_DELAY_SECS`: seconds between posts, `0` disables (default: 2)
    /// - `POLL_INTERVAL_SECS`: seconds between poll cycles (default: 10)
    /// - `HTTP_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `OUTPUT_FILE`: where sanitized lines are appended (default: `new_tweets.txt`)
    /// - `API_BASE_URL`, `UPLOAD_BASE_URL`: endpoint overrides
    pub fn from_vars<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading bot configuration");

        let credentials = OAuth1Credentials {
            consumer_key: Self::require_secret(&lookup, "CONSUMER_KEY")?,
            consumer_secret: Self::require_secret(&lookup, "CONSUMER_SECRET")?,
            access_token: Self::require_secret(&lookup, "ACCESS_TOKEN_KEY")?,
            access_token_secret: Self::require_secret(&lookup, "ACCESS_TOKEN_SECRET")?,
        };

        let search_keyword = match lookup("SEARCH_KEYWORD") {
            Some(keyword) if !keyword.trim().is_empty() => keyword,
            _ => {
                error!("Make sure SEARCH_KEYWORD environment variable is set");
                return Err("Missing SEARCH_KEYWORD environment variable".into());
            }
        };
        info!("Search keyword: '{}'", search_keyword);

        let hashtags = lookup("HASH_TAGS")
            .map(|raw| parse_hashtags(&raw))
            .unwrap_or_default();
        if hashtags.is_empty() {
            info!("No HASH_TAGS configured");
        } else {
            info!("Hashtags: {}", hashtags.join(" "));
        }

        let mention_user = lookup("MENTION_USER")
            .map(|user| user.trim().trim_start_matches('@').to_string())
            .filter(|user| !user.is_empty());
        if let Some(user) = &mention_user {
            warn!(
                "Every post will mention @{} - including users in threads can get your API token banned",
                user
            );
        }

        let append_position_marker = match lookup("APPEND_POSITION_MARKER") {
            Some(raw) => parse_bool("APPEND_POSITION_MARKER", &raw)?,
            None => true,
        };

        let max_chars = match lookup("MAX_CHARS") {
            Some(raw) => parse_number::<usize>("MAX_CHARS", &raw)?,
            None => 280,
        };
        if max_chars == 0 {
            return Err("MAX_CHARS must be greater than zero".into());
        }

        let post_delay = match lookup("POST_DELAY_SECS") {
            Some(raw) => parse_number::<u64>("POST_DELAY_SECS", &raw)?,
            None => 2,
        };
        let post_delay = (post_delay > 0).then(|| Duration::from_secs(post_delay));

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(raw) => parse_number::<u64>("POLL_INTERVAL_SECS", &raw)?,
            None => 10,
        };

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("HTTP_TIMEOUT_SECS", &raw)?,
            None => 30,
        };

        let config = BotConfig {
            credentials,
            search_keyword,
            hashtags,
            mention_user,
            append_position_marker,
            max_chars,
            post_delay,
            poll_interval: Duration::from_secs(poll_interval),
            http_timeout: Duration::from_secs(http_timeout),
            output_file: lookup("OUTPUT_FILE").unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
            api_base_url: lookup("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            upload_base_url: lookup("UPLOAD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        info!(
            "Bot configuration loaded: poll every {:?}, post delay {:?}, max {} chars",
            config.poll_interval, config.post_delay, config.max_chars
        );
        Ok(config)
    }

    /// Creates a new `BotConfig` from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    /// See [`BotConfig::from_vars`] for the variables read.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use threadcast::BotConfig;
    ///
    /// let config = BotConfig::from_env().unwrap();
    /// println!("Searching for {}", config.search_keyword);
    /// ```
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(_) => debug!("No .env file found, using process environment"),
        }
        Self::from_vars(|name| env::var(name).ok())
    }

    /// The composer options derived from this configuration.
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            mention_user: self.mention_user.clone(),
            append_position_marker: self.append_position_marker,
            max_chars: self.max_chars,
        }
    }

    /// The hashtags joined by spaces, as appended to each message.
    pub fn hashtag_suffix(&self) -> String {
        self.hashtags.join(" ")
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set or cannot be parsed, it defaults to 3000.
///
/// # Example
///
/// ```rust
/// use threadcast::get_server_port;
///
/// // With no PORT set
/// let port = get_server_port(); // Returns 3000
/// ```
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000)
}
