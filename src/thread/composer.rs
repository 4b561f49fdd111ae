//! Turns an ordered batch of message bodies into the posts of a thread.

use log::{debug, warn};

use crate::error::ThreadError;

/// How message bodies are formatted into posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// User mentioned at the start of every post, without the `@`
    pub mention_user: Option<String>,
    /// Append `1/`, `2/`, ... and `nx` on the last post
    pub append_position_marker: bool,
    /// Every post must be strictly shorter than this many characters
    pub max_chars: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            mention_user: None,
            append_position_marker: true,
            max_chars: 280,
        }
    }
}

/// One entry of a thread, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPost {
    pub text: String,
    /// 0-based position in the thread
    pub position: usize,
    pub total: usize,
}

/// The position marker for post `position` (0-based) of `total`.
fn position_marker(position: usize, total: usize) -> String {
    if position + 1 == total {
        format!("{}x", total)
    } else {
        format!("{}/", position + 1)
    }
}

/// Composes a thread from its message bodies.
///
/// Each body gets the `@user ` prefix when a mention user is set and, when
/// markers are on, a space plus its position marker. The whole batch is
/// validated before anything is returned: one post at or over `max_chars`
/// characters rejects all of them.
///
/// # Errors
///
/// [`ThreadError::Validation`] when fewer than two messages are given or when
/// any composed post is too long.
pub fn compose<S: AsRef<str>>(
    messages: &[S],
    options: &ComposeOptions,
) -> Result<Vec<ComposedPost>, ThreadError> {
    if messages.len() < 2 {
        return Err(ThreadError::Validation(format!(
            "you must pass two or more messages, got {}",
            messages.len()
        )));
    }

    let prefix = options
        .mention_user
        .as_ref()
        .map(|user| format!("@{} ", user))
        .unwrap_or_default();
    let total = messages.len();

    let posts: Vec<ComposedPost> = messages
        .iter()
        .enumerate()
        .map(|(position, message)| {
            let mut text = format!("{}{}", prefix, message.as_ref());
            if options.append_position_marker {
                text.push(' ');
                text.push_str(&position_marker(position, total));
            }
            ComposedPost {
                text,
                position,
                total,
            }
        })
        .collect();

    let oversized: Vec<usize> = posts
        .iter()
        .filter(|post| post.text.chars().count() >= options.max_chars)
        .map(|post| post.position + 1)
        .collect();
    if !oversized.is_empty() {
        warn!(
            "Posts {:?} are not shorter than {} characters",
            oversized, options.max_chars
        );
        return Err(ThreadError::Validation(format!(
            "not all posts are less than {} characters (too long: {:?})",
            options.max_chars, oversized
        )));
    }

    debug!("Composed a thread of {} posts", total);
    Ok(posts)
}
