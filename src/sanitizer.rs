//! Cleanup of scraped post text before it is queued for posting.

use regex::Regex;

/// The noise pattern applied to every scraped line.
///
/// NOTE: this was meant to strip mentions, links and punctuation, but it
/// removes any single character out of `a-z A-Z 0-9 | ^ [ :`, any `/`, and any
/// `@` followed by a run of `]`. In practice every ASCII letter and digit goes,
/// leaving whitespace, most punctuation and non-ASCII text. Kept as is; changing
/// it changes what the bot republishes.
pub const NOISE_PATTERN: &str = r"[a-zA-Z0-9|^\[:]|/|@\]*";

/// Returns the text before the first line break.
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

/// Cleans a scraped post body.
///
/// Keeps the first line only, removes every configured hashtag token, then
/// removes every match of [`NOISE_PATTERN`].
///
/// # Example
///
/// ```rust
/// use threadcast::sanitizer::sanitize;
///
/// let no_tags: [&str; 0] = [];
/// assert_eq!(sanitize("Price: $5 [sale]! 50% off\nsecond line", &no_tags), " $ ]! % ");
/// ```
pub fn sanitize<S: AsRef<str>>(text: &str, hashtags: &[S]) -> String {
    let mut line = first_line(text).to_string();
    for tag in hashtags {
        let tag = tag.as_ref();
        if !tag.is_empty() {
            line = line.replace(tag, "");
        }
    }

    match Regex::new(NOISE_PATTERN) {
        Ok(re) => re.replace_all(&line, "").into_owned(),
        Err(_) => line,
    }
}
