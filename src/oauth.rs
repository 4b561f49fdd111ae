//! OAuth authentication module for Twitter/X API integration.
//!
//! All requests the bot makes (search, post, media upload, user lookup) are
//! signed with OAuth 1.0a User Context credentials: the consumer key pair of the
//! app plus the access token pair of the account that posts the threads. The
//! media upload endpoint does not accept OAuth 2.0 app tokens, so the bot signs
//! everything the same way.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;

use crate::error::ThreadError;

type HmacSha1 = Hmac<Sha1>;

/// The four keys needed to sign requests on behalf of the posting account.
#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Percent-encodes a value per RFC 3986 (only `A-Z a-z 0-9 - . _ ~` pass through).
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the Authorization header for OAuth 1.0a User Context authentication.
///
/// A fresh nonce and the current timestamp are generated for every call.
///
/// # Parameters
///
/// - `credentials`: The consumer and access token pairs
/// - `method`: The HTTP method (`GET`, `POST`)
/// - `url`: The request URL without query string
/// - `params`: Query parameters (and form-encoded body parameters, if any).
///   JSON and multipart bodies are not part of the signature.
///
/// # Returns
///
/// A header value of the form `OAuth oauth_consumer_key="...", ...`.
pub fn build_oauth1_header(
    credentials: &OAuth1Credentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, ThreadError> {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().to_string();

    build_oauth1_header_with(credentials, method, url, params, &nonce, &timestamp)
}

/// Same as [`build_oauth1_header`] with a caller-supplied nonce and timestamp.
pub(crate) fn build_oauth1_header_with(
    credentials: &OAuth1Credentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> Result<String, ThreadError> {
    let oauth_params = [
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut all_params: Vec<(&str, &str)> = oauth_params.to_vec();
    all_params.extend_from_slice(params);

    let signature = oauth1_signature(credentials, method, url, &all_params)?;

    let header_fields: Vec<String> = oauth_params
        .iter()
        .map(|(key, value)| (*key, *value))
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect();

    Ok(format!("OAuth {}", header_fields.join(", ")))
}

/// Computes the HMAC-SHA1 signature over the RFC 5849 signature base string.
pub(crate) fn oauth1_signature(
    credentials: &OAuth1Credentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, ThreadError> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&parameter_string)
    );
    let signing_key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.access_token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .map_err(|e| ThreadError::Auth(e.to_string()))?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
