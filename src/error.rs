//! Error types for image generation and the tool screens.

use std::path::PathBuf;
use std::time::Duration;

/// Notice shown to the user for any failed generation attempt.
pub const GENERIC_FAILURE_NOTICE: &str = "Failed to generate. Please try again.";

/// Errors that can occur while reading inputs or generating images.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Startup configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// API key rejected by the provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response carried no image part.
    #[error("no image data returned")]
    NoImageData,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// A selected image could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`CanvasError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised at startup, before any screen is opened.
    Config,
    /// An input image could not be read or encoded.
    Read,
    /// The remote call failed or returned no usable image.
    Generation,
}

impl CanvasError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Read { .. } => ErrorKind::Read,
            _ => ErrorKind::Generation,
        }
    }

    /// Returns the message shown to the user.
    ///
    /// Read and generation failures all collapse to the same notice; the
    /// underlying cause only goes to the log.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Config => self.to_string(),
            ErrorKind::Read | ErrorKind::Generation => GENERIC_FAILURE_NOTICE.to_string(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for nanocanvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Trims provider error text down to something safe to log.
///
/// Control characters become spaces, anything that looks like an API key is
/// masked, and the result is capped in length.
pub fn sanitize_error_message(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let masked: Vec<String> = cleaned
        .split_whitespace()
        .map(|word| {
            let looks_like_key = word.len() >= 32
                && word
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if looks_like_key || word.starts_with("AIza") {
                "[redacted]".to_string()
            } else {
                word.to_string()
            }
        })
        .collect();
    let joined = masked.join(" ");
    let trimmed = joined.trim();

    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            CanvasError::Config("missing key".into()).kind(),
            ErrorKind::Config
        );
        let read = CanvasError::read(
            "a.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(read.kind(), ErrorKind::Read);
        assert_eq!(CanvasError::NoImageData.kind(), ErrorKind::Generation);
        assert_eq!(
            CanvasError::Auth("bad key".into()).kind(),
            ErrorKind::Generation
        );
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = CanvasError::Api {
            status: 500,
            message: "internal: shard 7 overloaded".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_NOTICE);
        assert_eq!(CanvasError::NoImageData.user_message(), GENERIC_FAILURE_NOTICE);

        let config = CanvasError::Config("GOOGLE_API_KEY not set".into());
        assert!(config.user_message().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_error_display() {
        let err = CanvasError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");
        assert_eq!(CanvasError::NoImageData.to_string(), "no image data returned");
    }

    #[test]
    fn test_sanitize_masks_keys_and_truncates() {
        let msg = sanitize_error_message("bad key AIzaSyExample123 given\n");
        assert_eq!(msg, "bad key [redacted] given");

        let long = "x ".repeat(400);
        let msg = sanitize_error_message(&long);
        assert!(msg.ends_with("..."));
        assert!(msg.chars().count() <= MAX_ERROR_MESSAGE_LEN + 3);
    }

    #[test]
    fn test_sanitize_control_chars_separate_words() {
        assert_eq!(sanitize_error_message("bad\nAIzaKEY"), "bad [redacted]");
        assert_eq!(sanitize_error_message("line one\r\n\tline two"), "line one line two");
        let key = "k".repeat(40);
        assert_eq!(
            sanitize_error_message(&format!("token:\n{key}")),
            "token: [redacted]"
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(30));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}
