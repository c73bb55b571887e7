// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the Mustekala browsing client
//!
//! Form manipulation mistakes (unknown field, wrong setter for a field kind)
//! are separate variants from transport failures so callers can distinguish
//! local misuse from network trouble.

use thiserror::Error;

/// Result type alias for Mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Mustekala
#[derive(Error, Debug)]
pub enum Error {
    /// No form field with the given name exists in the markup
    #[error("no field named '{0}' in form")]
    FieldNotFound(String),

    /// A setter was used on a field kind it does not apply to
    #[error("field '{name}' is a {actual} field, expected {expected}")]
    InvalidFieldType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A value passed to check/choose is not among the field's options
    #[error("option '{option}' not found on field '{name}'")]
    InvalidOption { name: String, option: String },

    /// The form action could not be resolved to an absolute URL
    #[error("cannot resolve form action '{action}': {reason}")]
    InvalidFormAction { action: String, reason: String },

    /// Transport-level failure (connection, timeout, protocol decode)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Navigation refused by the target's robots.txt
    #[error("fetching {url} is disallowed by robots.txt")]
    DisallowedByRobots { url: String },

    /// Error status response, raised only when `raise_on_status` is set
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Page query found nothing (no form, no table)
    #[error("no {0} found on page")]
    MissingElement(&'static str),

    /// Link lookup by text found nothing or was ambiguous
    #[error("link lookup for '{text}' failed: {reason}")]
    LinkNotFound { text: String, reason: String },

    /// Navigation history misuse (back/forward with nothing to go to)
    #[error("history error: {0}")]
    History(String),

    /// I/O error (cookie files, downloads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (cookie jar export/import)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a field-not-found error
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Error::FieldNotFound(name.into())
    }

    /// Create an invalid-field-type error
    pub fn invalid_field_type(
        name: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Error::InvalidFieldType {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid-option error
    pub fn invalid_option(name: impl Into<String>, option: impl Into<String>) -> Self {
        Error::InvalidOption {
            name: name.into(),
            option: option.into(),
        }
    }

    /// Create an invalid-form-action error
    pub fn invalid_form_action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFormAction {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transport-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a local form-manipulation error (never retried)
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            Error::FieldNotFound(_)
                | Error::InvalidFieldType { .. }
                | Error::InvalidOption { .. }
                | Error::InvalidFormAction { .. }
        )
    }

    /// Check if a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_errors_are_local() {
        let err = Error::field_not_found("email");
        assert!(err.is_form_error());
        assert!(!err.is_retryable());

        let err = Error::invalid_field_type("pets", "text", "select");
        assert!(err.is_form_error());
        assert_eq!(
            err.to_string(),
            "field 'pets' is a select field, expected text"
        );
    }

    #[test]
    fn test_status_code() {
        let err = Error::HttpStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert_eq!(err.status_code(), Some(503));
        assert!(!err.is_form_error());
    }

    #[test]
    fn test_robots_error_message() {
        let err = Error::DisallowedByRobots {
            url: "https://example.com/private".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fetching https://example.com/private is disallowed by robots.txt"
        );
    }
}
