//! Error types for ACE contact search

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation boundary at which an error is surfaced to the user.
///
/// The boundary decides which noun appears in the generic retrieval alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Initial load (saved filters, org hierarchy, recent search)
    Data,
    /// Loading a single saved filter
    Filter,
    /// Applying the current criteria
    Contacts,
}

impl Boundary {
    /// Noun used in the user-facing retrieval failure message
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Filter => "filter",
            Self::Contacts => "contacts",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Main error type for the filter session
#[derive(Debug, Error)]
pub enum Error {
    /// Neither a positive contact id nor a date range was supplied
    #[error("Either date range or contact id must be specified")]
    MissingRequiredSelector,

    /// Remote API answered HTTP 401
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message
        message: String,
    },

    /// Any other remote failure
    #[error("Upstream error from {endpoint}: {message}")]
    Upstream {
        /// Endpoint path that failed
        endpoint: String,
        /// HTTP status, when the server answered at all
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Evaluation state id has no label
    #[error("Evaluation state id {id} is out of range")]
    StateIndexOutOfRange {
        /// Offending state id
        id: i64,
    },

    /// A search operation is already outstanding
    #[error("Another search operation is already in progress")]
    Busy,

    /// Remote call exceeded the configured timeout
    #[error("Request to {endpoint} timed out after {seconds}s")]
    Timeout {
        /// Endpoint path
        endpoint: String,
        /// Timeout in seconds
        seconds: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an upstream error
    pub fn upstream(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error should send the user to the login page
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Text to show the user when this error reaches `boundary`.
    ///
    /// Returns `None` when the error is handled without an alert: an
    /// unauthorized session redirects instead, and a busy session simply
    /// ignores the second trigger.
    #[must_use]
    pub fn alert_text(&self, boundary: Boundary) -> Option<String> {
        match self {
            Self::Unauthorized { .. } | Self::Busy => None,
            Self::MissingRequiredSelector => Some(self.to_string()),
            _ => Some(format!(
                "Could not get {boundary} from Calabrio ONE. If you continue to encounter \
                 this error please contact your system administrator"
            )),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_missing_selector_message() {
        assert_eq!(
            Error::MissingRequiredSelector.to_string(),
            "Either date range or contact id must be specified"
        );
    }

    #[test]
    fn test_upstream_error_display() {
        let error = Error::upstream("/api/ace/get_org", Some(500), "boom");
        assert_eq!(
            error.to_string(),
            "Upstream error from /api/ace/get_org: boom"
        );
    }

    #[rstest]
    #[case(Boundary::Data, "data")]
    #[case(Boundary::Filter, "filter")]
    #[case(Boundary::Contacts, "contacts")]
    fn test_alert_text_names_boundary(#[case] boundary: Boundary, #[case] noun: &str) {
        let error = Error::upstream("/api/ace/get_contacts", Some(502), "bad gateway");
        let text = error.alert_text(boundary).unwrap();
        assert_eq!(
            text,
            format!(
                "Could not get {noun} from Calabrio ONE. If you continue to encounter this \
                 error please contact your system administrator"
            )
        );
    }

    #[test]
    fn test_unauthorized_has_no_alert() {
        let error = Error::unauthorized("session expired");
        assert!(error.is_unauthorized());
        assert!(error.alert_text(Boundary::Data).is_none());
        assert!(Error::Busy.alert_text(Boundary::Contacts).is_none());
    }

    #[test]
    fn test_missing_selector_alert_is_inline_message() {
        assert_eq!(
            Error::MissingRequiredSelector
                .alert_text(Boundary::Contacts)
                .unwrap(),
            "Either date range or contact id must be specified"
        );
    }

    #[test]
    fn test_timeout_is_generic_failure() {
        let error = Error::Timeout {
            endpoint: "/api/ace/get_org".to_string(),
            seconds: 30,
        };
        assert!(!error.is_unauthorized());
        assert!(error.alert_text(Boundary::Data).unwrap().contains("get data"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = Error::from(json_error);
        assert!(matches!(error, Error::Serialization(_)));
        assert!(error.to_string().starts_with("Serialization error"));
    }
}
