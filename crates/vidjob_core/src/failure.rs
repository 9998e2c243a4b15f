use thiserror::Error;

/// Generic text shown for any transport-level failure.
pub const CONNECTION_ERROR: &str = "Connection error";

const AUTHENTICATION_REQUIRED: &str = "Authentication required. Please log in.";

/// Why a request did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    /// Rejected locally before reaching the network.
    #[error("{0}")]
    Validation(String),
    /// No verified token was available for a protected call.
    #[error("authentication required")]
    AuthenticationRequired,
    /// The backend answered with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// The transport failed before a response was available.
    #[error("connection error: {detail}")]
    Connectivity { detail: String },
}

impl RequestFailure {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    pub fn connectivity(detail: impl Into<String>) -> Self {
        Self::Connectivity {
            detail: detail.into(),
        }
    }

    /// Text shown to the user. Server messages are passed through verbatim;
    /// `fallback` covers rejections that came without one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            RequestFailure::Validation(reason) => reason.clone(),
            RequestFailure::AuthenticationRequired => AUTHENTICATION_REQUIRED.to_string(),
            RequestFailure::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            RequestFailure::Rejected { .. } => fallback.to_string(),
            RequestFailure::Connectivity { .. } => CONNECTION_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A single user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
