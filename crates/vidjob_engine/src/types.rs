use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDto {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobDto {
    pub id: u64,
    pub original_filename: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub frame_count: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobListResponse {
    #[serde(default)]
    pub jobs: Vec<JobDto>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsDto {
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub processing_jobs: u64,
    #[serde(default)]
    pub failed_jobs: u64,
    pub success_rate: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub job_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Completion of an [`crate::EngineCommand`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Verified {
        token: String,
        result: Result<UserDto, ApiError>,
    },
    Authenticated {
        request: u64,
        result: Result<AuthResponse, ApiError>,
    },
    Uploaded {
        request: u64,
        result: Result<u64, ApiError>,
    },
    JobsListed {
        request: u64,
        result: Result<JobListResponse, ApiError>,
    },
    StatsFetched {
        request: u64,
        result: Result<StatsDto, ApiError>,
    },
    Downloaded {
        job_id: u64,
        file_name: String,
        result: Result<Vec<u8>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidRequest,
    HttpStatus {
        status: u16,
        server_message: Option<String>,
    },
    Timeout,
    Network,
    InvalidResponse,
    TooLarge {
        max_bytes: u64,
        actual: Option<u64>,
    },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::HttpStatus {
                status,
                server_message: Some(message),
            } => write!(f, "http status {status} ({message})"),
            FailureKind::HttpStatus { status, .. } => write!(f, "http status {status}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response body"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
