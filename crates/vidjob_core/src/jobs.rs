//! Job records as the backend reports them and as the client keeps them.

pub type JobId = u64;

/// Message given to failed jobs that arrive without one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Parses a wire status. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Parses a wire status, degrading unknown values to `Pending`.
    pub fn from_wire(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

/// Raw job fields before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobRecord {
    pub id: JobId,
    pub original_filename: String,
    pub status: String,
    pub progress: i64,
    pub frame_count: i64,
    pub error_message: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub original_filename: String,
    pub status: JobStatus,
    /// 0..=100; only meaningful while processing.
    pub progress: u8,
    /// Zero unless the job completed.
    pub frame_count: u32,
    /// Present exactly when the job failed.
    pub error_message: Option<String>,
    pub created_at: Option<String>,
}

impl From<JobRecord> for Job {
    fn from(record: JobRecord) -> Self {
        let status = JobStatus::from_wire(&record.status);
        let error_message = match status {
            JobStatus::Failed => Some(
                record
                    .error_message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            ),
            _ => None,
        };
        let frame_count = match status {
            JobStatus::Completed => u32::try_from(record.frame_count.max(0)).unwrap_or(u32::MAX),
            _ => 0,
        };
        Self {
            id: record.id,
            original_filename: record.original_filename,
            status,
            progress: record.progress.clamp(0, 100) as u8,
            frame_count,
            error_message,
            created_at: record.created_at,
        }
    }
}

/// A page of jobs as received, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPageRecord {
    pub jobs: Vec<JobRecord>,
    pub total_pages: u32,
}

/// One page of jobs in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub page: u32,
    pub total_pages: u32,
}

/// Aggregate counters for the session's jobs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStats {
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub processing_jobs: u64,
    pub failed_jobs: u64,
    /// Percentage, 0.0..=100.0.
    pub success_rate: f64,
}
