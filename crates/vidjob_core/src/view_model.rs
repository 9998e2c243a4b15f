use crate::{DownloadAction, JobId, JobStats, JobView, Notice, Presentation, SessionPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub username: Option<String>,
    pub notice: Option<Notice>,
    pub auth_in_flight: bool,
    pub upload: Option<UploadView>,
    pub uploading: bool,
    pub view: JobView,
    pub page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub jobs: Vec<JobRowView>,
    pub stats: Option<JobStats>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub original_filename: String,
    pub presentation: Presentation,
    pub frame_count: u32,
    pub error_message: Option<String>,
    pub created_at: Option<String>,
    /// `Some` only for succeeded jobs.
    pub download: Option<DownloadAction>,
    pub downloading: bool,
}
