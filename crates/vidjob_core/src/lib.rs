//! Vidjob core: pure session and job-lifecycle state machine plus view-model helpers.
mod effect;
mod failure;
mod job_list;
mod job_status;
mod jobs;
mod msg;
mod session;
mod state;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use failure::{Notice, RequestFailure, Severity, CONNECTION_ERROR};
pub use job_list::{JobListModel, JobView, DASHBOARD_JOBS, JOBS_PER_PAGE};
pub use job_status::{artifact_file_name, DownloadAction, JobStatusView, Presentation};
pub use jobs::{
    Job, JobId, JobPage, JobPageRecord, JobRecord, JobStats, JobStatus, DEFAULT_FAILURE_MESSAGE,
};
pub use msg::Msg;
pub use session::{AuthGrant, AuthKind, Session, SessionManager, SessionPhase, User};
pub use state::{AppState, RequestId};
pub use update::update;
pub use upload::{validate_upload, JobSubmitter, UploadCandidate, UploadRejected, SUPPORTED_FORMATS};
pub use view_model::{AppViewModel, JobRowView, UploadView};
