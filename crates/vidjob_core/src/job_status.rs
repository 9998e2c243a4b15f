use std::collections::BTreeSet;

use crate::{Effect, Job, JobId, JobStatus, RequestFailure, DEFAULT_FAILURE_MESSAGE};

/// How a job is shown. Exactly one state per status; unknown wire values
/// were already folded into `Pending` and therefore show as `Waiting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Waiting,
    Running { progress: u8 },
    Succeeded,
    Failed { message: String },
}

impl Presentation {
    pub fn of(job: &Job) -> Self {
        match job.status {
            JobStatus::Pending => Presentation::Waiting,
            JobStatus::Processing => Presentation::Running {
                progress: job.progress.min(100),
            },
            JobStatus::Completed => Presentation::Succeeded,
            JobStatus::Failed => Presentation::Failed {
                message: job
                    .error_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Presentation::Waiting => "Pending",
            Presentation::Running { .. } => "Processing",
            Presentation::Succeeded => "Completed",
            Presentation::Failed { .. } => "Failed",
        }
    }
}

/// `frames_<original_filename>_<id>.zip`
pub fn artifact_file_name(job: &Job) -> String {
    format!("frames_{}_{}.zip", job.original_filename, job.id)
}

/// The download action shown next to a job; absent unless it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAction {
    pub job_id: JobId,
    pub file_name: String,
}

impl DownloadAction {
    pub fn for_job(job: &Job) -> Option<Self> {
        match Presentation::of(job) {
            Presentation::Succeeded => Some(Self {
                job_id: job.id,
                file_name: artifact_file_name(job),
            }),
            Presentation::Waiting | Presentation::Running { .. } | Presentation::Failed { .. } => {
                None
            }
        }
    }
}

/// Tracks artifact downloads. Never mutates jobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatusView {
    downloads_in_flight: BTreeSet<JobId>,
}

impl JobStatusView {
    pub fn is_downloading(&self, job_id: JobId) -> bool {
        self.downloads_in_flight.contains(&job_id)
    }

    /// Starts a download for `job`, which must be listed and succeeded.
    /// A second click while the first download runs is a no-op.
    pub(crate) fn request_download(
        &mut self,
        job_id: JobId,
        job: Option<&Job>,
        token: Option<&str>,
    ) -> Result<Option<Effect>, RequestFailure> {
        let job = job.ok_or_else(|| {
            RequestFailure::Validation(format!("Job {job_id} is not in the current list"))
        })?;
        let action = DownloadAction::for_job(job).ok_or_else(|| {
            RequestFailure::Validation("Download is only available for completed jobs".to_string())
        })?;
        let token = token.ok_or(RequestFailure::AuthenticationRequired)?;
        if !self.downloads_in_flight.insert(job_id) {
            return Ok(None);
        }
        Ok(Some(Effect::DownloadArtifact {
            job_id,
            token: token.to_string(),
            file_name: action.file_name,
        }))
    }

    /// Returns false when the download was not (or no longer) expected.
    pub(crate) fn finish_download(&mut self, job_id: JobId) -> bool {
        self.downloads_in_flight.remove(&job_id)
    }

    pub(crate) fn reset(&mut self) {
        self.downloads_in_flight.clear();
    }
}
