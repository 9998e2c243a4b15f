use crate::view_model::{AppViewModel, JobRowView, UploadView};
use crate::{
    DownloadAction, JobListModel, JobStatusView, JobSubmitter, Notice, Presentation, Session,
    SessionManager, SessionPhase,
};

/// Identity of an issued request; completions carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) session: SessionManager,
    pub(crate) submitter: JobSubmitter,
    pub(crate) jobs: JobListModel,
    pub(crate) status_view: JobStatusView,
    pub(crate) notice: Option<Notice>,
    next_request: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_sizes(jobs_per_page: u32, dashboard_jobs: u32) -> Self {
        Self {
            jobs: JobListModel::with_page_sizes(jobs_per_page, dashboard_jobs),
            ..Self::default()
        }
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn job_list(&self) -> &JobListModel {
        &self.jobs
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let jobs = self
            .jobs
            .jobs()
            .iter()
            .map(|job| JobRowView {
                job_id: job.id,
                original_filename: job.original_filename.clone(),
                presentation: Presentation::of(job),
                frame_count: job.frame_count,
                error_message: job.error_message.clone(),
                created_at: job.created_at.clone(),
                download: DownloadAction::for_job(job),
                downloading: self.status_view.is_downloading(job.id),
            })
            .collect();

        AppViewModel {
            phase: self.session.phase(),
            username: self
                .session
                .session()
                .user()
                .map(|user| user.username.clone()),
            notice: self.notice.clone(),
            auth_in_flight: self.session.auth_in_flight(),
            upload: self.submitter.selected().map(|candidate| UploadView {
                file_name: candidate.file_name.clone(),
                media_type: candidate.declared_media_type.clone(),
                size_bytes: candidate.size(),
            }),
            uploading: self.submitter.is_uploading(),
            view: self.jobs.view(),
            page: self.jobs.page(),
            total_pages: self.jobs.total_pages(),
            loading: self.jobs.is_loading(),
            jobs,
            stats: self.jobs.stats().cloned(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }
}
