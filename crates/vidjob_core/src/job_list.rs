use std::collections::BTreeMap;

use crate::{
    Effect, Job, JobId, JobPage, JobPageRecord, JobStats, JobStatus, RequestFailure, RequestId,
};

/// Rows per page on the jobs view.
pub const JOBS_PER_PAGE: u32 = 10;
/// Rows shown as "recent jobs" on the dashboard.
pub const DASHBOARD_JOBS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobView {
    #[default]
    Closed,
    Dashboard,
    Jobs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPage {
    request: RequestId,
    page: u32,
}

pub(crate) enum FetchOutcome {
    Stale,
    Applied,
    Failed(RequestFailure),
}

/// Paginated job summaries and stats for the open view.
///
/// Only the most recently issued page and stats requests may update what
/// is displayed; anything else that completes is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct JobListModel {
    view: JobView,
    jobs_per_page: u32,
    dashboard_jobs: u32,
    page: u32,
    total_pages: u32,
    jobs: Vec<Job>,
    stats: Option<JobStats>,
    pending_page: Option<PendingPage>,
    pending_stats: Option<RequestId>,
    // Highest progress seen per job while it keeps processing.
    progress_floor: BTreeMap<JobId, u8>,
}

impl Default for JobListModel {
    fn default() -> Self {
        Self::with_page_sizes(JOBS_PER_PAGE, DASHBOARD_JOBS)
    }
}

impl JobListModel {
    pub fn with_page_sizes(jobs_per_page: u32, dashboard_jobs: u32) -> Self {
        Self {
            view: JobView::Closed,
            jobs_per_page: jobs_per_page.max(1),
            dashboard_jobs: dashboard_jobs.max(1),
            page: 1,
            total_pages: 1,
            jobs: Vec::new(),
            stats: None,
            pending_page: None,
            pending_stats: None,
            progress_floor: BTreeMap::new(),
        }
    }

    pub fn view(&self) -> JobView {
        self.view
    }

    /// Page whose rows are currently displayed.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn stats(&self) -> Option<&JobStats> {
        self.stats.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_page.is_some()
    }

    pub fn per_page(&self) -> u32 {
        match self.view {
            JobView::Dashboard => self.dashboard_jobs,
            JobView::Closed | JobView::Jobs => self.jobs_per_page,
        }
    }

    pub fn current_page(&self) -> JobPage {
        JobPage {
            jobs: self.jobs.clone(),
            page: self.page,
            total_pages: self.total_pages,
        }
    }

    pub fn find(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == job_id)
    }

    /// Switches to `view`, starting over from an empty first page.
    pub(crate) fn open(&mut self, view: JobView) {
        self.view = view;
        self.page = 1;
        self.total_pages = 1;
        self.jobs.clear();
        self.stats = None;
        self.pending_page = None;
        self.pending_stats = None;
        self.progress_floor.clear();
    }

    /// Drops interest in every in-flight fetch.
    pub(crate) fn close(&mut self) {
        self.view = JobView::Closed;
        self.pending_page = None;
        self.pending_stats = None;
    }

    pub(crate) fn request_page(&mut self, request: RequestId, token: &str, page: u32) -> Effect {
        let page = page.max(1);
        self.pending_page = Some(PendingPage { request, page });
        Effect::FetchJobs {
            request,
            token: token.to_string(),
            page,
            per_page: self.per_page(),
        }
    }

    pub(crate) fn request_stats(&mut self, request: RequestId, token: &str) -> Effect {
        self.pending_stats = Some(request);
        Effect::FetchStats {
            request,
            token: token.to_string(),
        }
    }

    /// The page most recently asked for, displayed or not.
    pub(crate) fn target_page(&self) -> u32 {
        self.pending_page
            .map(|pending| pending.page)
            .unwrap_or(self.page)
    }

    pub(crate) fn next_page(&self) -> Option<u32> {
        let target = self.target_page();
        (target < self.total_pages).then_some(target + 1)
    }

    pub(crate) fn previous_page(&self) -> Option<u32> {
        let target = self.target_page();
        (target > 1).then_some(target - 1)
    }

    pub(crate) fn apply_page(
        &mut self,
        request: RequestId,
        result: Result<JobPageRecord, RequestFailure>,
    ) -> FetchOutcome {
        let pending = match self.pending_page {
            Some(pending) if pending.request == request => pending,
            _ => return FetchOutcome::Stale,
        };
        self.pending_page = None;
        match result {
            Ok(record) => {
                let jobs: Vec<Job> = record
                    .jobs
                    .into_iter()
                    .map(|raw| self.hold_progress(Job::from(raw)))
                    .collect();
                // Jobs no longer on screen lose their floor.
                self.progress_floor
                    .retain(|id, _| jobs.iter().any(|job| job.id == *id));
                self.jobs = jobs;
                self.page = pending.page;
                self.total_pages = record.total_pages.max(1);
                FetchOutcome::Applied
            }
            Err(failure) => FetchOutcome::Failed(failure),
        }
    }

    pub(crate) fn apply_stats(
        &mut self,
        request: RequestId,
        result: Result<JobStats, RequestFailure>,
    ) -> FetchOutcome {
        if self.pending_stats != Some(request) {
            return FetchOutcome::Stale;
        }
        self.pending_stats = None;
        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                FetchOutcome::Applied
            }
            Err(failure) => FetchOutcome::Failed(failure),
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::with_page_sizes(self.jobs_per_page, self.dashboard_jobs);
    }

    fn hold_progress(&mut self, mut job: Job) -> Job {
        if job.status == JobStatus::Processing {
            let floor = self.progress_floor.entry(job.id).or_insert(job.progress);
            *floor = (*floor).max(job.progress);
            job.progress = *floor;
        } else {
            self.progress_floor.remove(&job.id);
        }
        job
    }
}
