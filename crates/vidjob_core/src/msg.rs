use crate::{
    AuthGrant, JobId, JobPageRecord, JobStats, RequestFailure, RequestId, UploadCandidate, User,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Startup: the token found in durable storage, if any.
    Restore { persisted_token: Option<String> },
    /// Backend answered a token verification.
    VerifyFinished {
        token: String,
        result: Result<User, RequestFailure>,
    },
    /// User submitted the login form.
    LoginSubmitted { username: String, password: String },
    /// User submitted the registration form.
    RegisterSubmitted {
        username: String,
        email: String,
        password: String,
    },
    /// Backend answered a login or registration.
    AuthFinished {
        request: RequestId,
        result: Result<AuthGrant, RequestFailure>,
    },
    /// User clicked Logout.
    LogoutClicked,
    /// User picked a file for upload.
    FileSelected(UploadCandidate),
    /// User clicked Upload.
    UploadClicked,
    /// Backend answered an upload.
    UploadFinished {
        request: RequestId,
        result: Result<JobId, RequestFailure>,
    },
    /// Dashboard became visible: stats plus recent jobs.
    DashboardOpened,
    /// Paginated jobs view became visible.
    JobsViewOpened,
    /// User asked for a specific page.
    PageRequested { page: u32 },
    NextPage,
    PreviousPage,
    /// User asked to reload the open view.
    RefreshClicked,
    /// User navigated away from the job views.
    ViewClosed,
    JobsLoaded {
        request: RequestId,
        result: Result<JobPageRecord, RequestFailure>,
    },
    StatsLoaded {
        request: RequestId,
        result: Result<JobStats, RequestFailure>,
    },
    /// User clicked Download on a job row.
    DownloadClicked { job_id: JobId },
    DownloadFinished {
        job_id: JobId,
        file_name: String,
        result: Result<Vec<u8>, RequestFailure>,
    },
    /// Host finished writing a downloaded artifact; `Ok` carries its location.
    ArtifactSaved {
        file_name: String,
        result: Result<String, String>,
    },
    DismissNotice,
    /// Fallback for placeholder wiring.
    NoOp,
}
