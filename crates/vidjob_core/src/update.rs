use crate::job_list::FetchOutcome;
use crate::session::{AuthOutcome, VerifyOutcome};
use crate::{AppState, AuthKind, Effect, JobView, Msg, Notice, RequestFailure};

const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Restore { persisted_token } => {
            let had_token = persisted_token.is_some();
            match state.session.restore(persisted_token) {
                Some(token) => {
                    state.mark_dirty();
                    vec![Effect::VerifyToken { token }]
                }
                // A blank stored value is as good as none; drop it.
                None if had_token && state.session.session().is_anonymous() => {
                    vec![Effect::ClearPersistedToken]
                }
                None => Vec::new(),
            }
        }
        Msg::VerifyFinished { token, result } => {
            match state.session.apply_verification(&token, result) {
                VerifyOutcome::Ignored => Vec::new(),
                VerifyOutcome::Accepted => {
                    state.mark_dirty();
                    open_view(&mut state, JobView::Dashboard)
                }
                VerifyOutcome::Rejected(failure) => {
                    state.set_notice(Notice::error(failure.user_message(SESSION_EXPIRED)));
                    vec![Effect::ClearPersistedToken]
                }
            }
        }
        Msg::LoginSubmitted { username, password } => {
            let username = username.trim().to_string();
            if username.is_empty() || password.is_empty() {
                state.set_notice(Notice::error("Username and password are required"));
                return (state, Vec::new());
            }
            let request = state.issue_request();
            if !state.session.begin_auth(request, AuthKind::Login) {
                return (state, Vec::new());
            }
            state.notice = None;
            state.mark_dirty();
            vec![Effect::Login {
                request,
                username,
                password,
            }]
        }
        Msg::RegisterSubmitted {
            username,
            email,
            password,
        } => {
            let username = username.trim().to_string();
            let email = email.trim().to_string();
            if username.is_empty() || email.is_empty() || password.is_empty() {
                state.set_notice(Notice::error("Username, email and password are required"));
                return (state, Vec::new());
            }
            let request = state.issue_request();
            if !state.session.begin_auth(request, AuthKind::Register) {
                return (state, Vec::new());
            }
            state.notice = None;
            state.mark_dirty();
            vec![Effect::Register {
                request,
                username,
                email,
                password,
            }]
        }
        Msg::AuthFinished { request, result } => match state.session.apply_auth(request, result) {
            AuthOutcome::Stale => Vec::new(),
            AuthOutcome::Established { kind, token } => {
                state.set_notice(Notice::info(kind.success_text()));
                let mut effects = vec![Effect::PersistToken { token }];
                effects.extend(open_view(&mut state, JobView::Dashboard));
                effects
            }
            AuthOutcome::Failed { kind, failure } => {
                state.set_notice(Notice::error(failure.user_message(kind.failure_fallback())));
                Vec::new()
            }
        },
        Msg::LogoutClicked => {
            state.session.logout();
            state.submitter.reset();
            state.jobs.reset();
            state.status_view.reset();
            state.set_notice(Notice::info("Logged out successfully"));
            vec![Effect::ClearPersistedToken]
        }
        Msg::FileSelected(candidate) => {
            match state.submitter.select(candidate) {
                Ok(()) => state.notice = None,
                Err(rejected) => state.notice = Some(Notice::error(rejected.to_string())),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadClicked => {
            let request = state.issue_request();
            let token = state.session.authenticated_token().map(str::to_owned);
            match state.submitter.submit(request, token.as_deref()) {
                Ok(Some(effect)) => {
                    state.notice = None;
                    state.mark_dirty();
                    vec![effect]
                }
                Ok(None) => Vec::new(),
                Err(failure) => {
                    state.set_notice(Notice::error(failure.user_message("Upload failed")));
                    Vec::new()
                }
            }
        }
        Msg::UploadFinished { request, result } => {
            if !state.submitter.finish(request) {
                return (state, Vec::new());
            }
            match result {
                Ok(job_id) => {
                    state.set_notice(Notice::info(format!(
                        "Upload succeeded. Job ID: {job_id}"
                    )));
                    refresh(&mut state)
                }
                Err(failure) => {
                    state.set_notice(Notice::error(failure.user_message("Upload failed")));
                    Vec::new()
                }
            }
        }
        Msg::DashboardOpened => open_view(&mut state, JobView::Dashboard),
        Msg::JobsViewOpened => open_view(&mut state, JobView::Jobs),
        Msg::PageRequested { page } => {
            if state.jobs.view() == JobView::Closed {
                if authenticated_token(&mut state).is_none() {
                    return (state, Vec::new());
                }
                state.jobs.open(JobView::Jobs);
            }
            request_page(&mut state, page)
        }
        Msg::NextPage => match state.jobs.next_page() {
            Some(page) if state.jobs.view() != JobView::Closed => request_page(&mut state, page),
            _ => Vec::new(),
        },
        Msg::PreviousPage => match state.jobs.previous_page() {
            Some(page) if state.jobs.view() != JobView::Closed => request_page(&mut state, page),
            _ => Vec::new(),
        },
        Msg::RefreshClicked => refresh(&mut state),
        Msg::ViewClosed => {
            state.jobs.close();
            state.mark_dirty();
            Vec::new()
        }
        Msg::JobsLoaded { request, result } => {
            let outcome = state.jobs.apply_page(request, result);
            apply_fetch_outcome(&mut state, outcome, "Could not load jobs");
            Vec::new()
        }
        Msg::StatsLoaded { request, result } => {
            let outcome = state.jobs.apply_stats(request, result);
            apply_fetch_outcome(&mut state, outcome, "Could not load statistics");
            Vec::new()
        }
        Msg::DownloadClicked { job_id } => {
            let token = state.session.authenticated_token().map(str::to_owned);
            let job = state.jobs.find(job_id).cloned();
            match state
                .status_view
                .request_download(job_id, job.as_ref(), token.as_deref())
            {
                Ok(Some(effect)) => {
                    state.mark_dirty();
                    vec![effect]
                }
                Ok(None) => Vec::new(),
                Err(failure) => {
                    state.set_notice(Notice::error(failure.user_message("Download failed")));
                    Vec::new()
                }
            }
        }
        Msg::DownloadFinished {
            job_id,
            file_name,
            result,
        } => {
            if !state.status_view.finish_download(job_id) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(bytes) => vec![Effect::SaveArtifact { file_name, bytes }],
                Err(failure) => {
                    state.set_notice(Notice::error(failure.user_message("Download failed")));
                    Vec::new()
                }
            }
        }
        Msg::ArtifactSaved { file_name, result } => {
            let notice = match result {
                Ok(location) => Notice::info(format!("Saved {location}")),
                Err(reason) => Notice::error(format!("Could not save {file_name}: {reason}")),
            };
            state.set_notice(notice);
            Vec::new()
        }
        Msg::DismissNotice => {
            if state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Opens a job view and asks for its data. Requires a verified session.
fn open_view(state: &mut AppState, view: JobView) -> Vec<Effect> {
    let Some(token) = authenticated_token(state) else {
        return Vec::new();
    };
    state.jobs.open(view);
    state.mark_dirty();
    let mut effects = Vec::with_capacity(2);
    if view == JobView::Dashboard {
        let request = state.issue_request();
        effects.push(state.jobs.request_stats(request, &token));
    }
    let request = state.issue_request();
    effects.push(state.jobs.request_page(request, &token, 1));
    effects
}

fn request_page(state: &mut AppState, page: u32) -> Vec<Effect> {
    let Some(token) = authenticated_token(state) else {
        return Vec::new();
    };
    let request = state.issue_request();
    state.mark_dirty();
    vec![state.jobs.request_page(request, &token, page)]
}

/// Re-fetches the open view at the page most recently asked for.
fn refresh(state: &mut AppState) -> Vec<Effect> {
    let view = state.jobs.view();
    if view == JobView::Closed {
        return Vec::new();
    }
    let Some(token) = authenticated_token(state) else {
        return Vec::new();
    };
    let mut effects = Vec::with_capacity(2);
    if view == JobView::Dashboard {
        let request = state.issue_request();
        effects.push(state.jobs.request_stats(request, &token));
    }
    let page = state.jobs.target_page();
    let request = state.issue_request();
    effects.push(state.jobs.request_page(request, &token, page));
    state.mark_dirty();
    effects
}

/// Token for protected calls; sets the authentication notice when absent.
fn authenticated_token(state: &mut AppState) -> Option<String> {
    match state.session.authenticated_token() {
        Some(token) => Some(token.to_string()),
        None => {
            state.set_notice(Notice::error(
                RequestFailure::AuthenticationRequired.user_message(""),
            ));
            None
        }
    }
}

fn apply_fetch_outcome(state: &mut AppState, outcome: FetchOutcome, fallback: &str) {
    match outcome {
        FetchOutcome::Stale => {}
        FetchOutcome::Applied => state.mark_dirty(),
        FetchOutcome::Failed(failure) => {
            state.set_notice(Notice::error(failure.user_message(fallback)));
        }
    }
}
