use std::sync::{mpsc, Arc};

use engine_logging::{engine_error, engine_info, engine_warn, redact};
use vidjob_core::{
    AuthGrant, Effect, JobPageRecord, JobRecord, JobStats, Msg, RequestFailure, RequestId, User,
};
use vidjob_engine::{
    safe_file_name, ApiError, ApiSettings, AtomicFileWriter, EngineCommand, EngineError,
    EngineEvent, EngineHandle, EventSink, FailureKind, JobDto, JobListResponse, StatsDto,
    UploadFile, UserDto,
};

use super::config::AppConfig;
use super::persistence::TokenStore;

/// Executes core effects: network work goes to the engine, token and
/// artifact writes happen here. Results come back as `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
    tokens: TokenStore,
    downloads: AtomicFileWriter,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, EngineError> {
        let settings = ApiSettings::with_base_url(config.api_base.clone());
        let sink = Arc::new(MsgEventSink {
            tx: msg_tx.clone(),
        });
        let engine = EngineHandle::new(settings, sink)?;
        engine_info!("Engine started against {}", config.api_base);

        Ok(Self {
            engine,
            tokens: TokenStore::new(config.state_dir.clone()),
            downloads: AtomicFileWriter::new(config.download_dir.clone()),
            msg_tx,
        })
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.tokens.load()
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::VerifyToken { token } => self.submit(EngineCommand::Verify { token }),
                Effect::Login {
                    request,
                    username,
                    password,
                } => self.submit(EngineCommand::Login {
                    request: request.value(),
                    username,
                    password,
                }),
                Effect::Register {
                    request,
                    username,
                    email,
                    password,
                } => self.submit(EngineCommand::Register {
                    request: request.value(),
                    username,
                    email,
                    password,
                }),
                Effect::PersistToken { token } => match self.tokens.save(&token) {
                    Ok(path) => engine_info!("Stored session {} in {:?}", redact(&token), path),
                    Err(err) => engine_error!("Failed to store session: {}", err),
                },
                Effect::ClearPersistedToken => match self.tokens.clear() {
                    Ok(true) => engine_info!("Removed stored session"),
                    Ok(false) => {}
                    Err(err) => engine_error!("Failed to remove stored session: {}", err),
                },
                Effect::SubmitUpload {
                    request,
                    token,
                    candidate,
                } => {
                    engine_info!(
                        "Upload request={} file={} size={}",
                        request.value(),
                        candidate.file_name,
                        candidate.size()
                    );
                    self.submit(EngineCommand::Upload {
                        request: request.value(),
                        token,
                        file: UploadFile {
                            file_name: candidate.file_name,
                            media_type: candidate.declared_media_type,
                            bytes: candidate.bytes,
                        },
                    });
                }
                Effect::FetchJobs {
                    request,
                    token,
                    page,
                    per_page,
                } => self.submit(EngineCommand::ListJobs {
                    request: request.value(),
                    token,
                    page,
                    per_page,
                }),
                Effect::FetchStats { request, token } => self.submit(EngineCommand::Stats {
                    request: request.value(),
                    token,
                }),
                Effect::DownloadArtifact {
                    job_id,
                    token,
                    file_name,
                } => self.submit(EngineCommand::Download {
                    job_id,
                    token,
                    file_name,
                }),
                Effect::SaveArtifact { file_name, bytes } => {
                    let msg = self.save_artifact(file_name, &bytes);
                    let _ = self.msg_tx.send(msg);
                }
            }
        }
    }

    fn submit(&self, command: EngineCommand) {
        let undelivered = undelivered_msg(&command);
        if let Err(err) = self.engine.submit(command) {
            engine_error!("Engine refused command: {}", err);
            let _ = self.msg_tx.send(undelivered);
        }
    }

    fn save_artifact(&self, file_name: String, bytes: &[u8]) -> Msg {
        let target = safe_file_name(&file_name);
        let result = self
            .downloads
            .write(&target, bytes)
            .map(|path| path.display().to_string())
            .map_err(|err| {
                engine_warn!("Failed to save {}: {}", target, err);
                err.to_string()
            });
        Msg::ArtifactSaved { file_name, result }
    }
}

/// The completion a command would have produced had the engine been able to
/// run it.
fn undelivered_msg(command: &EngineCommand) -> Msg {
    let failure = || RequestFailure::connectivity("engine stopped");
    match command {
        EngineCommand::Verify { token } => Msg::VerifyFinished {
            token: token.clone(),
            result: Err(failure()),
        },
        EngineCommand::Login { request, .. } | EngineCommand::Register { request, .. } => {
            Msg::AuthFinished {
                request: RequestId::new(*request),
                result: Err(failure()),
            }
        }
        EngineCommand::Upload { request, .. } => Msg::UploadFinished {
            request: RequestId::new(*request),
            result: Err(failure()),
        },
        EngineCommand::ListJobs { request, .. } => Msg::JobsLoaded {
            request: RequestId::new(*request),
            result: Err(failure()),
        },
        EngineCommand::Stats { request, .. } => Msg::StatsLoaded {
            request: RequestId::new(*request),
            result: Err(failure()),
        },
        EngineCommand::Download {
            job_id, file_name, ..
        } => Msg::DownloadFinished {
            job_id: *job_id,
            file_name: file_name.clone(),
            result: Err(failure()),
        },
    }
}

/// Turns engine completions into core messages on the host channel.
struct MsgEventSink {
    tx: mpsc::Sender<Msg>,
}

impl EventSink for MsgEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(map_event(event));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Verified { token, result } => Msg::VerifyFinished {
            token,
            result: result.map(map_user).map_err(map_failure),
        },
        EngineEvent::Authenticated { request, result } => Msg::AuthFinished {
            request: RequestId::new(request),
            result: result
                .map(|grant| AuthGrant {
                    token: grant.token,
                    user: map_user(grant.user),
                })
                .map_err(map_failure),
        },
        EngineEvent::Uploaded { request, result } => Msg::UploadFinished {
            request: RequestId::new(request),
            result: result.map_err(map_failure),
        },
        EngineEvent::JobsListed { request, result } => Msg::JobsLoaded {
            request: RequestId::new(request),
            result: result.map(map_page).map_err(map_failure),
        },
        EngineEvent::StatsFetched { request, result } => Msg::StatsLoaded {
            request: RequestId::new(request),
            result: result.map(map_stats).map_err(map_failure),
        },
        EngineEvent::Downloaded {
            job_id,
            file_name,
            result,
        } => Msg::DownloadFinished {
            job_id,
            file_name,
            result: result.map_err(map_failure),
        },
    }
}

fn map_user(user: UserDto) -> User {
    User {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }
}

fn map_page(listing: JobListResponse) -> JobPageRecord {
    JobPageRecord {
        jobs: listing.jobs.into_iter().map(map_job).collect(),
        total_pages: listing.pages.unwrap_or(1),
    }
}

fn map_job(job: JobDto) -> JobRecord {
    JobRecord {
        id: job.id,
        original_filename: job.original_filename,
        status: job.status.unwrap_or_default(),
        progress: job.progress.unwrap_or(0),
        frame_count: job.frame_count.unwrap_or(0),
        error_message: job.error_message,
        created_at: job.created_at,
    }
}

fn map_stats(stats: StatsDto) -> JobStats {
    JobStats {
        total_jobs: stats.total_jobs,
        completed_jobs: stats.completed_jobs,
        processing_jobs: stats.processing_jobs,
        failed_jobs: stats.failed_jobs,
        success_rate: stats.success_rate,
    }
}

/// Server rejections keep their status and message; everything that kept a
/// usable response from arriving is a connectivity failure.
fn map_failure(err: ApiError) -> RequestFailure {
    match err.kind {
        FailureKind::HttpStatus {
            status,
            server_message,
        } => RequestFailure::Rejected {
            status,
            message: server_message,
        },
        FailureKind::InvalidRequest => RequestFailure::Validation(err.message),
        FailureKind::InvalidUrl
        | FailureKind::Timeout
        | FailureKind::Network
        | FailureKind::InvalidResponse
        | FailureKind::TooLarge { .. } => {
            let detail = err.to_string();
            RequestFailure::Connectivity { detail }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(kind: FailureKind) -> ApiError {
        ApiError {
            kind,
            message: "detail".to_string(),
        }
    }

    #[test]
    fn rejection_keeps_server_message() {
        let failure = map_failure(api_error(FailureKind::HttpStatus {
            status: 401,
            server_message: Some("Invalid username or password".to_string()),
        }));
        assert_eq!(
            failure,
            RequestFailure::rejected(401, "Invalid username or password")
        );
        assert_eq!(failure.user_message("Login failed"), "Invalid username or password");
    }

    #[test]
    fn transport_problems_read_as_connection_error() {
        for kind in [
            FailureKind::Timeout,
            FailureKind::Network,
            FailureKind::InvalidResponse,
            FailureKind::TooLarge {
                max_bytes: 1,
                actual: Some(2),
            },
        ] {
            let failure = map_failure(api_error(kind));
            assert_eq!(failure.user_message("Upload failed"), "Connection error");
        }
    }

    #[test]
    fn job_listing_fills_missing_fields() {
        let msg = map_event(EngineEvent::JobsListed {
            request: 8,
            result: Ok(JobListResponse {
                jobs: vec![JobDto {
                    id: 3,
                    original_filename: "a.mp4".to_string(),
                    status: None,
                    progress: None,
                    frame_count: None,
                    error_message: None,
                    created_at: None,
                }],
                pages: None,
                total: None,
                current_page: None,
            }),
        });

        assert_eq!(
            msg,
            Msg::JobsLoaded {
                request: RequestId::new(8),
                result: Ok(JobPageRecord {
                    jobs: vec![JobRecord {
                        id: 3,
                        original_filename: "a.mp4".to_string(),
                        ..JobRecord::default()
                    }],
                    total_pages: 1,
                }),
            }
        );
    }

    #[test]
    fn undelivered_download_still_completes() {
        let msg = undelivered_msg(&EngineCommand::Download {
            job_id: 4,
            token: "tok".to_string(),
            file_name: "frames_a.mp4_4.zip".to_string(),
        });
        assert!(matches!(
            msg,
            Msg::DownloadFinished {
                job_id: 4,
                result: Err(RequestFailure::Connectivity { .. }),
                ..
            }
        ));
    }
}
