use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_warn, redact};

use crate::api::{ApiSettings, Backend, ReqwestBackend, UploadFile};
use crate::{ApiError, EngineEvent};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] std::io::Error),
    #[error("backend configuration rejected: {0}")]
    Backend(#[from] ApiError),
    #[error("engine is no longer running")]
    Stopped,
}

/// Receives engine completions. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Work for the engine. `request` tags are echoed back in the matching event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Verify {
        token: String,
    },
    Login {
        request: u64,
        username: String,
        password: String,
    },
    Register {
        request: u64,
        username: String,
        email: String,
        password: String,
    },
    Upload {
        request: u64,
        token: String,
        file: UploadFile,
    },
    ListJobs {
        request: u64,
        token: String,
        page: u32,
        per_page: u32,
    },
    Stats {
        request: u64,
        token: String,
    },
    Download {
        job_id: u64,
        token: String,
        file_name: String,
    },
}

/// Runs commands concurrently on a background runtime. Commands are never
/// aborted; every one of them eventually produces exactly one event.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let backend = Arc::new(ReqwestBackend::new(settings)?);
        Self::with_backend(backend, sink)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let runtime = tokio::runtime::Runtime::new().map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("vidjob-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let backend = backend.clone();
                    let sink = sink.clone();
                    runtime.spawn(async move {
                        let event = handle_command(backend.as_ref(), command).await;
                        sink.emit(event);
                    });
                }
                engine_debug!("Engine command channel closed");
            })
            .map_err(EngineError::Thread)?;

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(command).map_err(|_| EngineError::Stopped)
    }
}

async fn handle_command(backend: &dyn Backend, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Verify { token } => {
            engine_debug!("Verifying token {}", redact(&token));
            let result = backend.verify(&token).await;
            log_failure("verify", &result);
            EngineEvent::Verified { token, result }
        }
        EngineCommand::Login {
            request,
            username,
            password,
        } => {
            let result = backend.login(&username, &password).await;
            log_failure("login", &result);
            EngineEvent::Authenticated { request, result }
        }
        EngineCommand::Register {
            request,
            username,
            email,
            password,
        } => {
            let result = backend.register(&username, &email, &password).await;
            log_failure("register", &result);
            EngineEvent::Authenticated { request, result }
        }
        EngineCommand::Upload {
            request,
            token,
            file,
        } => {
            let result = backend.upload(&token, file).await;
            log_failure("upload", &result);
            EngineEvent::Uploaded { request, result }
        }
        EngineCommand::ListJobs {
            request,
            token,
            page,
            per_page,
        } => {
            let result = backend.list_jobs(&token, page, per_page).await;
            log_failure("list jobs", &result);
            EngineEvent::JobsListed { request, result }
        }
        EngineCommand::Stats { request, token } => {
            let result = backend.stats(&token).await;
            log_failure("stats", &result);
            EngineEvent::StatsFetched { request, result }
        }
        EngineCommand::Download {
            job_id,
            token,
            file_name,
        } => {
            let result = backend.download(&token, job_id).await;
            log_failure("download", &result);
            EngineEvent::Downloaded {
                job_id,
                file_name,
                result,
            }
        }
    }
}

fn log_failure<T>(operation: &str, result: &Result<T, ApiError>) {
    if let Err(err) = result {
        engine_warn!("{} failed: {}", operation, err);
    }
}
