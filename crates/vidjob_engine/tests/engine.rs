use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use vidjob_engine::{
    ApiError, AuthResponse, Backend, ChannelEventSink, EngineCommand, EngineEvent, EngineHandle,
    JobListResponse, StatsDto, UploadFile, UserDto,
};

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn user() -> UserDto {
    UserDto {
        id: 1,
        username: "ana".to_string(),
        email: None,
        created_at: None,
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn verify(&self, token: &str) -> Result<UserDto, ApiError> {
        self.record(format!("verify {token}"));
        Ok(user())
    }

    async fn login(&self, username: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.record(format!("login {username}"));
        Ok(AuthResponse {
            token: "tok".to_string(),
            user: user(),
        })
    }

    async fn register(
        &self,
        username: &str,
        _email: &str,
        _password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.record(format!("register {username}"));
        Ok(AuthResponse {
            token: "tok".to_string(),
            user: user(),
        })
    }

    async fn upload(&self, _token: &str, file: UploadFile) -> Result<u64, ApiError> {
        self.record(format!("upload {}", file.file_name));
        Ok(99)
    }

    async fn list_jobs(
        &self,
        _token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<JobListResponse, ApiError> {
        // Earlier pages answer later, to exercise out-of-order completion.
        if page == 1 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.record(format!("jobs {page}/{per_page}"));
        Ok(JobListResponse {
            jobs: Vec::new(),
            pages: Some(3),
            total: Some(0),
            current_page: Some(page),
        })
    }

    async fn stats(&self, _token: &str) -> Result<StatsDto, ApiError> {
        self.record("stats");
        Ok(StatsDto {
            total_jobs: 0,
            completed_jobs: 0,
            processing_jobs: 0,
            failed_jobs: 0,
            success_rate: 0.0,
        })
    }

    async fn download(&self, _token: &str, job_id: u64) -> Result<Vec<u8>, ApiError> {
        self.record(format!("download {job_id}"));
        Ok(vec![1, 2, 3])
    }
}

fn start() -> (EngineHandle, mpsc::Receiver<EngineEvent>, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::default());
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::with_backend(backend.clone(), Arc::new(ChannelEventSink::new(tx)))
        .expect("engine");
    (engine, rx, backend)
}

#[test]
fn every_command_produces_its_event() {
    let (engine, rx, backend) = start();
    engine
        .submit(EngineCommand::Login {
            request: 4,
            username: "ana".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();

    let event = rx.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::Authenticated {
            request: 4,
            result: Ok(AuthResponse {
                token: "tok".to_string(),
                user: user(),
            }),
        }
    );
    assert_eq!(*backend.calls.lock().unwrap(), vec!["login ana".to_string()]);

    engine
        .submit(EngineCommand::Download {
            job_id: 7,
            token: "tok".to_string(),
            file_name: "frames_a.mp4_7.zip".to_string(),
        })
        .unwrap();
    let event = rx.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::Downloaded {
            job_id: 7,
            file_name: "frames_a.mp4_7.zip".to_string(),
            result: Ok(vec![1, 2, 3]),
        }
    );
}

#[test]
fn commands_run_concurrently_and_complete_out_of_order() {
    let (engine, rx, _backend) = start();
    for (request, page) in [(1, 1), (2, 2)] {
        engine
            .submit(EngineCommand::ListJobs {
                request,
                token: "tok".to_string(),
                page,
                per_page: 10,
            })
            .unwrap();
    }

    let order: Vec<u64> = (0..2)
        .map(|_| match rx.recv_timeout(Duration::from_secs(5)).expect("event") {
            EngineEvent::JobsListed { request, .. } => request,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(order, vec![2, 1]);
}
