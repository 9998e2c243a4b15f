use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use vidjob_engine::{
    ApiSettings, AuthResponse, Backend, FailureKind, JobDto, ReqwestBackend, UploadFile, UserDto,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(ApiSettings::with_base_url(format!("{}/api", server.uri())))
        .expect("backend")
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 3,
        "username": "ana",
        "email": "ana@example.com",
        "created_at": "2024-05-01T10:00:00"
    })
}

#[tokio::test]
async fn login_posts_credentials_and_returns_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "ana", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "token": "tok-123",
            "user": user_json()
        })))
        .mount(&server)
        .await;

    let grant = backend_for(&server).login("ana", "pw").await.expect("login");
    assert_eq!(
        grant,
        AuthResponse {
            token: "tok-123".to_string(),
            user: UserDto {
                id: 3,
                username: "ana".to_string(),
                email: Some("ana@example.com".to_string()),
                created_at: Some("2024-05-01T10:00:00".to_string()),
            },
        }
    );
}

#[tokio::test]
async fn rejected_login_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid username or password" })),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).login("ana", "bad").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 401,
            server_message: Some("Invalid username or password".to_string()),
        }
    );
}

#[tokio::test]
async fn register_accepts_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(
            json!({ "username": "bea", "email": "bea@example.com", "password": "pw" }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "reg",
            "user": { "id": 9, "username": "bea" }
        })))
        .mount(&server)
        .await;

    let grant = backend_for(&server)
        .register("bea", "bea@example.com", "pw")
        .await
        .expect("register");
    assert_eq!(grant.token, "reg");
    assert_eq!(grant.user.email, None);
}

#[tokio::test]
async fn verify_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "user": user_json()
        })))
        .mount(&server)
        .await;

    let user = backend_for(&server).verify("tok-123").await.expect("verify");
    assert_eq!(user.username, "ana");
}

#[tokio::test]
async fn verify_with_expired_token_fails_without_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = backend_for(&server).verify("stale").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 401,
            server_message: None,
        }
    );
}

#[tokio::test]
async fn upload_sends_multipart_video_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/video/upload"))
        .and(header("Authorization", "Bearer tok"))
        .and(body_string_contains("name=\"video\""))
        .and(body_string_contains("filename=\"clip.mp4\""))
        .and(body_string_contains("video/mp4"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Video uploaded successfully and queued for processing",
            "job_id": 17,
            "status": "pending"
        })))
        .mount(&server)
        .await;

    let job_id = backend_for(&server)
        .upload(
            "tok",
            UploadFile {
                file_name: "clip.mp4".to_string(),
                media_type: "video/mp4".to_string(),
                bytes: b"fake-video-bytes".to_vec(),
            },
        )
        .await
        .expect("upload");
    assert_eq!(job_id, 17);
}

#[tokio::test]
async fn list_jobs_passes_paging_and_tolerates_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/jobs"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [
                {
                    "id": 5,
                    "user_id": 3,
                    "original_filename": "a.mp4",
                    "status": "processing",
                    "progress": 40,
                    "frame_count": 0,
                    "zip_file_path": null,
                    "error_message": null,
                    "created_at": "2024-05-01T10:00:00"
                },
                {
                    "id": 4,
                    "original_filename": "b.mov",
                    "status": "failed",
                    "progress": null,
                    "frame_count": null,
                    "error_message": "corrupt input"
                }
            ],
            "total": 12,
            "pages": 2,
            "current_page": 2
        })))
        .mount(&server)
        .await;

    let listing = backend_for(&server)
        .list_jobs("tok", 2, 10)
        .await
        .expect("jobs");
    assert_eq!(listing.pages, Some(2));
    assert_eq!(listing.total, Some(12));
    assert_eq!(
        listing.jobs[1],
        JobDto {
            id: 4,
            original_filename: "b.mov".to_string(),
            status: Some("failed".to_string()),
            progress: None,
            frame_count: None,
            error_message: Some("corrupt input".to_string()),
            created_at: None,
        }
    );
}

#[tokio::test]
async fn stats_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_jobs": 4,
            "completed_jobs": 3,
            "processing_jobs": 1,
            "failed_jobs": 0,
            "success_rate": 75.0
        })))
        .mount(&server)
        .await;

    let stats = backend_for(&server).stats("tok").await.expect("stats");
    assert_eq!(stats.total_jobs, 4);
    assert_eq!(stats.success_rate, 75.0);
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).stats("tok").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn download_returns_artifact_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/jobs/12/download"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"PK\x03\x04zip".to_vec(), "application/zip"),
        )
        .mount(&server)
        .await;

    let bytes = backend_for(&server).download("tok", 12).await.expect("download");
    assert_eq!(bytes, b"PK\x03\x04zip".to_vec());
}

#[tokio::test]
async fn download_of_unfinished_job_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/jobs/12/download"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Job not completed yet" })),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).download("tok", 12).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 400,
            server_message: Some("Job not completed yet".to_string()),
        }
    );
}

#[tokio::test]
async fn download_over_cap_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/jobs/1/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        max_artifact_bytes: 16,
        ..ApiSettings::with_base_url(format!("{}/api", server.uri()))
    };
    let err = ReqwestBackend::new(settings)
        .expect("backend")
        .download("tok", 1)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 16,
            actual: Some(64)
        }
    );
}

#[tokio::test]
async fn slow_backend_times_out_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/video/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..ApiSettings::with_base_url(format!("{}/api", server.uri()))
    };
    let err = ReqwestBackend::new(settings)
        .expect("backend")
        .stats("tok")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_network_failure() {
    let backend = ReqwestBackend::new(ApiSettings::with_base_url("http://127.0.0.1:1/api"))
        .expect("backend");
    let err = backend.login("ana", "pw").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestBackend::new(ApiSettings::with_base_url("not a url")).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[test]
fn base_url_gains_trailing_slash() {
    let backend =
        ReqwestBackend::new(ApiSettings::with_base_url("http://localhost:8080/api")).expect("backend");
    assert_eq!(backend.base_url().as_str(), "http://localhost:8080/api/");
}
