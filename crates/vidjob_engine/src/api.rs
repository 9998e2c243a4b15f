use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::types::{ErrorBody, UploadResponse, VerifyResponse};
use crate::{ApiError, AuthResponse, FailureKind, JobListResponse, StatsDto, UserDto};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Prefix for every endpoint, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves request duration to the transport.
    pub request_timeout: Option<Duration>,
    pub max_artifact_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_artifact_bytes: 1024 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// A file ready to be sent as the `video` multipart field.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// The processing backend's HTTP contract.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserDto, ApiError>;

    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;

    /// Returns the id of the created job.
    async fn upload(&self, token: &str, file: UploadFile) -> Result<u64, ApiError>;

    async fn list_jobs(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<JobListResponse, ApiError>;

    async fn stats(&self, token: &str) -> Result<StatsDto, ApiError>;

    async fn download(&self, token: &str, job_id: u64) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        // `Url::join` drops the last segment unless the base ends in '/'.
        let mut base_text = settings.base_url.trim().to_string();
        if !base_text.ends_with('/') {
            base_text.push('/');
        }
        let base = Url::parse(&base_text)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn post_json(&self, url: Url, body: &serde_json::Value) -> RequestBuilder {
        self.client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn verify(&self, token: &str) -> Result<UserDto, ApiError> {
        let url = self.endpoint("auth/verify")?;
        let response = send(self.post_json(url, &json!({})).bearer_auth(token)).await?;
        let body: VerifyResponse = read_json(response).await?;
        Ok(body.user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        let body = json!({ "username": username, "password": password });
        let response = send(self.post_json(url, &body)).await?;
        read_json(response).await
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("auth/register")?;
        let body = json!({ "username": username, "email": email, "password": password });
        let response = send(self.post_json(url, &body)).await?;
        read_json(response).await
    }

    async fn upload(&self, token: &str, file: UploadFile) -> Result<u64, ApiError> {
        let url = self.endpoint("video/upload")?;
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|err| ApiError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let form = Form::new().part("video", part);
        engine_debug!(
            "Uploading {} ({} bytes, {})",
            file.file_name,
            size,
            file.media_type
        );

        let response = send(self.client.post(url).bearer_auth(token).multipart(form)).await?;
        let body: UploadResponse = read_json(response).await?;
        Ok(body.job_id)
    }

    async fn list_jobs(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<JobListResponse, ApiError> {
        let mut url = self.endpoint("video/jobs")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        let response = send(self.client.get(url).bearer_auth(token)).await?;
        read_json(response).await
    }

    async fn stats(&self, token: &str) -> Result<StatsDto, ApiError> {
        let url = self.endpoint("video/stats")?;
        let response = send(self.client.get(url).bearer_auth(token)).await?;
        read_json(response).await
    }

    async fn download(&self, token: &str, job_id: u64) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("video/jobs/{job_id}/download"))?;
        let response = send(self.client.get(url).bearer_auth(token)).await?;
        let max_bytes = self.settings.max_artifact_bytes;

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "artifact too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "artifact too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// Sends a request and turns non-success statuses into `HttpStatus` errors,
/// keeping the server's `error` text when the body carries one.
async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let server_message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error);
    engine_warn!(
        "Backend answered {} ({})",
        status,
        server_message.as_deref().unwrap_or("no message")
    );
    Err(ApiError::new(
        FailureKind::HttpStatus {
            status: status.as_u16(),
            server_message,
        },
        status.to_string(),
    ))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::InvalidResponse, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
