use crate::{JobId, RequestId, UploadCandidate};

/// Side effects requested by [`crate::update`]; executed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    VerifyToken {
        token: String,
    },
    Login {
        request: RequestId,
        username: String,
        password: String,
    },
    Register {
        request: RequestId,
        username: String,
        email: String,
        password: String,
    },
    PersistToken {
        token: String,
    },
    ClearPersistedToken,
    SubmitUpload {
        request: RequestId,
        token: String,
        candidate: UploadCandidate,
    },
    FetchJobs {
        request: RequestId,
        token: String,
        page: u32,
        per_page: u32,
    },
    FetchStats {
        request: RequestId,
        token: String,
    },
    DownloadArtifact {
        job_id: JobId,
        token: String,
        file_name: String,
    },
    /// Hand a named binary payload to the host's save/export facility.
    SaveArtifact {
        file_name: String,
        bytes: Vec<u8>,
    },
}
