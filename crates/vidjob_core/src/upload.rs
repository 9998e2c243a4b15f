use thiserror::Error;

use crate::{Effect, RequestFailure, RequestId};

/// Human-readable list of accepted containers.
pub const SUPPORTED_FORMATS: &str = "MP4, AVI, MOV, MKV, WMV, WEBM";

// Short forms plus the registered/vendor names hosts commonly report.
const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/msvideo",
    "video/x-msvideo",
    "video/mov",
    "video/quicktime",
    "video/mkv",
    "video/x-matroska",
    "video/wmv",
    "video/x-ms-wmv",
    "video/webm",
];

/// A selected file waiting to be submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    pub declared_media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        declared_media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            declared_media_type: declared_media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Payloads are large; keep them out of debug output.
impl std::fmt::Debug for UploadCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCandidate")
            .field("file_name", &self.file_name)
            .field("declared_media_type", &self.declared_media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported file format. Use: {SUPPORTED_FORMATS}")]
pub struct UploadRejected {
    pub declared_media_type: String,
}

/// Checks the declared media type against the allow-list. Parameters such
/// as `; codecs=...` are ignored and the comparison is case-insensitive.
pub fn validate_upload(candidate: &UploadCandidate) -> Result<(), UploadRejected> {
    let declared = candidate.declared_media_type.as_str();
    let essence = declared.split(';').next().unwrap_or(declared).trim();
    if ALLOWED_MEDIA_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    {
        Ok(())
    } else {
        Err(UploadRejected {
            declared_media_type: declared.to_string(),
        })
    }
}

/// Holds the current selection and the in-flight upload, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSubmitter {
    selected: Option<UploadCandidate>,
    in_flight: Option<RequestId>,
}

impl JobSubmitter {
    pub fn selected(&self) -> Option<&UploadCandidate> {
        self.selected.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replaces the selection. A rejected file clears any previous one.
    pub(crate) fn select(&mut self, candidate: UploadCandidate) -> Result<(), UploadRejected> {
        match validate_upload(&candidate) {
            Ok(()) => {
                self.selected = Some(candidate);
                Ok(())
            }
            Err(rejected) => {
                self.selected = None;
                Err(rejected)
            }
        }
    }

    /// Consumes the selection and produces the upload effect.
    ///
    /// Returns `Ok(None)` when there is nothing to send or an upload is
    /// already running. Without a token the selection is discarded and no
    /// effect is produced.
    pub(crate) fn submit(
        &mut self,
        request: RequestId,
        token: Option<&str>,
    ) -> Result<Option<Effect>, RequestFailure> {
        if self.in_flight.is_some() {
            return Ok(None);
        }
        let Some(candidate) = self.selected.take() else {
            return Ok(None);
        };
        let Some(token) = token else {
            return Err(RequestFailure::AuthenticationRequired);
        };
        self.in_flight = Some(request);
        Ok(Some(Effect::SubmitUpload {
            request,
            token: token.to_string(),
            candidate,
        }))
    }

    /// Clears the in-flight marker. Returns false for stale completions.
    pub(crate) fn finish(&mut self, request: RequestId) -> bool {
        if self.in_flight == Some(request) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(media_type: &str) -> UploadCandidate {
        UploadCandidate::new("clip", media_type, vec![0; 4])
    }

    #[test]
    fn accepts_every_listed_container() {
        for media_type in [
            "video/mp4",
            "video/avi",
            "video/mov",
            "video/mkv",
            "video/wmv",
            "video/webm",
            "video/quicktime",
            "VIDEO/MP4",
            "video/webm; codecs=vp9",
        ] {
            assert!(validate_upload(&candidate(media_type)).is_ok(), "{media_type}");
        }
    }

    #[test]
    fn rejection_names_supported_formats() {
        let err = validate_upload(&candidate("video/x-flv")).unwrap_err();
        assert_eq!(err.declared_media_type, "video/x-flv");
        assert!(err.to_string().contains(SUPPORTED_FORMATS));
        assert!(validate_upload(&candidate("")).is_err());
        assert!(validate_upload(&candidate("image/png")).is_err());
    }

    #[test]
    fn submit_without_token_discards_selection() {
        let mut submitter = JobSubmitter::default();
        submitter.select(candidate("video/mp4")).unwrap();

        let result = submitter.submit(RequestId::new(1), None);
        assert_eq!(result, Err(RequestFailure::AuthenticationRequired));
        assert!(submitter.selected().is_none());
        assert!(!submitter.is_uploading());
    }

    #[test]
    fn stale_finish_is_ignored() {
        let mut submitter = JobSubmitter::default();
        submitter.select(candidate("video/mp4")).unwrap();
        let effect = submitter.submit(RequestId::new(3), Some("tok")).unwrap();
        assert!(effect.is_some());
        assert!(!submitter.finish(RequestId::new(2)));
        assert!(submitter.is_uploading());
        assert!(submitter.finish(RequestId::new(3)));
        assert!(!submitter.is_uploading());
    }
}
