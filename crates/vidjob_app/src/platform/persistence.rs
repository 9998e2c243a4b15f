use std::fs;
use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn, redact};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vidjob_engine::{AtomicFileWriter, PersistError};

const SESSION_FILENAME: &str = "session.ron";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("could not serialize session: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
}

/// Durable home of the session token: `<state_dir>/session.ron`.
pub struct TokenStore {
    writer: AtomicFileWriter,
}

impl TokenStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(state_dir),
        }
    }

    fn path(&self) -> PathBuf {
        self.writer.dir().join(SESSION_FILENAME)
    }

    /// Missing, unreadable and unparsable files all mean "no token".
    pub fn load(&self) -> Option<String> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                engine_warn!("Failed to read session from {:?}: {}", path, err);
                return None;
            }
        };

        match ron::from_str::<PersistedSession>(&content) {
            Ok(session) => {
                engine_info!(
                    "Loaded session {} from {:?}",
                    redact(&session.token),
                    path
                );
                Some(session.token)
            }
            Err(err) => {
                engine_warn!("Failed to parse session from {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<PathBuf, TokenStoreError> {
        let session = PersistedSession {
            token: token.to_string(),
        };
        let content = ron::ser::to_string_pretty(&session, ron::ser::PrettyConfig::new())?;
        Ok(self.writer.write(SESSION_FILENAME, content.as_bytes())?)
    }

    /// Returns whether a stored token was removed.
    pub fn clear(&self) -> Result<bool, TokenStoreError> {
        Ok(self.writer.remove(SESSION_FILENAME)?)
    }
}
