//! Vidjob engine: HTTP backend client, effect execution and file output.
mod api;
mod engine;
mod filename;
mod persist;
mod types;

pub use api::{ApiSettings, Backend, ReqwestBackend, UploadFile};
pub use engine::{ChannelEventSink, EngineCommand, EngineError, EngineHandle, EventSink};
pub use filename::safe_file_name;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, AuthResponse, EngineEvent, FailureKind, JobDto, JobListResponse, StatsDto, UserDto,
};
