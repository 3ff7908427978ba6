//! Encore engine: backend IO and bounded song enrichment.
mod api;
mod config;
mod engine;
mod enrich;
mod runner;
mod types;
mod wire;

pub use api::{ApiSettings, ChannelProgressSink, MusicApi, ProgressSink, ReqwestApi};
pub use config::EngineConfig;
pub use engine::{EngineError, EngineHandle};
pub use enrich::enrich_songs;
pub use runner::{BoundedRunner, ItemOutcome, RunPhase, RunProgress, RunReport, RunnerError};
pub use types::{ApiError, EngineEvent, FailureKind, SearchResult};
