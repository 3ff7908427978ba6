use std::fmt;

use encore_core::{RunId, Singer, Song, SongIndex, Tour};

use crate::runner::RunProgress;

/// Result of `GET /api/search_singer`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub singer: Option<Singer>,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ToursLoaded(Result<Vec<Tour>, ApiError>),
    SearchCompleted {
        name: String,
        result: Result<SearchResult, ApiError>,
    },
    /// One enrichment job settled; `index` is the item position in the run.
    ItemSettled {
        run_id: RunId,
        index: usize,
        mid: String,
        result: Result<SongIndex, ApiError>,
    },
    Progress {
        run_id: RunId,
        progress: RunProgress,
    },
    /// Emitted exactly once per run, after the last `Progress`.
    RunCompleted {
        run_id: RunId,
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the backend answered but had nothing usable for us.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::Application { .. } | FailureKind::MissingData
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    /// The backend answered with a non-zero application `code`.
    Application { code: i64 },
    /// The envelope had `code == 0` but no `data`.
    MissingData,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Application { code } => write!(f, "backend code {code}"),
            FailureKind::MissingData => write!(f, "no data"),
        }
    }
}
