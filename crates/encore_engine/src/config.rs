use encore_core::DEFAULT_FEATURED_TOUR;

use crate::api::ApiSettings;

/// Everything the engine needs to talk to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub api: ApiSettings,
    /// Maximum number of `song_index` requests in flight per run.
    pub concurrency_limit: usize,
    pub featured_tour: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            // The backend runs on a Raspberry Pi; one request at a time.
            concurrency_limit: 1,
            featured_tour: DEFAULT_FEATURED_TOUR.to_string(),
        }
    }
}
