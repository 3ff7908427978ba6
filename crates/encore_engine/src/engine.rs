use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use encore_core::{RunId, Song};
use engine_logging::{engine_debug, engine_error};
use tokio_util::sync::CancellationToken;

use crate::api::{ChannelProgressSink, MusicApi, ProgressSink, ReqwestApi};
use crate::config::EngineConfig;
use crate::enrich::enrich_songs;
use crate::runner::{BoundedRunner, RunnerError};
use crate::types::{ApiError, EngineEvent};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build the http client: {0}")]
    Client(#[from] ApiError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

enum EngineCommand {
    LoadTours,
    Search { name: String },
    Enrich { run_id: RunId, songs: Vec<Song> },
    Cancel { run_id: RunId },
}

type Runs = Arc<Mutex<HashMap<RunId, CancellationToken>>>;

/// Owns the background thread that performs all network IO.
///
/// Commands are fire-and-forget; results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = ReqwestApi::new(config.api.clone())?;
        Self::with_api(Arc::new(api), config.concurrency_limit)
    }

    /// Starts the engine on top of any [`MusicApi`] implementation.
    pub fn with_api(api: Arc<dyn MusicApi>, concurrency_limit: usize) -> Result<Self, EngineError> {
        BoundedRunner::new(concurrency_limit)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("encore-engine")
            .build()?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runs: Runs = Arc::new(Mutex::new(HashMap::new()));

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match &command {
                    EngineCommand::Cancel { run_id } => {
                        cancel_run(&runs, *run_id);
                        continue;
                    }
                    EngineCommand::Enrich { run_id, .. } => supersede_runs(&runs, *run_id),
                    EngineCommand::LoadTours | EngineCommand::Search { .. } => {}
                }
                let api = api.clone();
                let runs = runs.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, concurrency_limit, &runs, event_tx)
                        .await;
                });
            }
            engine_debug!("engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn load_tours(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadTours);
    }

    pub fn search(&self, name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Search { name: name.into() });
    }

    /// Starts enriching `songs`; any run still in flight is cancelled first.
    pub fn enrich(&self, run_id: RunId, songs: Vec<Song>) {
        let _ = self.cmd_tx.send(EngineCommand::Enrich { run_id, songs });
    }

    pub fn cancel(&self, run_id: RunId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { run_id });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Cancels every registered run and registers a fresh token for `run_id`.
fn supersede_runs(runs: &Runs, run_id: RunId) {
    let mut runs = runs.lock().unwrap_or_else(PoisonError::into_inner);
    for (old, token) in runs.drain() {
        engine_debug!("run {} superseded by run {}", old, run_id);
        token.cancel();
    }
    runs.insert(run_id, CancellationToken::new());
}

fn cancel_run(runs: &Runs, run_id: RunId) {
    let token = runs
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&run_id);
    if let Some(token) = token {
        engine_debug!("run {} cancelled", run_id);
        token.cancel();
    }
}

async fn handle_command(
    api: &dyn MusicApi,
    command: EngineCommand,
    concurrency_limit: usize,
    runs: &Runs,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::LoadTours => {
            let result = api.upcoming_tours().await;
            let _ = event_tx.send(EngineEvent::ToursLoaded(result));
        }
        EngineCommand::Search { name } => {
            let result = api.search_singer(&name).await;
            let _ = event_tx.send(EngineEvent::SearchCompleted { name, result });
        }
        EngineCommand::Enrich { run_id, songs } => {
            let token = runs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&run_id)
                .cloned();
            // Cancelled before the task got to run.
            let token = token.unwrap_or_else(|| {
                let token = CancellationToken::new();
                token.cancel();
                token
            });

            let sink = ChannelProgressSink::new(event_tx);
            if let Err(err) =
                enrich_songs(api, run_id, songs, concurrency_limit, &sink, &token).await
            {
                engine_error!("run {} could not start: {}", run_id, err);
                sink.emit(EngineEvent::RunCompleted {
                    run_id,
                    succeeded: 0,
                    failed: 0,
                    cancelled: 0,
                });
            }
            runs.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&run_id);
        }
        // Handled on the command thread.
        EngineCommand::Cancel { .. } => {}
    }
}
