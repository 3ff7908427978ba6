use std::time::Duration;

use encore_core::{Effect, Msg};
use encore_engine::{EngineEvent, EngineHandle};
use engine_logging::{engine_debug, engine_info, engine_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadTours => {
                    engine_debug!("LoadTours");
                    self.engine.load_tours();
                }
                Effect::SearchSinger { name } => {
                    engine_info!("SearchSinger name={}", name);
                    self.engine.search(name);
                }
                Effect::EnrichSongs { run_id, songs } => {
                    engine_info!("EnrichSongs run_id={} songs={}", run_id, songs.len());
                    self.engine.enrich(run_id, songs);
                }
                Effect::CancelRun { run_id } => {
                    engine_info!("CancelRun run_id={}", run_id);
                    self.engine.cancel(run_id);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ToursLoaded(Ok(tours)) => Msg::ToursLoaded(tours),
        EngineEvent::ToursLoaded(Err(err)) => {
            engine_warn!("Loading tours failed: {}", err);
            Msg::ToursFailed(err.kind.to_string())
        }
        EngineEvent::SearchCompleted { result: Ok(found), .. } => Msg::SearchResolved {
            singer: found.singer,
            songs: found.songs,
        },
        EngineEvent::SearchCompleted {
            name,
            result: Err(err),
        } => {
            if err.is_not_found() {
                engine_info!("Search for {} found nothing: {}", name, err);
                Msg::SearchNotFound
            } else {
                engine_warn!("Search for {} failed: {}", name, err);
                Msg::SearchFailed(err.kind.to_string())
            }
        }
        EngineEvent::ItemSettled {
            run_id,
            index,
            mid,
            result,
        } => {
            if let Err(err) = &result {
                engine_warn!("Song index for {} failed: {}", mid, err);
            }
            Msg::SongIndexLoaded {
                run_id,
                index,
                result: result.map_err(|err| err.kind.to_string()),
            }
        }
        EngineEvent::Progress { run_id, progress } => Msg::EnrichProgress {
            run_id,
            completed: progress.completed,
            total: progress.total,
        },
        EngineEvent::RunCompleted {
            run_id,
            succeeded,
            failed,
            cancelled,
        } => {
            engine_info!(
                "Run {} finished: {} ok, {} failed, {} cancelled",
                run_id,
                succeeded,
                failed,
                cancelled
            );
            Msg::EnrichFinished { run_id }
        }
    }
}
