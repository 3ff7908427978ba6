use crate::{AppState, Effect, Msg, SearchPhase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Tick(now) => {
            state.set_now(now);
            Vec::new()
        }
        Msg::ToursRequested => {
            state.request_tours();
            vec![Effect::LoadTours]
        }
        Msg::ToursLoaded(tours) => {
            state.set_tours(tours);
            Vec::new()
        }
        Msg::ToursFailed(message) => {
            state.set_tours_error(message);
            Vec::new()
        }
        Msg::SearchSubmitted(raw) => {
            let name = raw.trim();
            if name.is_empty() {
                return (state, Vec::new());
            }
            // A new search supersedes whatever the previous one is still enriching.
            let displaced = state.begin_search(name.to_string());
            let mut effects = Vec::with_capacity(2);
            if let Some(run_id) = displaced {
                effects.push(Effect::CancelRun { run_id });
            }
            effects.push(Effect::SearchSinger {
                name: name.to_string(),
            });
            effects
        }
        Msg::SearchResolved { singer, songs } => {
            if state.phase() != SearchPhase::Searching {
                return (state, Vec::new());
            }
            match state.resolve_search(singer, songs) {
                Some((run_id, songs)) => vec![Effect::EnrichSongs { run_id, songs }],
                None => Vec::new(),
            }
        }
        Msg::SearchNotFound => {
            if state.phase() == SearchPhase::Searching {
                state.fail_search(SearchPhase::NotFound, None);
            }
            Vec::new()
        }
        Msg::SearchFailed(message) => {
            if state.phase() == SearchPhase::Searching {
                state.fail_search(SearchPhase::Failed, Some(message));
            }
            Vec::new()
        }
        Msg::SongIndexLoaded {
            run_id,
            index,
            result,
        } => {
            state.apply_item(run_id, index, result);
            Vec::new()
        }
        Msg::EnrichProgress {
            run_id,
            completed,
            total,
        } => {
            state.apply_progress(run_id, completed, total);
            Vec::new()
        }
        Msg::EnrichFinished { run_id } => {
            state.finish_run(run_id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
