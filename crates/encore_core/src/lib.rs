//! Encore core: pure state machine, view-model helpers and the small
//! formatting rules shared by every front end.
mod effect;
mod msg;
mod song;
mod state;
mod tour;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use song::{dedupe_songs, Singer, Song, SongIndex};
pub use state::{AppState, RowStatus, RunId, SearchPhase, SongRow, MISSING_MID_MESSAGE};
pub use tour::{clock_label, countdown, select_visible_tours, Countdown, Tour, DEFAULT_FEATURED_TOUR};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, SongRowView, TourCardView};
