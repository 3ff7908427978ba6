use chrono::NaiveDateTime;

use crate::{Countdown, RowStatus, SearchPhase, Singer, Tour};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub query: Option<String>,
    pub phase: SearchPhase,
    pub singer: Option<Singer>,
    pub rows: Vec<SongRowView>,
    pub progress: Option<ProgressView>,
    pub status_line: String,
    /// `None` until the first clock tick.
    pub clock: Option<String>,
    pub tours: Vec<TourCardView>,
    pub tours_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRowView {
    pub name: String,
    pub album: String,
    pub status: RowStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressView {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ProgressView {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (completed.min(total) * 100 / total) as u8
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourCardView {
    pub city: String,
    pub date: String,
    /// `None` until the first clock tick.
    pub countdown: Option<Countdown>,
    pub venue: String,
    pub finished: bool,
}

impl TourCardView {
    pub(crate) fn new(tour: &Tour, now: Option<NaiveDateTime>) -> Self {
        let countdown = now.map(|now| tour.countdown(now));
        Self {
            city: tour.city.clone(),
            date: tour.date_label(),
            countdown,
            venue: tour.venue.clone(),
            finished: countdown.is_some_and(Countdown::is_finished),
        }
    }
}
