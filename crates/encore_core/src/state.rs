use chrono::NaiveDateTime;

use crate::song::dedupe_songs;
use crate::tour::{clock_label, select_visible_tours, DEFAULT_FEATURED_TOUR};
use crate::view_model::{AppViewModel, ProgressView, SongRowView, TourCardView};
use crate::{Singer, Song, SongIndex, Tour};

pub type RunId = u64;

/// Placeholder shown for rows that can never be enriched.
pub const MISSING_MID_MESSAGE: &str = "missing song id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Enriching,
    Done,
    NoSongs,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    Pending,
    Loaded(SongIndex),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    pub song: Song,
    pub status: RowStatus,
}

/// Progress of the active enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRun {
    run_id: RunId,
    /// Run item position -> row position.
    rows: Vec<usize>,
    completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    featured_tour: Option<String>,
    now: Option<NaiveDateTime>,
    tours: Vec<Tour>,
    tours_error: Option<String>,
    tours_loading: bool,
    query: Option<String>,
    phase: SearchPhase,
    singer: Option<Singer>,
    rows: Vec<SongRow>,
    run: Option<ActiveRun>,
    enrich_total: usize,
    enrich_completed: usize,
    last_error: Option<String>,
    next_run_id: RunId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_featured_tour(Some(DEFAULT_FEATURED_TOUR.to_string()))
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_featured_tour(featured_tour: Option<String>) -> Self {
        Self {
            featured_tour,
            now: None,
            tours: Vec::new(),
            tours_error: None,
            tours_loading: false,
            query: None,
            phase: SearchPhase::Idle,
            singer: None,
            rows: Vec::new(),
            run: None,
            enrich_total: 0,
            enrich_completed: 0,
            last_error: None,
            next_run_id: 1,
            dirty: false,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.run_id)
    }

    /// True between a tour request and its answer.
    pub fn tours_loading(&self) -> bool {
        self.tours_loading
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        let progress = (self.enrich_total > 0).then(|| {
            ProgressView::new(self.enrich_completed, self.enrich_total)
        });
        AppViewModel {
            query: self.query.clone(),
            phase: self.phase,
            singer: self.singer.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| SongRowView {
                    name: row.song.name.clone(),
                    album: row.song.album.clone(),
                    status: row.status.clone(),
                })
                .collect(),
            status_line: self.status_line(progress.as_ref()),
            progress,
            clock: self.now.map(clock_label),
            tours: self
                .tours
                .iter()
                .map(|tour| TourCardView::new(tour, self.now))
                .collect(),
            tours_error: self.tours_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn status_line(&self, progress: Option<&ProgressView>) -> String {
        match self.phase {
            SearchPhase::Idle => String::new(),
            SearchPhase::Searching => "loading…".to_string(),
            SearchPhase::Enriching => match progress {
                Some(p) if p.is_complete() => format!("all {} songs processed", self.rows.len()),
                Some(p) => format!(
                    "loading song index {}/{} ({}%)",
                    p.completed, p.total, p.percent
                ),
                None => "loading song index…".to_string(),
            },
            SearchPhase::Done => format!("all {} songs processed", self.rows.len()),
            SearchPhase::NoSongs => "no hot songs".to_string(),
            SearchPhase::NotFound => "no matching data".to_string(),
            SearchPhase::Failed => match &self.last_error {
                Some(err) => format!("loading failed, please retry ({err})"),
                None => "loading failed, please retry".to_string(),
            },
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_now(&mut self, now: NaiveDateTime) {
        let previous = self.now.replace(now);
        // The clock header shows whole seconds.
        if previous.map(clock_label) != Some(clock_label(now)) {
            self.mark_dirty();
        }
    }

    pub(crate) fn request_tours(&mut self) {
        self.tours_loading = true;
    }

    pub(crate) fn set_tours(&mut self, tours: Vec<Tour>) {
        let now = self.now.unwrap_or(NaiveDateTime::MIN);
        self.tours = select_visible_tours(tours, now, self.featured_tour.as_deref());
        self.tours_error = None;
        self.tours_loading = false;
        self.mark_dirty();
    }

    pub(crate) fn set_tours_error(&mut self, message: String) {
        self.tours.clear();
        self.tours_error = Some(message);
        self.tours_loading = false;
        self.mark_dirty();
    }

    /// Resets the search area for a new query. Returns the run it displaced.
    pub(crate) fn begin_search(&mut self, query: String) -> Option<RunId> {
        let displaced = self.run.take().map(|run| run.run_id);
        self.query = Some(query);
        self.phase = SearchPhase::Searching;
        self.singer = None;
        self.rows.clear();
        self.enrich_total = 0;
        self.enrich_completed = 0;
        self.last_error = None;
        self.mark_dirty();
        displaced
    }

    /// Installs the search result and opens an enrichment run for every row
    /// that has a song id. Returns the run and its songs, if any.
    pub(crate) fn resolve_search(
        &mut self,
        singer: Option<Singer>,
        songs: Vec<Song>,
    ) -> Option<(RunId, Vec<Song>)> {
        self.singer = singer;
        self.rows = dedupe_songs(songs)
            .into_iter()
            .map(|song| {
                let status = if song.has_mid() {
                    RowStatus::Pending
                } else {
                    RowStatus::Failed(MISSING_MID_MESSAGE.to_string())
                };
                SongRow { song, status }
            })
            .collect();
        self.mark_dirty();

        if self.rows.is_empty() {
            self.phase = SearchPhase::NoSongs;
            return None;
        }

        let (rows, songs): (Vec<usize>, Vec<Song>) = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.status == RowStatus::Pending)
            .map(|(pos, row)| (pos, row.song.clone()))
            .unzip();

        if songs.is_empty() {
            self.phase = SearchPhase::Done;
            return None;
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.enrich_total = songs.len();
        self.enrich_completed = 0;
        self.phase = SearchPhase::Enriching;
        self.run = Some(ActiveRun {
            run_id,
            rows,
            completed: 0,
        });
        Some((run_id, songs))
    }

    pub(crate) fn fail_search(&mut self, phase: SearchPhase, message: Option<String>) {
        self.phase = phase;
        self.last_error = message;
        self.mark_dirty();
    }

    pub(crate) fn apply_item(
        &mut self,
        run_id: RunId,
        index: usize,
        result: Result<SongIndex, String>,
    ) {
        let Some(row) = self
            .run
            .as_ref()
            .filter(|run| run.run_id == run_id)
            .and_then(|run| run.rows.get(index).copied())
        else {
            return;
        };
        if let Some(row) = self.rows.get_mut(row) {
            row.status = match result {
                Ok(data) => RowStatus::Loaded(data),
                Err(message) => RowStatus::Failed(message),
            };
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_progress(&mut self, run_id: RunId, completed: usize, total: usize) {
        let Some(run) = self.run.as_mut().filter(|run| run.run_id == run_id) else {
            return;
        };
        // Progress never moves backwards.
        if completed <= run.completed {
            return;
        }
        run.completed = completed;
        self.enrich_completed = completed;
        self.enrich_total = total;
        self.mark_dirty();
    }

    pub(crate) fn finish_run(&mut self, run_id: RunId) {
        if self.active_run() != Some(run_id) {
            return;
        }
        self.run = None;
        self.phase = SearchPhase::Done;
        self.mark_dirty();
    }
}
