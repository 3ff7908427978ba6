use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Clock tick; drives countdown labels.
    Tick(NaiveDateTime),
    /// Ask for the tour list.
    ToursRequested,
    /// Backend returned the tour list (unfiltered).
    ToursLoaded(Vec<crate::Tour>),
    /// Tour list could not be loaded.
    ToursFailed(String),
    /// User submitted a singer name.
    SearchSubmitted(String),
    /// Backend resolved the singer search.
    SearchResolved {
        singer: Option<crate::Singer>,
        songs: Vec<crate::Song>,
    },
    /// Backend answered, but without usable data.
    SearchNotFound,
    /// The search request itself failed.
    SearchFailed(String),
    /// One enrichment job settled. `index` is the item position in the run.
    SongIndexLoaded {
        run_id: crate::RunId,
        index: usize,
        result: Result<crate::SongIndex, String>,
    },
    /// Aggregate enrichment progress.
    EnrichProgress {
        run_id: crate::RunId,
        completed: usize,
        total: usize,
    },
    /// Every job of the run has settled (or the run was cancelled).
    EnrichFinished { run_id: crate::RunId },
    /// Fallback for placeholder wiring.
    NoOp,
}
