#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadTours,
    SearchSinger { name: String },
    EnrichSongs {
        run_id: crate::RunId,
        songs: Vec<crate::Song>,
    },
    CancelRun { run_id: crate::RunId },
}
