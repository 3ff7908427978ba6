use encore_core::{RunId, Song, SongIndex};
use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::api::{MusicApi, ProgressSink};
use crate::runner::{BoundedRunner, RunReport, RunnerError};
use crate::types::{ApiError, EngineEvent};

/// Fetches the index of every song, at most `limit` requests at a time.
///
/// Each settled song is reported as [`EngineEvent::ItemSettled`] followed by
/// an [`EngineEvent::Progress`]; a single [`EngineEvent::RunCompleted`] closes
/// the run, cancelled or not.
pub async fn enrich_songs(
    api: &dyn MusicApi,
    run_id: RunId,
    songs: Vec<Song>,
    limit: usize,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<RunReport<SongIndex, ApiError>, RunnerError> {
    let runner = BoundedRunner::new(limit)?;
    engine_info!(
        "run {}: enriching {} songs with limit {}",
        run_id,
        songs.len(),
        runner.limit()
    );

    let items: Vec<(usize, Song)> = songs.into_iter().enumerate().collect();
    let report = runner
        .run(
            items,
            |(index, song)| async move {
                let result = api.song_index(&song.mid).await;
                sink.emit(EngineEvent::ItemSettled {
                    run_id,
                    index,
                    mid: song.mid,
                    result: result.clone(),
                });
                result
            },
            |progress| {
                engine_debug!("run {}: {}% done", run_id, progress.percent());
                sink.emit(EngineEvent::Progress { run_id, progress });
            },
            cancel,
        )
        .await;

    engine_info!(
        "run {}: {} ok, {} failed, {} cancelled",
        run_id,
        report.succeeded(),
        report.failed(),
        report.cancelled_items()
    );
    sink.emit(EngineEvent::RunCompleted {
        run_id,
        succeeded: report.succeeded(),
        failed: report.failed(),
        cancelled: report.cancelled_items(),
    });

    Ok(report)
}
