use std::fmt::Write as _;

use encore_core::{AppViewModel, ProgressView, RowStatus, SongIndex, SongRowView, TourCardView};

use super::constants::*;

pub fn render_tours(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(clock) = &view.clock {
        let _ = writeln!(out, "{clock}");
    }
    if let Some(err) = &view.tours_error {
        let _ = writeln!(out, "tours unavailable: {err}");
        return out;
    }
    if view.tours.is_empty() {
        out.push_str("no upcoming tours\n");
        return out;
    }

    for card in &view.tours {
        let _ = writeln!(out, "{}", format_tour_card(card));
        let _ = writeln!(out, "    {}", card.venue);
    }
    out
}

fn format_tour_card(card: &TourCardView) -> String {
    let countdown = card
        .countdown
        .map(|c| c.to_string())
        .unwrap_or_else(|| "--".to_string());
    if card.finished {
        format!("{:<12} {}  {}", card.city, card.date, FINISHED_STAMP)
    } else {
        format!("{:<12} {}  {}", card.city, card.date, countdown)
    }
}

pub fn render_search(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(singer) = &view.singer {
        let _ = writeln!(
            out,
            "{}  songs {}  albums {}",
            singer.name, singer.song_count, singer.album_count
        );
        if !singer.picture_url.is_empty() {
            let _ = writeln!(out, "    {}", singer.picture_url);
        }
    }
    for (position, row) in view.rows.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", position + 1, format_song_row(row));
    }
    let _ = writeln!(out, "{}", view.status_line);
    out
}

fn format_song_row(row: &SongRowView) -> String {
    let status = match &row.status {
        RowStatus::Pending => "pending".to_string(),
        RowStatus::Loaded(index) => format_index(index),
        RowStatus::Failed(message) => format!("failed: {message}"),
    };
    if row.album.is_empty() {
        format!("{} | {}", row.name, status)
    } else {
        format!("{} ({}) | {}", row.name, row.album, status)
    }
}

fn format_index(index: &SongIndex) -> String {
    let mut parts = Vec::new();
    if let Some(value) = &index.music_index {
        match &index.index_change {
            Some(change) => parts.push(format!("index {value} ({change})")),
            None => parts.push(format!("index {value}")),
        }
    }
    if let Some(rank) = &index.global_rank {
        match &index.rank_change {
            Some(change) => parts.push(format!("rank {rank} ({change})")),
            None => parts.push(format!("rank {rank}")),
        }
    }
    if let Some(count) = &index.listening_count {
        parts.push(format!("listeners {count}"));
    }
    if !index.achievements.is_empty() {
        parts.push(index.achievements.join(", "));
    }
    if parts.is_empty() {
        "no index data".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Single-line progress indicator, redrawn in place while a run is active.
pub fn progress_line(view: &AppViewModel) -> Option<String> {
    view.progress
        .map(|progress| format!("{} {}", progress_bar(&progress), view.status_line))
}

fn progress_bar(progress: &ProgressView) -> String {
    let filled = PROGRESS_BAR_WIDTH * usize::from(progress.percent) / 100;
    let mut bar = String::with_capacity(PROGRESS_BAR_WIDTH + 2);
    bar.push('[');
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(PROGRESS_BAR_WIDTH - filled));
    bar.push(']');
    bar
}
