use std::collections::HashSet;

/// A song reference as returned by a singer search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Song {
    pub mid: String,
    pub name: String,
    pub album: String,
}

impl Song {
    pub fn new(mid: impl Into<String>, name: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            name: name.into(),
            album: album.into(),
        }
    }

    /// Whether this song carries an id the index endpoint can be queried with.
    pub fn has_mid(&self) -> bool {
        !self.mid.trim().is_empty()
    }
}

/// The singer summary shown above the song list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Singer {
    pub name: String,
    pub picture_url: String,
    pub song_count: u32,
    pub album_count: u32,
}

/// Remote "index" statistics for one song.
///
/// Numeric values stay as display strings: the backend hands out either
/// numbers or pre-formatted text such as `"296,407"` or `"下降1.23%"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongIndex {
    pub music_index: Option<String>,
    pub global_rank: Option<String>,
    pub update_time: Option<String>,
    pub yesterday_index: Option<String>,
    pub index_change: Option<String>,
    pub yesterday_rank: Option<String>,
    pub rank_change: Option<String>,
    pub listening_count: Option<String>,
    pub chart_image: Option<String>,
    pub achievements: Vec<String>,
}

/// Collapses duplicate songs by `mid`, keeping the first occurrence.
///
/// Songs without a `mid` cannot collide with anything and are kept in place.
pub fn dedupe_songs(songs: Vec<Song>) -> Vec<Song> {
    let mut seen = HashSet::new();
    songs
        .into_iter()
        .filter(|song| !song.has_mid() || seen.insert(normalize_mid(&song.mid)))
        .collect()
}

fn normalize_mid(mid: &str) -> String {
    mid.trim().to_string()
}
