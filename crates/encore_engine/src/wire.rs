//! JSON shapes served by the backend and their mapping to domain types.

use chrono::NaiveDateTime;
use encore_core::{Singer, Song, SongIndex, Tour};
use engine_logging::engine_warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{ApiError, FailureKind, SearchResult};

/// `{ "code": 0, "data": ... }` wrapper used by the search and index endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, ApiError> {
        if self.code != 0 {
            return Err(ApiError::new(
                FailureKind::Application { code: self.code },
                format!("backend answered with code {}", self.code),
            ));
        }
        self.data
            .ok_or_else(|| ApiError::new(FailureKind::MissingData, "response carried no data"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TourWire {
    #[serde(default)]
    pub city: String,
    pub date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub tour_name: Option<String>,
}

/// Converts tour rows, dropping rows whose date cannot be read.
pub(crate) fn tours_from_wire(rows: Vec<TourWire>) -> Vec<Tour> {
    rows.into_iter()
        .filter_map(|row| match parse_tour_date(&row.date) {
            Some(date) => Some(Tour {
                city: row.city,
                date,
                venue: row.venue,
                tour_name: row.tour_name.filter(|name| !name.trim().is_empty()),
            }),
            None => {
                engine_warn!("skipping tour in {} with unreadable date {:?}", row.city, row.date);
                None
            }
        })
        .collect()
}

fn parse_tour_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchData {
    #[serde(default)]
    zhida: Option<Zhida>,
    #[serde(default)]
    song: Option<SongList>,
}

#[derive(Debug, Default, Deserialize)]
struct Zhida {
    #[serde(default)]
    zhida_singer: Option<SingerWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SingerWire {
    #[serde(default, deserialize_with = "lenient_string")]
    singer_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    singer_pic: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    song_num: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    album_num: u32,
    #[serde(default)]
    hotsong: Vec<SongWire>,
}

#[derive(Debug, Default, Deserialize)]
struct SongList {
    #[serde(default)]
    list: Vec<SongWire>,
}

/// Song entries come in two spellings depending on the list they sit in.
#[derive(Debug, Default, Deserialize)]
struct SongWire {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    songmid: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    mid: Option<String>,
    #[serde(default, rename = "songName", deserialize_with = "lenient_opt_string")]
    song_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    songname: Option<String>,
    #[serde(default, rename = "albumName", deserialize_with = "lenient_opt_string")]
    album_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    albumname: Option<String>,
}

impl From<SongWire> for Song {
    fn from(wire: SongWire) -> Self {
        Song::new(
            wire.songmid.or(wire.mid).unwrap_or_default(),
            wire.song_name.or(wire.songname).unwrap_or_default(),
            wire.album_name.or(wire.albumname).unwrap_or_default(),
        )
    }
}

impl From<SearchData> for SearchResult {
    fn from(data: SearchData) -> Self {
        // The singer box wins over the plain song list when both are present.
        match data.zhida.and_then(|z| z.zhida_singer) {
            Some(singer) => SearchResult {
                songs: singer.hotsong.into_iter().map(Song::from).collect(),
                singer: Some(Singer {
                    name: singer.singer_name,
                    picture_url: singer.singer_pic,
                    song_count: singer.song_num,
                    album_count: singer.album_num,
                }),
            },
            None => SearchResult {
                singer: None,
                songs: data
                    .song
                    .map(|list| list.list.into_iter().map(Song::from).collect())
                    .unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SongIndexWire {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    music_index: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    global_rank: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    update_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    yesterday_index: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    index_change: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    yesterday_rank: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    rank_change: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    listening_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    chart_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    achievements: Vec<String>,
}

impl From<SongIndexWire> for SongIndex {
    fn from(wire: SongIndexWire) -> Self {
        SongIndex {
            music_index: wire.music_index,
            global_rank: wire.global_rank,
            update_time: wire.update_time,
            yesterday_index: wire.yesterday_index,
            index_change: wire.index_change,
            yesterday_rank: wire.yesterday_rank,
            rank_change: wire.rank_change,
            listening_count: wire.listening_count,
            chart_image: wire.chart_image,
            achievements: wire.achievements,
        }
    }
}

/// Renders a scalar as display text; `null`, empty strings and containers yield `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// Accepts `12`, `"12"` and `"1,234"`; anything unreadable becomes 0.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_opt_string(deserializer)?.unwrap_or_default();
    let digits: String = text.chars().filter(|c| *c != ',').collect();
    Ok(digits.parse().unwrap_or(0))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_maps_code_and_missing_data() {
        let bad: Envelope<SongIndexWire> =
            serde_json::from_value(json!({ "code": 500, "data": {} })).unwrap();
        assert_eq!(
            bad.into_data().unwrap_err().kind,
            FailureKind::Application { code: 500 }
        );

        let empty: Envelope<SongIndexWire> =
            serde_json::from_value(json!({ "code": 0, "data": null })).unwrap();
        assert_eq!(empty.into_data().unwrap_err().kind, FailureKind::MissingData);
    }

    #[test]
    fn search_prefers_singer_box() {
        let data: SearchData = serde_json::from_value(json!({
            "zhida": { "zhida_singer": {
                "singerName": "Rainie",
                "singerPic": "pic",
                "songNum": "1,210",
                "albumNum": 18,
                "hotsong": [{ "songmid": "m1", "songName": "Rain Love", "albumName": "Meteor" }]
            }},
            "song": { "list": [{ "songmid": "x", "songname": "other", "albumname": "y" }] }
        }))
        .unwrap();

        let result = SearchResult::from(data);
        let singer = result.singer.unwrap();
        assert_eq!(singer.song_count, 1210);
        assert_eq!(singer.album_count, 18);
        assert_eq!(result.songs, vec![Song::new("m1", "Rain Love", "Meteor")]);
    }

    #[test]
    fn search_falls_back_to_song_list() {
        let data: SearchData = serde_json::from_value(json!({
            "zhida": {},
            "song": { "list": [{ "mid": " x ", "songname": "other", "albumname": "y" }] }
        }))
        .unwrap();

        let result = SearchResult::from(data);
        assert_eq!(result.singer, None);
        assert_eq!(result.songs, vec![Song::new("x", "other", "y")]);
    }

    #[test]
    fn tour_rows_with_bad_dates_are_skipped() {
        let rows: Vec<TourWire> = serde_json::from_value(json!([
            { "city": "Suzhou", "date": "2026-03-07T19:00:00", "venue": "Centre" },
            { "city": "Nowhere", "date": "soon", "venue": "?" },
            { "city": "Xi'an", "date": "2026-02-01 19:30", "venue": "Gym", "tour_name": "" }
        ]))
        .unwrap();

        let tours = tours_from_wire(rows);
        assert_eq!(tours.len(), 2);
        assert_eq!(tours[0].date_label(), "2026.03.07");
        assert_eq!(tours[1].tour_name, None);
    }

    #[test]
    fn achievements_accept_single_value() {
        let wire: SongIndexWire =
            serde_json::from_value(json!({ "music_index": 98.5, "achievements": "Top 10" }))
                .unwrap();
        let index = SongIndex::from(wire);
        assert_eq!(index.music_index.as_deref(), Some("98.5"));
        assert_eq!(index.achievements, vec!["Top 10".to_string()]);
    }
}
