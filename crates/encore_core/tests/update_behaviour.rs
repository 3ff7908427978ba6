use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use encore_core::{
    update, AppState, Countdown, Effect, Msg, RowStatus, SearchPhase, Singer, Song, Tour,
    DEFAULT_FEATURED_TOUR, MISSING_MID_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn singer() -> Singer {
    Singer {
        name: "Rainie".to_string(),
        picture_url: "https://img.example.com/rainie.jpg".to_string(),
        song_count: 210,
        album_count: 18,
    }
}

#[test]
fn search_emits_search_effect_with_trimmed_name() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::SearchSubmitted("  Rainie \n".into()));

    assert_eq!(
        effects,
        vec![Effect::SearchSinger {
            name: "Rainie".to_string()
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, SearchPhase::Searching);
    assert_eq!(view.query.as_deref(), Some("Rainie"));
    assert_eq!(view.status_line, "loading…");
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn resolved_search_dedupes_and_starts_enrichment() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("Rainie".into()));
    let (state, effects) = update(
        state,
        Msg::SearchResolved {
            singer: Some(singer()),
            songs: vec![
                Song::new("m1", "Rain Love", "Meteor"),
                Song::new("", "Untitled", "Demo"),
                Song::new("m2", "Ambiguous", "Ambiguous"),
                Song::new("m1", "Rain Love", "Live"),
            ],
        },
    );

    assert_eq!(
        effects,
        vec![Effect::EnrichSongs {
            run_id: 1,
            songs: vec![
                Song::new("m1", "Rain Love", "Meteor"),
                Song::new("m2", "Ambiguous", "Ambiguous"),
            ],
        }]
    );

    let view = state.view();
    assert_eq!(view.phase, SearchPhase::Enriching);
    assert_eq!(view.singer, Some(singer()));
    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.rows[0].status, RowStatus::Pending);
    assert_eq!(
        view.rows[1].status,
        RowStatus::Failed(MISSING_MID_MESSAGE.to_string())
    );
    assert_eq!(view.status_line, "loading song index 0/2 (0%)");
}

#[test]
fn empty_song_list_shows_placeholder_without_effects() {
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("Nobody".into()));
    let (state, effects) = update(
        state,
        Msg::SearchResolved {
            singer: None,
            songs: Vec::new(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SearchPhase::NoSongs);
    assert_eq!(state.view().status_line, "no hot songs");
}

#[test]
fn not_found_and_failure_are_distinct() {
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("x".into()));
    let (not_found, _) = update(state.clone(), Msg::SearchNotFound);
    let (failed, _) = update(state, Msg::SearchFailed("timeout".into()));

    assert_eq!(not_found.view().phase, SearchPhase::NotFound);
    assert_eq!(failed.view().phase, SearchPhase::Failed);
    assert_eq!(
        failed.view().status_line,
        "loading failed, please retry (timeout)"
    );
}

#[test]
fn late_search_result_after_failure_is_ignored() {
    let (state, _) = update(AppState::new(), Msg::SearchSubmitted("x".into()));
    let (state, _) = update(state, Msg::SearchFailed("boom".into()));
    let (state, effects) = update(
        state,
        Msg::SearchResolved {
            singer: None,
            songs: vec![Song::new("m1", "a", "b")],
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SearchPhase::Failed);
    assert!(state.view().rows.is_empty());
}

#[test]
fn tours_are_filtered_against_last_tick_and_counted_down() {
    let (state, _) = update(AppState::new(), Msg::Tick(at(2, 1, 12)));
    let (state, effects) = update(state, Msg::ToursRequested);
    assert_eq!(effects, vec![Effect::LoadTours]);
    assert!(state.tours_loading());

    let (mut state, _) = update(
        state,
        Msg::ToursLoaded(vec![
            Tour {
                city: "Suzhou".into(),
                date: at(3, 7, 19),
                venue: "Olympic Sports Centre".into(),
                tour_name: None,
            },
            Tour {
                city: "Old town".into(),
                date: at(1, 2, 19),
                venue: "Gym".into(),
                tour_name: None,
            },
            Tour {
                city: "Foshan".into(),
                date: at(1, 10, 19),
                venue: "Arena".into(),
                tour_name: Some(DEFAULT_FEATURED_TOUR.into()),
            },
            Tour {
                city: "Xi'an".into(),
                date: at(2, 1, 19),
                venue: "Olympic Sports Center".into(),
                tour_name: Some(DEFAULT_FEATURED_TOUR.into()),
            },
        ]),
    );
    assert!(state.consume_dirty());
    assert!(!state.tours_loading());

    let tours = state.view().tours;
    let cities: Vec<_> = tours.iter().map(|t| t.city.as_str()).collect();
    assert_eq!(cities, vec!["Foshan", "Xi'an", "Suzhou"]);
    assert!(tours[0].finished);
    assert_eq!(tours[0].countdown, Some(Countdown::Finished));
    assert_eq!(
        tours[1].countdown,
        Some(Countdown::Clock {
            hours: 7,
            minutes: 0,
            seconds: 0
        })
    );
    assert_eq!(tours[2].date, "2026.03.07");
    assert_eq!(tours[2].countdown.map(|c| c.to_string()).as_deref(), Some("34 DAYS LEFT"));

    // Ticking re-renders countdowns.
    let (mut state, _) = update(state, Msg::Tick(at(2, 1, 20)));
    assert!(state.consume_dirty());
    assert_eq!(state.view().tours[1].countdown, Some(Countdown::Today));
}

#[test]
fn clock_header_follows_whole_seconds() {
    let mut state = AppState::new();
    assert_eq!(state.view().clock, None);

    let first = at(2, 7, 19);
    let (mut next, _) = update(state, Msg::Tick(first));
    assert!(next.consume_dirty());
    assert_eq!(next.view().clock.as_deref(), Some("2026.02.07 19:00:00"));

    state = next;
    let (mut next, _) = update(state, Msg::Tick(first + TimeDelta::milliseconds(400)));
    assert!(!next.consume_dirty());

    state = next;
    let (mut next, _) = update(state, Msg::Tick(first + TimeDelta::seconds(1)));
    assert!(next.consume_dirty());
    assert_eq!(next.view().clock.as_deref(), Some("2026.02.07 19:00:01"));
}

#[test]
fn tour_failure_clears_cards() {
    let (state, _) = update(AppState::new(), Msg::ToursFailed("network error".into()));
    let view = state.view();
    assert!(view.tours.is_empty());
    assert_eq!(view.tours_error.as_deref(), Some("network error"));
}
