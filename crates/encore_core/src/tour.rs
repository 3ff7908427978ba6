use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

/// The tour whose dates are shown even after they have passed.
pub const DEFAULT_FEATURED_TOUR: &str = "房间里的大象";

/// One concert date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub city: String,
    /// Local (venue) time, as stored by the backend.
    pub date: NaiveDateTime,
    pub venue: String,
    pub tour_name: Option<String>,
}

impl Tour {
    pub fn is_featured(&self, featured: Option<&str>) -> bool {
        match (featured, self.tour_name.as_deref()) {
            (Some(featured), Some(name)) => featured == name,
            _ => false,
        }
    }

    /// `2026-02-07T19:00:00` renders as `2026.02.07`.
    pub fn date_label(&self) -> String {
        self.date.format("%Y.%m.%d").to_string()
    }

    pub fn countdown(&self, now: NaiveDateTime) -> Countdown {
        countdown(self.date, now)
    }
}

/// Keeps every date of the featured tour plus any other date not yet passed,
/// sorted ascending by date.
pub fn select_visible_tours(
    tours: Vec<Tour>,
    now: NaiveDateTime,
    featured: Option<&str>,
) -> Vec<Tour> {
    let mut visible: Vec<Tour> = tours
        .into_iter()
        .filter(|tour| tour.is_featured(featured) || tour.date >= now)
        .collect();
    visible.sort_by_key(|tour| tour.date);
    visible
}

/// What a tour card shows under its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// At least one whole day to go.
    DaysLeft(i64),
    /// Less than a day to go.
    Clock { hours: u8, minutes: u8, seconds: u8 },
    /// The show starts (or started) today.
    Today,
    /// The show was on an earlier day.
    Finished,
}

impl Countdown {
    pub fn is_finished(self) -> bool {
        self == Countdown::Finished
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::DaysLeft(1) => write!(f, "1 DAY LEFT"),
            Countdown::DaysLeft(days) => write!(f, "{days} DAYS LEFT"),
            Countdown::Clock {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours:02}:{minutes:02}:{seconds:02}"),
            Countdown::Today => write!(f, "TODAY!"),
            Countdown::Finished => write!(f, "ENDED"),
        }
    }
}

/// Wall clock header shown above the tour cards, e.g. `2026.02.07 19:00:05`.
pub fn clock_label(now: NaiveDateTime) -> String {
    now.format("%Y.%m.%d %H:%M:%S").to_string()
}

pub fn countdown(target: NaiveDateTime, now: NaiveDateTime) -> Countdown {
    let remaining = target - now;
    if remaining <= TimeDelta::zero() {
        return if target.date() == now.date() {
            Countdown::Today
        } else {
            Countdown::Finished
        };
    }

    let total_seconds = remaining.num_seconds();
    let days = remaining.num_days();
    if days > 0 {
        return Countdown::DaysLeft(days);
    }

    Countdown::Clock {
        hours: (total_seconds / 3600) as u8,
        minutes: ((total_seconds % 3600) / 60) as u8,
        seconds: (total_seconds % 60) as u8,
    }
}
