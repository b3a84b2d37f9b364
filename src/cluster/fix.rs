//! A Fix is a single GPS reading: one animal, one moment, one place

use chrono::{DateTime, NaiveDateTime};
use std::fmt;

/// Date format used to build cluster and crossing ids
pub const DATE_FMT_ID: &str = "%Y%m%d-%H%M";
/// Date format used in reports
pub const DATE_FMT_ISO: &str = "%Y-%m-%d %H:%M:%S";

/// How a fix was consumed by the clusterer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Unassigned,
    /// Inside the cluster radius; contributes to the centroid
    Home,
    /// Between home fixes in time but outside the radius
    Away,
}

impl Membership {
    /// One-character symbol used in home/away patterns
    pub fn symbol(self) -> char {
        match self {
            Membership::Home => 'O',
            Membership::Away => '.',
            Membership::Unassigned => '-',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Membership::Home => "home",
            Membership::Away => "away",
            Membership::Unassigned => "",
        }
    }
}

/// Day or night, as decided by an external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayPeriod {
    #[default]
    Unknown,
    Day,
    Night,
}

impl DayPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            DayPeriod::Unknown => "unknown",
            DayPeriod::Day => "day",
            DayPeriod::Night => "night",
        }
    }
}

/// Fix represents one timestamped location of one animal
///
/// Coordinates are planar, in a projected CRS:
/// - `x` is easting
/// - `y` is northing
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub id: String,
    pub animal_id: String,
    pub datetime: NaiveDateTime,
    /// Seconds since the epoch, taken from `datetime`
    pub time: i64,
    pub x: f64,
    pub y: f64,
    pub membership: Membership,
    pub day_period: DayPeriod,
}

impl Fix {
    pub fn new(
        id: impl Into<String>,
        animal_id: impl Into<String>,
        datetime: NaiveDateTime,
        x: f64,
        y: f64,
    ) -> Self {
        Fix {
            id: id.into(),
            animal_id: animal_id.into(),
            time: datetime.and_utc().timestamp(),
            datetime,
            x,
            y,
            membership: Membership::Unassigned,
            day_period: DayPeriod::Unknown,
        }
    }

    /// Builds a fix from epoch seconds instead of a calendar date
    pub fn at(
        id: impl Into<String>,
        animal_id: impl Into<String>,
        time: i64,
        x: f64,
        y: f64,
    ) -> Self {
        let datetime = DateTime::from_timestamp(time, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default();
        Fix::new(id, animal_id, datetime, x, y)
    }

    /// Key that must be unique within a working set
    pub fn key(&self) -> (&str, i64) {
        (&self.animal_id, self.time)
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.id,
            self.animal_id,
            self.datetime.format(DATE_FMT_ISO),
            self.x,
            self.y
        )
    }
}
