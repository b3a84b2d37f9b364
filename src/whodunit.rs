//! Whodunit: which animals were near a given place at a given time

use crate::cluster::{
    DateRange, Fix, Point, SweepParams, Trail, closeness, delay_point_to_point, distance,
};
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use tracing::debug;

/// Fixes farther than this many time cutoffs from the request are dropped up front
pub const DATE_PREFILTER_FACTOR: i64 = 5;
/// Fixes farther than this many radii from the request are dropped up front
pub const LOCATION_PREFILTER_FACTOR: f64 = 5.0;
/// How many near misses a report lists
pub const CLOSE_REPORTED: usize = 10;

/// A place and time to search around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub datetime: NaiveDateTime,
    pub location: Point,
    pub params: SweepParams,
}

impl Query {
    pub fn time(&self) -> i64 {
        self.datetime.and_utc().timestamp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Within both the radius and the time cutoff
    Match,
    Close,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Match => "Match",
            MatchStatus::Close => "Close",
        }
    }
}

/// One fix scored against a query
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub fix: &'a Fix,
    pub status: MatchStatus,
    pub closeness: f64,
    pub distance: f64,
    pub delay: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matches<'a> {
    /// Ascending closeness
    pub matches: Vec<Candidate<'a>>,
    /// Everything else, ascending closeness
    pub close: Vec<Candidate<'a>>,
}

/// Narrows a pooled trail to the neighbourhood of the query, then orders
/// and deduplicates it
///
/// The date window is applied first, then the location bound. Either one
/// leaving nothing ends the search with [`Error::NoData`].
pub fn prefilter(trail: &mut Trail, query: &Query) -> Result<()> {
    let window = DateRange::around(
        query.time(),
        query.params.time_cutoff.saturating_mul(DATE_PREFILTER_FACTOR),
    );
    trail.filter_by_date(&window);
    if trail.is_empty() {
        return Err(Error::NoData(
            "no data remaining after filtering by date, check the request date".into(),
        ));
    }

    trail.filter_by_location(&query.location, query.params.radius * LOCATION_PREFILTER_FACTOR);
    if trail.is_empty() {
        return Err(Error::NoData(
            "no data remaining after filtering by location, check the request coordinates".into(),
        ));
    }

    trail.order_by_time();
    trail.remove_duplicates();
    debug!(remaining = trail.len(), "whodunit prefilter done");
    Ok(())
}

/// Scores every fix against the query
pub fn find_matches<'a>(fixes: &'a [Fix], query: &Query) -> Matches<'a> {
    let time = query.time();
    let SweepParams {
        radius,
        time_cutoff,
    } = query.params;

    let mut result = Matches::default();
    for fix in fixes {
        let distance = distance(fix, &query.location);
        let delay = delay_point_to_point(fix.time, time);
        let within = distance <= radius && delay <= time_cutoff;
        let candidate = Candidate {
            fix,
            status: if within {
                MatchStatus::Match
            } else {
                MatchStatus::Close
            },
            closeness: closeness(distance, radius, delay, time_cutoff),
            distance,
            delay,
        };
        if within {
            result.matches.push(candidate);
        } else {
            result.close.push(candidate);
        }
    }

    result.matches.sort_by(|a, b| a.closeness.total_cmp(&b.closeness));
    result.close.sort_by(|a, b| a.closeness.total_cmp(&b.closeness));
    result
}
