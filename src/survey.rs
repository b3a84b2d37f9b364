//! Matching field surveys to detected clusters
//!
//! A survey is one row of a field spreadsheet. Several of its columns may
//! hold a date or a location; the filled-in ones are averaged into a single
//! time and place, which is then compared against the clusters of every
//! animal.

use crate::cluster::{
    Cluster, Point, Position, SweepParams, TimeSpan, Trail, closeness, delay_point_to_cluster,
    distance,
};
use crate::config::MatchSurveyConfig;
use crate::error::Result;
use crate::ingest::parse_with_default_time;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// 1980-01-01
pub const MINIMUM_TIME: i64 = 315_536_400;
/// 2030-01-01
pub const MAXIMUM_TIME: i64 = 1_893_456_000;
pub const EASTING_RANGE: (f64, f64) = (400_000.0, 650_000.0);
pub const NORTHING_RANGE: (f64, f64) = (3_500_000.0, 6_000_000.0);

/// Date-only survey values are taken to be at noon
fn default_survey_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Header names of the survey columns that matter
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyColumns {
    pub id: String,
    pub dates: Vec<String>,
    pub eastings: Vec<String>,
    pub northings: Vec<String>,
}

impl From<&MatchSurveyConfig> for SurveyColumns {
    fn from(config: &MatchSurveyConfig) -> Self {
        SurveyColumns {
            id: config.id_header.clone(),
            dates: config.date_headers.clone(),
            eastings: config.easting_headers.clone(),
            northings: config.northing_headers.clone(),
        }
    }
}

/// What survey matching needs to know of a cluster
///
/// Unlike [`Cluster`] it holds no fix indices, so it outlives the trail it
/// was swept from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSite {
    pub id: String,
    pub animal_id: String,
    pub centroid: Point,
    /// First to last home fix
    pub span: TimeSpan,
}

impl From<&Cluster> for ClusterSite {
    fn from(cluster: &Cluster) -> Self {
        ClusterSite {
            id: cluster.id.clone(),
            animal_id: cluster.animal_id().to_string(),
            centroid: cluster.centroid,
            span: cluster.span,
        }
    }
}

impl Position for ClusterSite {
    fn position(&self) -> Point {
        self.centroid
    }
}

/// A cluster that lies within the thresholds of a survey
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMatch {
    pub animal_id: String,
    pub cluster_id: String,
    pub centroid: Point,
    pub closeness: f64,
    pub distance: f64,
    pub delay: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Survey {
    pub id: String,
    /// Mean of the parsed dates
    pub datetime: Option<NaiveDateTime>,
    /// Mean of the parsed eastings and northings
    pub location: Option<Point>,
    /// Problems that make the survey unusable for searching
    pub major_problems: Vec<String>,
    /// Advisory problems
    pub minor_problems: Vec<String>,
    /// Best match first
    pub matches: Vec<SurveyMatch>,
}

impl Survey {
    /// Builds a survey from one spreadsheet row keyed by header
    pub fn from_record(record: &HashMap<String, String>, columns: &SurveyColumns) -> Survey {
        let mut survey = Survey {
            id: record.get(&columns.id).cloned().unwrap_or_default(),
            ..Survey::default()
        };

        let missing: Vec<&String> = std::iter::once(&columns.id)
            .chain(&columns.dates)
            .chain(&columns.eastings)
            .chain(&columns.northings)
            .filter(|header| !record.contains_key(header.as_str()))
            .collect();
        if !missing.is_empty() {
            for header in &missing {
                warn!(header = %header, "survey file has no column with this header");
            }
            survey
                .major_problems
                .push("Internal header list did not match headers of the data file.".into());
            return survey;
        }

        survey.find_average_time(record, &columns.dates);
        let x = survey.find_average_location(record, &columns.eastings, "easting", EASTING_RANGE);
        let y =
            survey.find_average_location(record, &columns.northings, "northing", NORTHING_RANGE);
        if let (Some(x), Some(y)) = (x, y) {
            survey.location = Some(Point::new(x, y));
        }
        survey
    }

    /// Usable surveys have a time, a location and no major problems
    pub fn is_usable(&self) -> bool {
        self.major_problems.is_empty() && self.datetime.is_some() && self.location.is_some()
    }

    pub fn time(&self) -> Option<i64> {
        self.datetime.map(|dt| dt.and_utc().timestamp())
    }

    fn find_average_time(&mut self, record: &HashMap<String, String>, headers: &[String]) {
        let mut times = Vec::new();
        for value in headers.iter().map(|h| record[h].as_str()) {
            if value.is_empty() {
                continue;
            }
            match parse_with_default_time(value, default_survey_time()) {
                Some(dt) => times.push(dt.and_utc().timestamp()),
                None => self.minor_problems.push(format!(
                    "This date string could not be parsed: {value}. Please correct survey file."
                )),
            }
        }

        if times.is_empty() {
            self.major_problems
                .push("Survey has no date values, and cannot be used for searching.".into());
            return;
        }

        let mean = times.iter().map(|&t| t as f64).sum::<f64>() / times.len() as f64;
        let average = mean.round() as i64;
        self.datetime = DateTime::from_timestamp(average, 0).map(|dt| dt.naive_utc());

        if !(MINIMUM_TIME < average && average < MAXIMUM_TIME) {
            self.major_problems.push(format!(
                "Average time is out of range. Range is {MINIMUM_TIME} to {MAXIMUM_TIME}, value is {average}."
            ));
        }
    }

    fn find_average_location(
        &mut self,
        record: &HashMap<String, String>,
        headers: &[String],
        name: &str,
        (min, max): (f64, f64),
    ) -> Option<f64> {
        let mut values = Vec::new();
        for value in headers.iter().map(|h| record[h].as_str()) {
            if value.is_empty() {
                continue;
            }
            match value.parse::<i64>() {
                Ok(v) => values.push(v as f64),
                Err(_) => self.minor_problems.push(format!(
                    "This {name} value could not be converted to an integer: {value}. Please correct survey file."
                )),
            }
        }

        if values.is_empty() {
            self.major_problems.push(format!(
                "Survey has no {name} values, and cannot be used for searching."
            ));
            return None;
        }

        let average = values.iter().sum::<f64>() / values.len() as f64;
        if !(min < average && average < max) {
            self.major_problems.push(format!(
                "Average {name} value is out of range. Range is {min} to {max}, value is {average}."
            ));
        }
        Some(average)
    }
}

/// Reads a headed survey spreadsheet
pub fn read_surveys<P: AsRef<Path>>(path: P, columns: &SurveyColumns) -> Result<Vec<Survey>> {
    read_surveys_from(File::open(path)?, columns)
}

pub fn read_surveys_from<R: Read>(source: R, columns: &SurveyColumns) -> Result<Vec<Survey>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    let headers = reader.headers()?.clone();

    let mut surveys = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        surveys.push(Survey::from_record(&row, columns));
    }
    Ok(surveys)
}

/// Clusters every animal's trail on its own, merged in order of start time
pub fn find_all_clusters(pool: Trail, params: SweepParams) -> Vec<ClusterSite> {
    let mut sites: Vec<ClusterSite> = pool
        .split_by_animal()
        .into_values()
        .flat_map(|mut trail| {
            let clusters = trail.find_clusters(params);
            clusters.iter().map(ClusterSite::from).collect::<Vec<_>>()
        })
        .collect();
    sites.sort_by_key(|site| site.span.start);
    sites
}

/// Ranks the clusters within both thresholds of each usable survey
///
/// Surveys with major problems are left without matches.
pub fn search(surveys: &mut [Survey], clusters: &[ClusterSite], params: SweepParams) {
    for survey in surveys.iter_mut() {
        if !survey.is_usable() {
            continue;
        }
        let (Some(time), Some(location)) = (survey.time(), survey.location) else {
            continue;
        };

        let mut matches: Vec<SurveyMatch> = clusters
            .iter()
            .filter_map(|cluster| {
                let distance = distance(cluster, &location);
                let delay = delay_point_to_cluster(time, &cluster.span);
                (distance <= params.radius && delay <= params.time_cutoff).then(|| SurveyMatch {
                    animal_id: cluster.animal_id.clone(),
                    cluster_id: cluster.id.clone(),
                    centroid: cluster.centroid,
                    closeness: closeness(distance, params.radius, delay, params.time_cutoff),
                    distance,
                    delay,
                })
            })
            .collect();
        matches.sort_by(|a, b| a.closeness.total_cmp(&b.closeness));
        debug!(survey = %survey.id, matches = matches.len(), "survey searched");
        survey.matches = matches;
    }
}

/// Logs a one-line account of a matching run
pub fn log_summary(
    fix_count: usize,
    clusters: &[ClusterSite],
    animal_count: usize,
    surveys: &[Survey],
) {
    let matched = surveys.iter().filter(|s| !s.matches.is_empty()).count();
    let success = if surveys.is_empty() {
        0.0
    } else {
        100.0 * matched as f64 / surveys.len() as f64
    };
    info!(
        fixes = fix_count,
        clusters = clusters.len(),
        animals = animal_count,
        surveys = surveys.len(),
        matched,
        "survey matching done ({success:.1}% success)"
    );
}
