//! Configuration for every tool
//!
//! Values come from, in order of precedence: command line arguments,
//! the config file, built-in defaults. The resolved values are handed to
//! each component explicitly.

use crate::cluster::{DateRange, SweepParams};
use crate::error::{Error, Result};
use crate::ingest::parse_date_argument;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "catamount.toml";

pub const RADIUS_RANGE: (i64, i64) = (0, 1000);
pub const TIME_CUTOFF_RANGE: (i64, i64) = (0, 31_536_000);
pub const MINIMUM_COUNT_RANGE: (i64, i64) = (0, 100);
pub const MINIMUM_STAY_RANGE: (i64, i64) = (0, 8_640_000);
pub const PERIMETER_RESOLUTION_RANGE: (i64, i64) = (1, 90);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub data: DataColumns,

    #[serde(default)]
    pub clusters: ClusterConfig,

    #[serde(default)]
    pub territories: TerritoryConfig,

    #[serde(default)]
    pub crossings: CrossingConfig,

    #[serde(default)]
    pub whodunit: WhodunitConfig,

    #[serde(default)]
    pub match_survey: MatchSurveyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Fix data file
    #[serde(default = "default_datafile_path")]
    pub datafile_path: PathBuf,
}

/// Zero-based column positions of the fix data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataColumns {
    pub id: usize,
    pub animal_id: usize,
    pub timestamp: usize,
    pub northing: usize,
    pub easting: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Meters
    pub radius: i64,
    pub time_cutoff_hours: i64,
    /// Home fixes
    pub minimum_count: i64,
    pub minimum_stay_hours: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryConfig {
    /// Width in degrees of each perimeter bin
    pub perimeter_resolution: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingConfig {
    pub radius: i64,
    pub time_cutoff_hours: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhodunitConfig {
    pub radius: i64,
    pub time_cutoff_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSurveyConfig {
    pub survey_file_path: PathBuf,
    pub radius: i64,
    pub time_cutoff_hours: i64,
    /// Header of the survey id column
    pub id_header: String,
    /// Headers of columns holding dates; their values are averaged
    pub date_headers: Vec<String>,
    pub easting_headers: Vec<String>,
    pub northing_headers: Vec<String>,
}

// Default value functions
fn default_datafile_path() -> PathBuf {
    PathBuf::from("data/ALLGPS.csv")
}

fn default_radius() -> i64 {
    200
}

fn default_time_cutoff_hours() -> i64 {
    144
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            datafile_path: default_datafile_path(),
        }
    }
}

impl Default for DataColumns {
    fn default() -> Self {
        Self {
            id: 0,
            animal_id: 1,
            timestamp: 4,
            northing: 6,
            easting: 7,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            time_cutoff_hours: default_time_cutoff_hours(),
            minimum_count: 0,
            minimum_stay_hours: 0,
            start_date: None,
            end_date: None,
        }
    }
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            perimeter_resolution: 9,
            start_date: None,
            end_date: None,
        }
    }
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            time_cutoff_hours: default_time_cutoff_hours(),
            start_date: None,
            end_date: None,
        }
    }
}

impl Default for WhodunitConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            time_cutoff_hours: default_time_cutoff_hours(),
        }
    }
}

impl Default for MatchSurveyConfig {
    fn default() -> Self {
        Self {
            survey_file_path: PathBuf::from("data/surveys.csv"),
            radius: default_radius(),
            time_cutoff_hours: default_time_cutoff_hours(),
            id_header: "ID".to_string(),
            date_headers: strings(&["Estimated DOD", "Date off", "Pick-up Date"]),
            easting_headers: strings(&["Kill UTM E", "Cache UTM E", "Carcass Only UTM E"]),
            northing_headers: strings(&["Kill UTM N", "Cache UTM N", "Carcass Only UTM N"]),
        }
    }
}

impl Settings {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from an explicit file, or from
    /// [`DEFAULT_CONFIG_FILE`] if present, or fall back to defaults
    ///
    /// An explicit file that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) if !path.is_file() => Err(Error::ConfigMissing(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }
}

impl ClusterConfig {
    pub fn sweep_params(&self) -> SweepParams {
        sweep_params(self.radius, self.time_cutoff_hours)
    }

    pub fn minimum_count(&self) -> usize {
        constrain(self.minimum_count, MINIMUM_COUNT_RANGE) as usize
    }

    /// Seconds
    pub fn minimum_stay(&self) -> i64 {
        constrain(hours_to_seconds(self.minimum_stay_hours), MINIMUM_STAY_RANGE)
    }

    pub fn date_range(&self) -> Result<DateRange> {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

impl TerritoryConfig {
    pub fn perimeter_resolution(&self) -> u32 {
        constrain(self.perimeter_resolution, PERIMETER_RESOLUTION_RANGE) as u32
    }

    pub fn date_range(&self) -> Result<DateRange> {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

impl CrossingConfig {
    pub fn sweep_params(&self) -> SweepParams {
        sweep_params(self.radius, self.time_cutoff_hours)
    }

    pub fn date_range(&self) -> Result<DateRange> {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

impl WhodunitConfig {
    pub fn sweep_params(&self) -> SweepParams {
        sweep_params(self.radius, self.time_cutoff_hours)
    }
}

impl MatchSurveyConfig {
    pub fn sweep_params(&self) -> SweepParams {
        sweep_params(self.radius, self.time_cutoff_hours)
    }
}

/// Clamps a user-supplied integer into `(min, max)`
pub fn constrain(value: i64, (min, max): (i64, i64)) -> i64 {
    value.clamp(min, max)
}

pub fn hours_to_seconds(hours: i64) -> i64 {
    hours.saturating_mul(3600)
}

fn sweep_params(radius: i64, time_cutoff_hours: i64) -> SweepParams {
    SweepParams {
        radius: constrain(radius, RADIUS_RANGE) as f64,
        time_cutoff: constrain(hours_to_seconds(time_cutoff_hours), TIME_CUTOFF_RANGE),
    }
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let start = start.map(parse_date_argument).transpose()?.flatten();
    let end = end.map(parse_date_argument).transpose()?.flatten();
    Ok(DateRange::new(
        start.map(|dt| dt.and_utc().timestamp()),
        end.map(|dt| dt.and_utc().timestamp()),
    ))
}
