//! Cluster accumulation and statistics
//!
//! Clusters hold indices into the fix slice they were built from, the same
//! slice the sweep marked with home/away membership. Keep that slice around
//! to look the fixes up again.

use super::fix::{DATE_FMT_ID, Fix};
use super::geometry::{Point, Position, TimeSpan, distance};

/// Statistics computed once membership is final
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStats {
    /// Mean distance of home fixes from the centroid
    pub avg_distance: f64,
    /// Farthest away fix from the centroid, 0 without away fixes
    pub max_excursion: f64,
    /// `100 * home / all`
    pub fidelity: f64,
    /// One symbol per fix, `O` home and `.` away, in time order
    pub pattern: String,
}

/// A spatio-temporal grouping of fixes
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Start of the first home fix, formatted with [`DATE_FMT_ID`]
    pub id: String,
    /// Sorted, unique animal ids of the home fixes
    pub animal_ids: Vec<String>,
    pub home: Vec<usize>,
    pub away: Vec<usize>,
    /// Home and away fixes interleaved in time order
    pub all: Vec<usize>,
    /// Mean of the home fix coordinates
    pub centroid: Point,
    /// First to last home fix
    pub span: TimeSpan,
    pub stats: ClusterStats,
}

impl Cluster {
    /// Seconds between the first and last home fix
    pub fn elapsed(&self) -> i64 {
        self.span.elapsed()
    }

    /// Owning animal of a single-animal cluster, or the first of several
    pub fn animal_id(&self) -> &str {
        self.animal_ids.first().map(String::as_str).unwrap_or_default()
    }

    /// Mean seconds between consecutive fixes, `None` for a single fix
    pub fn average_interval(&self) -> Option<f64> {
        match self.all.len() {
            0 | 1 => None,
            n => Some(self.elapsed() as f64 / (n - 1) as f64),
        }
    }

    pub fn home_fixes<'a>(&'a self, fixes: &'a [Fix]) -> impl Iterator<Item = &'a Fix> + 'a {
        self.home.iter().map(move |&i| &fixes[i])
    }

    pub fn away_fixes<'a>(&'a self, fixes: &'a [Fix]) -> impl Iterator<Item = &'a Fix> + 'a {
        self.away.iter().map(move |&i| &fixes[i])
    }

    pub fn all_fixes<'a>(&'a self, fixes: &'a [Fix]) -> impl Iterator<Item = &'a Fix> + 'a {
        self.all.iter().map(move |&i| &fixes[i])
    }
}

impl Position for Cluster {
    fn position(&self) -> Point {
        self.centroid
    }
}

/// Incremental accumulator for a cluster under construction
///
/// The centroid is a running mean that only home fixes move.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    home: Vec<usize>,
    away: Vec<usize>,
    all: Vec<usize>,
    sum_x: f64,
    sum_y: f64,
    centroid: Point,
    span: TimeSpan,
    animals: Vec<String>,
}

impl ClusterBuilder {
    /// Starts a cluster from its first home fix
    pub fn new(index: usize, fix: &Fix) -> Self {
        ClusterBuilder {
            home: vec![index],
            away: Vec::new(),
            all: vec![index],
            sum_x: fix.x,
            sum_y: fix.y,
            centroid: Point::new(fix.x, fix.y),
            span: TimeSpan::instant(fix.time),
            animals: vec![fix.animal_id.clone()],
        }
    }

    pub fn add_home(&mut self, index: usize, fix: &Fix) {
        self.home.push(index);
        self.all.push(index);
        self.sum_x += fix.x;
        self.sum_y += fix.y;
        let n = self.home.len() as f64;
        self.centroid = Point::new(self.sum_x / n, self.sum_y / n);
        self.span.end = fix.time;
        self.involve(&fix.animal_id);
    }

    pub fn add_away(&mut self, index: usize) {
        self.away.push(index);
        self.all.push(index);
    }

    /// Records an animal as taking part in this cluster
    pub fn involve(&mut self, animal_id: &str) {
        if !self.involves(animal_id) {
            self.animals.push(animal_id.to_string());
        }
    }

    pub fn involves(&self, animal_id: &str) -> bool {
        self.animals.iter().any(|a| a == animal_id)
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn span(&self) -> TimeSpan {
        self.span
    }

    pub fn home_count(&self) -> usize {
        self.home.len()
    }

    /// Closes the cluster and computes its statistics
    ///
    /// `fixes` must be the slice the indices were taken from.
    pub fn finish(self, fixes: &[Fix]) -> Cluster {
        let centroid = self.centroid;
        let avg_distance = self
            .home
            .iter()
            .map(|&i| distance(&fixes[i], &centroid))
            .sum::<f64>()
            / self.home.len() as f64;
        let max_excursion = self
            .away
            .iter()
            .map(|&i| distance(&fixes[i], &centroid))
            .fold(0.0, f64::max);
        let fidelity = 100.0 * self.home.len() as f64 / self.all.len() as f64;
        let pattern = self
            .all
            .iter()
            .map(|&i| fixes[i].membership.symbol())
            .collect();

        let mut animal_ids = self.animals;
        animal_ids.sort();

        Cluster {
            id: fixes[self.home[0]].datetime.format(DATE_FMT_ID).to_string(),
            animal_ids,
            home: self.home,
            away: self.away,
            all: self.all,
            centroid,
            span: self.span,
            stats: ClusterStats {
                avg_distance,
                max_excursion,
                fidelity,
                pattern,
            },
        }
    }
}
