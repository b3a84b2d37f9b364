//! A Trail is a working set of fixes, kept in chronological order
//!
//! One animal's fixes make a trail for cluster finding; several animals'
//! fixes pooled together are used for crossings, whodunit and territories.

use super::crossing::{Crossing, find_crossings};
use super::fix::{DayPeriod, Fix};
use super::geometry::{Bounds, Position, distance};
use super::sweep::{SweepParams, Universe, sweep};
use super::Cluster;
use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Inclusive bounds on fix time; open ends are unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DateRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        DateRange { start, end }
    }

    /// `center ± half_width`
    pub fn around(center: i64, half_width: i64) -> Self {
        DateRange::new(Some(center - half_width), Some(center + half_width))
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start.is_none_or(|start| start <= time) && self.end.is_none_or(|end| time <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    pub fixes: Vec<Fix>,
}

impl Trail {
    pub fn new(fixes: Vec<Fix>) -> Self {
        Trail { fixes }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Stable sort by time; fixes sharing a time keep their input order
    pub fn order_by_time(&mut self) {
        self.fixes.sort_by_key(|fix| fix.time);
    }

    /// Drops every fix whose (animal id, time) was already seen
    ///
    /// The first occurrence is kept. Returns how many fixes were removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let mut seen: HashMap<(String, i64), usize> = HashMap::new();
        let mut unique: Vec<Fix> = Vec::with_capacity(self.fixes.len());
        let mut removed = 0;

        for fix in std::mem::take(&mut self.fixes) {
            match seen.entry((fix.animal_id.clone(), fix.time)) {
                Entry::Occupied(kept) => {
                    warn!(
                        kept = %unique[*kept.get()],
                        discarded = %fix,
                        "two fixes with the same timestamp found, one removed"
                    );
                    removed += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(unique.len());
                    unique.push(fix);
                }
            }
        }

        self.fixes = unique;
        removed
    }

    /// Keeps only fixes inside `range`; returns how many were removed
    pub fn filter_by_date(&mut self, range: &DateRange) -> usize {
        let before = self.fixes.len();
        self.fixes.retain(|fix| range.contains(fix.time));
        before - self.fixes.len()
    }

    /// Keeps only fixes within `limit` of `center`; returns how many were removed
    pub fn filter_by_location(&mut self, center: &impl Position, limit: f64) -> usize {
        let before = self.fixes.len();
        self.fixes.retain(|fix| distance(fix, center) <= limit);
        before - self.fixes.len()
    }

    /// Keeps only fixes of the listed animals; an empty list keeps everything
    pub fn select_animals(&mut self, animal_ids: &[String]) {
        if animal_ids.is_empty() {
            return;
        }
        self.fixes.retain(|fix| animal_ids.contains(&fix.animal_id));
    }

    /// Date filter, then time order, then duplicate removal
    ///
    /// Fails with [`Error::NoData`] if the date filter leaves nothing.
    pub fn prepare(&mut self, range: &DateRange) -> Result<()> {
        let filtered = self.filter_by_date(range);
        if self.is_empty() {
            return Err(Error::NoData(
                "no data remaining after filtering by date, try adjusting the date range".into(),
            ));
        }
        self.order_by_time();
        let duplicates = self.remove_duplicates();
        debug!(kept = self.len(), filtered, duplicates, "trail prepared");
        Ok(())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.fixes)
    }

    /// Sorted, unique animal ids present in the trail
    pub fn animal_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.fixes.iter().map(|f| f.animal_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Partitions the fixes into one ordered, deduplicated trail per animal
    pub fn split_by_animal(self) -> BTreeMap<String, Trail> {
        let mut trails: BTreeMap<String, Trail> = BTreeMap::new();
        for fix in self.fixes {
            trails.entry(fix.animal_id.clone()).or_default().fixes.push(fix);
        }
        for trail in trails.values_mut() {
            trail.order_by_time();
            trail.remove_duplicates();
        }
        trails
    }

    /// Sets the day/night tag of every fix
    pub fn tag_day_periods<F>(&mut self, mut classify: F)
    where
        F: FnMut(&Fix) -> DayPeriod,
    {
        for fix in &mut self.fixes {
            fix.day_period = classify(fix);
        }
    }

    /// Single-animal clusters of this trail
    pub fn find_clusters(&mut self, params: SweepParams) -> Vec<Cluster> {
        sweep(&mut self.fixes, params, Universe::SingleAnimal)
    }

    /// Crossings between the animals pooled in this trail
    pub fn find_crossings(&mut self, params: SweepParams) -> Vec<Crossing> {
        find_crossings(&mut self.fixes, params)
    }
}
