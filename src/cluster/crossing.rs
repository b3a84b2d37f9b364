//! Crossings: clusters shared by two or more animals

use super::aggregate::Cluster;
use super::fix::Fix;
use super::geometry::{delay_point_to_point, distance};
use super::sweep::{SweepParams, Universe, sweep};

/// How many closest meetings a crossing keeps
pub const MEETINGS_KEPT: usize = 3;

/// Two home fixes of different animals inside one crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meeting {
    pub first: usize,
    pub second: usize,
    /// Seconds between the two fixes
    pub delay: i64,
    pub distance: f64,
}

/// A cluster involving more than one animal
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    /// Cluster id followed by the involved animal ids, e.g. `20120601-0400-F12_M7`
    pub id: String,
    pub cluster: Cluster,
    /// Newest improvement first, at most [`MEETINGS_KEPT`]
    pub closest_meetings: Vec<Meeting>,
}

impl Crossing {
    /// Returns `None` for a cluster that only involves one animal
    pub fn from_cluster(cluster: Cluster, fixes: &[Fix]) -> Option<Crossing> {
        if cluster.animal_ids.len() < 2 {
            return None;
        }
        let id = format!("{}-{}", cluster.id, cluster.animal_ids.join("_"));
        let closest_meetings = closest_meetings(&cluster, fixes);
        Some(Crossing {
            id,
            cluster,
            closest_meetings,
        })
    }

    pub fn animal_ids(&self) -> &[String] {
        &self.cluster.animal_ids
    }
}

/// Sweeps pooled fixes of many animals and keeps the clusters they share
pub fn find_crossings(fixes: &mut [Fix], params: SweepParams) -> Vec<Crossing> {
    let clusters = sweep(fixes, params, Universe::Pooled);
    clusters_to_crossings(clusters, fixes)
}

pub fn clusters_to_crossings(clusters: Vec<Cluster>, fixes: &[Fix]) -> Vec<Crossing> {
    clusters
        .into_iter()
        .filter_map(|cluster| Crossing::from_cluster(cluster, fixes))
        .collect()
}

/// Finds the pairs of home fixes, one per animal, with the least time between them
///
/// Each animal but the last is paired against every other animal's home
/// fixes. A pair is recorded when it strictly beats the best delay so far,
/// and is put in front, so ties keep the pair found first.
fn closest_meetings(cluster: &Cluster, fixes: &[Fix]) -> Vec<Meeting> {
    let mut closest = i64::MAX;
    let mut meetings = Vec::new();

    let Some((_, queried)) = cluster.animal_ids.split_last() else {
        return meetings;
    };

    for animal_id in queried {
        let (query, field): (Vec<usize>, Vec<usize>) = cluster
            .home
            .iter()
            .copied()
            .partition(|&i| fixes[i].animal_id == *animal_id);

        for &first in &query {
            for &second in &field {
                let delay = delay_point_to_point(fixes[first].time, fixes[second].time);
                if delay < closest {
                    closest = delay;
                    meetings.insert(
                        0,
                        Meeting {
                            first,
                            second,
                            delay,
                            distance: distance(&fixes[first], &fixes[second]),
                        },
                    );
                }
            }
        }
    }

    meetings.truncate(MEETINGS_KEPT);
    meetings
}
