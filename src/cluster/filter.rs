//! Post-sweep filters and lookups on committed clusters

use super::aggregate::Cluster;
use super::crossing::Crossing;

/// Keeps clusters with at least `minimum_count` home fixes
pub fn filter_by_count(clusters: &mut Vec<Cluster>, minimum_count: usize) {
    clusters.retain(|cluster| cluster.home.len() >= minimum_count);
}

/// Keeps clusters whose home fixes span at least `minimum_stay` seconds
pub fn filter_by_stay(clusters: &mut Vec<Cluster>, minimum_stay: i64) {
    clusters.retain(|cluster| cluster.elapsed() >= minimum_stay);
}

/// Looks a cluster up by id; `None` when there is no such cluster
pub fn cluster_by_id<'a>(clusters: &'a [Cluster], id: &str) -> Option<&'a Cluster> {
    clusters.iter().find(|cluster| cluster.id == id)
}

pub fn crossing_by_id<'a>(crossings: &'a [Crossing], id: &str) -> Option<&'a Crossing> {
    crossings.iter().find(|crossing| crossing.id == id)
}
