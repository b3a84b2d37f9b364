use super::aggregate::{Cluster, ClusterBuilder};
use super::fix::{Fix, Membership};
use super::geometry::{delay_point_to_cluster, delay_point_to_point, distance};
use bitvec::prelude::*;
use tracing::debug;

// Chronological sweep, one pass over time-ordered fixes:
//
// SWEEP(F, radius, cutoff)
//    for each unused fix P in F, earliest first
//       current = P, pending = []
//       for each unused fix Q after P
//          if delay(Q, current) > cutoff
//             stop scanning
//          if distance(Q, current) <= radius
//             if current is a bare fix
//                promote current to a cluster, P becomes home
//             move pending into current as away fixes
//             add Q to current as home, mark Q used
//          else
//             append Q to pending
//       if current is a cluster
//          commit current
//
// delay and distance are measured against P while it is bare, and against
// the cluster's home span and centroid once promoted.

/// Thresholds for one sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepParams {
    /// Maximum distance from the current centroid, in CRS units
    pub radius: f64,
    /// Maximum delay from the current home span, in seconds
    pub time_cutoff: i64,
}

/// Which fixes a sweep is allowed to group together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Universe {
    /// Fixes of one animal; every pending fix becomes away on a match
    SingleAnimal,
    /// Fixes of several animals pooled; pending fixes only become away if
    /// their animal is already part of the cluster
    Pooled,
}

/// Current item of the sweep: a lone fix, or a cluster grown from it
enum Current {
    Unpromoted(usize),
    Promoted(ClusterBuilder),
}

impl Current {
    fn promote(&mut self, fixes: &mut [Fix]) -> &mut ClusterBuilder {
        if let Current::Unpromoted(origin) = *self {
            fixes[origin].membership = Membership::Home;
            *self = Current::Promoted(ClusterBuilder::new(origin, &fixes[origin]));
        }
        match self {
            Current::Promoted(builder) => builder,
            Current::Unpromoted(_) => unreachable!("current was promoted above"),
        }
    }

    fn delay(&self, fixes: &[Fix], candidate: usize) -> i64 {
        match self {
            Current::Unpromoted(origin) => {
                delay_point_to_point(fixes[candidate].time, fixes[*origin].time)
            }
            Current::Promoted(builder) => {
                delay_point_to_cluster(fixes[candidate].time, &builder.span())
            }
        }
    }

    fn distance(&self, fixes: &[Fix], candidate: usize) -> f64 {
        match self {
            Current::Unpromoted(origin) => distance(&fixes[candidate], &fixes[*origin]),
            Current::Promoted(builder) => distance(&fixes[candidate], &builder.centroid()),
        }
    }
}

/// Groups time-ordered fixes into clusters
///
/// # Arguments
///
/// * `fixes` - Fixes ordered by time and deduplicated; their membership is
///   set to home or away as they are consumed
/// * `params` - Radius and time cutoff
/// * `universe` - Whether fixes belong to one animal or many
///
/// # Returns
///
/// Committed clusters in order of their first home fix, statistics included.
/// Indices in each cluster refer to `fixes`. A fix ends up in at most one
/// cluster; fixes that matched nothing stay unassigned.
pub fn sweep(fixes: &mut [Fix], params: SweepParams, universe: Universe) -> Vec<Cluster> {
    let mut used = bitvec![0; fixes.len()];
    let mut clusters = Vec::new();

    for origin in 0..fixes.len() {
        if used[origin] {
            continue;
        }
        used.set(origin, true);

        let mut current = Current::Unpromoted(origin);
        let mut pending: Vec<usize> = Vec::new();

        for candidate in (origin + 1)..fixes.len() {
            if used[candidate] {
                continue;
            }

            // Fixes are time-ordered, nothing later can be closer in time
            if current.delay(fixes, candidate) > params.time_cutoff {
                break;
            }

            if current.distance(fixes, candidate) <= params.radius {
                let builder = current.promote(fixes);
                builder.involve(&fixes[candidate].animal_id);

                // Away fixes go in before the new home fix to keep time order
                for away in pending.drain(..) {
                    if universe == Universe::SingleAnimal
                        || builder.involves(&fixes[away].animal_id)
                    {
                        fixes[away].membership = Membership::Away;
                        builder.add_away(away);
                        used.set(away, true);
                    }
                }

                fixes[candidate].membership = Membership::Home;
                builder.add_home(candidate, &fixes[candidate]);
                used.set(candidate, true);
            } else {
                pending.push(candidate);
            }
        }

        match current {
            Current::Promoted(builder) => {
                debug!(origin, home = builder.home_count(), "committing cluster");
                clusters.push(builder.finish(fixes));
            }
            // Matched nothing, dropped
            Current::Unpromoted(_) => {}
        }
    }

    clusters
}
