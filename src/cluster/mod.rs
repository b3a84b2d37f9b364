//! Package cluster groups time-ordered GPS fixes into clusters and crossings
pub mod aggregate;
pub mod crossing;
pub mod filter;
pub mod fix;
pub mod geometry;
pub mod sweep;
pub mod trail;

#[cfg(test)]
mod trail_test;

pub use aggregate::{Cluster, ClusterBuilder, ClusterStats};
pub use crossing::{Crossing, MEETINGS_KEPT, Meeting, clusters_to_crossings, find_crossings};
pub use filter::{cluster_by_id, crossing_by_id, filter_by_count, filter_by_stay};
pub use fix::{DATE_FMT_ID, DATE_FMT_ISO, DayPeriod, Fix, Membership};
pub use geometry::{
    AXIS_EPSILON, Bounds, Point, Position, TimeSpan, angle_and_distance, closeness,
    delay_cluster_to_cluster, delay_point_to_cluster, delay_point_to_point, distance,
};
pub use sweep::{SweepParams, Universe, sweep};
pub use trail::{DateRange, Trail};
