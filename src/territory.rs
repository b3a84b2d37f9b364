//! Territories: the outline of the area each animal ranges over
//!
//! Fixes are binned by their bearing from the centre of the animal's
//! extent. The farthest fix in each bin becomes a vertex of the perimeter.

use crate::cluster::{Bounds, Fix, Point, Trail, angle_and_distance};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Lower edge of the angular bin, degrees from north
    pub bin: u32,
    pub location: Point,
    pub angle: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub animal_id: String,
    pub bounds: Bounds,
    /// Mid-point of `bounds`
    pub center: Point,
    /// Vertices in ascending bin order
    pub perimeter: Vec<Vertex>,
    pub fix_count: usize,
}

/// Outline of one animal's fixes; `None` without fixes
///
/// `resolution` is the bin width in degrees and must be at least 1.
pub fn territory(animal_id: &str, fixes: &[Fix], resolution: u32) -> Option<Territory> {
    let bounds = Bounds::of(fixes)?;
    let center = bounds.center();
    let resolution = resolution.max(1);

    let mut farthest: BTreeMap<u32, Vertex> = BTreeMap::new();
    for fix in fixes {
        let (angle, distance) = angle_and_distance(fix, &center);
        let bin = (angle / resolution as f64).floor() as u32 * resolution;
        let vertex = Vertex {
            bin,
            location: Point::new(fix.x, fix.y),
            angle,
            distance,
        };
        // Later fixes win ties
        farthest
            .entry(bin)
            .and_modify(|current| {
                if distance >= current.distance {
                    *current = vertex;
                }
            })
            .or_insert(vertex);
    }

    Some(Territory {
        animal_id: animal_id.to_string(),
        bounds,
        center,
        perimeter: farthest.into_values().collect(),
        fix_count: fixes.len(),
    })
}

/// One territory per animal, in animal id order
pub fn territories(trail: Trail, resolution: u32) -> Vec<Territory> {
    trail
        .split_by_animal()
        .iter()
        .filter_map(|(animal_id, trail)| territory(animal_id, &trail.fixes, resolution))
        .collect()
}
