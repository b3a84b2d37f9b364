//! Spatio-temporal clustering of animal GPS telemetry
//!
//! Fixes are read from CSV, ordered by time and swept into clusters: places
//! an animal kept returning to within a radius and a time cutoff. Pooling
//! several animals gives crossings. The same geometry answers "who was near
//! here, then" (whodunit), outlines territories and matches field surveys
//! against the clusters.

pub mod cluster;
pub mod config;
pub mod error;
pub mod ingest;
pub mod report;
pub mod survey;
pub mod territory;
pub mod whodunit;

#[cfg(test)]
mod whodunit_test;

pub use error::{Error, Result};
