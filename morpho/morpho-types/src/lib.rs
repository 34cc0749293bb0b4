//! Core data types for body-morphometry scans.
//!
//! This crate provides the foundational types shared by the morphometry
//! pipeline:
//!
//! - [`PointCloud`] - An ordered sequence of 3D scan points
//! - [`MetricsRecord`] - The measurement record produced for one scan
//! - [`QualityReport`] - Scan-quality heuristics attached to a record
//!
//! # Layer 0 Crate
//!
//! This crate has no I/O and no global state. It can be used from CLI
//! tools, servers, or bindings.
//!
//! # Units
//!
//! Coordinates are `f64`. After the pipeline applies its physical scale,
//! all lengths are meters, volumes cubic meters and weights kilograms.
//!
//! # Missing Values
//!
//! A measurement that could not be computed is `f64::NAN`. Callers test
//! finiteness; they never rely on an error to detect a missing value.
//!
//! # Example
//!
//! ```
//! use morpho_types::PointCloud;
//!
//! let cloud = PointCloud::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
//! assert_eq!(cloud.len(), 3);
//! assert!(cloud.centroid().is_some());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cloud;
mod record;

pub use cloud::PointCloud;
pub use record::{MetricsRecord, QualityReport, nan_as_null};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};
