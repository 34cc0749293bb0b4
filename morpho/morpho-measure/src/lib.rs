//! Cross-section and volume measurements for aligned body scans.
//!
//! This crate provides tools for:
//! - Slab selection along the primary body axis ([`Slab`], [`SlabSection`])
//! - 2D convex hulls and perimeters ([`convex_hull_2d`])
//! - 3D convex hull volume ([`convex_hull_volume`])
//! - Volume estimation from a surface handle ([`VolumeSurface`], [`estimate_volume`])
//!
//! # Layer 0 Crate
//!
//! No I/O and no global state. Inputs are aligned coordinates produced by
//! the transform stage: component 0 runs along the body, component 1 across
//! it, component 2 vertically.
//!
//! # Example
//!
//! ```
//! use morpho_measure::{Slab, convex_hull_2d};
//! use nalgebra::Point3;
//!
//! // A 1 x 1 square tube, sampled along its length
//! let mut points = Vec::new();
//! for i in 0..=10 {
//!     let x = f64::from(i) * 0.1;
//!     for (y, z) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
//!         points.push(Point3::new(x, y, z));
//!     }
//! }
//!
//! let section = Slab::new(0.5, 0.03).extract(&points);
//! assert_eq!(section.len(), 4);
//!
//! let hull = convex_hull_2d(&section.lateral_profile()).unwrap();
//! assert!((hull.perimeter - 4.0).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod hull2d;
mod hull3d;
mod slab;
mod surface;
mod volume;

pub use error::{MeasureError, MeasureResult};
pub use hull2d::{ConvexHull2D, MIN_HULL_POINTS, convex_hull_2d};
pub use hull3d::convex_hull_volume;
pub use slab::{Slab, SlabSection};
pub use surface::{SurfaceMesh, VolumeSurface};
pub use volume::{SurfaceUnits, VolumeEstimate, VolumeSource, estimate_volume};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3};
