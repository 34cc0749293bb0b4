//! Ground-plane estimation and principal-axis alignment for body scans.
//!
//! This crate provides tools for:
//! - Plane representation with signed distances ([`Plane`])
//! - Seeded sampling of distinct indices ([`DistinctSampler`], [`SeededSampler`])
//! - RANSAC ground-plane fitting ([`fit_ground_plane`])
//! - PCA alignment into an object-local frame ([`align_principal_axes`])
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: no I/O, no global state. Every function is a
//! pure computation over the cloud it is given, so independent scans can be
//! processed on independent threads without locking.
//!
//! # Determinism
//!
//! Given the same cloud and the same seed, [`fit_ground_plane`] returns
//! bit-identical plane parameters on every run.
//!
//! # Example
//!
//! ```
//! use morpho_transform::{GroundPlaneConfig, align_principal_axes, fit_ground_plane};
//! use morpho_types::PointCloud;
//!
//! let mut cloud = PointCloud::new();
//! for i in 0..20 {
//!     for j in 0..10 {
//!         cloud.push_coords(f64::from(i) * 0.1, 0.0, f64::from(j) * 0.1);
//!     }
//! }
//!
//! let fit = fit_ground_plane(&cloud, &GroundPlaneConfig::default());
//! assert_eq!(fit.inliers.len(), cloud.len());
//!
//! let frame = align_principal_axes(&cloud).unwrap();
//! assert!(frame.primary_axis().x.abs() > 0.99);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod frame;
mod ground;
mod plane;
mod sampler;

pub use error::{TransformError, TransformResult};
pub use frame::{AlignedCloud, AlignedFrame, PrincipalExtents, align_principal_axes};
pub use ground::{GroundPlaneConfig, GroundPlaneFit, fit_ground_plane, fit_ground_plane_with};
pub use plane::{DEGENERATE_NORMAL_EPSILON, Plane};
pub use sampler::{DistinctSampler, RngSampler, SeededSampler};
