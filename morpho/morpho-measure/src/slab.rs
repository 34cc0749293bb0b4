//! Thin cross-sectional bands along the primary body axis.

use nalgebra::{Point2, Point3};

/// A band `[center - h, center + h]` along axis 0.
///
/// The center sits at fractional position `fraction` between the minimum
/// and maximum axis-0 coordinate of the cloud it is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    /// Position along axis 0, in `[0, 1]`.
    pub fraction: f64,
    /// Half of the band thickness, in cloud units.
    pub half_thickness: f64,
}

/// Points selected by a [`Slab`], still in aligned coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SlabSection {
    /// Axis-0 coordinate of the band center (`NaN` for an empty cloud).
    pub center: f64,
    /// Inclusive axis-0 bounds of the band.
    pub bounds: (f64, f64),
    /// Selected points, in input order.
    pub points: Vec<Point3<f64>>,
}

impl Slab {
    /// Create a slab at `fraction` with half-thickness `half_thickness`.
    #[must_use]
    pub const fn new(fraction: f64, half_thickness: f64) -> Self {
        Self {
            fraction,
            half_thickness,
        }
    }

    /// Select the points whose axis-0 coordinate lies inside the band.
    ///
    /// Bounds are inclusive on both sides. An empty input gives an empty
    /// section with a `NaN` center.
    #[must_use]
    pub fn extract(&self, points: &[Point3<f64>]) -> SlabSection {
        let range = points.iter().fold(None, |acc: Option<(f64, f64)>, p| {
            Some(acc.map_or((p.x, p.x), |(lo, hi)| (lo.min(p.x), hi.max(p.x))))
        });

        let Some((lo, hi)) = range else {
            return SlabSection {
                center: f64::NAN,
                bounds: (f64::NAN, f64::NAN),
                points: Vec::new(),
            };
        };

        let center = self.fraction.mul_add(hi - lo, lo);
        let bounds = (center - self.half_thickness, center + self.half_thickness);
        let selected = points
            .iter()
            .filter(|p| p.x >= bounds.0 && p.x <= bounds.1)
            .copied()
            .collect();

        SlabSection {
            center,
            bounds,
            points: selected,
        }
    }
}

impl SlabSection {
    /// Number of selected points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no point fell inside the band.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if the section holds at least `min_points` points.
    #[must_use]
    pub fn is_populated(&self, min_points: usize) -> bool {
        self.points.len() >= min_points
    }

    /// The (axis 1, axis 2) projection of the selected points.
    #[must_use]
    pub fn lateral_profile(&self) -> Vec<Point2<f64>> {
        self.points.iter().map(|p| Point2::new(p.y, p.z)).collect()
    }

    /// Peak-to-peak extent along axis 1; `NaN` when empty.
    #[must_use]
    pub fn width(&self) -> f64 {
        peak_to_peak(self.points.iter().map(|p| p.y))
    }

    /// Peak-to-peak extent along axis 2; `NaN` when empty.
    #[must_use]
    pub fn depth(&self) -> f64 {
        peak_to_peak(self.points.iter().map(|p| p.z))
    }
}

fn peak_to_peak(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo <= hi { hi - lo } else { f64::NAN }
}
