// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan configuration, fixed when the engine is constructed.

use core::f64::consts::FRAC_PI_3;

/// How sample points are drawn from each surviving tile triangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SampleMode {
    /// Every distinct vertex, each examined once per tile/shape pair.
    #[default]
    Vertices,
    /// One centroid per triangle: roughly a third of the raycasts, coarser extremes.
    Centroids,
}

/// Second raycast through the tile's own surface to find where a sample actually lands.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceRefinement {
    /// Largest angle, in radians, between the hit surface normal and the query axis.
    ///
    /// Steeper hits (cliff faces, tunnel walls) are discarded.
    pub max_angle: f64,
}

impl Default for SurfaceRefinement {
    fn default() -> Self {
        Self {
            max_angle: FRAC_PI_3,
        }
    }
}

/// Scan tuning.
///
/// ```
/// use altimetry_engine::{SampleMode, ScanConfig, SurfaceRefinement};
///
/// let config = ScanConfig::default()
///     .with_sample_mode(SampleMode::Centroids)
///     .with_surface_refinement(Some(SurfaceRefinement::default()));
/// assert_eq!(config.skirt_threshold, 0.1);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Triangles with `|normal · direction|` below this are skirts and never sampled.
    pub skirt_threshold: f64,
    /// Vertex or centroid sampling.
    pub sample_mode: SampleMode,
    /// Surface-following refinement; off when `None`.
    pub surface_refinement: Option<SurfaceRefinement>,
    /// How far along the query axis containment rays start from their sample.
    pub raycast_distance: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skirt_threshold: 0.1,
            sample_mode: SampleMode::Vertices,
            surface_refinement: None,
            raycast_distance: 1e5,
        }
    }
}

impl ScanConfig {
    /// Set the skirt rejection threshold.
    #[must_use]
    pub fn with_skirt_threshold(mut self, threshold: f64) -> Self {
        self.skirt_threshold = threshold;
        self
    }

    /// Set the sampling mode.
    #[must_use]
    pub fn with_sample_mode(mut self, mode: SampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Enable or disable surface-following refinement.
    #[must_use]
    pub fn with_surface_refinement(mut self, refinement: Option<SurfaceRefinement>) -> Self {
        self.surface_refinement = refinement;
        self
    }

    /// Set the containment ray offset.
    #[must_use]
    pub fn with_raycast_distance(mut self, distance: f64) -> Self {
        self.raycast_distance = distance;
        self
    }
}
