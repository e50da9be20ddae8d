//! Core configuration for cadence-animation-core.

use serde::{Deserialize, Serialize};

/// Tolerances used by keyframe capture and the gesture fitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Distance below which a captured value counts as unchanged.
    pub modified_tolerance: f64,
    pub fitter: FitterConfig,
}

/// Constants for the gesture least-squares fit. Authored content depends on the
/// defaults; change them only for experiments.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitterConfig {
    /// Singular values at or below `svd_cutoff * s_max` are dropped from the solve.
    pub svd_cutoff: f64,
    /// Weights below `-weight_threshold` exclude their gesture; weights within
    /// `±weight_threshold` are treated as zero.
    pub weight_threshold: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            svd_cutoff: 0.1,
            weight_threshold: 0.001,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modified_tolerance: 1e-10,
            fitter: FitterConfig::default(),
        }
    }
}
