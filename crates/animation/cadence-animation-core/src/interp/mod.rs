//! Interpolation modes and helpers.

pub mod functions;

use serde::{Deserialize, Serialize};

/// How a timecourse is evaluated between samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMode {
    /// Step function holding the latest sample at or before the query time.
    Discontinuous,
    Linear,
    /// Smoothness-scaled Hermite spline through every sample.
    #[default]
    Interpolating,
    /// Spline through neighbour-averaged control values; need not touch the samples.
    Approximating,
}

impl InterpMode {
    /// Whether `subdivide` adds samples for this mode.
    pub fn is_curved(self) -> bool {
        matches!(self, InterpMode::Interpolating | InterpMode::Approximating)
    }
}
