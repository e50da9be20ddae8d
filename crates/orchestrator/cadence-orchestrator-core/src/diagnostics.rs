use serde::{Deserialize, Serialize};

use cadence_animation_core::ObjectId;

use crate::scheduler::CycleEdge;

/// Diagnostics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
    /// Log the evaluation order of every frame at `debug` level.
    #[serde(default)]
    pub log_order: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            enabled: true,
            log_order: false,
        }
    }
}

/// What one evaluation pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    pub time: f64,
    /// Objects in the order they were evaluated.
    pub order: Vec<ObjectId>,
    pub cycles: Vec<CycleEdge>,
    /// Tracks that were enabled and had something to contribute.
    pub tracks_applied: usize,
    pub tracks_skipped: usize,
}

impl FrameDiagnostics {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub(crate) fn report(&self, cfg: &DiagnosticsCfg) {
        if !cfg.enabled {
            return;
        }
        if cfg.log_order {
            log::debug!("frame t={} order={:?}", self.time, self.order);
        }
        if self.has_cycles() {
            log::debug!(
                "frame t={}: {} dependency edge(s) dropped",
                self.time,
                self.cycles.len()
            );
        }
    }
}
