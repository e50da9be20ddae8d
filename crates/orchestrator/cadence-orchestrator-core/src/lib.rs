//! cadence-orchestrator
//!
//! Drives a scene of animated objects frame by frame: orders objects by the cross-object
//! reads of their tracks, resets animated state, applies every object's tracks and commits
//! pending poses. IK and pose distortions queued during a frame are resolved on request
//! with a host-provided solver.

pub mod diagnostics;
pub mod scene;
pub mod scheduler;

pub use crate::diagnostics::{DiagnosticsCfg, FrameDiagnostics};
pub use crate::scene::{Scene, SceneConfig, SceneObject};
pub use crate::scheduler::{evaluation_order, CycleEdge, ScheduleOrder};
