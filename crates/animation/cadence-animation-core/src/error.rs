//! Error types for the animation core.
//!
//! Evaluation never fails: broken references and degenerate solves degrade to no-ops.
//! Errors are raised for persisted data that cannot be trusted and for invalid edits.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// A stored record carries a version this build does not read.
    #[error("Unsupported {tag} version: {version}")]
    UnsupportedVersion { tag: String, version: u16 },

    /// No decoder is registered for a stored record tag.
    #[error("Unknown track type: {tag}")]
    UnknownTrackTag { tag: String },

    /// Payload bytes could not be encoded or decoded.
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// A keyframe of the wrong concrete type was handed to a track.
    #[error("Keyframe type mismatch: expected {expected}, got {actual}")]
    KeyframeMismatch { expected: String, actual: String },

    /// A timepoint index outside the timecourse.
    #[error("Timepoint {index} out of range (len {len})")]
    InvalidTimepoint { index: usize, len: usize },

    /// A time that is not a finite number.
    #[error("Invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// Every id of this kind has been handed out once already.
    #[error("No {kind} ids left")]
    IdsExhausted { kind: String },
}

impl AnimationError {
    /// Whether the caller can continue with the rest of its input.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTrackTag { .. }
                | Self::KeyframeMismatch { .. }
                | Self::InvalidTimepoint { .. }
                | Self::InvalidTime { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. }
            | Self::UnknownTrackTag { .. }
            | Self::Serialization { .. } => "persistence",
            Self::KeyframeMismatch { .. } => "data",
            Self::InvalidTimepoint { .. } | Self::InvalidTime { .. } => "validation",
            Self::IdsExhausted { .. } => "capacity",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<bincode::Error> for AnimationError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnimationError>;
