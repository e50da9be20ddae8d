//! Cadence Animation Core (engine-agnostic)
//!
//! Keyframe algebra, timecourses with per-sample smoothness, the animation track types
//! (object placement, pose, texture and visibility channels, constraints, IK, and surface
//! distortions) plus weight tracks, actors with least-squares gesture fitting, and
//! versioned track persistence. Scene ordering lives in `cadence-orchestrator-core`; this crate
//! only sees other objects through [`SceneView`].

pub mod actor;
pub mod config;
pub mod deform;
pub mod error;
pub mod fit;
pub mod gesture;
pub mod ids;
pub mod interp;
pub mod io;
pub mod keyframe;
pub mod math;
pub mod object;
pub mod skeleton;
pub mod smoothness;
pub mod timecourse;
pub mod track;

// Re-exports for consumers (scene hosts)
pub use actor::{Actor, GestureEntry, REST_GESTURE_NAME};
pub use config::{Config, FitterConfig};
pub use deform::{Axis, Deformation};
pub use error::{AnimationError, Result};
pub use fit::{solve_gesture_weights, FitResult};
pub use gesture::Gesture;
pub use ids::{GestureId, IdAllocator, JointId, ObjectId, ParamId};
pub use interp::InterpMode;
pub use io::{
    encode_track, write_tracks, DecodeContext, LoadedTracks, TrackRecord, TrackRegistry,
};
pub use keyframe::{ActorKeyframe, Keyframe, KeyframeKind, RotationKeyframe};
pub use math::CoordinateSystem;
pub use object::{
    Distortion, IkRequest, IkSolver, ObjectRef, ObjectState, ParamValue, SceneView,
    TextureParameter,
};
pub use skeleton::{Joint, Skeleton};
pub use smoothness::Smoothness;
pub use timecourse::{Timecourse, Timepoint};
pub use track::{
    AnimationTrack, AxisMask, BendTrack, ConstraintTrack, CoordinateFrame, IkTrack, Placement,
    PoseTrack, PositionTrack, ProceduralPositionTrack, RotationTrack, ScaleTrack,
    SkeletonShapeTrack, TextureTrack, Track, TrackMode, TwistTrack, VisibilityTrack,
    WeightTrack,
};
