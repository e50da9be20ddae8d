//! Versioned persistence records for tracks and keyframes.
//!
//! Each track is stored as a [`TrackRecord`]: a type tag, a payload version and a
//! bincode payload. A [`TrackRegistry`] maps tags to decoders. Payloads use dedicated
//! record types so the stored layout is independent of the in-memory serde layout.
//!
//! Unknown tags are skipped by [`TrackRegistry::read_tracks`], including tags nested inside
//! another track's payload; an unknown version of a known tag is always an error.

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::deform::Axis;
use crate::error::{AnimationError, Result};
use crate::gesture::Gesture;
use crate::ids::{JointId, ParamId};
use crate::interp::InterpMode;
use crate::keyframe::{ActorKeyframe, Keyframe, RotationKeyframe};
use crate::object::ObjectRef;
use crate::smoothness::Smoothness;
use crate::timecourse::{Timecourse, Timepoint};
use crate::track::constraint::{AxisConstraint, OrientationAxis, OrientationMode};
use crate::track::ik::IkConstraint;
use crate::track::{
    bend, constraint, ik, pose, position, procedural, rotation, scale, skeleton_shape, texture,
    twist, visibility, BendTrack, ConstraintTrack, IkTrack, Placement, PoseTrack, PositionTrack,
    ProceduralPositionTrack, RotationTrack, ScaleTrack, SkeletonShapeTrack, TextureTrack, Track,
    TwistTrack, VisibilityTrack, WeightTrack,
};

pub const KEYFRAME_VERSION: u16 = 0;

const POSITION_VERSION: u16 = 1;
const ROTATION_VERSION: u16 = 0;
const POSE_VERSION: u16 = 2;
const TEXTURE_VERSION: u16 = 0;
const VISIBILITY_VERSION: u16 = 0;
const CONSTRAINT_VERSION: u16 = 0;
const IK_VERSION: u16 = 1;
const PROCEDURAL_VERSION: u16 = 0;
const SCALE_VERSION: u16 = 0;
const BEND_VERSION: u16 = 0;
const TWIST_VERSION: u16 = 0;
const SKELETON_SHAPE_VERSION: u16 = 0;

/// One stored track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub tag: String,
    pub version: u16,
    pub payload: Vec<u8>,
}

/// Result of a multi-track load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedTracks {
    pub tracks: Vec<Track>,
    /// Tags that had no registered decoder, in encounter order, at any nesting depth.
    pub skipped: Vec<String>,
}

pub type TrackDecoder = fn(&mut DecodeContext<'_>, u16, &[u8]) -> Result<Track>;

/// State of one load, handed to every decoder so nested records share the skip list.
pub struct DecodeContext<'a> {
    registry: &'a TrackRegistry,
    skipped: Vec<String>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a TrackRegistry) -> Self {
        Self {
            registry,
            skipped: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'a TrackRegistry {
        self.registry
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn decode(&mut self, record: &TrackRecord) -> Result<Track> {
        let decoder = *self
            .registry
            .decoders
            .get(record.tag.as_str())
            .ok_or_else(|| AnimationError::UnknownTrackTag {
                tag: record.tag.clone(),
            })?;
        decoder(self, record.version, &record.payload)
    }

    /// Decode a list of records, skipping (and recording) unknown tags.
    pub fn read_tracks(&mut self, records: &[TrackRecord]) -> Result<Vec<Track>> {
        let mut tracks = Vec::with_capacity(records.len());
        for record in records {
            match self.decode(record) {
                Ok(track) => tracks.push(track),
                Err(AnimationError::UnknownTrackTag { tag }) => {
                    log::warn!("skipping track with unknown type {:?}", tag);
                    self.skipped.push(tag);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(tracks)
    }

    pub fn into_skipped(self) -> Vec<String> {
        self.skipped
    }
}

/// Tag to decoder table. `TrackRegistry::default()` knows every built-in track type.
#[derive(Clone)]
pub struct TrackRegistry {
    decoders: HashMap<String, TrackDecoder>,
}

impl Default for TrackRegistry {
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register(position::TAG, decode_position);
        reg.register(rotation::TAG, decode_rotation);
        reg.register(pose::TAG, decode_pose);
        reg.register(texture::TAG, decode_texture);
        reg.register(visibility::TAG, decode_visibility);
        reg.register(constraint::TAG, decode_constraint);
        reg.register(ik::TAG, decode_ik);
        reg.register(procedural::TAG, decode_procedural);
        reg.register(scale::TAG, decode_scale);
        reg.register(bend::TAG, decode_bend);
        reg.register(twist::TAG, decode_twist);
        reg.register(skeleton_shape::TAG, decode_skeleton_shape);
        reg
    }
}

impl TrackRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, decoder: TrackDecoder) {
        self.decoders.insert(tag.into(), decoder);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode one record. Unknown tags nested inside it are logged and dropped; use
    /// [`read_tracks`](Self::read_tracks) to collect them.
    pub fn decode(&self, record: &TrackRecord) -> Result<Track> {
        DecodeContext::new(self).decode(record)
    }

    /// Decode a list of records, skipping (and reporting) unknown tags.
    pub fn read_tracks(&self, records: &[TrackRecord]) -> Result<LoadedTracks> {
        let mut ctx = DecodeContext::new(self);
        let tracks = ctx.read_tracks(records)?;
        Ok(LoadedTracks {
            tracks,
            skipped: ctx.into_skipped(),
        })
    }
}

pub fn write_tracks(tracks: &[Track]) -> Result<Vec<TrackRecord>> {
    tracks.iter().map(encode_track).collect()
}

pub fn encode_track(track: &Track) -> Result<TrackRecord> {
    let (version, payload) = match track {
        Track::Position(t) => (
            POSITION_VERSION,
            bincode::serialize(&PositionRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                placement: t.placement.clone(),
                joint: t.joint,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Rotation(t) => (
            ROTATION_VERSION,
            bincode::serialize(&RotationRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                placement: t.placement.clone(),
                use_quaternion: t.use_quaternion,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Pose(t) => (
            POSE_VERSION,
            bincode::serialize(&PoseRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                relative: t.relative,
                weight: (&t.weight).into(),
                subtracks: write_tracks(&t.subtracks)?,
            })?,
        ),
        Track::Texture(t) => (
            TEXTURE_VERSION,
            bincode::serialize(&TextureRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                params: t.params.clone(),
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Visibility(t) => (
            VISIBILITY_VERSION,
            bincode::serialize(&BaseRecord::of(&t.name, t.enabled, &t.tc, InterpMode::Linear))?,
        ),
        Track::Constraint(t) => (
            CONSTRAINT_VERSION,
            bincode::serialize(&ConstraintRecord {
                name: t.name.clone(),
                enabled: t.enabled,
                axes: t.axes,
                pos: t.pos,
                orient_axis: t.orient_axis,
                orient_mode: t.orient_mode,
                orient: t.orient,
                face_toward: t.face_toward,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Ik(t) => (
            IK_VERSION,
            bincode::serialize(&IkRecord {
                name: t.name.clone(),
                enabled: t.enabled,
                constraints: t.constraints.clone(),
                use_gestures: t.use_gestures,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::ProceduralPosition(t) => (
            PROCEDURAL_VERSION,
            bincode::serialize(&ProceduralRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                procedure: serde_json::to_string(&t.procedure)?,
                placement: t.placement.clone(),
                joint: t.joint,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Scale(t) => (
            SCALE_VERSION,
            bincode::serialize(&ScaleRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                world_space: t.world_space,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Bend(t) => (
            BEND_VERSION,
            bincode::serialize(&BendRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                axis: t.axis,
                direction: t.direction,
                forward: t.forward,
                world_space: t.world_space,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::Twist(t) => (
            TWIST_VERSION,
            bincode::serialize(&TwistRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                axis: t.axis,
                forward: t.forward,
                world_space: t.world_space,
                weight: (&t.weight).into(),
            })?,
        ),
        Track::SkeletonShape(t) => (
            SKELETON_SHAPE_VERSION,
            bincode::serialize(&SkeletonShapeRecord {
                base: BaseRecord::of(&t.name, t.enabled, &t.tc, t.smoothing),
                use_gestures: t.use_gestures,
                weight: (&t.weight).into(),
            })?,
        ),
    };
    Ok(TrackRecord {
        tag: track.tag().to_string(),
        version,
        payload,
    })
}

/// Encode one keyframe with a leading version.
pub fn encode_keyframe(k: &Keyframe) -> Result<Vec<u8>> {
    let mut out = bincode::serialize(&KEYFRAME_VERSION)?;
    out.extend(bincode::serialize(&KeyframeRecord::from(k))?);
    Ok(out)
}

pub fn decode_keyframe(bytes: &[u8]) -> Result<Keyframe> {
    let version: u16 = bincode::deserialize(bytes)?;
    if version != KEYFRAME_VERSION {
        return Err(unsupported("keyframe", version));
    }
    let body = bytes.get(2..).unwrap_or_default();
    let record: KeyframeRecord = bincode::deserialize(body)?;
    Ok(record.into())
}

fn unsupported(tag: &str, version: u16) -> AnimationError {
    AnimationError::UnsupportedVersion {
        tag: tag.to_string(),
        version,
    }
}

// ---- record types ----

#[derive(Serialize, Deserialize)]
enum KeyframeRecord {
    Null,
    Scalar(f64),
    Vector(Vector3<f64>),
    Rotation(RotationKeyframe),
    Bool(bool),
    Array(Vec<f64>),
    Gesture(Gesture),
    Actor(ActorKeyframe),
}

impl From<&Keyframe> for KeyframeRecord {
    fn from(k: &Keyframe) -> Self {
        match k {
            Keyframe::Null => KeyframeRecord::Null,
            Keyframe::Scalar(v) => KeyframeRecord::Scalar(*v),
            Keyframe::Vector(v) => KeyframeRecord::Vector(*v),
            Keyframe::Rotation(r) => KeyframeRecord::Rotation(*r),
            Keyframe::Bool(b) => KeyframeRecord::Bool(*b),
            Keyframe::Array(a) => KeyframeRecord::Array(a.clone()),
            Keyframe::Gesture(g) => KeyframeRecord::Gesture(g.clone()),
            Keyframe::Actor(a) => KeyframeRecord::Actor(a.clone()),
        }
    }
}

impl From<KeyframeRecord> for Keyframe {
    fn from(r: KeyframeRecord) -> Self {
        match r {
            KeyframeRecord::Null => Keyframe::Null,
            KeyframeRecord::Scalar(v) => Keyframe::Scalar(v),
            KeyframeRecord::Vector(v) => Keyframe::Vector(v),
            KeyframeRecord::Rotation(r) => Keyframe::Rotation(r),
            KeyframeRecord::Bool(b) => Keyframe::Bool(b),
            KeyframeRecord::Array(a) => Keyframe::Array(a),
            KeyframeRecord::Gesture(g) => Keyframe::Gesture(g),
            KeyframeRecord::Actor(a) => Keyframe::Actor(a),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TimepointRecord {
    time: f64,
    value: KeyframeRecord,
    smoothness: Smoothness,
}

#[derive(Serialize, Deserialize)]
struct TimecourseRecord(Vec<TimepointRecord>);

impl From<&Timecourse> for TimecourseRecord {
    fn from(tc: &Timecourse) -> Self {
        TimecourseRecord(
            tc.points()
                .iter()
                .map(|p| TimepointRecord {
                    time: p.time,
                    value: (&p.value).into(),
                    smoothness: p.smoothness,
                })
                .collect(),
        )
    }
}

impl TimecourseRecord {
    fn restore(self) -> Result<Timecourse> {
        Timecourse::from_points(self.0.into_iter().map(|p| Timepoint {
            time: p.time,
            value: p.value.into(),
            smoothness: p.smoothness,
        }))
    }
}

#[derive(Serialize, Deserialize)]
struct WeightRecord {
    name: String,
    enabled: bool,
    tc: TimecourseRecord,
    smoothing: InterpMode,
}

impl From<&WeightTrack> for WeightRecord {
    fn from(w: &WeightTrack) -> Self {
        Self {
            name: w.name.clone(),
            enabled: w.enabled,
            tc: (&w.tc).into(),
            smoothing: w.smoothing,
        }
    }
}

impl WeightRecord {
    fn restore(self) -> Result<WeightTrack> {
        Ok(WeightTrack {
            name: self.name,
            enabled: self.enabled,
            tc: self.tc.restore()?,
            smoothing: self.smoothing,
        })
    }
}

/// Fields every keyframed track stores.
#[derive(Serialize, Deserialize)]
struct BaseRecord {
    name: String,
    enabled: bool,
    tc: TimecourseRecord,
    smoothing: InterpMode,
}

impl BaseRecord {
    fn of(name: &str, enabled: bool, tc: &Timecourse, smoothing: InterpMode) -> Self {
        Self {
            name: name.to_string(),
            enabled,
            tc: tc.into(),
            smoothing,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PositionRecordV0 {
    base: BaseRecord,
    placement: Placement,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct PositionRecord {
    base: BaseRecord,
    placement: Placement,
    joint: Option<JointId>,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct RotationRecord {
    base: BaseRecord,
    placement: Placement,
    use_quaternion: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct PoseRecordV1 {
    base: BaseRecord,
    relative: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct PoseRecord {
    base: BaseRecord,
    relative: bool,
    weight: WeightRecord,
    subtracks: Vec<TrackRecord>,
}

#[derive(Serialize, Deserialize)]
struct TextureRecord {
    base: BaseRecord,
    params: Vec<ParamId>,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct ConstraintRecord {
    name: String,
    enabled: bool,
    axes: [AxisConstraint; 3],
    pos: Vector3<f64>,
    orient_axis: OrientationAxis,
    orient_mode: OrientationMode,
    orient: Vector3<f64>,
    face_toward: Option<ObjectRef>,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct IkRecordV0 {
    name: String,
    enabled: bool,
    constraints: Vec<IkConstraint>,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct IkRecord {
    name: String,
    enabled: bool,
    constraints: Vec<IkConstraint>,
    use_gestures: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct ProceduralRecord {
    base: BaseRecord,
    /// Procedures are stored as JSON text.
    procedure: String,
    placement: Placement,
    joint: Option<JointId>,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct ScaleRecord {
    base: BaseRecord,
    world_space: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct BendRecord {
    base: BaseRecord,
    axis: Axis,
    direction: Axis,
    forward: bool,
    world_space: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct TwistRecord {
    base: BaseRecord,
    axis: Axis,
    forward: bool,
    world_space: bool,
    weight: WeightRecord,
}

#[derive(Serialize, Deserialize)]
struct SkeletonShapeRecord {
    base: BaseRecord,
    use_gestures: bool,
    weight: WeightRecord,
}

// ---- decoders ----

fn decode_position(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    let r = match version {
        0 => {
            let r: PositionRecordV0 = bincode::deserialize(bytes)?;
            PositionRecord {
                base: r.base,
                placement: r.placement,
                joint: None,
                weight: r.weight,
            }
        }
        1 => bincode::deserialize(bytes)?,
        v => return Err(unsupported(position::TAG, v)),
    };
    Ok(Track::Position(PositionTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        placement: r.placement,
        joint: r.joint,
        weight: r.weight.restore()?,
    }))
}

fn decode_rotation(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != ROTATION_VERSION {
        return Err(unsupported(rotation::TAG, version));
    }
    let r: RotationRecord = bincode::deserialize(bytes)?;
    Ok(Track::Rotation(RotationTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        placement: r.placement,
        use_quaternion: r.use_quaternion,
        weight: r.weight.restore()?,
    }))
}

fn decode_pose(ctx: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    let r = match version {
        1 => {
            let r: PoseRecordV1 = bincode::deserialize(bytes)?;
            PoseRecord {
                base: r.base,
                relative: r.relative,
                weight: r.weight,
                subtracks: Vec::new(),
            }
        }
        2 => bincode::deserialize(bytes)?,
        v => return Err(unsupported(pose::TAG, v)),
    };
    let subtracks = ctx.read_tracks(&r.subtracks)?;
    Ok(Track::Pose(PoseTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        relative: r.relative,
        weight: r.weight.restore()?,
        subtracks,
    }))
}

fn decode_texture(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != TEXTURE_VERSION {
        return Err(unsupported(texture::TAG, version));
    }
    let r: TextureRecord = bincode::deserialize(bytes)?;
    Ok(Track::Texture(TextureTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        params: r.params,
        weight: r.weight.restore()?,
    }))
}

fn decode_visibility(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != VISIBILITY_VERSION {
        return Err(unsupported(visibility::TAG, version));
    }
    let r: BaseRecord = bincode::deserialize(bytes)?;
    Ok(Track::Visibility(VisibilityTrack {
        name: r.name,
        enabled: r.enabled,
        tc: r.tc.restore()?,
    }))
}

fn decode_constraint(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != CONSTRAINT_VERSION {
        return Err(unsupported(constraint::TAG, version));
    }
    let r: ConstraintRecord = bincode::deserialize(bytes)?;
    Ok(Track::Constraint(ConstraintTrack {
        name: r.name,
        enabled: r.enabled,
        axes: r.axes,
        pos: r.pos,
        orient_axis: r.orient_axis,
        orient_mode: r.orient_mode,
        orient: r.orient,
        face_toward: r.face_toward,
        weight: r.weight.restore()?,
    }))
}

fn decode_ik(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    let r = match version {
        0 => {
            let r: IkRecordV0 = bincode::deserialize(bytes)?;
            IkRecord {
                name: r.name,
                enabled: r.enabled,
                constraints: r.constraints,
                use_gestures: true,
                weight: r.weight,
            }
        }
        1 => bincode::deserialize(bytes)?,
        v => return Err(unsupported(ik::TAG, v)),
    };
    Ok(Track::Ik(IkTrack {
        name: r.name,
        enabled: r.enabled,
        constraints: r.constraints,
        use_gestures: r.use_gestures,
        weight: r.weight.restore()?,
    }))
}

fn decode_procedural(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != PROCEDURAL_VERSION {
        return Err(unsupported(procedural::TAG, version));
    }
    let r: ProceduralRecord = bincode::deserialize(bytes)?;
    Ok(Track::ProceduralPosition(ProceduralPositionTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        procedure: serde_json::from_str(&r.procedure)?,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        placement: r.placement,
        joint: r.joint,
        weight: r.weight.restore()?,
    }))
}

fn decode_scale(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != SCALE_VERSION {
        return Err(unsupported(scale::TAG, version));
    }
    let r: ScaleRecord = bincode::deserialize(bytes)?;
    Ok(Track::Scale(ScaleTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        world_space: r.world_space,
        weight: r.weight.restore()?,
    }))
}

fn decode_bend(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != BEND_VERSION {
        return Err(unsupported(bend::TAG, version));
    }
    let r: BendRecord = bincode::deserialize(bytes)?;
    Ok(Track::Bend(BendTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        axis: r.axis,
        direction: r.direction,
        forward: r.forward,
        world_space: r.world_space,
        weight: r.weight.restore()?,
    }))
}

fn decode_twist(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != TWIST_VERSION {
        return Err(unsupported(twist::TAG, version));
    }
    let r: TwistRecord = bincode::deserialize(bytes)?;
    Ok(Track::Twist(TwistTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        axis: r.axis,
        forward: r.forward,
        world_space: r.world_space,
        weight: r.weight.restore()?,
    }))
}

fn decode_skeleton_shape(_: &mut DecodeContext<'_>, version: u16, bytes: &[u8]) -> Result<Track> {
    if version != SKELETON_SHAPE_VERSION {
        return Err(unsupported(skeleton_shape::TAG, version));
    }
    let r: SkeletonShapeRecord = bincode::deserialize(bytes)?;
    Ok(Track::SkeletonShape(SkeletonShapeTrack {
        name: r.base.name,
        enabled: r.base.enabled,
        tc: r.base.tc.restore()?,
        smoothing: r.base.smoothing,
        use_gestures: r.use_gestures,
        weight: r.weight.restore()?,
    }))
}
