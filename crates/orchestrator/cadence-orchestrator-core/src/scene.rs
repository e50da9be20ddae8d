//! The scene: an ordered object table, the tracks attached to each object, and the
//! per-frame evaluation loop.

use anyhow::{anyhow, Context, Result};
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cadence_animation_core::io::{write_tracks, TrackRecord, TrackRegistry};
use cadence_animation_core::{
    AnimationTrack, FitResult, IdAllocator, IkSolver, ObjectId, ObjectState, SceneView, Track,
};
use nalgebra::{UnitQuaternion, Vector3};

use crate::diagnostics::{DiagnosticsCfg, FrameDiagnostics};
use crate::scheduler::{evaluation_order, ScheduleOrder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsCfg,
    /// Reset animated state before tracks run each frame, so absolute tracks start from a
    /// clean origin, orientation and pose.
    pub reset_per_frame: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            diagnostics: DiagnosticsCfg::default(),
            reset_per_frame: true,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid scene config")
    }
}

/// One object with its tracks. Tracks are listed in priority order and applied last to
/// first, so the first track has the final word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub state: ObjectState,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: IndexMap<ObjectId, SceneObject>,
    ids: IdAllocator,
    time: f64,
    pub config: SceneConfig,
}

impl SceneView for Scene {
    fn object(&self, id: ObjectId) -> Option<&ObjectState> {
        self.objects.get(&id).map(|o| &o.state)
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Time of the last evaluated frame.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn add_object(&mut self, state: ObjectState) -> Result<ObjectId> {
        let id = self
            .ids
            .alloc_object()
            .with_context(|| format!("cannot add object {:?}", state.name))?;
        self.objects.insert(
            id,
            SceneObject {
                state,
                tracks: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn state(&self, id: ObjectId) -> Option<&ObjectState> {
        self.object(id)
    }

    pub fn state_mut(&mut self, id: ObjectId) -> Option<&mut ObjectState> {
        self.objects.get_mut(&id).map(|o| &mut o.state)
    }

    /// Append a track to `id`. Returns the track's index.
    pub fn add_track(&mut self, id: ObjectId, track: impl Into<Track>) -> Result<usize> {
        let obj = self
            .objects
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no object {:?} in scene", id))?;
        obj.tracks.push(track.into());
        Ok(obj.tracks.len() - 1)
    }

    /// Remove an object and every reference other tracks hold to it.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.objects.shift_remove(&id)?;
        for obj in self.objects.values_mut() {
            if obj.state.parent == Some(id) {
                obj.state.parent = None;
            }
            for track in &mut obj.tracks {
                track.delete_dependencies(id);
            }
        }
        Some(removed)
    }

    /// Copy `ids` with their tracks. References between copied objects are re-pointed at
    /// the copies; references to anything else are kept. Returns the new ids in order.
    pub fn duplicate_objects(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let mut map: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut copies = Vec::new();
        for &id in ids {
            let Some(obj) = self.objects.get(&id) else {
                log::warn!("cannot duplicate missing object {:?}", id);
                continue;
            };
            let copy = SceneObject {
                state: obj.state.clone(),
                tracks: obj.tracks.iter().map(Track::duplicate).collect(),
            };
            let new_id = match self.ids.alloc_object() {
                Ok(new_id) => new_id,
                Err(err) => {
                    log::warn!("stopping duplication at {:?}: {}", id, err);
                    break;
                }
            };
            map.insert(id, new_id);
            copies.push((new_id, copy));
        }
        let mut out = Vec::with_capacity(copies.len());
        for (new_id, mut copy) in copies {
            if let Some(p) = copy.state.parent.and_then(|p| map.get(&p)) {
                copy.state.parent = Some(*p);
            }
            for track in &mut copy.tracks {
                track.update_object_references(&map);
            }
            self.objects.insert(new_id, copy);
            out.push(new_id);
        }
        out
    }

    /// Objects that `id` reads through its enabled, non-null tracks.
    pub fn dependencies_of(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(obj) = self.objects.get(&id) else {
            return Vec::new();
        };
        obj.tracks
            .iter()
            .filter(|t| t.is_enabled() && !t.is_null())
            .flat_map(|t| t.dependencies(&obj.state))
            .collect()
    }

    pub fn schedule(&self) -> ScheduleOrder {
        let nodes = self.object_ids();
        evaluation_order(&nodes, |id| self.dependencies_of(id))
    }

    /// Evaluate every object at `time` in dependency order.
    pub fn set_time(&mut self, time: f64) -> FrameDiagnostics {
        self.time = time;
        let schedule = self.schedule();
        let mut diag = FrameDiagnostics::new(time);
        for &id in &schedule.order {
            self.evaluate_object(id, time, &mut diag);
        }
        diag.order = schedule.order;
        diag.cycles = schedule.cycles;
        diag.report(&self.config.diagnostics);
        diag
    }

    /// Bring the scene up to date after `changed` objects were edited by hand.
    ///
    /// The changed objects only re-run their leading settling tracks (constraints and IK,
    /// skipping null tracks) so the edit itself survives. Every object that reads a changed
    /// object, directly or transitively, is then fully re-evaluated.
    pub fn apply_tracks_after_modification(&mut self, changed: &[ObjectId]) -> FrameDiagnostics {
        let time = self.time;
        let mut diag = FrameDiagnostics::new(time);
        for &id in changed {
            self.settle_object(id, time, &mut diag);
        }

        let schedule = self.schedule();
        let mut dirty: HashSet<ObjectId> = changed.iter().copied().collect();
        for &id in &schedule.order {
            if dirty.contains(&id) {
                continue;
            }
            if self.dependencies_of(id).iter().any(|d| dirty.contains(d)) {
                dirty.insert(id);
                self.evaluate_object(id, time, &mut diag);
                diag.order.push(id);
            }
        }
        diag.cycles = schedule.cycles;
        diag.report(&self.config.diagnostics);
        diag
    }

    /// Resolve the distortions queued during the last frame. Returns the gesture fits that
    /// ran, per object.
    pub fn resolve_distortions(&mut self, solver: &dyn IkSolver) -> Vec<(ObjectId, Vec<FitResult>)> {
        let mut out = Vec::new();
        for (id, obj) in self.objects.iter_mut() {
            if !obj.state.is_distorted() {
                continue;
            }
            let fits = obj.state.apply_distortions(solver);
            if !fits.is_empty() {
                out.push((*id, fits));
            }
        }
        out
    }

    /// Persist the tracks of one object.
    pub fn save_tracks(&self, id: ObjectId) -> Result<Vec<TrackRecord>> {
        let obj = self
            .objects
            .get(&id)
            .ok_or_else(|| anyhow!("no object {:?} in scene", id))?;
        write_tracks(&obj.tracks).with_context(|| format!("failed to encode tracks of {:?}", id))
    }

    /// Append persisted tracks to an object. Returns the tags that had no decoder.
    pub fn load_tracks(
        &mut self,
        id: ObjectId,
        records: &[TrackRecord],
        registry: &TrackRegistry,
    ) -> Result<Vec<String>> {
        let loaded = registry
            .read_tracks(records)
            .with_context(|| format!("failed to decode tracks for {:?}", id))?;
        let obj = self
            .objects
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no object {:?} in scene", id))?;
        obj.tracks.extend(loaded.tracks);
        Ok(loaded.skipped)
    }

    fn evaluate_object(&mut self, id: ObjectId, time: f64, diag: &mut FrameDiagnostics) {
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        let mut state = obj.state.clone();
        if self.config.reset_per_frame {
            reset_animated_state(&mut state, &obj.tracks);
        }
        for track in obj.tracks.iter().rev() {
            count(track, diag);
            track.apply(time, &mut state, self);
        }
        state.commit_pose();
        self.store_state(id, state);
    }

    fn settle_object(&mut self, id: ObjectId, time: f64, diag: &mut FrameDiagnostics) {
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        let leading = obj
            .tracks
            .iter()
            .take_while(|t| t.is_settling() || t.is_null())
            .count();
        let mut state = obj.state.clone();
        state.clear_distortions();
        for track in obj.tracks[..leading].iter().rev() {
            count(track, diag);
            track.apply(time, &mut state, self);
        }
        self.store_state(id, state);
        diag.order.push(id);
    }

    fn store_state(&mut self, id: ObjectId, state: ObjectState) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.state = state;
        }
    }
}

fn count(track: &Track, diag: &mut FrameDiagnostics) {
    if track.is_enabled() && !track.is_null() {
        diag.tracks_applied += 1;
    } else {
        diag.tracks_skipped += 1;
    }
}

fn reset_animated_state(state: &mut ObjectState, tracks: &[Track]) {
    let active = || tracks.iter().filter(|t| t.is_enabled() && !t.is_null());
    if active().any(Track::writes_origin) {
        state.coords.origin = Vector3::zeros();
    }
    if active().any(Track::writes_orientation) {
        state.coords.orientation = UnitQuaternion::identity();
    }
    state.pose = None;
    state.clear_distortions();
}
