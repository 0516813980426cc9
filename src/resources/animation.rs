//! Keyframe animation: tracks, clips and a mixer that drives one node.
//!
//! Sampling is a pure function of the time passed in, so clips can be
//! evaluated with synthetic deltas without any real-time clock.

use std::rc::Rc;

use anyhow::{bail, Result};
use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::{
    instance::Instance,
    scene_graph::{NodeId, Scene},
};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
}

impl Keyframes {
    fn len(&self) -> usize {
        match self {
            Keyframes::Translation(values) | Keyframes::Scale(values) => values.len(),
            Keyframes::Rotation(values) => values.len(),
        }
    }
}

/// One interpolated value of a track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackValue {
    Translation(cgmath::Vector3<f32>),
    Rotation(cgmath::Quaternion<f32>),
    Scale(cgmath::Vector3<f32>),
}

impl TrackValue {
    pub fn apply(self, transform: &mut Instance) {
        match self {
            TrackValue::Translation(position) => transform.position = position,
            TrackValue::Rotation(rotation) => transform.rotation = rotation,
            TrackValue::Scale(scale) => transform.scale = scale,
        }
    }
}

/// A sorted sequence of timestamps with one value per timestamp.
#[derive(Clone, Debug)]
pub struct KeyframeTrack {
    times: Vec<f32>,
    values: Keyframes,
}

impl KeyframeTrack {
    pub fn new(times: Vec<f32>, values: Keyframes) -> Result<Self> {
        if times.is_empty() {
            bail!("A keyframe track needs at least one keyframe");
        }
        if times.len() != values.len() {
            bail!(
                "Keyframe track has {} timestamps but {} values",
                times.len(),
                values.len()
            );
        }
        if times.windows(2).any(|pair| pair[0] > pair[1]) {
            bail!("Keyframe timestamps must be sorted: {:?}", times);
        }
        let values = match values {
            Keyframes::Rotation(rotations) => {
                Keyframes::Rotation(rotations.into_iter().map(|q| q.normalize()).collect())
            }
            other => other,
        };
        Ok(Self { times, values })
    }

    /// Quaternion track from `[x, y, z, w]` tuples.
    pub fn quaternion(times: Vec<f32>, xyzw: &[[f32; 4]]) -> Result<Self> {
        let rotations = xyzw
            .iter()
            .map(|[x, y, z, w]| cgmath::Quaternion::new(*w, *x, *y, *z))
            .collect();
        Self::new(times, Keyframes::Rotation(rotations))
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Interpolated value at `time`, clamped to the first and last keyframe.
    pub fn sample(&self, time: f32) -> TrackValue {
        let next = self.times.partition_point(|&t| t <= time);
        let (from, to, alpha) = if next == 0 {
            (0, 0, 0.0)
        } else if next == self.times.len() {
            let last = self.times.len() - 1;
            (last, last, 0.0)
        } else {
            let from = next - 1;
            let span = self.times[next] - self.times[from];
            let alpha = if span > 0.0 {
                (time - self.times[from]) / span
            } else {
                0.0
            };
            (from, next, alpha)
        };

        match &self.values {
            Keyframes::Translation(values) => {
                TrackValue::Translation(values[from].lerp(values[to], alpha))
            }
            Keyframes::Scale(values) => TrackValue::Scale(values[from].lerp(values[to], alpha)),
            Keyframes::Rotation(values) => {
                let rotation = if from == to {
                    values[from]
                } else {
                    values[from].slerp(values[to], alpha)
                };
                TrackValue::Rotation(rotation.normalize())
            }
        }
    }
}

/// A named, immutable set of tracks sharing one timeline.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// A negative `duration` is replaced by the end of the longest track.
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = if duration < 0.0 {
            tracks
                .iter()
                .map(KeyframeTrack::end_time)
                .fold(0.0, f32::max)
        } else {
            duration
        };
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop on the last frame once the clip is over.
    Once,
    #[default]
    Repeat,
}

/// Playback state of one clip on a mixer.
#[derive(Clone, Debug)]
pub struct AnimationAction {
    clip: Rc<AnimationClip>,
    time: f32,
    playing: bool,
    pub loop_mode: LoopMode,
    pub time_scale: f32,
}

impl AnimationAction {
    fn new(clip: Rc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            playing: false,
            loop_mode: LoopMode::default(),
            time_scale: 1.0,
        }
    }

    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self.time = 0.0;
        self
    }

    pub fn set_loop(&mut self, loop_mode: LoopMode) -> &mut Self {
        self.loop_mode = loop_mode;
        self
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    fn advance(&mut self, dt: f32) {
        let duration = self.clip.duration;
        self.time += dt * self.time_scale;
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        match self.loop_mode {
            LoopMode::Repeat => self.time = self.time.rem_euclid(duration),
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.playing = false;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.playing = false;
                }
            }
        }
    }

    fn apply(&self, transform: &mut Instance) {
        for track in &self.clip.tracks {
            track.sample(self.time).apply(transform);
        }
    }
}

/// Advances the actions bound to one target node.
#[derive(Debug)]
pub struct AnimationMixer {
    target: NodeId,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            actions: Vec::new(),
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The action for `clip`, created on first request. Clips are matched by name.
    pub fn clip_action(&mut self, clip: AnimationClip) -> &mut AnimationAction {
        let idx = match self
            .actions
            .iter()
            .position(|action| action.clip.name == clip.name)
        {
            Some(idx) => idx,
            None => {
                self.actions.push(AnimationAction::new(Rc::new(clip)));
                self.actions.len() - 1
            }
        };
        &mut self.actions[idx]
    }

    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|action| action.clip.name == name)
    }

    pub fn is_active(&self) -> bool {
        self.actions.iter().any(AnimationAction::is_playing)
    }

    /// Advance every playing action by `dt` seconds and write the result to
    /// the target's local transform. A zero delta changes nothing.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        if dt == 0.0 || !self.is_active() {
            return;
        }
        let node = match scene.node_mut(self.target) {
            Some(node) => node,
            None => {
                log::warn!("Animation target {:?} is not part of the scene", self.target);
                return;
            }
        };
        for action in self.actions.iter_mut().filter(|action| action.playing) {
            action.advance(dt);
            action.apply(&mut node.local);
        }
    }
}
