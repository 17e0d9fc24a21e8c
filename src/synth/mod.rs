//! Gesture synthesis
//!
//! Builds gesture definitions when no canned one exists:
//! - procedural gestures seeded from the sign name
//! - gestures analyzed from tracked hand landmarks

pub mod landmarks;
pub mod procedural;
pub mod types;

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::gesture::{neutral_angle, Axis, Command, CommandGroup, Direction, GestureDefinition, JointRef};

pub use landmarks::{
    analyze, from_frames, placeholder_motion, sample_times, HandObservation, HandPoseSource,
    Handedness, Landmark, LandmarkFrame, LandmarkRecording,
};
pub use types::{MotionData, SynthError, SynthResult};

/// Procedural gestures kept in the cache
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Group that drives every joint axis touched by `groups` to its rest angle
///
/// Joints appear in first-touched order; each direction points from the
/// last target the joint was given toward its rest angle.
pub fn neutral_return(groups: &[CommandGroup]) -> CommandGroup {
    let mut order: Vec<(JointRef, Axis)> = Vec::new();
    let mut last: HashMap<(JointRef, Axis), f32> = HashMap::new();
    for cmd in groups.iter().flat_map(CommandGroup::iter) {
        let key = (cmd.joint.clone(), cmd.axis);
        if last.insert(key.clone(), cmd.target).is_none() {
            order.push(key);
        }
    }

    order
        .into_iter()
        .map(|key| {
            let rest = neutral_angle(key.0.as_str(), key.1);
            let from = last.get(&key).copied().unwrap_or(rest);
            Command::rotate(key.0.as_str(), key.1, rest, Direction::toward(from, rest))
        })
        .collect()
}

/// Synthesizer facade with a cache of procedural gestures
pub struct GestureSynthesizer {
    cache: LruCache<String, GestureDefinition>,
}

impl Default for GestureSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSynthesizer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Procedural gesture for `name`, cached by upper-cased name
    pub fn procedural(&mut self, name: &str) -> GestureDefinition {
        let key = name.to_uppercase();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let gesture = procedural::generate(&key);
        self.cache.put(key, gesture.clone());
        gesture
    }

    /// Analyze a hand-pose recording into a gesture named `name`
    pub fn from_landmarks(&mut self, name: &str, source: &mut dyn HandPoseSource) -> (GestureDefinition, MotionData) {
        let motion = analyze(source);
        let gesture = GestureDefinition::new(name, motion.animations.clone());
        (gesture, motion)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
