//! Gesture library
//!
//! Static mapping from upper-cased gesture names to definitions, plus the
//! fingerspelling alphabet, the default pose and neutral joint angles.

use std::collections::BTreeMap;

use super::alphabet;
use super::types::{Axis, GestureDefinition};
use super::words::{self, DEFAULT_POSE, PLACEHOLDER, WORDS};

/// Name of the built-in rest gesture
pub const DEFAULT_POSE_NAME: &str = "DEFAULT";

/// Rest angle of a joint axis
///
/// This is the value the default pose drives the joint to; every other
/// joint axis rests at zero.
pub fn neutral_angle(joint: &str, axis: Axis) -> f32 {
    DEFAULT_POSE
        .iter()
        .flat_map(|group| group.iter())
        .find(|(j, a, _, _)| *j == joint && *a == axis)
        .map(|(_, _, target, _)| *target)
        .unwrap_or(0.0)
}

/// Built-in fallback gesture for signs without usable motion
pub fn placeholder_gesture(name: &str) -> GestureDefinition {
    words::build(name, PLACEHOLDER)
}

/// Name-to-gesture lookup table
#[derive(Debug, Clone)]
pub struct GestureLibrary {
    words: BTreeMap<String, GestureDefinition>,
    letters: BTreeMap<char, GestureDefinition>,
    default_pose: GestureDefinition,
}

impl Default for GestureLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GestureLibrary {
    /// Library with only the default pose
    pub fn empty() -> Self {
        Self {
            words: BTreeMap::new(),
            letters: BTreeMap::new(),
            default_pose: words::build(DEFAULT_POSE_NAME, DEFAULT_POSE),
        }
    }

    /// Library with every built-in word and letter
    pub fn builtin() -> Self {
        let mut lib = Self::empty();
        for (name, groups) in WORDS {
            lib.insert(words::build(name, groups));
        }
        for letter in alphabet::letters() {
            if let Some(shape) = alphabet::hand_shape(letter) {
                lib.insert_letter(letter, alphabet::letter_gesture(letter, &shape));
            }
        }
        lib
    }

    /// Look up a word gesture by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Option<&GestureDefinition> {
        self.words.get(&name.trim().to_uppercase())
    }

    /// Look up a fingerspelling letter (case-insensitive)
    pub fn letter(&self, letter: char) -> Option<&GestureDefinition> {
        self.letters.get(&letter.to_ascii_uppercase())
    }

    /// Gesture applied when a skeleton is first attached
    pub fn default_pose(&self) -> &GestureDefinition {
        &self.default_pose
    }

    /// Add or replace a word gesture, keyed by its upper-cased name
    pub fn insert(&mut self, gesture: GestureDefinition) -> Option<GestureDefinition> {
        let key = gesture.name.to_uppercase();
        self.words.insert(key, gesture)
    }

    pub fn insert_letter(&mut self, letter: char, gesture: GestureDefinition) {
        self.letters.insert(letter.to_ascii_uppercase(), gesture);
    }

    pub fn remove_letter(&mut self, letter: char) -> Option<GestureDefinition> {
        self.letters.remove(&letter.to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Sorted word names
    pub fn names(&self) -> Vec<&str> {
        self.words.keys().map(String::as_str).collect()
    }

    /// Letters with a gesture, in order
    pub fn letters(&self) -> Vec<char> {
        self.letters.keys().copied().collect()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}
