//! Shared types for gesture synthesis

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::gesture::{wire, CommandGroup};

/// Error type for hand-pose sources
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    /// The pose source could not produce observations
    #[error("Hand pose source failed: {0}")]
    Source(String),
}

/// Result type for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;

/// Synthesized motion with the metadata stored alongside a sign
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionData {
    /// Command-groups, stored as lists of command tuples
    #[serde(with = "animations_format", default)]
    pub animations: Vec<CommandGroup>,
    #[serde(default)]
    pub frame_count: usize,
    /// Seconds of source recording
    #[serde(default)]
    pub duration: f32,
}

impl MotionData {
    pub fn new(animations: Vec<CommandGroup>) -> Self {
        let frame_count = animations.len();
        Self {
            animations,
            frame_count,
            duration: 0.0,
        }
    }

    /// Whether any usable command-group is present
    pub fn is_usable(&self) -> bool {
        self.animations.iter().any(|g| !g.is_empty())
    }
}

/// Lenient tuple encoding: malformed commands and groups are dropped on read
mod animations_format {
    use super::*;

    pub fn serialize<S: Serializer>(groups: &[CommandGroup], s: S) -> Result<S::Ok, S::Error> {
        wire::encode_groups(groups).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<CommandGroup>, D::Error> {
        let values = Vec::<Value>::deserialize(d)?;
        Ok(wire::decode_groups(&values))
    }
}
