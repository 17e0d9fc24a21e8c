//! Core types for the playback engine

use std::time::Duration;

/// Per-tick angular step in radians
pub const DEFAULT_ANGULAR_SPEED: f32 = 0.1;
/// Pause between command-groups
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(800);
/// Frame rate the per-tick step was tuned at
pub const DEFAULT_REFERENCE_FPS: f32 = 60.0;

/// Error type for skeleton access and avatar loading
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkeletonError {
    #[error("Joint not found: {0}")]
    MissingJoint(String),
    #[error("Joint {joint} has no {axis} rotation")]
    MissingAxis { joint: String, axis: String },
    #[error("Angle for {0} is not finite")]
    NonFinite(String),
    #[error("Rig lists joint {0} more than once")]
    DuplicateJoint(String),
    #[error("Unknown avatar: {0}")]
    UnknownAvatar(String),
    #[error("Failed to load avatar {name}: {reason}")]
    LoadFailed { name: String, reason: String },
}

/// Result type for skeleton operations
pub type SkeletonResult<T> = Result<T, SkeletonError>;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// No skeleton is attached
    #[error("No avatar loaded")]
    NoAvatar,
    #[error("Invalid angular speed: {0}")]
    InvalidSpeed(f32),
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// How far a joint moves per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StepMode {
    /// Fixed `angular_speed` every tick, regardless of frame time
    #[default]
    PerTick,
    /// `angular_speed * delta_seconds * reference_fps`
    TimeScaled { reference_fps: f32 },
}

impl StepMode {
    /// Step size for one tick of length `delta`
    pub fn step(self, angular_speed: f32, delta: Duration) -> f32 {
        match self {
            StepMode::PerTick => angular_speed,
            StepMode::TimeScaled { reference_fps } => {
                angular_speed * delta.as_secs_f32() * reference_fps
            }
        }
    }
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub angular_speed: f32,
    pub pause: Duration,
    pub step_mode: StepMode,
    /// Whether caption markers reach the caption sink
    pub captions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            angular_speed: DEFAULT_ANGULAR_SPEED,
            pause: DEFAULT_PAUSE,
            step_mode: StepMode::PerTick,
            captions: true,
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing queued
    Idle,
    /// A caption marker was applied
    Caption(String),
    /// Joints moved; `remaining` commands are still active
    Advanced { moved: usize, remaining: usize },
    /// Waiting out the pause after a finished group
    Paused,
    /// The pause ended and the finished group left the queue
    GroupRetired,
    /// The queue ran empty and the engine went idle
    Drained,
    /// The tick failed and the queue was discarded
    Recovered,
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub captions: u64,
    pub commands_retired: u64,
    /// Commands retired because their joint or axis was absent
    pub commands_skipped: u64,
    pub groups_retired: u64,
    pub recoveries: u64,
}
