//! Playback Engine
//!
//! Consumes gesture queues and drives an avatar skeleton frame by frame.
//!
//! # Architecture
//!
//! The engine consists of:
//! - Skeleton access and avatar loading
//! - The tick state machine over the gesture queue
//! - Caption display
//! - The inter-group pause window
//!
//! # Thread Safety
//!
//! The engine is single-threaded and owned by whoever drives the frame
//! clock. Ticks are never re-entrant; failures inside a tick are caught
//! and the queue is discarded.

pub mod caption;
pub mod pause;
pub mod skeleton;
pub mod state;
pub mod types;

pub use caption::{CaptionChunk, CaptionSink, CaptionTracker, MAX_CAPTION_CHUNKS};
pub use pause::PauseWindow;
pub use skeleton::{
    AvatarLoader, AvatarSpec, JointState, RigDescription, RigJoint, RigLoader, Skeleton, SkeletonPose,
};
pub use state::{EngineState, PlaybackEngine};
pub use types::{
    EngineConfig, EngineError, EngineResult, EngineStats, SkeletonError, SkeletonResult, StepMode,
    TickOutcome, DEFAULT_ANGULAR_SPEED, DEFAULT_PAUSE, DEFAULT_REFERENCE_FPS,
};
