//! Gesture data
//!
//! Types shared by every producer and consumer of gesture motion:
//! - the command / command-group / gesture / queue model
//! - the stored tuple format and declarative scripts
//! - the built-in library (words, fingerspelling alphabet, default pose)

pub mod alphabet;
pub mod library;
pub mod script;
pub mod types;
pub mod wire;
mod words;

pub use library::{neutral_angle, placeholder_gesture, GestureLibrary, DEFAULT_POSE_NAME};
pub use types::{
    Axis, Command, CommandGroup, Direction, GestureDefinition, GestureError, GestureQueue,
    GestureResult, JointRef, Property, QueueEntry,
};
