// signbridge library
// Text to sign-language gesture compilation and avatar playback

pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod gesture;
pub mod logging;
pub mod propfile;
pub mod signs;
pub mod synth;

pub use cli::Cli;
pub use compiler::UtteranceCompiler;
pub use config::Options;
pub use engine::{PlaybackEngine, TickOutcome};
pub use gesture::{GestureDefinition, GestureLibrary, GestureQueue};
pub use logging::LogLevel;
