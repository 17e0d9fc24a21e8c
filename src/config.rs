use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::engine::{AvatarSpec, EngineConfig, StepMode, DEFAULT_REFERENCE_FPS};
use crate::logging::LogLevel;
use crate::propfile::{PropertyError, PropertyFile};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "signbridge.cfg";
pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const MAX_FRAME_RATE: u32 = 240;

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline-only options
    pub config_file: Option<PathBuf>,

    // Commandline and config file options
    pub log_level: Option<LogLevel>,
    pub angular_speed: Option<f32>,
    pub pause: Option<Duration>,
    pub frame_rate: Option<u32>,
    pub step_mode: Option<StepMode>,
    pub signs_file: Option<PathBuf>,
    pub avatar: Option<AvatarSpec>,
    pub captions: Option<bool>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            angular_speed: None,
            pause: None,
            frame_rate: Some(DEFAULT_FRAME_RATE),
            step_mode: None,
            signs_file: None,
            avatar: None,
            captions: None,
        }
    }
}

impl Options {
    /// Overlay the keys found in a parsed config file
    pub fn apply_properties(mut self, props: &PropertyFile) -> Result<Self> {
        for (key, value) in props.iter() {
            match key {
                "angular_speed" => self.angular_speed = Some(parse_speed(value)?),
                "pause_ms" => self.pause = Some(parse_pause(value)?),
                "frame_rate" => self.frame_rate = Some(parse_frame_rate(value)?),
                "step_mode" => self.step_mode = Some(parse_step_mode(value)?),
                "signs_file" if !value.is_empty() => self.signs_file = Some(PathBuf::from(value)),
                "signs_file" => self.signs_file = None,
                "avatar" => self.avatar = Some(AvatarSpec::parse(value)),
                "captions" => self.captions = Some(parse_bool(value).context("Invalid captions value")?),
                "log_level" => self.log_level = Some(parse_log_level(value)?),
                other => log::warn!("Ignoring unknown config key: {}", other),
            }
        }
        Ok(self)
    }

    /// Engine tunables with defaults filled in
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            angular_speed: self.angular_speed.unwrap_or(defaults.angular_speed),
            pause: self.pause.unwrap_or(defaults.pause),
            step_mode: self.step_mode.unwrap_or(defaults.step_mode),
            captions: self.captions.unwrap_or(defaults.captions),
        }
    }

    /// Simulated frame length for headless playback
    pub fn frame_duration(&self) -> Duration {
        let fps = self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE).max(1);
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }

    pub fn avatar(&self) -> AvatarSpec {
        self.avatar.clone().unwrap_or_default()
    }
}

/// Load configuration from a signbridge.cfg file
///
/// With no explicit path, a missing `signbridge.cfg` in the working
/// directory just means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Options> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let props = match PropertyFile::load(&path) {
        Ok(props) => props,
        Err(PropertyError::FileNotFound) if !explicit => return Ok(Options::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
        }
    };
    log::info!("Loaded {} settings from {}", props.len(), path.display());

    let mut opts = Options::default().apply_properties(&props)?;
    opts.config_file = Some(path);
    Ok(opts)
}

/// Parse an angular speed in radians per tick
pub fn parse_speed(s: &str) -> Result<f32> {
    let speed: f32 = s.trim().parse().context("Invalid angular speed value")?;
    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("Angular speed must be a positive number");
    }
    Ok(speed)
}

/// Parse a pause length in milliseconds
pub fn parse_pause(s: &str) -> Result<Duration> {
    let ms: u64 = s.trim().parse().context("Invalid pause value")?;
    Ok(Duration::from_millis(ms))
}

/// Parse a frame rate (1-240)
pub fn parse_frame_rate(s: &str) -> Result<u32> {
    let fps: u32 = s.trim().parse().context("Invalid frame rate value")?;
    if fps == 0 || fps > MAX_FRAME_RATE {
        anyhow::bail!("Frame rate out of range (1 to {})", MAX_FRAME_RATE);
    }
    Ok(fps)
}

pub fn parse_step_mode(s: &str) -> Result<StepMode> {
    match s.trim().to_lowercase().as_str() {
        "per_tick" | "pertick" | "tick" => Ok(StepMode::PerTick),
        "time_scaled" | "timescaled" | "time" => Ok(StepMode::TimeScaled {
            reference_fps: DEFAULT_REFERENCE_FPS,
        }),
        _ => anyhow::bail!("Invalid step mode: {}. Valid options: per_tick, time_scaled", s),
    }
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Invalid boolean: {}", s),
    }
}

pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    s.parse::<LogLevel>().map_err(anyhow::Error::msg)
}
