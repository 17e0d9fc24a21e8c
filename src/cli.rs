use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{parse_frame_rate, parse_log_level, parse_pause, parse_speed, parse_step_mode};
use crate::config::Options;
use crate::engine::AvatarSpec;

/// Sign-language avatar playback, headless
#[derive(Parser, Debug, Default)]
#[command(name = "signbridge")]
#[command(version)]
#[command(about = "Compile text to sign-language gestures and play them on an avatar skeleton", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./signbridge.cfg if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Angular speed in radians per tick
    #[arg(short, long, value_name = "RADIANS", global = true)]
    pub speed: Option<String>,

    /// Pause between command-groups in milliseconds
    #[arg(short, long, value_name = "MS", global = true)]
    pub pause: Option<String>,

    /// Simulated frame rate (1-240)
    #[arg(short, long, value_name = "FPS", global = true)]
    pub fps: Option<String>,

    /// Joint step mode (per_tick, time_scaled)
    #[arg(long = "step-mode", value_name = "MODE", global = true)]
    pub step_mode: Option<String>,

    /// JSON sign store
    #[arg(long, value_name = "FILE", global = true)]
    pub signs: Option<PathBuf>,

    /// Avatar (xbot, ybot or a rig JSON file)
    #[arg(short, long, value_name = "AVATAR", global = true)]
    pub avatar: Option<String>,

    /// Disable captions
    #[arg(long, global = true)]
    pub nocaptions: bool,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Compile text and play it until the avatar is idle
    Play {
        /// Text to sign
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Stop after this many frames
        #[arg(long, value_name = "N", default_value_t = 100_000)]
        max_frames: usize,

        /// Print every joint that left its rest pose
        #[arg(long)]
        pose: bool,
    },

    /// Play one sign or fingerspelled letter
    Learn {
        name: String,
    },

    /// Print the procedural gesture for a sign as a script
    Synth {
        name: String,
    },

    /// Build a sign from a JSON file of hand landmark frames
    Analyze {
        /// Landmark recording
        landmarks: PathBuf,

        /// Name of the resulting sign
        #[arg(long)]
        name: String,

        /// Save the sign into the sign store
        #[arg(long)]
        save: bool,
    },

    /// Manage the sign store
    Signs {
        #[command(subcommand)]
        action: SignsCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SignsCommand {
    /// List stored signs
    List,
    /// Print one stored sign as JSON
    Show { name: String },
    /// Store a sign from a gesture script
    Add {
        name: String,
        /// Gesture script file
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a stored sign by id
    Delete { id: String },
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref config) = self.config {
            opts.config_file = Some(config.clone());
        }

        if let Some(ref speed) = self.speed {
            opts.angular_speed = Some(parse_speed(speed).context("Invalid --speed")?);
        }

        if let Some(ref pause) = self.pause {
            opts.pause = Some(parse_pause(pause).context("Invalid --pause")?);
        }

        if let Some(ref fps) = self.fps {
            opts.frame_rate = Some(parse_frame_rate(fps).context("Invalid --fps")?);
        }

        if let Some(ref mode) = self.step_mode {
            opts.step_mode = Some(parse_step_mode(mode)?);
        }

        if let Some(ref signs) = self.signs {
            opts.signs_file = Some(signs.clone());
        }

        if let Some(ref avatar) = self.avatar {
            opts.avatar = Some(AvatarSpec::parse(avatar));
        }

        if self.nocaptions {
            opts.captions = Some(false);
        }

        if let Some(ref level) = self.log_level {
            opts.log_level = Some(parse_log_level(level)?);
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::time::Duration;

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from(["signbridge", "play", "hello", "world", "--fps", "30"]).unwrap();
        assert_eq!(cli.fps.as_deref(), Some("30"));
        match cli.command {
            Some(Commands::Play { text, max_frames, pose }) => {
                assert_eq!(text, vec!["hello", "world"]);
                assert_eq!(max_frames, 100_000);
                assert!(!pose);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_signs_subcommand() {
        let cli = Cli::try_parse_from(["signbridge", "--signs", "s.json", "signs", "delete", "sign-1"]).unwrap();
        assert_eq!(cli.signs, Some(PathBuf::from("s.json")));
        assert_eq!(
            cli.command,
            Some(Commands::Signs {
                action: SignsCommand::Delete { id: "sign-1".into() }
            })
        );
    }

    #[test]
    fn test_play_requires_text() {
        assert!(Cli::try_parse_from(["signbridge", "play"]).is_err());
    }

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            speed: Some("0.2".to_string()),
            pause: Some("100".to_string()),
            avatar: Some("xbot".to_string()),
            nocaptions: true,
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.angular_speed, Some(0.2));
        assert_eq!(opts.pause, Some(Duration::from_millis(100)));
        assert_eq!(opts.avatar, Some(AvatarSpec::Xbot));
        assert_eq!(opts.captions, Some(false));
        assert_eq!(opts.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_merge_overrides_config_values() {
        let base = Options {
            frame_rate: Some(24),
            captions: Some(true),
            ..Default::default()
        };
        let cli = Cli {
            fps: Some("50".to_string()),
            ..Default::default()
        };
        let opts = cli.merge_into_options(base).unwrap();
        assert_eq!(opts.frame_rate, Some(50));
        assert_eq!(opts.captions, Some(true));
    }

    #[test]
    fn test_invalid_speed() {
        let cli = Cli {
            speed: Some("-1".to_string()),
            ..Default::default()
        };

        let result = cli.merge_into_options(Options::default());
        assert!(result.is_err());
    }
}
