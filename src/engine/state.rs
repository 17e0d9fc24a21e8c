//! Playback engine
//!
//! Owns the gesture queue and drives the attached skeleton one tick per
//! rendered frame. The head of the queue is either a caption marker, which
//! is applied and dropped, or a command-group whose commands all step
//! toward their targets together. A finished group stays at the head for
//! the length of the pause and is then dropped.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::gesture::{Command, CommandGroup, Direction, GestureDefinition, GestureLibrary, GestureQueue, QueueEntry};

use super::caption::{CaptionSink, CaptionTracker};
use super::pause::PauseWindow;
use super::skeleton::{AvatarLoader, AvatarSpec, Skeleton};
use super::types::{EngineConfig, EngineError, EngineResult, EngineStats, StepMode, TickOutcome};

/// Mutable playback state
#[derive(Debug, Default)]
pub struct EngineState {
    queue: GestureQueue,
    /// Set while there is queued work
    running: bool,
    pause: PauseWindow,
    captions: CaptionTracker,
    stats: EngineStats,
}

impl EngineState {
    fn new(config: &EngineConfig) -> Self {
        let mut captions = CaptionTracker::new();
        captions.set_enabled(config.captions);
        Self {
            queue: GestureQueue::new(),
            running: false,
            pause: PauseWindow::new(config.pause),
            captions,
            stats: EngineStats::default(),
        }
    }

    pub fn queue(&self) -> &GestureQueue {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_active()
    }

    pub fn captions(&self) -> &CaptionTracker {
        &self.captions
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Drop all queued work
    fn cancel(&mut self) {
        self.queue.clear();
        self.pause.cancel();
        self.running = false;
    }
}

/// Per-command result of one tick
enum Progress {
    Moved,
    /// Target reached or already satisfied
    Done,
    /// Joint or axis missing, or target unusable
    Skipped,
}

fn advance_command(cmd: &Command, skeleton: &mut dyn Skeleton, step: f32) -> EngineResult<Progress> {
    let joint = cmd.joint.as_str();
    if !cmd.target.is_finite() {
        log::warn!("Dropping command on {} with target {}", joint, cmd.target);
        return Ok(Progress::Skipped);
    }
    let Some(current) = skeleton.rotation(joint, cmd.axis) else {
        log::debug!("Joint {} has no {} rotation, skipping", joint, cmd.axis);
        return Ok(Progress::Skipped);
    };
    if cmd.is_satisfied_by(current) {
        return Ok(Progress::Done);
    }

    let next = match cmd.direction {
        Direction::Increase => (current + step).min(cmd.target),
        Direction::Decrease => (current - step).max(cmd.target),
    };
    skeleton.set_rotation(joint, cmd.axis, next)?;
    Ok(Progress::Moved)
}

/// Step every command of `group`, dropping the finished ones
fn advance_group(
    group: &mut CommandGroup,
    skeleton: &mut dyn Skeleton,
    step: f32,
    stats: &mut EngineStats,
) -> EngineResult<usize> {
    let mut moved = 0;
    let mut failure = None;
    group.commands.retain(|cmd| {
        if failure.is_some() {
            return true;
        }
        match advance_command(cmd, skeleton, step) {
            Ok(Progress::Moved) => {
                moved += 1;
                true
            }
            Ok(Progress::Done) => {
                stats.commands_retired += 1;
                false
            }
            Ok(Progress::Skipped) => {
                stats.commands_retired += 1;
                stats.commands_skipped += 1;
                false
            }
            Err(e) => {
                failure = Some(e);
                true
            }
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(moved),
    }
}

pub struct PlaybackEngine {
    config: EngineConfig,
    skeleton: Option<Box<dyn Skeleton>>,
    /// Queued whenever a skeleton is attached
    default_pose: GestureDefinition,
    state: EngineState,
    sink: Option<Box<dyn CaptionSink>>,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PlaybackEngine {
    pub fn new(config: EngineConfig) -> Self {
        let state = EngineState::new(&config);
        Self {
            config,
            skeleton: None,
            default_pose: GestureLibrary::empty().default_pose().clone(),
            state,
            sink: None,
        }
    }

    /// Replace the gesture played when a skeleton is attached
    pub fn with_default_pose(mut self, pose: GestureDefinition) -> Self {
        self.default_pose = pose;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_angular_speed(&mut self, speed: f32) -> EngineResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(EngineError::InvalidSpeed(speed));
        }
        self.config.angular_speed = speed;
        Ok(())
    }

    /// New length for pauses started from now on
    pub fn set_pause_time(&mut self, pause: Duration) {
        self.config.pause = pause;
        self.state.pause.set_duration(pause);
    }

    pub fn set_step_mode(&mut self, mode: StepMode) -> EngineResult<()> {
        if let StepMode::TimeScaled { reference_fps } = mode {
            if !reference_fps.is_finite() || reference_fps <= 0.0 {
                return Err(EngineError::InvalidSpeed(reference_fps));
            }
        }
        self.config.step_mode = mode;
        Ok(())
    }

    pub fn set_captions_enabled(&mut self, enabled: bool) {
        self.config.captions = enabled;
        self.state.captions.set_enabled(enabled);
    }

    /// Forward caption changes to `sink` as well
    pub fn set_caption_sink(&mut self, sink: Box<dyn CaptionSink>) {
        self.sink = Some(sink);
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn stats(&self) -> &EngineStats {
        &self.state.stats
    }

    /// Caption currently displayed
    pub fn caption(&self) -> Option<&str> {
        self.state.captions.current()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// True when nothing is queued and new text can be played
    pub fn ready_for_input(&self) -> bool {
        !self.state.running
    }

    pub fn skeleton(&self) -> Option<&dyn Skeleton> {
        self.skeleton.as_deref()
    }

    /// Attach a skeleton, abandoning any playback
    ///
    /// The skeleton is reset to rest and the default pose is queued.
    pub fn attach_skeleton(&mut self, mut skeleton: Box<dyn Skeleton>) {
        self.stop();
        self.clear_captions();
        skeleton.reset_pose();
        log::info!("Attached avatar {}", skeleton.name());
        self.skeleton = Some(skeleton);

        self.state.queue.push_gesture(&self.default_pose);
        self.state.running = !self.state.queue.is_empty();
    }

    pub fn detach_skeleton(&mut self) -> Option<Box<dyn Skeleton>> {
        self.stop();
        self.skeleton.take()
    }

    /// Load and attach an avatar
    ///
    /// On failure the engine is left idle with no skeleton.
    pub fn load_avatar(&mut self, loader: &dyn AvatarLoader, spec: &AvatarSpec) -> EngineResult<()> {
        self.detach_skeleton();
        match loader.load(spec) {
            Ok(skeleton) => {
                self.attach_skeleton(skeleton);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load avatar {}: {}", spec, e);
                Err(e.into())
            }
        }
    }

    /// Load `spec`, or its fallback if that fails; returns what loaded
    pub fn load_avatar_with_fallback(
        &mut self,
        loader: &dyn AvatarLoader,
        spec: &AvatarSpec,
    ) -> EngineResult<AvatarSpec> {
        if self.load_avatar(loader, spec).is_ok() {
            return Ok(spec.clone());
        }
        let alternate = spec.fallback();
        log::warn!("Trying fallback avatar {}", alternate);
        self.load_avatar(loader, &alternate)?;
        Ok(alternate)
    }

    /// Append compiled work to the queue
    ///
    /// Work queued while idle starts a new utterance and clears the
    /// caption; work queued while running plays after what is pending.
    pub fn enqueue(&mut self, queue: GestureQueue) -> EngineResult<()> {
        if self.skeleton.is_none() {
            return Err(EngineError::NoAvatar);
        }
        if queue.is_empty() {
            return Ok(());
        }
        if !self.state.running {
            self.clear_captions();
            self.state.running = true;
        }
        self.state.queue.append(queue);
        Ok(())
    }

    /// Abandon all queued work; the pose and caption stay as they are
    pub fn stop(&mut self) {
        if self.state.running {
            log::debug!("Stopping playback with {} queued entries", self.state.queue.len());
        }
        self.state.cancel();
    }

    /// Stop, clear the caption and put the skeleton back at rest
    pub fn reset(&mut self) {
        self.stop();
        self.clear_captions();
        if let Some(skeleton) = self.skeleton.as_deref_mut() {
            skeleton.reset_pose();
        }
    }

    /// Run one frame of playback
    pub fn tick(&mut self, delta: Duration) -> TickOutcome {
        if !self.state.running {
            return TickOutcome::Idle;
        }
        self.state.stats.ticks += 1;

        match panic::catch_unwind(AssertUnwindSafe(|| self.step(delta))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                log::error!("Playback tick failed: {}", e);
                self.recover()
            }
            Err(_) => {
                log::error!("Playback tick panicked");
                self.recover()
            }
        }
    }

    /// Tick with a fixed frame length until idle or `max_ticks`
    ///
    /// Returns the number of ticks run.
    pub fn run_until_idle(&mut self, frame: Duration, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while self.state.running && ticks < max_ticks {
            self.tick(frame);
            ticks += 1;
        }
        ticks
    }

    fn step(&mut self, delta: Duration) -> EngineResult<TickOutcome> {
        if self.state.pause.is_active() {
            if !self.state.pause.advance(delta) {
                return Ok(TickOutcome::Paused);
            }
            self.state.queue.pop_front();
            self.state.stats.groups_retired += 1;
            if self.state.queue.is_empty() {
                return Ok(self.drain());
            }
            return Ok(TickOutcome::GroupRetired);
        }

        let Some(entry) = self.state.queue.front_mut() else {
            return Ok(self.drain());
        };

        match entry {
            QueueEntry::Caption(text) => {
                let text = std::mem::take(text);
                self.state.queue.pop_front();
                self.show_caption(&text);
                if self.state.queue.is_empty() {
                    self.state.running = false;
                }
                Ok(TickOutcome::Caption(text))
            }
            QueueEntry::Animate(group) => {
                let skeleton = self.skeleton.as_deref_mut().ok_or(EngineError::NoAvatar)?;
                let step = self.config.step_mode.step(self.config.angular_speed, delta);
                let moved = advance_group(group, skeleton, step, &mut self.state.stats)?;
                if group.is_empty() {
                    self.state.pause.start();
                    return Ok(TickOutcome::Paused);
                }
                Ok(TickOutcome::Advanced {
                    moved,
                    remaining: group.len(),
                })
            }
        }
    }

    fn drain(&mut self) -> TickOutcome {
        self.state.running = false;
        log::debug!("Playback drained after {} ticks", self.state.stats.ticks);
        TickOutcome::Drained
    }

    fn recover(&mut self) -> TickOutcome {
        self.state.cancel();
        self.state.stats.recoveries += 1;
        TickOutcome::Recovered
    }

    fn show_caption(&mut self, text: &str) {
        self.state.stats.captions += 1;
        if !self.state.captions.show_at(self.state.stats.ticks, text) {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.show(text);
        }
    }

    fn clear_captions(&mut self) {
        self.state.captions.clear();
        if let Some(sink) = self.sink.as_mut() {
            sink.clear();
        }
    }
}
