//! Gestures derived from tracked hand landmarks
//!
//! Each hand is 21 keypoints in the usual hand-pose topology: the wrist,
//! then four points per digit from thumb to pinky. Coordinates are in
//! image pixels with y growing downward. Every scalar whose inputs are
//! missing evaluates to 0 instead of failing.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::gesture::{Axis, Command, CommandGroup, Direction};

use super::types::{MotionData, SynthError, SynthResult};

/// Frames per second sampled from a recording
pub const SAMPLE_RATE: f32 = 10.0;
/// Upper bound on sampled frames
pub const MAX_FRAMES: usize = 100;

pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const MIDDLE_MCP: usize = 9;
pub const PINKY_MCP: usize = 17;

/// Keypoint indices (mcp, pip, dip, tip) per finger
const FINGER_POINTS: [(&str, [usize; 4]); 4] = [
    ("Index", [5, 6, 7, 8]),
    ("Middle", [9, 10, 11, 12]),
    ("Ring", [13, 14, 15, 16]),
    ("Pinky", [17, 18, 19, 20]),
];
const THUMB_POINTS: [usize; 4] = [1, 2, 3, 4];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Bone name prefix on a Mixamo rig
    pub fn prefix(self) -> &'static str {
        match self {
            Handedness::Left => "mixamorigLeft",
            Handedness::Right => "mixamorigRight",
        }
    }

    /// Direction used for mirrored rotations
    pub fn direction(self) -> Direction {
        match self {
            Handedness::Left => Direction::Decrease,
            Handedness::Right => Direction::Increase,
        }
    }

    /// -1 for the left hand, 1 for the right
    pub fn factor(self) -> f32 {
        match self {
            Handedness::Left => -1.0,
            Handedness::Right => 1.0,
        }
    }
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub handedness: Handedness,
    /// Up to 21 keypoints; `null` for points the tracker lost
    pub keypoints: Vec<Option<Landmark>>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, keypoints: Vec<Option<Landmark>>) -> Self {
        Self {
            handedness,
            keypoints,
        }
    }

    fn point(&self, index: usize) -> Option<Landmark> {
        self.keypoints.get(index).copied().flatten()
    }

    fn points<const N: usize>(&self, indices: [usize; N]) -> Option<[Landmark; N]> {
        let mut out = [Landmark::new(0.0, 0.0); N];
        for (slot, index) in out.iter_mut().zip(indices) {
            *slot = self.point(index)?;
        }
        Some(out)
    }
}

/// Hands detected at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Seconds from the start of the recording
    pub time: f32,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

/// Source of hand observations at a given time
pub trait HandPoseSource {
    /// Length of the recording in seconds
    fn duration(&self) -> f32;

    /// Hands visible at `time` seconds
    fn estimate_hands(&mut self, time: f32) -> SynthResult<Vec<HandObservation>>;
}

/// Pre-extracted landmark frames, e.g. loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecording {
    /// Defaults to just past the last frame
    #[serde(default)]
    pub duration: Option<f32>,
    pub frames: Vec<LandmarkFrame>,
}

impl LandmarkRecording {
    pub fn from_json(text: &str) -> SynthResult<Self> {
        serde_json::from_str(text).map_err(|e| SynthError::Source(e.to_string()))
    }
}

impl HandPoseSource for LandmarkRecording {
    fn duration(&self) -> f32 {
        self.duration.unwrap_or_else(|| {
            self.frames
                .iter()
                .map(|f| f.time)
                .fold(0.0, f32::max)
                + 1.0 / SAMPLE_RATE
        })
    }

    fn estimate_hands(&mut self, time: f32) -> SynthResult<Vec<HandObservation>> {
        let nearest = self.frames.iter().min_by(|a, b| {
            (a.time - time)
                .abs()
                .total_cmp(&(b.time - time).abs())
        });
        Ok(nearest.map(|f| f.hands.clone()).unwrap_or_default())
    }
}

/// Times at which a recording of `duration` seconds is sampled
pub fn sample_times(duration: f32) -> Vec<f32> {
    if !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }
    let count = ((duration * SAMPLE_RATE).floor() as usize).min(MAX_FRAMES);
    (0..count).map(|i| i as f32 / SAMPLE_RATE).collect()
}

fn unit(x: f32, y: f32) -> Option<(f32, f32)> {
    let mag = (x * x + y * y).sqrt();
    if mag == 0.0 || !mag.is_finite() {
        return None;
    }
    Some((x / mag, y / mag))
}

fn angle_between(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 * b.0 + a.1 * b.1).clamp(-1.0, 1.0).acos()
}

/// Bend of a finger from its mcp, pip and tip points, capped at PI/2
pub fn finger_bend(mcp: Landmark, pip: Landmark, tip: Landmark) -> f32 {
    let Some(v1) = unit(pip.x - mcp.x, pip.y - mcp.y) else {
        return 0.0;
    };
    let Some(v2) = unit(tip.x - pip.x, tip.y - pip.y) else {
        return 0.0;
    };
    angle_between(v1, v2).min(PI / 2.0)
}

/// How far the thumb points across the palm
pub fn thumb_opposition(base: Landmark, tip: Landmark) -> f32 {
    match unit(tip.x - base.x, tip.y - base.y) {
        Some((dx, _)) => PI / 4.0 * (1.0 - dx.abs()),
        None => 0.0,
    }
}

pub fn thumb_bend(base: Landmark, mcp: Landmark, ip: Landmark, tip: Landmark) -> f32 {
    match (
        unit(mcp.x - base.x, mcp.y - base.y),
        unit(tip.x - ip.x, tip.y - ip.y),
    ) {
        (Some(v1), Some(v2)) => angle_between(v1, v2) * 0.8,
        _ => 0.0,
    }
}

/// Wrist pitch from the wrist to middle-knuckle height
pub fn wrist_pitch(hand: &HandObservation) -> f32 {
    match (hand.point(WRIST), hand.point(MIDDLE_MCP)) {
        (Some(wrist), Some(middle)) => ((middle.y - wrist.y) / 100.0).clamp(-PI / 4.0, PI / 4.0),
        _ => 0.0,
    }
}

/// Wrist yaw from the knuckle line
pub fn wrist_yaw(hand: &HandObservation) -> f32 {
    match hand.points([WRIST, INDEX_MCP, PINKY_MCP]) {
        Some([_, index, pinky]) => {
            ((index.y - pinky.y).atan2(index.x - pinky.x) * 0.5).clamp(-PI / 4.0, PI / 4.0)
        }
        None => 0.0,
    }
}

/// Wrist roll from the knuckle height difference
pub fn wrist_roll(hand: &HandObservation) -> f32 {
    match hand.points([INDEX_MCP, PINKY_MCP]) {
        Some([index, pinky]) => ((index.y - pinky.y) / 50.0).clamp(-PI / 6.0, PI / 6.0),
        None => 0.0,
    }
}

/// Upper-arm raise, kept within a per-side range
///
/// Without a wrist and middle knuckle this is the rest angle of the arm.
pub fn arm_raise(hand: &HandObservation) -> f32 {
    let factor = hand.handedness.factor();
    let (min, max) = match hand.handedness {
        Handedness::Left => (-PI / 2.0, -PI / 4.0),
        Handedness::Right => (PI / 4.0, PI / 2.0),
    };
    match (hand.point(WRIST), hand.point(MIDDLE_MCP)) {
        (Some(wrist), Some(middle)) => (factor * (middle.x - wrist.x) / 100.0).clamp(min, max),
        _ => factor * PI / 3.0,
    }
}

/// Upper-arm twist from the knuckle line
pub fn arm_twist(hand: &HandObservation) -> f32 {
    match hand.points([WRIST, INDEX_MCP, PINKY_MCP]) {
        Some([_, index, pinky]) => (pinky.y - index.y).atan2(pinky.x - index.x) * 0.25,
        None => 0.0,
    }
}

fn push(group: &mut CommandGroup, joint: String, axis: Axis, target: f32, dir: Direction) {
    group.push(Command::rotate(joint, axis, target, dir));
}

/// Commands for the fingers and thumb of one hand
fn hand_commands(hand: &HandObservation, group: &mut CommandGroup) {
    let prefix = hand.handedness.prefix();
    let dir = hand.handedness.direction();

    for (finger, indices) in FINGER_POINTS {
        let bend = match hand.points(indices) {
            Some([mcp, pip, _, tip]) => finger_bend(mcp, pip, tip),
            None => 0.0,
        };
        for (segment, scale) in [1.0, 0.8, 0.6].into_iter().enumerate() {
            push(
                group,
                format!("{}Hand{}{}", prefix, finger, segment + 1),
                Axis::Z,
                bend * scale,
                dir,
            );
        }
    }

    let [base, mcp, ip, tip] = THUMB_POINTS.map(|i| hand.point(i));
    if let (Some(base), Some(mcp), Some(tip)) = (base, mcp, tip) {
        push(
            group,
            format!("{}HandThumb1", prefix),
            Axis::Y,
            thumb_opposition(base, tip),
            dir,
        );
        let bend = ip.map_or(0.0, |ip| thumb_bend(base, mcp, ip, tip));
        push(group, format!("{}HandThumb2", prefix), Axis::Z, bend * 0.7, dir);
        push(group, format!("{}HandThumb3", prefix), Axis::Z, bend * 0.5, dir);
    }
}

/// Commands for the wrist, forearm and upper arm of one hand
fn arm_commands(hand: &HandObservation, group: &mut CommandGroup) {
    if hand.point(WRIST).is_none() {
        return;
    }
    let prefix = hand.handedness.prefix();
    let dir = hand.handedness.direction();

    push(group, format!("{}Hand", prefix), Axis::X, wrist_pitch(hand), Direction::Increase);
    push(group, format!("{}Hand", prefix), Axis::Y, wrist_yaw(hand), Direction::Increase);
    push(group, format!("{}ForeArm", prefix), Axis::Z, wrist_roll(hand) * 0.8, dir);
    push(group, format!("{}Arm", prefix), Axis::Z, arm_raise(hand), dir);

    let twist = arm_twist(hand);
    if twist.abs() > 0.1 {
        push(group, format!("{}Arm", prefix), Axis::Y, twist, Direction::Increase);
    }
}

/// One command-group for every hand seen in a frame
pub fn frame_group(hands: &[HandObservation]) -> CommandGroup {
    let mut group = CommandGroup::default();
    for hand in hands {
        hand_commands(hand, &mut group);
        arm_commands(hand, &mut group);
    }
    group
}

fn side_to_neutral(side: Handedness, group: &mut CommandGroup) {
    let prefix = side.prefix();
    // Left-side bones close with "+", right-side with "-"
    let close = match side {
        Handedness::Left => Direction::Increase,
        Handedness::Right => Direction::Decrease,
    };
    for (finger, _) in FINGER_POINTS {
        for segment in 1..=3 {
            push(group, format!("{}Hand{}{}", prefix, finger, segment), Axis::Z, 0.0, close);
        }
    }
    push(group, format!("{}HandThumb1", prefix), Axis::Y, 0.0, close);
    push(group, format!("{}HandThumb2", prefix), Axis::Z, 0.0, close);
    push(group, format!("{}HandThumb3", prefix), Axis::Z, 0.0, close);
    push(group, format!("{}ForeArm", prefix), Axis::Z, 0.0, close);
    push(
        group,
        format!("{}Arm", prefix),
        Axis::Z,
        side.factor() * PI / 3.0,
        close,
    );
    push(group, format!("{}Arm", prefix), Axis::Y, 0.0, Direction::Decrease);
    push(group, format!("{}Hand", prefix), Axis::X, 0.0, Direction::Decrease);
    push(group, format!("{}Hand", prefix), Axis::Y, 0.0, Direction::Decrease);
}

/// Both hands back to rest
pub fn neutral_frame() -> CommandGroup {
    let mut group = CommandGroup::default();
    side_to_neutral(Handedness::Left, &mut group);
    side_to_neutral(Handedness::Right, &mut group);
    group
}

/// Fixed motion used when no hands could be analyzed
pub fn placeholder_motion() -> MotionData {
    let up = Direction::Increase;
    let down = Direction::Decrease;

    let mut pose = CommandGroup::default();
    for (finger, _) in FINGER_POINTS {
        for segment in 1..=3 {
            push(&mut pose, format!("mixamorigLeftHand{}{}", finger, segment), Axis::Z, -PI / 2.0, down);
        }
    }
    push(&mut pose, "mixamorigLeftHandThumb1".into(), Axis::Y, -PI / 4.0, down);
    push(&mut pose, "mixamorigLeftForeArm".into(), Axis::Z, -PI / 4.0, down);
    push(&mut pose, "mixamorigLeftArm".into(), Axis::Z, -PI / 2.5, down);
    push(&mut pose, "mixamorigLeftHand".into(), Axis::X, PI / 6.0, up);
    for (finger, _) in FINGER_POINTS {
        for segment in 1..=3 {
            push(&mut pose, format!("mixamorigRightHand{}{}", finger, segment), Axis::Z, PI / 2.0, up);
        }
    }
    push(&mut pose, "mixamorigRightArm".into(), Axis::Z, PI / 3.5, up);
    push(&mut pose, "mixamorigRightArm".into(), Axis::Y, PI / 9.0, up);
    push(&mut pose, "mixamorigRightForeArm".into(), Axis::Z, PI / 12.0, up);
    push(&mut pose, "mixamorigRightHand".into(), Axis::X, PI / 6.0, up);
    push(&mut pose, "mixamorigRightHand".into(), Axis::Y, PI / 6.0, up);

    let tap_down = CommandGroup::new(vec![Command::rotate("mixamorigRightForeArm", Axis::Z, 0.0, down)]);
    let tap_up = CommandGroup::new(vec![Command::rotate("mixamorigRightForeArm", Axis::Z, PI / 12.0, up)]);

    MotionData {
        animations: vec![pose, tap_down, tap_up, neutral_frame()],
        frame_count: 4,
        duration: 2.0,
    }
}

/// Analyze a recording into motion data
///
/// Frames without hands are skipped. When no frame yields commands, or the
/// source fails, the placeholder motion is returned instead.
pub fn analyze(source: &mut dyn HandPoseSource) -> MotionData {
    let duration = source.duration();
    let times = sample_times(duration);
    match collect_groups(source, &times) {
        Ok(groups) if !groups.is_empty() => {
            log::info!(
                "Analyzed {} frames, {} with hand motion",
                times.len(),
                groups.len()
            );
            from_groups(groups, times.len(), duration)
        }
        Ok(_) => {
            log::warn!("No hand movements detected, using placeholder motion");
            placeholder_motion()
        }
        Err(e) => {
            log::error!("Hand pose analysis failed: {}", e);
            placeholder_motion()
        }
    }
}

fn collect_groups(source: &mut dyn HandPoseSource, times: &[f32]) -> SynthResult<Vec<CommandGroup>> {
    let mut groups = Vec::new();
    for (i, &time) in times.iter().enumerate() {
        let hands = source.estimate_hands(time)?;
        let group = frame_group(&hands);
        if group.is_empty() {
            log::debug!("Frame {} at {:.1}s has no hands", i, time);
        } else {
            groups.push(group);
        }
    }
    Ok(groups)
}

/// Analyze already-extracted frames
pub fn from_frames(frames: &[LandmarkFrame], duration: f32) -> MotionData {
    let groups: Vec<CommandGroup> = frames
        .iter()
        .map(|f| frame_group(&f.hands))
        .filter(|g| !g.is_empty())
        .collect();
    if groups.is_empty() {
        return placeholder_motion();
    }
    from_groups(groups, frames.len(), duration)
}

fn from_groups(mut groups: Vec<CommandGroup>, frame_count: usize, duration: f32) -> MotionData {
    let mut home = neutral_frame();
    for cmd in home.commands.iter_mut() {
        let last = groups
            .iter()
            .rev()
            .flat_map(|g| g.iter().rev())
            .find(|c| c.joint == cmd.joint && c.axis == cmd.axis);
        if let Some(prev) = last {
            cmd.direction = Direction::toward(prev.target, cmd.target);
        }
    }
    groups.push(home);
    MotionData {
        animations: groups,
        frame_count,
        duration,
    }
}
