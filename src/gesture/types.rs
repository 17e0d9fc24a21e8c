//! Core types for gesture data
//!
//! A gesture is an ordered list of command-groups; each group holds
//! joint rotation commands that advance together on every tick.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Error type for gesture decoding and scripting
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GestureError {
    /// Command tuple does not have five elements
    #[error("Command has {0} parts, expected 5")]
    WrongArity(usize),
    /// A command part is missing or empty
    #[error("Command is missing its {0}")]
    MissingPart(&'static str),
    /// Target value is not a finite number
    #[error("Target is not a number: {0}")]
    BadTarget(String),
    /// Unknown axis name
    #[error("Unknown axis: {0}")]
    BadAxis(String),
    /// Unknown direction marker
    #[error("Unknown direction: {0}")]
    BadDirection(String),
    /// Only rotation is animatable
    #[error("Unsupported property: {0}")]
    BadProperty(String),
    /// A command-group is not a list
    #[error("Command-group is not a list")]
    BadGroup,
    /// Gesture script line could not be parsed
    #[error("Script line {line}: {reason}")]
    Script { line: usize, reason: String },
    /// Gesture decoded to nothing usable
    #[error("Gesture has no usable command-groups")]
    Empty,
}

/// Result type for gesture operations
pub type GestureResult<T> = Result<T, GestureError>;

/// Rotation axis of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index into an `[f32; 3]` rotation triple
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(GestureError::BadAxis(other.to_string())),
        }
    }
}

/// Direction a command moves its joint in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// "+": the angle grows toward the target
    Increase,
    /// "-": the angle shrinks toward the target
    Decrease,
}

impl Direction {
    /// Direction that moves `from` toward `to`
    pub fn toward(from: f32, to: f32) -> Self {
        if to >= from {
            Direction::Increase
        } else {
            Direction::Decrease
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increase => "+",
            Direction::Decrease => "-",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Direction::Increase),
            "-" => Ok(Direction::Decrease),
            other => Err(GestureError::BadDirection(other.to_string())),
        }
    }
}

/// Animatable joint property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Property {
    #[default]
    Rotation,
}

impl Property {
    pub fn as_str(self) -> &'static str {
        "rotation"
    }
}

impl FromStr for Property {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rotation" => Ok(Property::Rotation),
            other => Err(GestureError::BadProperty(other.to_string())),
        }
    }
}

/// Name of a joint in a skeleton, resolved at apply time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointRef(String);

impl JointRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JointRef {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// One joint/axis/target instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub joint: JointRef,
    pub property: Property,
    pub axis: Axis,
    pub target: f32,
    pub direction: Direction,
}

impl Command {
    /// Create a rotation command
    pub fn rotate(joint: impl Into<String>, axis: Axis, target: f32, direction: Direction) -> Self {
        Self {
            joint: JointRef::new(joint),
            property: Property::Rotation,
            axis,
            target,
            direction,
        }
    }

    /// Whether `current` already satisfies this command
    pub fn is_satisfied_by(&self, current: f32) -> bool {
        match self.direction {
            Direction::Increase => current >= self.target,
            Direction::Decrease => current <= self.target,
        }
    }
}

/// Commands that advance concurrently
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandGroup {
    pub commands: Vec<Command>,
}

impl CommandGroup {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// A group with no pending commands is done
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl FromIterator<Command> for CommandGroup {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Full bone-motion definition of one sign or letter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureDefinition {
    /// Upper-cased gesture name
    pub name: String,
    /// Groups run sequentially, separated by a pause
    pub groups: Vec<CommandGroup>,
}

impl GestureDefinition {
    pub fn new(name: &str, groups: Vec<CommandGroup>) -> Self {
        Self {
            name: name.to_uppercase(),
            groups,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn command_count(&self) -> usize {
        self.groups.iter().map(CommandGroup::len).sum()
    }

    /// Last command-group, usually the return to neutral
    pub fn last_group(&self) -> Option<&CommandGroup> {
        self.groups.last()
    }
}

/// Entry in the engine's gesture queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEntry {
    /// Joint motion
    Animate(CommandGroup),
    /// Replace the displayed caption text
    Caption(String),
}

impl QueueEntry {
    pub fn is_caption(&self) -> bool {
        matches!(self, QueueEntry::Caption(_))
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            QueueEntry::Caption(text) => Some(text),
            QueueEntry::Animate(_) => None,
        }
    }

    pub fn group(&self) -> Option<&CommandGroup> {
        match self {
            QueueEntry::Animate(group) => Some(group),
            QueueEntry::Caption(_) => None,
        }
    }
}

/// Ordered pending command-groups and caption markers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureQueue {
    entries: VecDeque<QueueEntry>,
}

impl GestureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a caption marker
    pub fn push_caption(&mut self, text: impl Into<String>) {
        self.entries.push_back(QueueEntry::Caption(text.into()));
    }

    /// Append one command-group
    pub fn push_group(&mut self, group: CommandGroup) {
        self.entries.push_back(QueueEntry::Animate(group));
    }

    /// Append every command-group of a gesture in order
    pub fn push_gesture(&mut self, gesture: &GestureDefinition) {
        for group in &gesture.groups {
            self.push_group(group.clone());
        }
    }

    /// Move every entry of `other` to the back of this queue
    pub fn append(&mut self, other: GestureQueue) {
        self.entries.extend(other.entries);
    }

    pub fn front(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueueEntry> {
        self.entries.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, QueueEntry> {
        self.entries.iter()
    }

    /// Caption texts in queue order
    pub fn captions(&self) -> Vec<&str> {
        self.entries.iter().filter_map(QueueEntry::caption).collect()
    }

    /// Number of animation entries
    pub fn group_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_caption()).count()
    }
}

impl FromIterator<QueueEntry> for GestureQueue {
    fn from_iter<T: IntoIterator<Item = QueueEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for GestureQueue {
    type Item = QueueEntry;
    type IntoIter = std::collections::vec_deque::IntoIter<QueueEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
