//! Stored command tuple format
//!
//! Persisted signs keep each command as a JSON 5-tuple:
//! `["mixamorigRightArm", "rotation", "z", 1.047, "+"]`.
//! Decoding is lenient at the group level: a malformed command is
//! dropped with a warning and the rest of the group survives.

use serde_json::Value;

use super::types::{Axis, Command, CommandGroup, Direction, GestureError, GestureResult, JointRef, Property};

fn str_part<'a>(value: &'a Value, what: &'static str) -> GestureResult<&'a str> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(GestureError::MissingPart(what)),
    }
}

/// Decode a single command tuple
pub fn decode_command(value: &Value) -> GestureResult<Command> {
    let parts = value.as_array().ok_or(GestureError::WrongArity(0))?;
    if parts.len() < 5 {
        return Err(GestureError::WrongArity(parts.len()));
    }

    let joint = str_part(&parts[0], "joint")?;
    let property: Property = str_part(&parts[1], "property")?.parse()?;
    let axis: Axis = str_part(&parts[2], "axis")?.parse()?;
    let target = match parts[3].as_f64() {
        Some(t) if t.is_finite() => t as f32,
        _ => return Err(GestureError::BadTarget(parts[3].to_string())),
    };
    let direction: Direction = str_part(&parts[4], "direction")?.parse()?;

    Ok(Command {
        joint: JointRef::new(joint),
        property,
        axis,
        target,
        direction,
    })
}

/// Decode one command-group, dropping malformed commands
pub fn decode_group(value: &Value) -> GestureResult<CommandGroup> {
    let items = value.as_array().ok_or(GestureError::BadGroup)?;
    let mut group = CommandGroup::default();
    for item in items {
        match decode_command(item) {
            Ok(command) => group.push(command),
            Err(e) => log::warn!("Dropping malformed command {}: {}", item, e),
        }
    }
    Ok(group)
}

/// Decode a list of command-groups
///
/// Entries that are not lists, or that decode to no commands, are skipped.
pub fn decode_groups(values: &[Value]) -> Vec<CommandGroup> {
    let mut groups = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        match decode_group(value) {
            Ok(group) if !group.is_empty() => groups.push(group),
            Ok(_) => log::debug!("Skipping empty command-group {}", i),
            Err(e) => log::warn!("Skipping command-group {}: {}", i, e),
        }
    }
    groups
}

pub fn encode_command(command: &Command) -> Value {
    Value::Array(vec![
        Value::from(command.joint.as_str()),
        Value::from(command.property.as_str()),
        Value::from(command.axis.as_str()),
        Value::from(command.target as f64),
        Value::from(command.direction.as_str()),
    ])
}

pub fn encode_group(group: &CommandGroup) -> Value {
    Value::Array(group.iter().map(encode_command).collect())
}

pub fn encode_groups(groups: &[CommandGroup]) -> Vec<Value> {
    groups.iter().map(encode_group).collect()
}
