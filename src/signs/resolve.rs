//! Turning stored sign records into gestures
//!
//! Motion data wins, then the record's gesture script, then the built-in
//! placeholder. A record is never rejected for bad motion.

use std::collections::HashMap;

use crate::gesture::{placeholder_gesture, script, GestureDefinition};

use super::record::SignRecord;

/// Where a resolved gesture came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    MotionData,
    Script,
    Placeholder,
}

/// Resolve one record; `None` when the record has no name
pub fn resolve(record: &SignRecord) -> Option<(GestureDefinition, GestureSource)> {
    let Some(name) = record.key() else {
        log::warn!("Ignoring sign {} without a name", record.id);
        return None;
    };

    if let Some(motion) = record.motion_data.as_ref().filter(|m| m.is_usable()) {
        let groups = motion
            .animations
            .iter()
            .filter(|g| !g.is_empty())
            .cloned()
            .collect();
        return Some((GestureDefinition::new(&name, groups), GestureSource::MotionData));
    }

    if let Some(code) = record.code.as_deref() {
        match script::parse(&name, code) {
            Ok(gesture) => return Some((gesture, GestureSource::Script)),
            Err(e) => log::warn!("Sign {} has an unusable gesture script: {}", name, e),
        }
    }

    log::debug!("Sign {} falls back to the placeholder gesture", name);
    Some((placeholder_gesture(&name), GestureSource::Placeholder))
}

/// Resolve a record list into a name-to-gesture map
pub fn resolve_all(records: &[SignRecord]) -> HashMap<String, GestureDefinition> {
    records
        .iter()
        .filter_map(resolve)
        .map(|(gesture, _)| (gesture.name.clone(), gesture))
        .collect()
}
