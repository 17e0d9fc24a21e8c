//! Persisted sign records

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::synth::MotionData;

/// Disambiguates records created within the same millisecond
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A user-created sign as kept by the sign store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRecord {
    pub id: String,
    /// Upper-cased sign name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Declarative gesture script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_data: Option<MotionData>,
}

impl SignRecord {
    /// New record with a time-based id, unique within the process
    pub fn new(name: &str) -> Self {
        let created_at = Utc::now();
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("sign-{}-{}", created_at.timestamp_millis(), seq),
            name: normalize_name(name),
            description: String::new(),
            created_by: String::new(),
            created_at,
            code: None,
            motion_data: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.created_by = author.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_motion(mut self, motion: MotionData) -> Self {
        self.motion_data = Some(motion);
        self
    }

    /// Normalized lookup key, `None` for a nameless record
    pub fn key(&self) -> Option<String> {
        let key = normalize_name(&self.name);
        (!key.is_empty()).then_some(key)
    }
}

/// Trimmed, upper-cased sign name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record_normalizes_name() {
        let rec = SignRecord::new("  wave ");
        assert_eq!(rec.name, "WAVE");
        assert!(rec.id.starts_with("sign-"));
        assert_eq!(rec.key().as_deref(), Some("WAVE"));
    }

    #[test]
    fn test_records_created_together_get_distinct_ids() {
        let ids: std::collections::HashSet<String> =
            (0..200).map(|_| SignRecord::new("wave").id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_nameless_record_has_no_key() {
        let rec = SignRecord::new("   ");
        assert_eq!(rec.key(), None);
    }

    #[test]
    fn test_record_json_field_names() {
        let rec = SignRecord::new("wave")
            .with_id("abc")
            .with_author("tester")
            .with_code("mixamorigHead x 0.1 +");
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["createdBy"], json!("tester"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("motionData").is_none());
        let back: SignRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_record_reads_minimal_json() {
        let rec: SignRecord = serde_json::from_value(json!({
            "id": "1",
            "name": "TIME",
            "createdAt": "2024-03-01T12:00:00Z",
            "motionData": {"animations": [], "frameCount": 0, "duration": 0}
        }))
        .unwrap();
        assert_eq!(rec.name, "TIME");
        assert_eq!(rec.code, None);
        assert!(!rec.motion_data.unwrap().is_usable());
    }
}
