//! Skeletons and avatar loading
//!
//! The engine sees a skeleton as named joints, each with up to three
//! independently rotatable axes. No other constraint applies.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gesture::Axis;

use super::types::{SkeletonError, SkeletonResult};

/// Joint access used by the playback engine
pub trait Skeleton: Send {
    /// Avatar name
    fn name(&self) -> &str;

    /// Current angle, or `None` when the joint or axis does not exist
    fn rotation(&self, joint: &str, axis: Axis) -> Option<f32>;

    fn set_rotation(&mut self, joint: &str, axis: Axis, angle: f32) -> SkeletonResult<()>;

    /// Put every joint back at its rest angles
    fn reset_pose(&mut self);

    /// Joint names in a stable order
    fn joint_names(&self) -> Vec<String>;
}

/// Live rotation state of one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointState {
    pub angles: [f32; 3],
    pub rest: [f32; 3],
    /// Which of x, y, z can rotate
    pub axes: [bool; 3],
}

impl JointState {
    pub fn new(rest: [f32; 3], axes: [bool; 3]) -> Self {
        Self {
            angles: rest,
            rest,
            axes,
        }
    }

    pub fn has_axis(&self, axis: Axis) -> bool {
        self.axes[axis.index()]
    }
}

/// One joint of a rig description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigJoint {
    pub name: String,
    /// Rotatable axes as letters, e.g. "xz"; all three when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<String>,
    /// Rest angles for x, y, z
    #[serde(default)]
    pub rest: [f32; 3],
}

impl RigJoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            axes: None,
            rest: [0.0; 3],
        }
    }

    fn axis_mask(&self) -> SkeletonResult<[bool; 3]> {
        let Some(letters) = &self.axes else {
            return Ok([true; 3]);
        };
        let mut mask = [false; 3];
        for ch in letters.chars().filter(|c| !c.is_whitespace()) {
            let axis: Axis = ch.to_string().parse().map_err(|_| SkeletonError::MissingAxis {
                joint: self.name.clone(),
                axis: ch.to_string(),
            })?;
            mask[axis.index()] = true;
        }
        Ok(mask)
    }
}

/// Serializable rig: a named list of joints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDescription {
    pub name: String,
    pub joints: Vec<RigJoint>,
}

const SPINE: [&str; 6] = ["Hips", "Spine", "Spine1", "Spine2", "Neck", "Head"];
const ARM: [&str; 4] = ["Shoulder", "Arm", "ForeArm", "Hand"];
const DIGITS: [&str; 5] = ["Thumb", "Index", "Middle", "Ring", "Pinky"];
const LEG: [&str; 4] = ["UpLeg", "Leg", "Foot", "ToeBase"];

impl RigDescription {
    /// Standard Mixamo humanoid bone set
    pub fn mixamo(name: &str) -> Self {
        let mut joints: Vec<RigJoint> = SPINE
            .iter()
            .map(|bone| RigJoint::new(format!("mixamorig{}", bone)))
            .collect();
        for side in ["Left", "Right"] {
            for bone in ARM {
                joints.push(RigJoint::new(format!("mixamorig{}{}", side, bone)));
            }
            for digit in DIGITS {
                for segment in 1..=3 {
                    joints.push(RigJoint::new(format!("mixamorig{}Hand{}{}", side, digit, segment)));
                }
            }
            for bone in LEG {
                joints.push(RigJoint::new(format!("mixamorig{}{}", side, bone)));
            }
        }
        Self {
            name: name.to_string(),
            joints,
        }
    }

    pub fn from_json(text: &str) -> SkeletonResult<Self> {
        serde_json::from_str(text).map_err(|e| SkeletonError::LoadFailed {
            name: "rig".into(),
            reason: e.to_string(),
        })
    }
}

/// In-memory skeleton built from a rig description
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPose {
    name: String,
    joints: BTreeMap<String, JointState>,
}

impl SkeletonPose {
    pub fn from_rig(rig: &RigDescription) -> SkeletonResult<Self> {
        let mut joints = BTreeMap::new();
        for joint in &rig.joints {
            if joint.rest.iter().any(|a| !a.is_finite()) {
                return Err(SkeletonError::NonFinite(joint.name.clone()));
            }
            let state = JointState::new(joint.rest, joint.axis_mask()?);
            if joints.insert(joint.name.clone(), state).is_some() {
                return Err(SkeletonError::DuplicateJoint(joint.name.clone()));
            }
        }
        Ok(Self {
            name: rig.name.clone(),
            joints,
        })
    }

    pub fn joint(&self, name: &str) -> Option<&JointState> {
        self.joints.get(name)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joints whose angles differ from rest
    pub fn moved_joints(&self) -> impl Iterator<Item = (&str, &JointState)> {
        self.joints
            .iter()
            .filter(|(_, j)| j.angles != j.rest)
            .map(|(n, j)| (n.as_str(), j))
    }
}

impl Skeleton for SkeletonPose {
    fn name(&self) -> &str {
        &self.name
    }

    fn rotation(&self, joint: &str, axis: Axis) -> Option<f32> {
        self.joints
            .get(joint)
            .filter(|j| j.has_axis(axis))
            .map(|j| j.angles[axis.index()])
    }

    fn set_rotation(&mut self, joint: &str, axis: Axis, angle: f32) -> SkeletonResult<()> {
        if !angle.is_finite() {
            return Err(SkeletonError::NonFinite(joint.to_string()));
        }
        let state = self
            .joints
            .get_mut(joint)
            .ok_or_else(|| SkeletonError::MissingJoint(joint.to_string()))?;
        if !state.has_axis(axis) {
            return Err(SkeletonError::MissingAxis {
                joint: joint.to_string(),
                axis: axis.to_string(),
            });
        }
        state.angles[axis.index()] = angle;
        Ok(())
    }

    fn reset_pose(&mut self) {
        for state in self.joints.values_mut() {
            state.angles = state.rest;
        }
    }

    fn joint_names(&self) -> Vec<String> {
        self.joints.keys().cloned().collect()
    }
}

/// Which avatar to load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AvatarSpec {
    Xbot,
    #[default]
    Ybot,
    /// JSON rig description on disk
    File(PathBuf),
}

impl AvatarSpec {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "xbot" => AvatarSpec::Xbot,
            "ybot" => AvatarSpec::Ybot,
            _ => AvatarSpec::File(PathBuf::from(text.trim())),
        }
    }

    /// Avatar to try when this one fails to load
    pub fn fallback(&self) -> AvatarSpec {
        match self {
            AvatarSpec::Xbot => AvatarSpec::Ybot,
            AvatarSpec::Ybot => AvatarSpec::Xbot,
            AvatarSpec::File(_) => AvatarSpec::Ybot,
        }
    }
}

impl fmt::Display for AvatarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarSpec::Xbot => write!(f, "xbot"),
            AvatarSpec::Ybot => write!(f, "ybot"),
            AvatarSpec::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Produces skeletons for avatar specs
pub trait AvatarLoader {
    fn load(&self, spec: &AvatarSpec) -> SkeletonResult<Box<dyn Skeleton>>;
}

/// Loads the built-in Mixamo bots and JSON rig files
#[derive(Debug, Default, Clone, Copy)]
pub struct RigLoader;

impl AvatarLoader for RigLoader {
    fn load(&self, spec: &AvatarSpec) -> SkeletonResult<Box<dyn Skeleton>> {
        let rig = match spec {
            AvatarSpec::Xbot => RigDescription::mixamo("xbot"),
            AvatarSpec::Ybot => RigDescription::mixamo("ybot"),
            AvatarSpec::File(path) => {
                let text = fs::read_to_string(path).map_err(|e| SkeletonError::LoadFailed {
                    name: spec.to_string(),
                    reason: e.to_string(),
                })?;
                RigDescription::from_json(&text).map_err(|e| SkeletonError::LoadFailed {
                    name: spec.to_string(),
                    reason: e.to_string(),
                })?
            }
        };
        let pose = SkeletonPose::from_rig(&rig)?;
        log::info!("Loaded avatar {} with {} joints", rig.name, pose.len());
        Ok(Box::new(pose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mixamo_rig_has_animated_bones() {
        let pose = SkeletonPose::from_rig(&RigDescription::mixamo("ybot")).unwrap();
        for name in [
            "mixamorigNeck",
            "mixamorigRightArm",
            "mixamorigLeftForeArm",
            "mixamorigRightHandThumb3",
            "mixamorigLeftHandPinky1",
        ] {
            assert!(pose.joint(name).is_some(), "missing {name}");
        }
        // 6 spine + 2 * (4 arm + 15 finger + 4 leg)
        assert_eq!(pose.len(), 52);
    }

    #[test]
    fn test_set_and_reset_rotation() {
        let mut pose = SkeletonPose::from_rig(&RigDescription::mixamo("xbot")).unwrap();
        pose.set_rotation("mixamorigHead", Axis::Y, 0.5).unwrap();
        assert_eq!(pose.rotation("mixamorigHead", Axis::Y), Some(0.5));
        assert_eq!(pose.moved_joints().count(), 1);
        pose.reset_pose();
        assert_eq!(pose.rotation("mixamorigHead", Axis::Y), Some(0.0));
    }

    #[test]
    fn test_missing_joint_and_axis() {
        let rig = RigDescription {
            name: "stick".into(),
            joints: vec![RigJoint {
                name: "elbow".into(),
                axes: Some("z".into()),
                rest: [0.0, 0.0, 0.25],
            }],
        };
        let mut pose = SkeletonPose::from_rig(&rig).unwrap();
        assert_eq!(pose.rotation("elbow", Axis::Z), Some(0.25));
        assert_eq!(pose.rotation("elbow", Axis::X), None);
        assert_eq!(pose.rotation("knee", Axis::Z), None);
        assert!(matches!(
            pose.set_rotation("elbow", Axis::X, 1.0),
            Err(SkeletonError::MissingAxis { .. })
        ));
        assert_eq!(
            pose.set_rotation("knee", Axis::Z, 1.0),
            Err(SkeletonError::MissingJoint("knee".into()))
        );
        assert!(pose.set_rotation("elbow", Axis::Z, f32::NAN).is_err());
    }

    #[test]
    fn test_duplicate_joint_is_rejected() {
        let rig = RigDescription {
            name: "twins".into(),
            joints: vec![RigJoint::new("head"), RigJoint::new("neck"), RigJoint::new("head")],
        };
        assert_eq!(
            SkeletonPose::from_rig(&rig),
            Err(SkeletonError::DuplicateJoint("head".into()))
        );
    }

    #[test]
    fn test_avatar_spec_parse_and_fallback() {
        assert_eq!(AvatarSpec::parse("XBot"), AvatarSpec::Xbot);
        assert_eq!(AvatarSpec::parse("ybot").fallback(), AvatarSpec::Xbot);
        let file = AvatarSpec::parse("rigs/custom.json");
        assert_eq!(file, AvatarSpec::File(PathBuf::from("rigs/custom.json")));
        assert_eq!(file.fallback(), AvatarSpec::Ybot);
    }

    #[test]
    fn test_rig_loader_reads_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rig.json");
        fs::write(
            &path,
            r#"{"name": "puppet", "joints": [{"name": "head", "axes": "xy"}]}"#,
        )
        .unwrap();
        let skeleton = RigLoader.load(&AvatarSpec::File(path)).unwrap();
        assert_eq!(skeleton.name(), "puppet");
        assert_eq!(skeleton.joint_names(), vec!["head".to_string()]);
        assert_eq!(skeleton.rotation("head", Axis::Z), None);
    }

    #[test]
    fn test_rig_loader_missing_file() {
        let err = RigLoader
            .load(&AvatarSpec::File(PathBuf::from("/nonexistent/rig.json")))
            .err()
            .unwrap();
        assert!(matches!(err, SkeletonError::LoadFailed { .. }));
    }
}
