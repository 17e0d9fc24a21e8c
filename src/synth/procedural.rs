//! Deterministic procedural gestures
//!
//! A gesture name is hashed into a seed, and every joint target is a base
//! angle offset by `sin(seed * (0.1 + offset)) * range`. The same name
//! always produces the same motion.

use std::f32::consts::PI;

use crate::gesture::{Axis, Command, CommandGroup, Direction, GestureDefinition};

use super::neutral_return;

/// One varied command: joint, axis, base angle, range, phase offset, direction
type Varied = (&'static str, Axis, f32, f32, f32, Direction);

const UP: Direction = Direction::Increase;
const DOWN: Direction = Direction::Decrease;

/// Arms forward, thumbs tucked
const REACH: [Varied; 8] = [
    ("mixamorigLeftHandThumb1", Axis::X, -PI / 3.0, 0.2, 0.1, DOWN),
    ("mixamorigLeftForeArm", Axis::X, PI / 70.0, 0.1, 0.2, UP),
    ("mixamorigLeftForeArm", Axis::Z, -PI / 7.0, 0.15, 0.3, DOWN),
    ("mixamorigLeftArm", Axis::X, -PI / 6.0, 0.12, 0.4, DOWN),
    ("mixamorigRightHandThumb1", Axis::X, -PI / 3.0, 0.2, 0.5, DOWN),
    ("mixamorigRightForeArm", Axis::X, PI / 70.0, 0.1, 0.6, UP),
    ("mixamorigRightForeArm", Axis::Z, PI / 7.0, 0.15, 0.7, UP),
    ("mixamorigRightArm", Axis::X, -PI / 6.0, 0.12, 0.8, DOWN),
];

/// Forearm twist with head and wrist accents
const ACCENT: [Varied; 5] = [
    ("mixamorigLeftForeArm", Axis::Y, -PI / 2.5, 0.3, 0.9, UP),
    ("mixamorigRightForeArm", Axis::Y, PI / 2.5, 0.3, 1.0, DOWN),
    ("mixamorigHead", Axis::X, 0.1, 0.05, 1.1, UP),
    ("mixamorigLeftHand", Axis::Z, 0.2, 0.15, 1.2, UP),
    ("mixamorigRightHand", Axis::Z, -0.2, 0.15, 1.3, DOWN),
];

/// Stable 32-bit hash of the upper-cased name
///
/// `hash = hash * 31 + code_unit` over UTF-16 code units, wrapping.
pub fn seed_for(name: &str) -> i32 {
    name.to_uppercase()
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
}

/// Seeded variation around `base`
pub fn variation(seed: i32, base: f32, range: f32, offset: f32) -> f32 {
    let phase = f64::from(seed) * (0.1 + f64::from(offset));
    base + (phase.sin() as f32) * range
}

fn varied_group(seed: i32, steps: &[Varied]) -> CommandGroup {
    steps
        .iter()
        .map(|&(joint, axis, base, range, offset, dir)| {
            Command::rotate(joint, axis, variation(seed, base, range, offset), dir)
        })
        .collect()
}

/// Build the procedural gesture for `name`
///
/// Two varied groups followed by a group that returns every touched joint
/// to its neutral angle.
pub fn generate(name: &str) -> GestureDefinition {
    let seed = seed_for(name);
    let mut groups = vec![varied_group(seed, &REACH), varied_group(seed, &ACCENT)];
    let home = neutral_return(&groups);
    groups.push(home);
    log::debug!("Generated procedural gesture {} (seed {})", name, seed);
    GestureDefinition::new(name, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::neutral_angle;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("A", 65)]
    #[case("AB", 65 * 31 + 66)]
    #[case("hello", seed_for("HELLO"))]
    fn test_seed_for(#[case] name: &str, #[case] expected: i32) {
        assert_eq!(seed_for(name), expected);
    }

    #[test]
    fn test_seed_wraps_on_long_names() {
        // Must not panic on overflow
        let long = "Z".repeat(64);
        let _ = seed_for(&long);
    }

    #[test]
    fn test_variation_stays_in_range() {
        for seed in [-7_000_000, -1, 0, 42, i32::MAX] {
            let v = variation(seed, 1.0, 0.25, 0.3);
            assert!((0.75..=1.25).contains(&v), "{seed} -> {v}");
        }
        assert_eq!(variation(0, 0.5, 10.0, 0.0), 0.5);
    }

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generate("WAVE"), generate("wave"));
        assert_ne!(generate("WAVE"), generate("WAVES"));
    }

    #[test]
    fn test_generate_shape() {
        let def = generate("THANKS");
        assert_eq!(def.name, "THANKS");
        assert_eq!(def.group_count(), 3);
        assert_eq!(def.groups[0].len(), 8);
        assert_eq!(def.groups[1].len(), 5);
        // 13 touched joint axes, all distinct
        assert_eq!(def.groups[2].len(), 13);
    }

    #[test]
    fn test_generate_returns_to_neutral() {
        let def = generate("THANKS");
        let home = def.last_group().unwrap();
        for cmd in home.iter() {
            assert_eq!(cmd.target, neutral_angle(cmd.joint.as_str(), cmd.axis));
        }
        let fore_y = home
            .iter()
            .find(|c| c.joint.as_str() == "mixamorigRightForeArm" && c.axis == Axis::Y)
            .unwrap();
        assert_eq!(fore_y.target, PI / 1.5);
    }
}
