//! Fingerspelling alphabet
//!
//! Letters are described as right-hand shapes and expanded into a
//! raise / shape / return sequence.

use std::f32::consts::PI;

use super::types::{Axis, Command, CommandGroup, Direction, GestureDefinition};

/// Right-hand shape for one letter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandShape {
    /// Curl of index, middle, ring, pinky (0 = straight, 1 = fist)
    pub fingers: [f32; 4],
    /// Thumb bend (0..1)
    pub thumb_bend: f32,
    /// Thumb across the palm (0..1)
    pub thumb_opposition: f32,
    /// Wrist movement traced after the shape (J and Z)
    pub trace: Option<(Axis, f32)>,
}

const fn shape(fingers: [f32; 4], thumb_bend: f32, thumb_opposition: f32) -> HandShape {
    HandShape {
        fingers,
        thumb_bend,
        thumb_opposition,
        trace: None,
    }
}

const FINGERS: [&str; 4] = ["Index", "Middle", "Ring", "Pinky"];

/// Per-segment share of a finger's curl
const SEGMENT_SCALE: [f32; 3] = [1.0, 0.8, 0.6];

const SHAPES: [(char, HandShape); 26] = [
    ('A', shape([1.0, 1.0, 1.0, 1.0], 0.0, 0.0)),
    ('B', shape([0.0, 0.0, 0.0, 0.0], 0.6, 1.0)),
    ('C', shape([0.5, 0.5, 0.5, 0.5], 0.3, 0.4)),
    ('D', shape([0.0, 0.7, 0.7, 0.7], 0.5, 0.8)),
    ('E', shape([0.9, 0.9, 0.9, 0.9], 0.8, 1.0)),
    ('F', shape([0.7, 0.0, 0.0, 0.0], 0.5, 0.8)),
    ('G', shape([0.0, 1.0, 1.0, 1.0], 0.0, 0.2)),
    ('H', shape([0.0, 0.0, 1.0, 1.0], 0.5, 0.8)),
    ('I', shape([1.0, 1.0, 1.0, 0.0], 0.6, 1.0)),
    (
        'J',
        HandShape {
            fingers: [1.0, 1.0, 1.0, 0.0],
            thumb_bend: 0.6,
            thumb_opposition: 1.0,
            trace: Some((Axis::Z, -PI / 4.0)),
        },
    ),
    ('K', shape([0.0, 0.0, 1.0, 1.0], 0.2, 0.6)),
    ('L', shape([0.0, 1.0, 1.0, 1.0], 0.0, 0.0)),
    ('M', shape([0.8, 0.8, 0.8, 1.0], 0.9, 1.0)),
    ('N', shape([0.8, 0.8, 1.0, 1.0], 0.9, 1.0)),
    ('O', shape([0.6, 0.6, 0.6, 0.6], 0.5, 0.7)),
    ('P', shape([0.0, 0.3, 1.0, 1.0], 0.2, 0.6)),
    ('Q', shape([0.2, 1.0, 1.0, 1.0], 0.2, 0.3)),
    ('R', shape([0.0, 0.0, 1.0, 1.0], 0.7, 1.0)),
    ('S', shape([1.0, 1.0, 1.0, 1.0], 0.7, 1.0)),
    ('T', shape([0.8, 1.0, 1.0, 1.0], 0.4, 0.9)),
    ('U', shape([0.0, 0.0, 1.0, 1.0], 0.6, 1.0)),
    ('V', shape([0.0, 0.0, 1.0, 1.0], 0.6, 0.9)),
    ('W', shape([0.0, 0.0, 0.0, 1.0], 0.6, 1.0)),
    ('X', shape([0.5, 1.0, 1.0, 1.0], 0.6, 1.0)),
    ('Y', shape([1.0, 1.0, 1.0, 0.0], 0.0, 0.0)),
    (
        'Z',
        HandShape {
            fingers: [0.0, 1.0, 1.0, 1.0],
            thumb_bend: 0.6,
            thumb_opposition: 1.0,
            trace: Some((Axis::Y, PI / 6.0)),
        },
    ),
];

/// Look up the hand shape for a letter (case-insensitive)
pub fn hand_shape(letter: char) -> Option<HandShape> {
    let letter = letter.to_ascii_uppercase();
    SHAPES.iter().find(|(c, _)| *c == letter).map(|(_, s)| *s)
}

/// Letters with a defined shape, in order
pub fn letters() -> impl Iterator<Item = char> {
    SHAPES.iter().map(|(c, _)| *c)
}

fn rotate(joint: String, axis: Axis, target: f32, direction: Direction) -> Command {
    Command::rotate(joint, axis, target, direction)
}

/// Expand a hand shape into a full letter gesture
pub fn letter_gesture(letter: char, shape: &HandShape) -> GestureDefinition {
    use Direction::{Decrease, Increase};

    let raise: CommandGroup = vec![
        rotate("mixamorigRightArm".into(), Axis::Z, PI / 6.0, Decrease),
        rotate("mixamorigRightArm".into(), Axis::X, -PI / 5.0, Decrease),
        rotate("mixamorigRightForeArm".into(), Axis::Z, PI / 2.5, Increase),
    ]
    .into_iter()
    .collect();

    let mut form = CommandGroup::default();
    let mut release = CommandGroup::default();
    for (finger, curl) in FINGERS.iter().zip(shape.fingers) {
        for (segment, scale) in SEGMENT_SCALE.iter().enumerate() {
            let joint = format!("mixamorigRightHand{}{}", finger, segment + 1);
            form.push(rotate(joint.clone(), Axis::Z, curl * scale * PI / 2.0, Increase));
            release.push(rotate(joint, Axis::Z, 0.0, Decrease));
        }
    }
    form.push(rotate(
        "mixamorigRightHandThumb1".into(),
        Axis::Y,
        shape.thumb_opposition * PI / 4.0,
        Increase,
    ));
    release.push(rotate("mixamorigRightHandThumb1".into(), Axis::Y, 0.0, Decrease));
    for (segment, scale) in [(2, 0.7), (3, 0.5)] {
        let joint = format!("mixamorigRightHandThumb{}", segment);
        form.push(rotate(joint.clone(), Axis::Z, shape.thumb_bend * scale * PI / 2.0, Increase));
        release.push(rotate(joint, Axis::Z, 0.0, Decrease));
    }

    let mut groups = vec![raise, form];
    if let Some((axis, target)) = shape.trace {
        let dir = Direction::toward(0.0, target);
        groups.push(vec![rotate("mixamorigRightHand".into(), axis, target, dir)].into_iter().collect());
        release.push(rotate("mixamorigRightHand".into(), axis, 0.0, Direction::toward(target, 0.0)));
    }

    release.push(rotate("mixamorigRightArm".into(), Axis::Z, PI / 3.0, Increase));
    release.push(rotate("mixamorigRightArm".into(), Axis::X, 0.0, Increase));
    release.push(rotate("mixamorigRightForeArm".into(), Axis::Z, 0.0, Decrease));
    groups.push(release);

    GestureDefinition::new(&letter.to_string(), groups)
}
