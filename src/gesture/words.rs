//! Built-in word signs
//!
//! Each entry is a list of command-groups written as
//! `(joint, axis, target, direction)` steps.

use std::f32::consts::PI;

use super::types::Axis::{X, Y, Z};
use super::types::{Axis, Command, CommandGroup, Direction, GestureDefinition};

pub(crate) type Step = (&'static str, Axis, f32, Direction);

const UP: Direction = Direction::Increase;
const DOWN: Direction = Direction::Decrease;

pub(crate) fn build(name: &str, groups: &[&[Step]]) -> GestureDefinition {
    let groups = groups
        .iter()
        .map(|steps| {
            steps
                .iter()
                .map(|&(joint, axis, target, dir)| Command::rotate(joint, axis, target, dir))
                .collect::<CommandGroup>()
        })
        .collect();
    GestureDefinition::new(name, groups)
}

/// Return-to-neutral group shared by the two-handed "arms forward" signs
const BOTH_ARMS_HOME: &[Step] = &[
    ("mixamorigLeftHandThumb1", X, 0.0, UP),
    ("mixamorigLeftForeArm", X, 0.0, DOWN),
    ("mixamorigLeftForeArm", Z, 0.0, UP),
    ("mixamorigLeftArm", X, 0.0, UP),
    ("mixamorigRightHandThumb1", X, 0.0, UP),
    ("mixamorigRightForeArm", X, 0.0, DOWN),
    ("mixamorigRightForeArm", Z, 0.0, DOWN),
    ("mixamorigRightArm", X, 0.0, UP),
    ("mixamorigLeftForeArm", Y, -PI / 1.5, DOWN),
    ("mixamorigRightForeArm", Y, PI / 1.5, UP),
    ("mixamorigHead", X, 0.0, DOWN),
    ("mixamorigLeftHand", Z, 0.0, DOWN),
    ("mixamorigRightHand", Z, 0.0, UP),
];

const APPLE: &[&[Step]] = &[
    &[
        ("mixamorigLeftHandThumb1", X, -1.196_131_1, DOWN),
        ("mixamorigLeftForeArm", X, 0.014_303_456, UP),
        ("mixamorigLeftForeArm", Z, -0.299_693_67, DOWN),
        ("mixamorigLeftArm", X, -0.584_189_8, DOWN),
        ("mixamorigRightHandThumb1", X, -1.163_645_7, DOWN),
        ("mixamorigRightForeArm", X, 0.142_857_36, UP),
        ("mixamorigRightForeArm", Z, 0.416_276_15, UP),
        ("mixamorigRightArm", X, -0.619_952_4, DOWN),
    ],
    &[
        ("mixamorigLeftForeArm", Y, -0.995_137_3, UP),
        ("mixamorigRightForeArm", Y, 1.284_253_9, DOWN),
        ("mixamorigHead", X, 0.052_662_86, UP),
        ("mixamorigLeftHand", Z, 0.302_009_6, UP),
        ("mixamorigRightHand", Z, -0.141_182_98, DOWN),
    ],
    BOTH_ARMS_HOME,
];

const FIFTY: &[&[Step]] = &[
    &[
        ("mixamorigLeftHandThumb1", X, -0.847_758_8, DOWN),
        ("mixamorigLeftForeArm", X, 0.107_213_23, UP),
        ("mixamorigLeftForeArm", Z, -0.471_194_86, DOWN),
        ("mixamorigLeftArm", X, -0.622_769_96, DOWN),
        ("mixamorigRightHandThumb1", X, -1.242_165_3, DOWN),
        ("mixamorigRightForeArm", X, -0.005_079_669, UP),
        ("mixamorigRightForeArm", Z, 0.493_088_7, UP),
        ("mixamorigRightArm", X, -0.415_451_28, DOWN),
    ],
    &[
        ("mixamorigLeftForeArm", Y, -0.977_448_1, UP),
        ("mixamorigRightForeArm", Y, 1.366_034_5, DOWN),
        ("mixamorigHead", X, 0.078_269_77, UP),
        ("mixamorigLeftHand", Z, 0.056_625_8, UP),
        ("mixamorigRightHand", Z, -0.329_833_73, DOWN),
    ],
    BOTH_ARMS_HOME,
];

const LOT: &[&[Step]] = &[
    &[
        ("mixamorigLeftHandThumb1", X, -0.968_898_4, DOWN),
        ("mixamorigLeftForeArm", X, 0.127_221_87, UP),
        ("mixamorigLeftForeArm", Z, -0.556_872_9, DOWN),
        ("mixamorigLeftArm", X, -0.587_864_4, DOWN),
        ("mixamorigRightHandThumb1", X, -0.860_303_4, DOWN),
        ("mixamorigRightForeArm", X, 0.061_097_83, UP),
        ("mixamorigRightForeArm", Z, 0.298_908_55, UP),
        ("mixamorigRightArm", X, -0.495_149_35, DOWN),
    ],
    &[
        ("mixamorigLeftForeArm", Y, -0.985_273_7, UP),
        ("mixamorigRightForeArm", Y, 1.077_090_3, DOWN),
        ("mixamorigHead", X, 0.066_729_08, UP),
        ("mixamorigLeftHand", Z, 0.329_653_55, UP),
        ("mixamorigRightHand", Z, -0.151_990_3, DOWN),
    ],
    BOTH_ARMS_HOME,
];

// Salute from the forehead outward.
const HELLO: &[&[Step]] = &[
    &[
        ("mixamorigRightArm", Z, PI / 12.0, DOWN),
        ("mixamorigRightArm", X, -PI / 4.0, DOWN),
        ("mixamorigRightForeArm", Z, PI / 2.2, UP),
        ("mixamorigRightHand", X, -PI / 8.0, DOWN),
    ],
    &[
        ("mixamorigRightArm", Y, PI / 6.0, UP),
        ("mixamorigRightForeArm", Z, PI / 3.0, DOWN),
        ("mixamorigHead", Y, PI / 24.0, UP),
    ],
    &[
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, 0.0, UP),
        ("mixamorigRightArm", Y, 0.0, DOWN),
        ("mixamorigRightForeArm", Z, 0.0, DOWN),
        ("mixamorigRightHand", X, 0.0, UP),
        ("mixamorigHead", Y, 0.0, DOWN),
    ],
];

// Flat-O touching the cheek near the mouth, then near the ear.
const HOME: &[&[Step]] = &[
    &[
        ("mixamorigRightArm", Z, 0.0, DOWN),
        ("mixamorigRightArm", X, -PI / 3.5, DOWN),
        ("mixamorigRightForeArm", Z, PI / 1.9, UP),
        ("mixamorigRightHandIndex1", Z, PI / 3.0, UP),
        ("mixamorigRightHandMiddle1", Z, PI / 3.0, UP),
        ("mixamorigRightHandRing1", Z, PI / 3.0, UP),
        ("mixamorigRightHandPinky1", Z, PI / 3.0, UP),
        ("mixamorigRightHandThumb1", Y, PI / 6.0, UP),
    ],
    &[
        ("mixamorigRightArm", Y, PI / 9.0, UP),
        ("mixamorigRightHand", Z, -PI / 12.0, DOWN),
    ],
    &[
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, 0.0, UP),
        ("mixamorigRightArm", Y, 0.0, DOWN),
        ("mixamorigRightForeArm", Z, 0.0, DOWN),
        ("mixamorigRightHandIndex1", Z, 0.0, DOWN),
        ("mixamorigRightHandMiddle1", Z, 0.0, DOWN),
        ("mixamorigRightHandRing1", Z, 0.0, DOWN),
        ("mixamorigRightHandPinky1", Z, 0.0, DOWN),
        ("mixamorigRightHandThumb1", Y, 0.0, DOWN),
        ("mixamorigRightHand", Z, 0.0, UP),
    ],
];

// Index finger tapping the back of the opposite wrist.
const TIME: &[&[Step]] = &[
    &[
        ("mixamorigLeftArm", Z, -PI / 6.0, UP),
        ("mixamorigLeftArm", X, -PI / 5.0, DOWN),
        ("mixamorigLeftForeArm", Z, -PI / 2.5, DOWN),
        ("mixamorigLeftHandIndex1", Z, -PI / 2.0, DOWN),
        ("mixamorigLeftHandMiddle1", Z, -PI / 2.0, DOWN),
        ("mixamorigLeftHandRing1", Z, -PI / 2.0, DOWN),
        ("mixamorigLeftHandPinky1", Z, -PI / 2.0, DOWN),
        ("mixamorigRightArm", Z, PI / 6.0, DOWN),
        ("mixamorigRightArm", X, -PI / 4.5, DOWN),
        ("mixamorigRightForeArm", Z, PI / 2.5, UP),
        ("mixamorigRightHandMiddle1", Z, PI / 2.0, UP),
        ("mixamorigRightHandRing1", Z, PI / 2.0, UP),
        ("mixamorigRightHandPinky1", Z, PI / 2.0, UP),
    ],
    &[("mixamorigRightHand", X, PI / 8.0, UP)],
    &[("mixamorigRightHand", X, 0.0, DOWN)],
    &[
        ("mixamorigLeftArm", Z, -PI / 3.0, DOWN),
        ("mixamorigLeftArm", X, 0.0, UP),
        ("mixamorigLeftForeArm", Z, 0.0, UP),
        ("mixamorigLeftHandIndex1", Z, 0.0, UP),
        ("mixamorigLeftHandMiddle1", Z, 0.0, UP),
        ("mixamorigLeftHandRing1", Z, 0.0, UP),
        ("mixamorigLeftHandPinky1", Z, 0.0, UP),
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, 0.0, UP),
        ("mixamorigRightForeArm", Z, 0.0, DOWN),
        ("mixamorigRightHandMiddle1", Z, 0.0, DOWN),
        ("mixamorigRightHandRing1", Z, 0.0, DOWN),
        ("mixamorigRightHandPinky1", Z, 0.0, DOWN),
    ],
];

// Both flat hands tracing down the sides of the body.
const PERSON: &[&[Step]] = &[
    &[
        ("mixamorigLeftArm", Z, -PI / 5.0, UP),
        ("mixamorigLeftArm", X, -PI / 6.0, DOWN),
        ("mixamorigLeftForeArm", Z, -PI / 4.0, DOWN),
        ("mixamorigRightArm", Z, PI / 5.0, DOWN),
        ("mixamorigRightArm", X, -PI / 6.0, DOWN),
        ("mixamorigRightForeArm", Z, PI / 4.0, UP),
    ],
    &[
        ("mixamorigLeftForeArm", Z, -PI / 12.0, UP),
        ("mixamorigRightForeArm", Z, PI / 12.0, DOWN),
    ],
    &[
        ("mixamorigLeftArm", Z, -PI / 3.0, DOWN),
        ("mixamorigLeftArm", X, 0.0, UP),
        ("mixamorigLeftForeArm", Z, 0.0, UP),
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, 0.0, UP),
        ("mixamorigRightForeArm", Z, 0.0, DOWN),
    ],
];

// Index finger pointing forward.
const YOU: &[&[Step]] = &[
    &[
        ("mixamorigRightArm", Z, PI / 8.0, DOWN),
        ("mixamorigRightArm", X, -PI / 3.0, DOWN),
        ("mixamorigRightForeArm", Z, PI / 8.0, UP),
        ("mixamorigRightHandMiddle1", Z, PI / 2.0, UP),
        ("mixamorigRightHandRing1", Z, PI / 2.0, UP),
        ("mixamorigRightHandPinky1", Z, PI / 2.0, UP),
        ("mixamorigRightHandThumb1", Y, PI / 4.0, UP),
    ],
    &[
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, 0.0, UP),
        ("mixamorigRightForeArm", Z, 0.0, DOWN),
        ("mixamorigRightHandMiddle1", Z, 0.0, DOWN),
        ("mixamorigRightHandRing1", Z, 0.0, DOWN),
        ("mixamorigRightHandPinky1", Z, 0.0, DOWN),
        ("mixamorigRightHandThumb1", Y, 0.0, DOWN),
    ],
];

/// The rest pose applied when an avatar is attached
pub(crate) const DEFAULT_POSE: &[&[Step]] = &[&[
    ("mixamorigNeck", X, PI / 12.0, UP),
    ("mixamorigLeftArm", Z, -PI / 3.0, DOWN),
    ("mixamorigLeftForeArm", Y, -PI / 1.5, DOWN),
    ("mixamorigRightArm", Z, PI / 3.0, UP),
    ("mixamorigRightForeArm", Y, PI / 1.5, UP),
]];

/// Right arm raise and return, used when a stored sign has no usable motion
pub(crate) const PLACEHOLDER: &[&[Step]] = &[
    &[
        ("mixamorigRightArm", Z, PI / 3.0, UP),
        ("mixamorigRightArm", X, -PI / 6.0, DOWN),
    ],
    &[
        ("mixamorigRightArm", Z, 0.0, DOWN),
        ("mixamorigRightArm", X, 0.0, UP),
    ],
];

pub(crate) const WORDS: &[(&str, &[&[Step]])] = &[
    ("APPLE", APPLE),
    ("FIFTY", FIFTY),
    ("HELLO", HELLO),
    ("HOME", HOME),
    ("LOT", LOT),
    ("PERSON", PERSON),
    ("TIME", TIME),
    ("YOU", YOU),
];
