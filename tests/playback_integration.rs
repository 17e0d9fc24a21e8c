//! End-to-end playback: compile text, enqueue, tick to idle.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use signbridge::compiler::UtteranceCompiler;
use signbridge::engine::{
    EngineConfig, PlaybackEngine, RigDescription, RigJoint, RigLoader, AvatarSpec, Skeleton,
    SkeletonPose, TickOutcome,
};
use signbridge::gesture::{
    Axis, Command, CommandGroup, Direction, GestureDefinition, GestureLibrary, GestureQueue,
    QueueEntry,
};

const FRAME: Duration = Duration::from_millis(16);

fn compiler() -> UtteranceCompiler {
    UtteranceCompiler::new(Arc::new(GestureLibrary::builtin()))
}

/// Engine on a Mixamo rig with the default pose already played
fn mixamo_engine(pause: Duration) -> PlaybackEngine {
    let config = EngineConfig {
        pause,
        ..Default::default()
    };
    let mut engine = PlaybackEngine::new(config);
    engine.load_avatar(&RigLoader, &AvatarSpec::Ybot).unwrap();
    engine.run_until_idle(FRAME, 10_000);
    assert!(engine.ready_for_input());
    engine
}

fn one_joint_engine(rest: f32) -> PlaybackEngine {
    let rig = RigDescription {
        name: "single".into(),
        joints: vec![RigJoint {
            name: "j".into(),
            axes: Some("x".into()),
            rest: [rest, 0.0, 0.0],
        }],
    };
    let config = EngineConfig {
        pause: Duration::ZERO,
        ..Default::default()
    };
    let mut engine = PlaybackEngine::new(config).with_default_pose(GestureDefinition::default());
    engine.attach_skeleton(Box::new(SkeletonPose::from_rig(&rig).unwrap()));
    engine
}

#[test]
fn test_hello_world_queue_shape() {
    let library = GestureLibrary::builtin();
    let hello = library.lookup("HELLO").unwrap();
    assert!(library.lookup("WORLD").is_none());

    let queue = compiler().compile("HELLO WORLD");
    assert_eq!(queue.captions(), vec!["HELLO ", "W", "O", "R", "L", "D "]);

    let entries: Vec<&QueueEntry> = queue.iter().collect();
    assert_eq!(entries[0].caption(), Some("HELLO "));
    for (i, group) in hello.groups.iter().enumerate() {
        assert_eq!(entries[1 + i].group(), Some(group));
    }

    let mut index = 1 + hello.group_count();
    for letter in ['W', 'O', 'R', 'L', 'D'] {
        assert!(entries[index].is_caption());
        let spelled = library.letter(letter).unwrap();
        index += 1;
        for group in &spelled.groups {
            assert_eq!(entries[index].group(), Some(group));
            index += 1;
        }
    }
    assert_eq!(index, entries.len());
}

#[test]
fn test_empty_text_is_noop() {
    let queue = compiler().compile("");
    assert!(queue.is_empty());

    let mut engine = mixamo_engine(Duration::from_millis(100));
    engine.enqueue(queue).unwrap();
    assert_eq!(engine.tick(FRAME), TickOutcome::Idle);
    assert!(engine.ready_for_input());
}

#[test]
fn test_utterance_plays_to_idle() {
    let mut engine = mixamo_engine(Duration::from_millis(50));
    let queue = compiler().compile("Hello, you. Hi");
    let groups = queue.group_count() as u64;
    engine.enqueue(queue).unwrap();

    let ticks = engine.run_until_idle(FRAME, 50_000);
    assert!(ticks < 50_000, "playback never drained");
    assert!(engine.ready_for_input());
    assert_eq!(engine.stats().recoveries, 0);
    // default pose group plus the utterance
    assert_eq!(engine.stats().groups_retired, groups + 1);
    assert_eq!(engine.caption(), Some("I "));
    assert_eq!(engine.state().captions().transcript(), "HELLO, YOU HI ");
}

#[test]
fn test_second_compile_appends_in_order() {
    let mut engine = mixamo_engine(Duration::from_millis(50));
    let mut compiler = compiler();

    let first = compiler.compile("home");
    let first_groups = first.group_count() as u64;
    engine.enqueue(first).unwrap();
    for _ in 0..3 {
        engine.tick(FRAME);
    }
    engine.enqueue(compiler.compile("time")).unwrap();

    let mut seen_time = false;
    while engine.is_running() {
        if let TickOutcome::Caption(text) = engine.tick(FRAME) {
            if text == "TIME " {
                // every HOME group plus the default pose is done
                assert_eq!(engine.stats().groups_retired, first_groups + 1);
                seen_time = true;
            }
        }
    }
    assert!(seen_time);
    assert_eq!(engine.state().captions().transcript(), "HOME TIME ");
}

#[test]
fn test_absent_joint_does_not_disturb_others() {
    let mut engine = one_joint_engine(0.0);
    let mut queue = GestureQueue::new();
    queue.push_group(CommandGroup::new(vec![
        Command::rotate("j", Axis::X, 0.35, Direction::Increase),
        Command::rotate("mixamorigTail", Axis::X, 1.0, Direction::Increase),
    ]));
    engine.enqueue(queue).unwrap();

    assert_eq!(
        engine.tick(FRAME),
        TickOutcome::Advanced {
            moved: 1,
            remaining: 1
        }
    );
    assert_eq!(engine.stats().commands_skipped, 1);
    let angle = engine.skeleton().unwrap().rotation("j", Axis::X).unwrap();
    assert!((angle - 0.1).abs() < 1e-6);
}

#[test]
fn test_satisfied_group_drains_after_one_pause() {
    let mut engine = one_joint_engine(0.5);
    let mut queue = GestureQueue::new();
    queue.push_group(CommandGroup::new(vec![
        Command::rotate("j", Axis::X, 0.2, Direction::Increase),
        Command::rotate("j", Axis::X, 0.9, Direction::Decrease),
    ]));
    engine.enqueue(queue).unwrap();

    let mut pauses = 0;
    for _ in 0..10 {
        match engine.tick(FRAME) {
            TickOutcome::Paused => pauses += 1,
            TickOutcome::Drained => break,
            other => panic!("unexpected outcome {:?}", other),
        }
    }
    assert_eq!(pauses, 1);
    assert!(engine.ready_for_input());
    assert_eq!(engine.stats().groups_retired, 1);
}

#[test]
fn test_avatar_reload_discards_queue() {
    let mut engine = mixamo_engine(Duration::from_millis(50));
    engine.enqueue(compiler().compile("apple")).unwrap();
    engine.tick(FRAME);
    engine.tick(FRAME);

    engine.load_avatar(&RigLoader, &AvatarSpec::Xbot).unwrap();
    assert_eq!(engine.skeleton().unwrap().name(), "xbot");
    assert_eq!(engine.caption(), None);
    // only the default pose is queued
    assert_eq!(engine.state().queue().group_count(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_ticks_never_overshoot(
        start in -3.0f32..3.0,
        target in -3.0f32..3.0,
        increase in any::<bool>(),
        speed in 0.01f32..1.0,
    ) {
        let direction = if increase { Direction::Increase } else { Direction::Decrease };
        let mut engine = one_joint_engine(start);
        engine.set_angular_speed(speed).unwrap();
        let mut queue = GestureQueue::new();
        queue.push_group(CommandGroup::new(vec![Command::rotate("j", Axis::X, target, direction)]));
        engine.enqueue(queue).unwrap();

        let limit = ((target - start).abs() / speed) as usize + 5;
        let mut last = start;
        for _ in 0..limit {
            engine.tick(FRAME);
            let value = engine.skeleton().unwrap().rotation("j", Axis::X).unwrap();
            match direction {
                Direction::Increase => {
                    prop_assert!(value <= target.max(start));
                    prop_assert!(value >= last);
                }
                Direction::Decrease => {
                    prop_assert!(value >= target.min(start));
                    prop_assert!(value <= last);
                }
            }
            last = value;
        }
        prop_assert!(engine.ready_for_input());
        let reachable = match direction {
            Direction::Increase => start < target,
            Direction::Decrease => start > target,
        };
        if reachable {
            prop_assert_eq!(last, target);
        } else {
            prop_assert_eq!(last, start);
        }
    }
}
