//! Custom signs: JSON store, resolution, compiler refresh and playback.

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use signbridge::compiler::UtteranceCompiler;
use signbridge::engine::{AvatarSpec, EngineConfig, PlaybackEngine, RigLoader, Skeleton};
use signbridge::gesture::{Axis, GestureLibrary};
use signbridge::signs::{resolve, GestureSource, JsonFileSignStore, SignRecord, SignStore};
use signbridge::synth::{
    GestureSynthesizer, HandObservation, Handedness, Landmark, LandmarkFrame, LandmarkRecording,
};

const FRAME: Duration = Duration::from_millis(16);

const WAVE_SCRIPT: &str = "\
# raise, then return
mixamorigRightArm z PI/2 +
mixamorigRightForeArm y 0.5 -
---
mixamorigRightArm z PI/3 -
mixamorigRightForeArm y PI/1.5 +
";

const SHORT_HELLO: &str = "mixamorigRightHand x 0.4 +\n";

fn open_hand(x: f32) -> HandObservation {
    let keypoints = (0..21)
        .map(|i| {
            let finger = (i.max(1) - 1) / 4;
            let joint = (i.max(1) - 1) % 4;
            Some(Landmark::new(x + finger as f32 * 0.02, 0.8 - joint as f32 * 0.05 - 0.05))
        })
        .collect();
    HandObservation::new(Handedness::Right, keypoints)
}

fn engine() -> PlaybackEngine {
    let config = EngineConfig {
        pause: Duration::from_millis(32),
        ..Default::default()
    };
    let mut engine = PlaybackEngine::new(config);
    engine.load_avatar(&RigLoader, &AvatarSpec::Ybot).unwrap();
    engine.run_until_idle(FRAME, 10_000);
    engine
}

#[test]
fn test_custom_signs_shadow_and_refresh() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileSignStore::open(dir.path().join("signs.json")).unwrap());
    store
        .create(SignRecord::new("hello").with_id("sign-1").with_code(SHORT_HELLO))
        .unwrap();

    let mut compiler = UtteranceCompiler::new(Arc::new(GestureLibrary::builtin()));
    compiler.attach_store(store.clone()).unwrap();

    let queue = compiler.compile("hello");
    assert_eq!(queue.captions(), vec!["HELLO "]);
    assert_eq!(queue.group_count(), 1);

    // unknown until created, then picked up without re-attaching
    assert_eq!(compiler.compile("wave").captions(), vec!["W", "A", "V", "E "]);
    store
        .create(SignRecord::new("Wave").with_id("sign-2").with_code(WAVE_SCRIPT))
        .unwrap();
    let queue = compiler.compile("wave");
    assert_eq!(queue.captions(), vec!["WAVE "]);
    assert_eq!(queue.group_count(), 2);

    store.delete("sign-1").unwrap();
    let builtin_hello = GestureLibrary::builtin().lookup("HELLO").unwrap().group_count();
    assert_eq!(compiler.compile("hello").group_count(), builtin_hello);
}

#[test]
fn test_scripted_sign_plays_to_target() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileSignStore::open(dir.path().join("signs.json")).unwrap());
    store.create(SignRecord::new("wave").with_code(WAVE_SCRIPT)).unwrap();

    let mut compiler = UtteranceCompiler::new(Arc::new(GestureLibrary::builtin()));
    compiler.attach_store(store).unwrap();
    let mut engine = engine();
    engine.enqueue(compiler.compile_sign("wave").unwrap()).unwrap();
    engine.run_until_idle(FRAME, 10_000);

    assert!(engine.ready_for_input());
    assert_eq!(engine.caption(), Some("WAVE"));
    let skeleton = engine.skeleton().unwrap();
    let arm = skeleton.rotation("mixamorigRightArm", Axis::Z).unwrap();
    assert!((arm - std::f32::consts::PI / 3.0).abs() < 1e-5);
}

#[test]
fn test_analyzed_sign_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signs.json");

    let mut recording = LandmarkRecording {
        duration: Some(0.3),
        frames: vec![
            LandmarkFrame {
                time: 0.0,
                hands: vec![open_hand(0.4)],
            },
            LandmarkFrame {
                time: 0.2,
                hands: vec![open_hand(0.6)],
            },
        ],
    };
    let (gesture, motion) = GestureSynthesizer::new().from_landmarks("thanks", &mut recording);
    assert!(motion.is_usable());
    assert_eq!(motion.animations.len(), gesture.group_count());

    {
        let store = JsonFileSignStore::open(&path).unwrap();
        store
            .create(SignRecord::new("thanks").with_id("sign-9").with_motion(motion))
            .unwrap();
    }

    let store = JsonFileSignStore::open(&path).unwrap();
    let record = store.get_by_name("Thanks").unwrap().unwrap();
    assert_eq!(record.id, "sign-9");
    let (resolved, source) = resolve(&record).unwrap();
    assert_eq!(source, GestureSource::MotionData);
    assert_eq!(resolved.group_count(), gesture.group_count());
}

#[test]
fn test_sign_without_motion_or_script_uses_placeholder() {
    let record = SignRecord::new("mystery");
    let (gesture, source) = resolve(&record).unwrap();
    assert_eq!(source, GestureSource::Placeholder);
    assert_eq!(gesture.name, "MYSTERY");
    assert!(gesture.group_count() > 0);
}
