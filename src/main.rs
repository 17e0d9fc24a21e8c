use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use signbridge::cli::{Cli, Commands, SignsCommand};
use signbridge::compiler::UtteranceCompiler;
use signbridge::config::{self, Options};
use signbridge::engine::{PlaybackEngine, RigLoader, Skeleton, TickOutcome};
use signbridge::gesture::{script, Axis, GestureLibrary, GestureQueue};
use signbridge::logging::{self, LogLevel};
use signbridge::signs::{JsonFileSignStore, SignRecord, SignStore};
use signbridge::synth::{GestureSynthesizer, LandmarkRecording};
use signbridge::{log_info, log_warning};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (early); the configured level applies after merge
    logging::init(LogLevel::default());

    let options = config::load_config(cli.config.as_deref())?;
    let options = cli.merge_into_options(options)?;
    logging::init(options.log_level.unwrap_or_default());
    log_info!("signbridge {} starting", env!("CARGO_PKG_VERSION"));

    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Play {
            text,
            max_frames,
            pose,
        } => run_play(&options, &text.join(" "), max_frames, pose),
        Commands::Learn { name } => run_learn(&options, &name),
        Commands::Synth { name } => {
            let gesture = GestureSynthesizer::new().procedural(&name);
            print!("{}", gesture.to_script());
            Ok(())
        }
        Commands::Analyze {
            landmarks,
            name,
            save,
        } => run_analyze(&options, &landmarks, &name, save),
        Commands::Signs { action } => run_signs(&options, action),
    }
}

fn open_store(options: &Options) -> Result<Option<Arc<JsonFileSignStore>>> {
    let Some(path) = options.signs_file.as_ref() else {
        return Ok(None);
    };
    let store = JsonFileSignStore::open(path)
        .with_context(|| format!("Failed to open sign store {}", path.display()))?;
    Ok(Some(Arc::new(store)))
}

fn build_compiler(options: &Options) -> Result<UtteranceCompiler> {
    let mut compiler = UtteranceCompiler::new(Arc::new(GestureLibrary::builtin()));
    if let Some(store) = open_store(options)? {
        compiler
            .attach_store(store)
            .context("Failed to read custom signs")?;
    }
    Ok(compiler)
}

/// Engine with the configured avatar loaded and settled in its default pose
fn build_engine(options: &Options, max_frames: usize) -> Result<PlaybackEngine> {
    let mut engine = PlaybackEngine::new(options.engine_config());
    let loaded = engine.load_avatar_with_fallback(&RigLoader, &options.avatar())?;
    log_info!("Using avatar {}", loaded);
    engine.run_until_idle(options.frame_duration(), max_frames);
    Ok(engine)
}

/// Tick until idle, printing caption changes
fn play(engine: &mut PlaybackEngine, queue: GestureQueue, frame: Duration, max_frames: usize) -> Result<()> {
    engine.enqueue(queue)?;
    let mut frames = 0;
    while engine.is_running() && frames < max_frames {
        frames += 1;
        match engine.tick(frame) {
            TickOutcome::Caption(text) if engine.config().captions => {
                println!("[{:>6}] {}", frames, text.trim_end());
            }
            TickOutcome::Recovered => log_warning!("Playback recovered from an error at frame {}", frames),
            _ => {}
        }
    }
    if engine.is_running() {
        log_warning!("Stopped after {} frames with work still queued", frames);
        engine.stop();
    }

    let stats = engine.stats();
    log_info!(
        "Played {} frames: {} groups, {} commands ({} skipped)",
        frames,
        stats.groups_retired,
        stats.commands_retired,
        stats.commands_skipped
    );
    Ok(())
}

fn print_pose(skeleton: &dyn Skeleton) {
    for joint in skeleton.joint_names() {
        for axis in Axis::ALL {
            match skeleton.rotation(&joint, axis) {
                Some(angle) if angle.abs() > 1e-6 => println!("{}.{} = {:.4}", joint, axis, angle),
                _ => {}
            }
        }
    }
}

fn run_play(options: &Options, text: &str, max_frames: usize, pose: bool) -> Result<()> {
    let mut compiler = build_compiler(options)?;
    let mut engine = build_engine(options, max_frames)?;

    let queue = compiler.compile(text);
    if queue.is_empty() {
        log_warning!("Nothing to sign");
        return Ok(());
    }
    play(&mut engine, queue, options.frame_duration(), max_frames)?;

    let transcript = engine.state().captions().transcript();
    if !transcript.is_empty() {
        println!("{}", transcript.trim_end());
    }
    if pose {
        if let Some(skeleton) = engine.skeleton() {
            print_pose(skeleton);
        }
    }
    Ok(())
}

fn run_learn(options: &Options, name: &str) -> Result<()> {
    let mut compiler = build_compiler(options)?;
    let mut chars = name.trim().chars();
    let queue = match (chars.next(), chars.next()) {
        (Some(letter), None) => compiler.compile_letter(letter),
        _ => compiler.compile_sign(name),
    };
    let queue = queue.with_context(|| format!("No sign named {}", name))?;

    let max_frames = 100_000;
    let mut engine = build_engine(options, max_frames)?;
    play(&mut engine, queue, options.frame_duration(), max_frames)
}

fn run_analyze(options: &Options, landmarks: &Path, name: &str, save: bool) -> Result<()> {
    let text = fs::read_to_string(landmarks)
        .with_context(|| format!("Failed to read landmarks {}", landmarks.display()))?;
    let mut recording = LandmarkRecording::from_json(&text)?;

    let (gesture, motion) = GestureSynthesizer::new().from_landmarks(name, &mut recording);
    log_info!(
        "Analyzed {} frames over {:.1}s into {} groups",
        motion.frame_count,
        motion.duration,
        gesture.group_count()
    );

    let mut record = SignRecord::new(name).with_motion(motion);
    if save {
        let store = open_store(options)?.context("No sign store configured; pass --signs or set signs_file")?;
        record = store.create(record)?;
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_signs(options: &Options, action: SignsCommand) -> Result<()> {
    let store = open_store(options)?.context("No sign store configured; pass --signs or set signs_file")?;

    match action {
        SignsCommand::List => {
            for record in store.list()? {
                println!("{}\t{}\t{}", record.id, record.name, record.description);
            }
        }
        SignsCommand::Show { name } => {
            let record = store
                .get_by_name(&name)?
                .with_context(|| format!("No sign named {}", name))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        SignsCommand::Add {
            name,
            script: script_file,
            description,
        } => {
            let mut record = SignRecord::new(&name);
            if let Some(path) = script_file {
                let code = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read script {}", path.display()))?;
                script::parse(&name, &code).with_context(|| format!("Invalid gesture script {}", path.display()))?;
                record = record.with_code(code);
            }
            if let Some(description) = description {
                record = record.with_description(description);
            }
            let record = store.create(record)?;
            println!("Created {} ({})", record.id, record.name);
        }
        SignsCommand::Delete { id } => {
            let record = store.delete(&id)?;
            println!("Deleted {} ({})", record.id, record.name);
        }
    }
    Ok(())
}
