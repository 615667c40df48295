use rand::SeedableRng;
use rand::rngs::StdRng;
use ringbuf::traits::{Consumer, Producer};
use rudiment_trainer::messaging::NotificationConsumer;
use rudiment_trainer::{
    Command, ManualClock, PracticeConfig, PracticeSession, QueueTrigger, RealtimeClock,
    RecordingTrigger, TriggerEvent, create_command_channel, create_notification_channel,
    create_trigger_channel, render_timeline, run_realtime,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

// Ringbuffer capacity constants
// A thirty-second at 200 BPM fires every 37.5 ms, two triggers each;
// 256 slots cover several seconds of a stalled consumer
const TRIGGER_RINGBUFFER_CAPACITY: usize = 256;
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

const DEFAULT_SECONDS: u64 = 10;

const USAGE: &str = "Usage: rudiment_trainer [--config FILE] [--bpm N] [--seconds N] \
[--seed N] [--ramp CYCLES] [--dry-run]";

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    bpm: Option<u32>,
    seconds: Option<u64>,
    seed: Option<u64>,
    ramp_cycles: Option<u32>,
    dry_run: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<CliOptions, String> {
    fn value<T: std::str::FromStr>(
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<T, String> {
        let raw = args
            .next()
            .ok_or_else(|| format!("Missing value for {}", flag))?;
        raw.parse()
            .map_err(|_| format!("Invalid value for {}: {}", flag, raw))
    }

    let mut options = CliOptions::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => options.config = Some(value(&arg, &mut args)?),
            "--bpm" => options.bpm = Some(value(&arg, &mut args)?),
            "--seconds" => options.seconds = Some(value(&arg, &mut args)?),
            "--seed" => options.seed = Some(value(&arg, &mut args)?),
            "--ramp" => options.ramp_cycles = Some(value(&arg, &mut args)?),
            "--dry-run" => options.dry_run = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(options)
}

/// Log to stderr, filtered by RUST_LOG (info when unset)
fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Logger already initialised: {}", e);
    }
}

fn build_config(options: &CliOptions) -> Result<PracticeConfig, Box<dyn std::error::Error>> {
    let mut config = match &options.config {
        Some(path) => PracticeConfig::load(path)?,
        None => PracticeConfig::default(),
    };
    if let Some(bpm) = options.bpm {
        config.bpm = bpm;
    }
    if let Some(cycles) = options.ramp_cycles {
        config.auto_ramp.enabled = true;
        config.auto_ramp.cycles = cycles;
    }
    Ok(config.validate()?)
}

fn drain_notifications(notifications: &mut NotificationConsumer) {
    while let Some(notification) = notifications.try_pop() {
        println!(
            "[{:?}] {}: {}",
            notification.level, notification.title, notification.message
        );
    }
}

fn dry_run(
    config: &PracticeConfig,
    rng: &mut StdRng,
    seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = PracticeSession::new(config, RecordingTrigger::new(), ManualClock::new());
    session.generate_random(rng)?;

    println!("Sequence:");
    for (index, note) in session.sequence().notes().iter().enumerate() {
        println!(
            "  {:>2}. {:<18} {}",
            index + 1,
            note.kind().to_string(),
            note.pattern()
        );
    }

    let timeline = render_timeline(
        session.sequence(),
        config.tempo(),
        config.ramp_state(),
        config.gate(),
        Duration::from_secs(seconds),
    )?;

    println!("\nTimeline ({} s at {}):", seconds, config.tempo());
    for trigger in &timeline.triggers {
        let event = match trigger.event {
            TriggerEvent::Click => "click".to_string(),
            TriggerEvent::Strike(strike) => format!("strike {}", strike),
        };
        println!(
            "  {:>9.3} ms  note {:>2} sub {}  {}",
            trigger.at.as_secs_f64() * 1000.0,
            trigger.position.note_index + 1,
            trigger.position.subdivision_index + 1,
            event
        );
    }
    println!(
        "\n{} loops completed, final tempo {}",
        timeline.completed_loops,
        timeline.final_tempo.unwrap_or_else(|| config.tempo())
    );
    Ok(())
}

fn play(
    config: &PracticeConfig,
    rng: &mut StdRng,
    seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let (trigger_tx, mut trigger_rx) = create_trigger_channel(TRIGGER_RINGBUFFER_CAPACITY);
    let (mut command_tx, mut command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);

    let mut session = PracticeSession::new(
        config,
        QueueTrigger::new(trigger_tx),
        RealtimeClock::new(),
    )
    .with_notifications(notification_tx);
    session.generate_random(rng)?;
    drain_notifications(&mut notification_rx);

    // Stand-in for the audio thread: report what would be played
    let finished = Arc::new(AtomicBool::new(false));
    let consumer_finished = Arc::clone(&finished);
    let audio_thread = thread::spawn(move || {
        while !consumer_finished.load(Ordering::Relaxed) {
            while let Some(event) = trigger_rx.try_pop() {
                match event {
                    TriggerEvent::Click => log::debug!("click"),
                    TriggerEvent::Strike(strike) => log::info!("strike {}", strike),
                }
            }
            thread::sleep(Duration::from_millis(1));
        }
    });

    command_tx
        .try_push(Command::Start)
        .map_err(|_| "command queue full")?;
    let control_thread = thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        let _ = command_tx.try_push(Command::Quit);
    });

    println!("Practicing for {} s at {}...", seconds, config.tempo());
    run_realtime(&mut session, &mut command_rx);

    finished.store(true, Ordering::Relaxed);
    let _ = control_thread.join();
    let _ = audio_thread.join();
    drain_notifications(&mut notification_rx);

    println!(
        "Done: {} practiced, final tempo {}, {} triggers dropped",
        session.practice_time_display(),
        session.tempo(),
        session.sink().dropped()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = build_config(&options)?;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seconds = options.seconds.unwrap_or(DEFAULT_SECONDS);

    if options.dry_run {
        dry_run(&config, &mut rng, seconds)
    } else {
        play(&config, &mut rng, seconds)
    }
}
