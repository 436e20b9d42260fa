use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use crossbeam::channel::RecvTimeoutError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ride_heart_monitor::intake::{prompt_age, ConsoleResponder};
use ride_heart_monitor::threaded_impl::{join_worker, spawn_monitor_thread, spawn_replay_thread, spawn_store_poller};
use ride_heart_monitor::visualization::{render_report, StatusBoard};
use ride_heart_monitor::{
    load_config, Actor, AgeGroup, AnxietyMonitor, MonitorConfig, MonitorEvent, MonitorMetrics, RideSimulator, Role,
    Series, SeriesStore, SharedMonitorState, SignalGenerator, SystemChannels,
};

#[derive(Parser)]
#[command(name = "ride-monitor", version, about = "Simulated ride heart rates and anxiety monitoring")]
struct Cli {
    /// TOML config; missing file means defaults
    #[arg(long, global = true, default_value = "config/monitor.toml")]
    config: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a ride and write the record file
    Generate {
        #[command(flatten)]
        ride: RideArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Monitor a record file
    Monitor {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Keep polling the file for new rows
        #[arg(long)]
        follow: bool,
        /// In follow mode, stop after this many intervals without new rows
        #[arg(long, default_value_t = 10)]
        idle_ticks: u32,
        #[arg(long)]
        interval_ms: Option<u64>,
        #[command(flatten)]
        answers: AnswerArgs,
    },
    /// Simulate a ride and monitor it in-process
    Simulate {
        #[command(flatten)]
        ride: RideArgs,
        #[arg(long)]
        interval_ms: Option<u64>,
        #[command(flatten)]
        answers: AnswerArgs,
    },
}

#[derive(Args)]
struct RideArgs {
    #[arg(long)]
    passenger_age: Option<i32>,
    #[arg(long)]
    driver_age: Option<i32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Ride length in seconds
    #[arg(long)]
    duration: Option<u64>,
}

#[derive(Args)]
struct AnswerArgs {
    /// Answer every prompt with yes
    #[arg(long, conflicts_with = "assume_not_ok")]
    assume_ok: bool,
    /// Answer every prompt with no
    #[arg(long)]
    assume_not_ok: bool,
}

impl AnswerArgs {
    fn responder(&self) -> ConsoleResponder {
        if self.assume_ok {
            ConsoleResponder::AssumeOk
        } else if self.assume_not_ok {
            ConsoleResponder::AssumeNotOk
        } else {
            ConsoleResponder::Ask
        }
    }
}

enum Feed {
    Replay(Series),
    Follow { store: SeriesStore, idle_ticks: u32 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut cfg = load_config(&cli.config).context("loading configuration")?;

    match cli.command {
        Command::Generate { ride, out } => {
            let series = simulate(&cfg, &ride)?;
            let store = SeriesStore::new(out.unwrap_or_else(|| cfg.data_file.clone()));
            store.save(&series).context("writing heart rate data")?;
            print_summary(&cfg, &series)?;
            println!("Heart rate data generated and saved to '{}'.", store.path().display());
        }
        Command::Monitor { file, follow, idle_ticks, interval_ms, answers } => {
            if let Some(ms) = interval_ms {
                cfg.tick_interval_ms = ms;
            }
            let store = SeriesStore::new(file.unwrap_or_else(|| cfg.data_file.clone()));
            let feed = if follow {
                // A writer may be mid-row; only the complete rows must parse.
                let written = store
                    .load_complete()
                    .with_context(|| format!("loading {}", store.path().display()))?;
                info!(rows = written.len(), path = %store.path().display(), "following record file");
                Feed::Follow { store, idle_ticks }
            } else {
                let series = store
                    .load()
                    .with_context(|| format!("loading {}", store.path().display()))?;
                print_summary(&cfg, &series)?;
                Feed::Replay(series)
            };
            run_session(&cfg, feed, answers.responder())?;
        }
        Command::Simulate { ride, interval_ms, answers } => {
            if let Some(ms) = interval_ms {
                cfg.tick_interval_ms = ms;
            }
            let series = simulate(&cfg, &ride)?;
            print_summary(&cfg, &series)?;
            run_session(&cfg, Feed::Replay(series), answers.responder())?;
        }
    }
    Ok(())
}

fn classify_or_prompt(age: Option<i32>, role: Role) -> anyhow::Result<AgeGroup> {
    match age {
        Some(a) => Ok(AgeGroup::classify(a, role)?),
        None => {
            let (_, group) = prompt_age(&mut io::stdin().lock(), &mut io::stdout(), role)?;
            Ok(group)
        }
    }
}

fn simulate(cfg: &MonitorConfig, ride: &RideArgs) -> anyhow::Result<Series> {
    let passenger = classify_or_prompt(ride.passenger_age, Role::Passenger)?;
    let driver = classify_or_prompt(ride.driver_age, Role::Driver)?;
    let duration = ride.duration.unwrap_or(cfg.ride_duration_secs);

    let generator = match ride.seed.or(cfg.seed) {
        Some(seed) => SignalGenerator::new(seed),
        None => SignalGenerator::from_entropy(),
    };
    info!(%passenger, %driver, duration, "simulating ride");
    Ok(RideSimulator::with_generator(generator, passenger, driver, duration).run())
}

fn print_summary(cfg: &MonitorConfig, series: &Series) -> anyhow::Result<()> {
    let thresholds = cfg.thresholds()?;
    let Some(summary) = series.summary(thresholds.danger, thresholds.control) else {
        println!("No samples.");
        return Ok(());
    };
    let (driver_smooth, passenger_smooth) = series.smoothed(cfg.smoothing_window);
    let smooth_max = |v: &[f64]| v.iter().copied().fold(f64::NAN, f64::max);

    println!("===========================================");
    println!("Ride summary ({} samples)", summary.len);
    println!("===========================================");
    for (name, actor, smooth) in [
        ("Driver", summary.driver, &driver_smooth),
        ("Passenger", summary.passenger, &passenger_smooth),
    ] {
        println!(
            "{name:<10} max {:.1} BPM, mean {:.1} BPM, smoothed max {:.1}, >{} for {}s, >{} for {}s",
            actor.max,
            actor.mean,
            smooth_max(smooth.as_slice()),
            thresholds.danger,
            actor.above_danger,
            thresholds.control,
            actor.above_control
        );
    }
    println!("Both above {}: {} ticks", thresholds.danger, series.both_high(thresholds.danger).len());
    Ok(())
}

fn run_session(cfg: &MonitorConfig, feed: Feed, responder: ConsoleResponder) -> anyhow::Result<()> {
    let thresholds = cfg.thresholds()?;
    let interval = cfg.tick_interval();
    let state = SharedMonitorState::new();
    let mut monitor = AnxietyMonitor::new(thresholds, state.clone(), responder).with_window(cfg.alert_window());
    let events = monitor.subscribe();

    let channels = SystemChannels::new(cfg.channel_capacity);
    let metrics = MonitorMetrics::new();
    let (monitor_handle, monitor_stats) =
        spawn_monitor_thread(monitor, channels.clone(), metrics.clone(), interval);

    let (feed_handle, feed_stats, idle_limit) = match feed {
        Feed::Replay(series) => {
            let (h, s) = spawn_replay_thread(series, channels.clone(), interval);
            (h, s, None)
        }
        Feed::Follow { store, idle_ticks } => {
            let (h, s) = spawn_store_poller(store, channels.clone(), interval);
            (h, s, Some(idle_ticks))
        }
    };

    println!("{}\n", StatusBoard::from_state(&state.get()));

    let mut idle = 0u32;
    let mut last_sent = 0u64;
    loop {
        match events.recv_timeout(interval) {
            Ok(event) => {
                present(&state, event);
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if feed_stats.failed.load(Ordering::Relaxed) {
            break;
        }
        let sent = feed_stats.sent.load(Ordering::Relaxed);
        let caught_up = monitor_stats.processed.load(Ordering::Relaxed) >= sent;
        if feed_stats.finished.load(Ordering::Relaxed) && caught_up {
            break;
        }
        if let Some(limit) = idle_limit {
            idle = if sent == last_sent && caught_up { idle + 1 } else { 0 };
            last_sent = sent;
            if idle >= limit {
                info!(idle_ticks = limit, "no new rows, stopping");
                break;
            }
        }
    }

    feed_stats.shutdown.store(true, Ordering::Relaxed);
    let feed_joined = join_worker(feed_handle, "feed");
    monitor_stats.shutdown.store(true, Ordering::Relaxed);
    let monitor = join_worker(monitor_handle, "monitor")?;
    for event in events.try_iter() {
        present(&state, event);
    }

    println!("\n===========================================");
    println!("FINAL MONITOR STATE");
    println!("===========================================");
    let final_state = state.get();
    println!("{}", StatusBoard::from_state(&final_state));
    if StatusBoard::is_alarming(&final_state) {
        warn!(alert = ?final_state.alert, control = %final_state.control_level, "ride ended with an active alert");
    }
    let (driver_max, passenger_max) = monitor.maxima();
    println!("Driver max: {:.1?}, Passenger max: {:.1?}", driver_max, passenger_max);
    println!("\n=== Metrics ===\n{}", render_report(&metrics.report()));

    feed_joined?;
    if feed_stats.failed.load(Ordering::Relaxed) {
        bail!("record file became unreadable while following it");
    }
    Ok(())
}

/// Operator side: prompting an actor counts as contacting them, and an
/// emergency brings in the response unit.
fn present(state: &SharedMonitorState, event: MonitorEvent) {
    match event {
        MonitorEvent::AlertChanged { .. } | MonitorEvent::ControlChanged { .. } => {
            println!("{}\n", StatusBoard::from_state(&state.get()));
        }
        MonitorEvent::PromptRequested { actor, .. } => {
            match actor {
                Actor::Driver => state.contact_driver(),
                Actor::Passenger => state.contact_passenger(),
            };
        }
        MonitorEvent::EmergencyNotified { actor, .. } => {
            println!("Emergency response has been notified for the {}.", actor.to_string().to_lowercase());
            state.contact_response_unit();
        }
    }
}
