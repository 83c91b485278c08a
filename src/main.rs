//! Memory Pulse CLI - drives the pulse controller with a synthetic packet
//! feed and the advisory tick scheduler.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval_at, Instant as TokioInstant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use memory_pulse::{PacketEvent, PulseConfig, PulseController, StatusSnapshot};

#[derive(Parser)]
#[command(name = "memory-pulse")]
#[command(about = "Self-tuning packet buffer controller", long_about = None)]
struct Cli {
    /// Config file path (defaults to <config dir>/memory-pulse/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller against a synthetic packet feed
    Run {
        /// Synthetic events per second
        #[arg(short, long, default_value = "200")]
        rate: u64,

        /// Stop after this many seconds (runs until Ctrl-C if unset)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Feed a short burst of events and print a status snapshot
    Status {
        /// Number of events in the burst
        #[arg(short, long, default_value = "100")]
        burst: u64,

        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

fn load_config(path: Option<&PathBuf>) -> PulseConfig {
    let path = path.cloned().or_else(PulseConfig::default_path);
    match path {
        Some(ref p) if p.exists() => match PulseConfig::load(p) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}. Using defaults.", p.display(), e);
                PulseConfig::default()
            }
        },
        _ => PulseConfig::default(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command {
        Commands::Run { rate, duration } => {
            run_loop(config, rate, duration).await;
        }

        Commands::Status { burst, json } => {
            let mut controller = PulseController::new(config);
            for seq in 1..=burst {
                controller.on_event(&PacketEvent::sequenced(seq));
            }
            controller.on_tick();

            let snapshot = StatusSnapshot::capture(&mut controller);
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", snapshot.status_line());
            }
            controller.release();
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Single-task cooperative loop: the event feed and the tick timer never
/// overlap, matching the serial delivery the controller expects.
async fn run_loop(config: PulseConfig, rate: u64, duration: Option<u64>) {
    if !config.enabled {
        info!("memory-pulse is disabled in the config");
        return;
    }

    let logger_enabled = config.logger_enabled;
    let mut controller = PulseController::new(config);
    info!(
        "memory-pulse running: {} events/sec, tick every {}s",
        rate,
        controller.current_interval()
    );

    let event_period = Duration::from_micros(1_000_000 / rate.max(1));
    let mut events = interval_at(TokioInstant::now() + event_period, event_period);
    let tick_period = Duration::from_secs(controller.current_interval());
    let mut ticks = interval_at(TokioInstant::now() + tick_period, tick_period);

    let deadline = duration.map(|secs| TokioInstant::now() + Duration::from_secs(secs));
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = events.tick() => {
                seq += 1;
                controller.on_event(&PacketEvent::sequenced(seq));
            }
            _ = ticks.tick() => {
                if let Some(report) = controller.on_tick() {
                    // The interval is advisory: re-register the timer when
                    // the controller retimes
                    if report.retimed {
                        let period = Duration::from_secs(report.interval_secs);
                        ticks = interval_at(TokioInstant::now() + period, period);
                    }
                    if logger_enabled {
                        let snapshot = StatusSnapshot::capture(&mut controller);
                        info!("{}", snapshot.status_line());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }

        if let Some(deadline) = deadline {
            if TokioInstant::now() >= deadline {
                break;
            }
        }
    }

    let snapshot = StatusSnapshot::capture(&mut controller);
    info!("{}", snapshot.status_line());
    controller.release();
}
