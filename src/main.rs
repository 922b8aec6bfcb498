use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use router_qos_sim::config::DEFAULT_SEED;
use router_qos_sim::report::{render_batch, render_tick};
use router_qos_sim::traffic::{BATTLE_PACKETS_PER_TICK, PACKETS_PER_TICK, TOTAL_PACKETS};
use router_qos_sim::{BurstSchedule, ChokeMode, LiveSession, RouterConfig, TrafficGenerator, run_batch};

#[derive(Parser, Debug)]
#[command(name = "router_qos_sim", about = "Congested router scheduling comparison")]
struct Cli {
    /// Seed for the router service gate.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Seed for the traffic generator.
    #[arg(long, default_value_t = DEFAULT_SEED + 1)]
    traffic_seed: u64,

    /// Use the single-threshold choke test instead of hysteresis.
    #[arg(long, default_value_t = false)]
    instant_choke: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run the whole traffic sequence once and print a summary.
    Batch {
        #[arg(long, default_value_t = TOTAL_PACKETS)]
        packets: usize,
    },
    /// Loss / buffer / bronze-sacrifice view, one chunk per tick.
    Live {
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        #[arg(long, default_value_t = PACKETS_PER_TICK)]
        chunk: usize,
        #[arg(long, default_value_t = 50)]
        interval_ms: u64,
    },
    /// Per-class throughput view with periodic gold bursts.
    Battle {
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        #[arg(long, default_value_t = BATTLE_PACKETS_PER_TICK)]
        chunk: usize,
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let cli = Cli::parse();
    let choke_mode = if cli.instant_choke {
        ChokeMode::Instantaneous
    } else {
        ChokeMode::Hysteresis
    };
    let config = RouterConfig::default()
        .with_seed(cli.seed)
        .with_choke_mode(choke_mode);
    config.validate()?;

    let traffic = TrafficGenerator::new(cli.traffic_seed);

    match cli.mode {
        Mode::Batch { packets } => {
            info!(packets, "running batch comparison");
            let mut traffic = traffic;
            let report = run_batch(&config, &mut traffic, packets)?;
            println!("{}", render_batch(&report));
        }
        Mode::Live {
            ticks,
            chunk,
            interval_ms,
        } => {
            let session = LiveSession::new(&config, traffic, chunk)?;
            drive(session, ticks, interval_ms)?;
        }
        Mode::Battle {
            ticks,
            chunk,
            interval_ms,
        } => {
            let session =
                LiveSession::new(&config, traffic, chunk)?.with_bursts(BurstSchedule::default());
            drive(session, ticks, interval_ms)?;
        }
    }

    Ok(())
}

// 外部驱动：每个 tick 喂一块流量，画面刷新交给终端
fn drive(mut session: LiveSession, ticks: u64, interval_ms: u64) -> Result<()> {
    for _ in 0..ticks {
        let report = session.tick()?;
        println!("{}", render_tick(&report));
        if interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }
    Ok(())
}
