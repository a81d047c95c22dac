//! Protest Simulation Engine
//!
//! Runs a crowd-unrest scenario to completion and writes the per-tick
//! report history for analysis.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use protest_core::components::world::SimClock;
use protest_core::config::Config;
use protest_core::output;
use protest_core::schedule::build_tick_schedule;
use protest_core::setup;

/// Command line arguments for the simulation.
#[derive(Parser, Debug)]
#[command(name = "protest_sim")]
#[command(about = "A crowd-unrest simulation engine")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Scenario file to load
    #[arg(long, default_value = "tuning.toml")]
    scenario: String,

    /// Override the scenario's run length, in days
    #[arg(long)]
    days: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match Config::load(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load {}: {}. Using defaults.", args.scenario, e);
            Config::default()
        }
    };
    if let Some(days) = args.days {
        config.schedule.max_days = days;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    println!("Protest Simulation Engine");
    println!("=========================");
    println!("Seed: {}", args.seed);
    println!(
        "Grid: {}x{} ({})",
        config.grid.width,
        config.grid.height,
        if config.grid.toroidal { "toroidal" } else { "bounded" }
    );
    println!(
        "Run length: {} days x {} ticks",
        config.schedule.max_days, config.schedule.ticks_per_day
    );
    println!();

    println!("Building world...");
    let (mut world, summary) = setup::build_world(&config, args.seed);
    println!("  Spawned {} agents", summary.total_agents());
    println!(
        "    citizens: {} (hardcore: {}, hangers-on: {}, observers: {})",
        summary.citizens(),
        summary.hardcore,
        summary.hangers_on,
        summary.observers
    );
    println!("    enforcers: {}", summary.enforcers);
    println!("    media: {}", summary.media);
    println!();

    println!("Starting simulation...");
    let mut schedule = build_tick_schedule();
    loop {
        let (running, tick, boundary) = {
            let clock = world.resource::<SimClock>();
            (clock.running, clock.tick, clock.is_day_boundary())
        };
        if !running {
            break;
        }
        if boundary || tick == 0 {
            if let Some(report) = world.resource::<output::ProtestStats>().latest() {
                println!(
                    "[{}] protest: {:>3}  fighting: {:>2}  jailed: {:>3}  legitimacy: {:.3}",
                    report.timestamp.format(),
                    report.states.protest_size(),
                    report.states.fighting,
                    report.arrested,
                    report.mean_legitimacy
                );
            }
        }
        schedule.run(&mut world);
    }

    let report = output::collect_run_report(&world);
    println!();
    println!("Simulation complete. Ran {} ticks.", report.ticks);
    if let Some(last) = report.history.last() {
        println!(
            "Final day: {} arrested, {} total arrests, {} total fights.",
            last.arrested, last.total_arrests, last.total_fights
        );
    }

    match output::write_report(&report) {
        Ok(()) => println!("Wrote {}", output::REPORT_OUTPUT_PATH),
        Err(e) => eprintln!("Warning: Could not write report: {e}"),
    }
}
