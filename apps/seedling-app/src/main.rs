//! Seedling seed trajectory CLI.
//!
//! Provides two modes of operation:
//! - `plan`: Load a TOML scenario, generate its seed and print it
//! - `info`: Print workspace crate versions and the default profile

mod scenario;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use seedling_core::config::LvsProfileConfig;
use seedling_core::types::{CompositeInstruction, Waypoint};
use seedling_planner::PlannerStatus;

use crate::scenario::Scenario;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Seed trajectory generation for motion planning.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the seed for a scenario.
    Plan {
        /// Scenario TOML file.
        #[arg(short, long)]
        scenario: PathBuf,

        /// Print the seed as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_plan(path: &Path, json: bool) -> ExitCode {
    let scenario = match Scenario::from_file(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("failed to load {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let (planner, request) = match scenario.build() {
        Ok(built) => built,
        Err(e) => {
            error!("invalid scenario {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let response = planner.solve(&request);
    info!(planner = planner.name(), status = ?response.status, "{}", response.status);
    let Some(seed) = response.results else {
        eprintln!("{}", response.status);
        return ExitCode::FAILURE;
    };

    if json {
        match serde_json::to_string_pretty(&seed) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("failed to serialize seed: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_seed(&seed);
    }

    if response.status == PlannerStatus::SolutionFound {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_seed(seed: &CompositeInstruction) {
    if let Some(start) = seed.start_instruction.as_deref().and_then(|i| i.as_move()) {
        println!("start  {}", describe(&start.waypoint));
    }
    for (segment, instruction) in seed.iter().enumerate() {
        let Some(composite) = instruction.as_composite() else {
            continue;
        };
        for mv in composite.flatten_moves() {
            println!(
                "{:>5}  {:<9} {:<12} {}",
                segment + 1,
                format!("{:?}", mv.move_type).to_lowercase(),
                mv.description,
                describe(&mv.waypoint)
            );
        }
    }
    println!("\ntotal: segments={}, moves={}", seed.len(), seed.flatten_moves().len());
}

fn describe(waypoint: &Waypoint) -> String {
    match waypoint {
        Waypoint::State(s) => format!("{:.4?}", s.position.as_slice()),
        Waypoint::Joint(j) => format!("joint {:.4?}", j.position.as_slice()),
        Waypoint::Cartesian(c) => {
            let t = c.pose.translation.vector;
            format!("xyz [{:.4}, {:.4}, {:.4}]", t.x, t.y, t.z)
        }
    }
}

fn run_info() -> ExitCode {
    let lvs = LvsProfileConfig::default();
    println!("seedling v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  seedling-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  seedling-kinematics {}", env!("CARGO_PKG_VERSION"));
    println!("  seedling-planner    {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("default profile: lvs");
    println!("  state       {:.4} rad", lvs.state_longest_valid_segment_length);
    println!("  translation {:.4} m", lvs.translation_longest_valid_segment_length);
    println!("  rotation    {:.4} rad", lvs.rotation_longest_valid_segment_length);
    println!("  min_steps   {}", lvs.min_steps);
    ExitCode::SUCCESS
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Plan { scenario, json }) => run_plan(&scenario, json),
        Some(Commands::Info) | None => run_info(),
    }
}
