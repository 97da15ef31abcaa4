use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use serpsim_common::SimulationConfig;
use serpsim_runner::{Registries, Simulation};

#[derive(Parser)]
#[command(name = "serpsim", about = "Simulated searcher sessions over a judged corpus")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every topic × user session in a simulation config
    Run {
        /// Path to the simulation config JSON file
        #[arg(long)]
        config: PathBuf,

        /// Write outputs here instead of the configured directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the JSON schema of the simulation config
    Schema,

    /// List the registered component kinds per family
    Components,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("serpsim=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Run { config, output_dir } => {
            let config = SimulationConfig::load(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            let simulation = Simulation::new(config, output_dir)?;
            let summary = simulation.run()?;
            info!(run_id = %summary.run_id, sessions = summary.sessions, "Done");
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SimulationConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Components => {
            let registries = Registries::standard();
            print_family(registries.query_strategy.family(), registries.query_strategy.kinds());
            print_family(registries.classifier.family(), registries.classifier.kinds());
            print_family(registries.stopping.family(), registries.stopping.kinds());
            print_family(registries.serp_impression.family(), registries.serp_impression.kinds());
            print_family(registries.logger.family(), registries.logger.kinds());
        }
    }
    Ok(())
}

fn print_family<'a>(family: &str, kinds: impl Iterator<Item = &'a str>) {
    println!("{family}:");
    for kind in kinds {
        println!("  {kind}");
    }
}
