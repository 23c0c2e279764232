//! Inventory network simulation CLI
//!
//! Runs the warehouse and store model for one seed and prints the event trace and the
//! end-of-run report, or runs several replications and prints one report per seed.

use clap::{Parser, ValueEnum};
use invsim::inventory::{
    run_replications, ConcurrencyMode, InventorySimulation, ReplicationConfig, RngAlgorithm,
    SimulationConfig,
};
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum RngChoice {
    /// 32-bit Mersenne Twister, numpy legacy `RandomState` stream
    Mt19937,
    /// rand's StdRng, accepts any 64-bit seed
    Std,
}

impl From<RngChoice> for RngAlgorithm {
    fn from(choice: RngChoice) -> Self {
        match choice {
            RngChoice::Mt19937 => RngAlgorithm::Mt19937,
            RngChoice::Std => RngAlgorithm::StdRng,
        }
    }
}

#[derive(Parser)]
#[command(name = "inventory_sim")]
#[command(about = "Two-tier inventory discrete-event simulation")]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated hours to run
    #[arg(long)]
    end_time: Option<u64>,

    /// Number of stores
    #[arg(long)]
    stores: Option<usize>,

    /// Hours between pending-restock reports
    #[arg(long)]
    report_interval: Option<u64>,

    /// Random number generator
    #[arg(long, value_enum)]
    rng: Option<RngChoice>,

    /// Run this many replications with consecutive seeds
    #[arg(long)]
    replications: Option<u64>,

    /// Run replications on a rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel
    #[arg(long)]
    threads: Option<usize>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Skip the per-event trace
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(end_time) = self.end_time {
            config = config.with_end_time(end_time);
        }
        if let Some(stores) = self.stores {
            config = config.with_store_count(stores);
            // Default overrides name stores that may no longer exist
            let overrides = config
                .store_overrides
                .iter()
                .filter(|o| o.store <= stores)
                .cloned()
                .collect();
            config = config.with_store_overrides(overrides);
        }
        if let Some(interval) = self.report_interval {
            config = config.with_report_interval(interval);
        }
        if let Some(rng) = self.rng {
            config = config.with_rng(rng.into());
        }
        config.validate()?;
        Ok(config)
    }

    fn replication_config(&self) -> ReplicationConfig {
        let mut replication = ReplicationConfig::new();
        if self.parallel {
            replication = replication.with_concurrency(ConcurrencyMode::Rayon);
        }
        if let Some(threads) = self.threads {
            replication = replication.with_thread_pool_size(threads);
        }
        replication
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let config = cli.simulation_config()?;

    if let Some(count) = cli.replications {
        let seeds: Vec<u64> = (0..count).map(|i| config.seed + i).collect();
        let summaries = run_replications(&config, &seeds, &cli.replication_config())?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            for summary in &summaries {
                println!("Seed {} (run {})", summary.seed, summary.run_id);
                println!("{}", summary);
                println!();
            }
        }
        return Ok(());
    }

    let mut sim = InventorySimulation::new(config)?;
    let summary = sim.run()?;

    if !cli.quiet {
        for event in sim.trace() {
            println!("{}", event);
        }
        println!();
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}
