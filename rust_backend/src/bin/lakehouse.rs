//! Lakehouse command line.
//!
//! ```bash
//! # Full generation run using lakehouse.toml (or defaults)
//! lakehouse generate --input data/raw-mta-data.csv --route-seed 7
//!
//! # Resumable bulk download of the raw export
//! lakehouse download --output data/raw-mta-data.csv
//!
//! # Scrub notebook outputs
//! lakehouse clean-notebooks notebooks/
//! ```
//!
//! `RUST_LOG` controls verbosity (default: info).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ridership_lakehouse::db::{RepositoryFactory, RepositoryType};
use ridership_lakehouse::ingest::{DEFAULT_DECREMENT, DEFAULT_PAGE_SIZE, TOTAL_NUMBER_OF_RECORDS};
use ridership_lakehouse::notebooks::clean_notebooks_in;
use ridership_lakehouse::{LakehouseConfig, LakehousePipeline};

#[derive(Parser, Debug)]
#[command(name = "lakehouse", version, about = "Ridership lakehouse batch tools")]
struct Cli {
    /// Configuration file (defaults to LAKEHOUSE_CONFIG or ./lakehouse.toml)
    #[arg(long, global = true, env = "LAKEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the generation pipeline end to end
    Generate(GenerateArgs),
    /// Download the raw hourly ridership export page by page
    Download(DownloadArgs),
    /// Clear execution counts and outputs of every notebook below a directory
    CleanNotebooks {
        #[arg(default_value = "notebooks")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Raw ridership CSV
    #[arg(long)]
    input: Option<PathBuf>,
    /// Lakehouse output directory
    #[arg(long)]
    output: Option<PathBuf>,
    /// Warehouse backend (local, file)
    #[arg(long)]
    repository: Option<RepositoryType>,
    /// Warehouse root for the file backend
    #[arg(long)]
    repository_path: Option<PathBuf>,
    #[arg(long)]
    route_seed: Option<u64>,
    #[arg(long)]
    simulation_seed: Option<u64>,
    #[arg(long)]
    no_simulation: bool,
    /// Keep the staging dataset after the run
    #[arg(long)]
    keep_staging: bool,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    #[arg(long, default_value = "raw-mta-data.csv")]
    output: PathBuf,
    #[arg(long, default_value_t = TOTAL_NUMBER_OF_RECORDS)]
    total_records: usize,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    #[arg(long, default_value_t = DEFAULT_DECREMENT)]
    decrement: usize,
    /// Ignore an existing file and start over
    #[arg(long)]
    force_clear: bool,
}

impl GenerateArgs {
    fn apply(self, config: &mut LakehouseConfig) {
        if let Some(input) = self.input {
            config.pipeline.input_csv = input;
        }
        if let Some(output) = self.output {
            config.pipeline.output_dir = output;
        }
        if let Some(repo_type) = self.repository {
            config.repository.repo_type = repo_type;
        }
        if let Some(path) = self.repository_path {
            config.repository.path = Some(path);
        }
        if self.route_seed.is_some() {
            config.generation.network.route_seed = self.route_seed;
        }
        if self.simulation_seed.is_some() {
            config.simulation.seed = self.simulation_seed;
        }
        if self.no_simulation {
            config.simulation.enabled = false;
        }
        if self.keep_staging {
            config.pipeline.teardown_staging = false;
        }
    }
}

async fn generate(mut config: LakehouseConfig, args: GenerateArgs) -> anyhow::Result<()> {
    args.apply(&mut config);
    let repo = RepositoryFactory::create(
        config.repository.repo_type,
        config.repository.path.as_deref(),
    )?;
    let report = LakehousePipeline::new(repo, config).run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(feature = "download")]
async fn download(args: DownloadArgs) -> anyhow::Result<()> {
    use ridership_lakehouse::ingest::{PagedDownloader, SocrataSource};

    let source = SocrataSource::hourly_ridership()?;
    let report = PagedDownloader::new(args.total_records)
        .with_page_size(args.page_size)
        .with_decrement(args.decrement)
        .with_force_clear(args.force_clear)
        .download(&source, &args.output)
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(not(feature = "download"))]
async fn download(args: DownloadArgs) -> anyhow::Result<()> {
    anyhow::bail!(
        "lakehouse was built without the `download` feature, cannot write {}",
        args.output.display()
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = LakehouseConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Generate(args) => generate(config, args).await,
        Command::Download(args) => download(args).await,
        Command::CleanNotebooks { dir } => {
            let cleaned = clean_notebooks_in(&dir)?;
            info!("Cleaned {} notebooks", cleaned.len());
            Ok(())
        }
    }
}
