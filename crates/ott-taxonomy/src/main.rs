//! OTT Taxonomy - command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ott_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use ott_taxonomy::{available_versions, Dataset, DatasetSettings, Table, TaxonId};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Argument of `build` selecting every packaged version
const ALL_VERSIONS: &str = "all";

const VERSIONS_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

#[derive(Parser, Debug)]
#[command(name = "ott-taxonomy")]
#[command(author, version, about = "Fetch and explore Open Tree of Life taxonomy releases")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory release archives are downloaded to
    #[arg(long, global = true, env = "OTT_DOWNLOADS_DIR", default_value = "downloads")]
    downloads_dir: PathBuf,

    /// Number of concurrent downloads
    #[arg(long, global = true, env = "OTT_FETCH_WORKERS")]
    workers: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every available version
    Versions,

    /// Download and unpack one version, or `all`
    Build {
        /// Version name (e.g. ott3.6) or `all`
        version: String,
    },

    /// Load a version and print the head of its taxonomy table
    Load {
        version: String,

        /// Number of rows to print
        #[arg(short, long, default_value_t = 10)]
        rows: usize,

        /// Print the synonyms table instead
        #[arg(long)]
        synonyms: bool,
    },

    /// Print node and edge counts of the full taxonomy graph
    Graph { version: String },

    /// Extract the subgraph below a taxon
    Subgraph {
        version: String,

        /// OTT identifier of the subgraph root
        uid: TaxonId,

        /// Remove every taxon below species rank first
        #[arg(long)]
        drop_subordinate_ranks: bool,
    },

    /// Check the taxonomy's tree invariants
    Validate { version: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Verbose: debug to console; otherwise warnings only
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("ott-taxonomy")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env().unwrap_or(log_config);

    // The CLI works without logging
    let guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        drop(guard);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Versions => {
            for version in available_versions() {
                println!("{version}");
            }
        },
        Command::Build { version } => build(cli, version).await?,
        Command::Load {
            version,
            rows,
            synonyms,
        } => {
            let dataset = load(cli, version).await?;
            let table = if *synonyms {
                dataset.get_synonyms()
            } else {
                dataset.get_taxonomy().table()
            };

            println!("{}", render(&table.head(*rows)));
            println!("{} of {} rows", table.len().min(*rows), table.len());
        },
        Command::Graph { version } => {
            let graph = load(cli, version).await?.to_graph()?;
            println!("nodes: {}", graph.node_count());
            println!("edges: {}", graph.edge_count());
        },
        Command::Subgraph {
            version,
            uid,
            drop_subordinate_ranks,
        } => {
            let dataset = load(cli, version).await?;
            let subgraph = dataset.subgraph(*uid, !*drop_subordinate_ranks)?;

            println!("nodes: {}", subgraph.node_count());
            println!("edges: {}", subgraph.edge_count());

            let mut nodes: Vec<TaxonId> = subgraph.nodes().collect();
            nodes.sort_unstable();
            for node in nodes {
                println!("{node}");
            }
        },
        Command::Validate { version } => {
            let dataset = load(cli, version).await?;
            dataset.get_taxonomy().validate()?;
            println!(
                "{}: {} taxa, {} synonyms, taxonomy is valid",
                dataset.version(),
                dataset.get_taxonomy().len(),
                dataset.get_synonyms().len()
            );
        },
    }

    Ok(())
}

fn settings(cli: &Cli, version: &str) -> ott_common::Result<DatasetSettings> {
    let settings = DatasetSettings::new(version)?
        .with_downloads_directory(cli.downloads_dir.clone())
        .with_verbose(cli.verbose);

    Ok(match cli.workers {
        Some(workers) => settings.with_workers(workers),
        None => settings,
    })
}

async fn load(cli: &Cli, version: &str) -> ott_common::Result<Dataset> {
    Dataset::build(settings(cli, version)?).await
}

/// Download one version, or every version when `version` is `all`
async fn build(cli: &Cli, version: &str) -> Result<()> {
    let versions = if version == ALL_VERSIONS {
        available_versions()
    } else {
        vec![version.to_string()]
    };

    // Resolve every version before fetching anything
    let all_settings = versions
        .iter()
        .map(|v| settings(cli, v))
        .collect::<ott_common::Result<Vec<_>>>()?;

    let pb = versions_progress(all_settings.len() as u64);
    for settings in all_settings {
        pb.set_message(settings.version().to_string());
        let dataset = Dataset::download(settings).await?;
        info!(version = dataset.version(), "Release ready");
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Built {} release(s) in {}",
        versions.len(),
        cli.downloads_dir.display()
    );
    Ok(())
}

/// Overall progress across versions; hidden for a single version
fn versions_progress(total: u64) -> ProgressBar {
    if total <= 1 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(VERSIONS_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn render(table: &Table) -> comfy_table::Table {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut rendered = comfy_table::Table::new();
    rendered
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(table.columns());

    for row in table.rows() {
        rendered.add_row(row);
    }
    rendered
}
