use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::Config;
use dao::StorageBackend;
use model::KeyPattern;
use service::Selection;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::Tee;

mod model;
mod dao;
mod import;
mod engagement;
mod service;
mod config;
mod util;

/// Default config path
const DEF_CONFIG_FILE: &str = "config.toml";

/// Flickr Commons metadata indexer
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Config file, written with defaults if missing
    #[arg(short, long, default_value = DEF_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index metadata documents of all organizations or a single one
    Index {
        /// Index only this organization
        #[arg(long, conflicts_with = "exclude")]
        org: Option<String>,
        /// Skip organization, in addition to `exclude` from config
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Save engagement stats and print monthly comments/uploads table
    Engagement,
    /// Print member count of every global set
    Summary,
    /// Print what is stored under a key, e.g. `image:1234:tags`
    Get {
        key: KeyPattern,
    },
}

async fn run(command: Command, store: &StorageBackend, cfg: &Config) -> anyhow::Result<()> {
    match command {
        Command::Index { org, exclude } => {
            let exclude: Vec<String> = cfg.exclude
                .iter()
                .chain(&exclude)
                .cloned()
                .collect();

            let selection = match &org {
                Some(org) => Selection::Single(org),
                None => Selection::All { exclude: &exclude },
            };

            let stats = service::index(store, cfg, selection).await?;
            info!(indexed = stats.indexed(), failed = stats.failed, "done");
        },
        Command::Engagement => {
            let table = service::engagement(store, cfg).await?;
            print!("{table}");
        },
        Command::Summary => {
            for line in service::summary(store).await? {
                println!("{line}");
            }
        },
        Command::Get { key } => {
            for line in service::lookup(store, &key).await? {
                println!("{line}");
            }
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let log_file = std::fs::File::options()
        .append(true)
        .create(true)
        .open(&cfg.log_file)?;

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_writer(Tee::new(std::io::stderr, log_file))
        .with_file(true)
        .with_line_number(true)
        .with_max_level(cfg.log_level)
        .init();

    info!(db = %cfg.db_url, "opening index");
    let store = StorageBackend::init(&cfg.db_url).await?;

    let res = run(cli.command, &store, &cfg).await;
    if let Err(e) = &res {
        error!(?e, "command failed");
    }

    store.close().await;
    res
}
