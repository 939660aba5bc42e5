use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use movs_core::{FsProvider, Ledger, Movement, TaggedMovement};
use movs_finance::{AggregateOptions, aggregate, validate_at, yearly_stats};
use movs_ingest::{load, load_and_merge};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "movs",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MOVS_BUILD_SHA"), ")"),
    about = "Bank statement ledger: validate, tag and aggregate movements"
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile each statement against its declared balances; stops at the first failure
    Validate {
        /// Statement files (default: data_paths from the config)
        paths: Vec<PathBuf>,
    },

    /// Merge statements and print every movement with its tags
    Tag {
        paths: Vec<PathBuf>,

        /// Emit CSV instead of aligned text
        #[arg(long)]
        csv: bool,

        /// TOML rule table overriding the configured one
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Merge statements and print all series and buckets as JSON
    Aggregate {
        paths: Vec<PathBuf>,

        /// Running-balance seed date (YYYY-MM-DD)
        #[arg(long)]
        epoch: Option<NaiveDate>,
    },

    /// Per-year net amounts and their sum
    Stats { paths: Vec<PathBuf> },

    /// Manage ~/.movs/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Validate { paths } => {
            let cfg = config::load_config()?;
            validate_sources(&source_ids(paths, &cfg)?)?;
        }

        Command::Tag { paths, csv, rules } => {
            let cfg = config::load_config()?;
            let table = match rules {
                Some(path) => config::load_rule_table(&path)?,
                None => cfg.rule_table()?,
            };
            let ledger = merged(&source_ids(paths, &cfg)?)?;
            let tagged = table.tag(&ledger);
            if csv {
                write_csv(&tagged)?;
            } else {
                print_tagged(&ledger.name, &tagged);
            }
        }

        Command::Aggregate { paths, epoch } => {
            let cfg = config::load_config()?;
            let ledger = merged(&source_ids(paths, &cfg)?)?;
            let mut options = AggregateOptions::new(today());
            if let Some(epoch) = epoch.or(cfg.epoch) {
                options = options.with_epoch(epoch);
            }
            let result = aggregate(&ledger, &options);
            let json = serde_json::to_string_pretty(&result).context("serialize aggregate")?;
            println!("{json}");
        }

        Command::Stats { paths } => {
            let cfg = config::load_config()?;
            let ids = source_ids(paths, &cfg)?;
            for id in &ids {
                let (_, ledger) = load(&FsProvider::new(), id).with_context(|| format!("loading {id}"))?;
                let stats = yearly_stats(&ledger);
                println!("EOY STATS - {id}");
                for bucket in &stats.years {
                    println!("{} -> {:>11.2}", bucket.year, bucket.sum);
                }
                println!(" SUM -> {:>11.2}", stats.total);
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let path = config::config_path()?;
                let cfg = config::load_config()?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn source_ids(paths: Vec<PathBuf>, cfg: &Config) -> Result<Vec<String>> {
    let ids: Vec<String> = if paths.is_empty() {
        cfg.data_paths.clone()
    } else {
        paths.iter().map(|p| p.display().to_string()).collect()
    };
    if ids.is_empty() {
        bail!(
            "no statement files: pass paths or set data_paths in {}",
            config::config_path()?.display()
        );
    }
    Ok(ids)
}

fn merged(ids: &[String]) -> Result<Ledger> {
    let ledger = load_and_merge(&FsProvider::new(), ids).context("loading statements")?;
    info!(name = %ledger.name, movements = ledger.len(), "ledger ready");
    Ok(ledger)
}

fn validate_sources(ids: &[String]) -> Result<()> {
    let provider = FsProvider::new();
    for id in ids {
        let (header, ledger) = load(&provider, id).with_context(|| format!("loading {id}"))?;
        let report = validate_at(&header, &ledger, today());

        println!("== {id} ({} movements)", ledger.len());
        for (label, value) in header.entries() {
            if !value.is_empty() {
                println!("  {label}: {value}");
            }
        }
        if let Some(days) = report.days_since_balance {
            println!("  balance is {days} days old");
        }
        if !report.ok {
            for line in &report.diagnostics {
                println!("  {line}");
            }
            bail!("{id}: reconciliation failed");
        }
        println!("  ok");
    }
    Ok(())
}

fn print_tagged(name: &str, tagged: &[TaggedMovement]) {
    println!("# {name} ({} movements)", tagged.len());
    for t in tagged {
        let m = &t.movement;
        println!(
            "{}  {:>12}  {}  [{}]",
            m.accounting_date,
            m.signed_amount(),
            m.description,
            t.tag_list()
        );
    }
}

fn write_csv(tagged: &[TaggedMovement]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    wtr.write_record(Movement::COLUMNS.iter().copied().chain(["tags"]))
        .context("write csv header")?;
    for t in tagged {
        let cells = t.movement.cells();
        let tags = t.tag_list();
        wtr.write_record(cells.iter().map(String::as_str).chain([tags.as_str()]))
            .context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}
