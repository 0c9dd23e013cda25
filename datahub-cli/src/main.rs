//! Datahub CLI: fetch, load, and inspect bundled datasets.
//!
//! Commands:
//! - `get`: run the full pipeline and print each table's shape and head
//! - `fetch`: stage a dataset's files without loading them
//! - `list`: enumerate task types and datasets in the catalog
//! - `show-config`: print a dataset's normalized configuration as JSON

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use datahub_core::config::ConfigResolver;
use datahub_core::settings::{load_settings_over, set_option};
use datahub_core::{docs, Pipeline, RuntimeSettings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datahub", version, about = "Datahub CLI: declarative dataset retrieval")]
struct Cli {
    /// Staging directory for downloaded files.
    #[arg(long, global = true, env = "DATAHUB_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// TOML settings file (keys: data_path, verbose).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Root of the dataset configs. Defaults to the bundled catalog, which
    /// lives in the source tree this binary was built from.
    #[arg(long, global = true, env = "DATAHUB_CONFIG_ROOT")]
    config_root: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(long, short, global = true, conflicts_with = "debug")]
    quiet: bool,

    /// Log debug detail.
    #[arg(long, global = true)]
    debug: bool,

    /// Skip the documentation link after loading.
    #[arg(long, global = true)]
    no_verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, transform, and load a dataset; print every table.
    Get {
        /// Task type (e.g., classification, regression).
        task: String,
        /// Dataset name (e.g., iris).
        dataset: String,
        /// Rows to print per table.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Stage a dataset's files without loading tables.
    Fetch { task: String, dataset: String },
    /// List task types, or the datasets of one task type.
    List { task: Option<String> },
    /// Print the normalized configuration of a dataset as JSON.
    ShowConfig { task: String, dataset: String },
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.debug {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Defaults, then the settings file, then command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<RuntimeSettings> {
    let base = match &cli.settings {
        Some(path) => RuntimeSettings::from_file(path)?,
        None => RuntimeSettings::default(),
    };
    if let Some(data_path) = &cli.data_path {
        set_option("data_path", data_path.as_path())?;
    }
    if cli.no_verbose {
        set_option("verbose", false)?;
    }
    let settings = load_settings_over(base);
    log::debug!("effective settings: {settings:?}");
    Ok(settings)
}

fn resolver(cli: &Cli) -> ConfigResolver {
    match &cli.config_root {
        Some(root) => ConfigResolver::new(root),
        None => ConfigResolver::bundled(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Get {
            task,
            dataset,
            rows,
        } => run_get(&cli, task, dataset, *rows),
        Commands::Fetch { task, dataset } => run_fetch(&cli, task, dataset),
        Commands::List { task } => run_list(&cli, task.as_deref()),
        Commands::ShowConfig { task, dataset } => run_show_config(&cli, task, dataset),
    }
}

fn pipeline(cli: &Cli, settings: &RuntimeSettings) -> Result<Pipeline> {
    Ok(Pipeline::new(settings)?.with_resolver(resolver(cli)))
}

fn run_get(cli: &Cli, task: &str, dataset: &str, rows: usize) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let bundle = pipeline(cli, &settings)?
        .run(dataset, task)
        .with_context(|| format!("failed to load {task}/{dataset}"))?;

    println!("{dataset} ({task}): {bundle}");
    for (name, df) in bundle.iter() {
        let (height, width) = df.shape();
        println!();
        println!("── {name}: {height} rows × {width} columns");
        println!("{}", df.head(Some(rows)));
    }
    docs::log_dataset_doc_link(dataset, task, settings.verbose);
    Ok(())
}

fn run_fetch(cli: &Cli, task: &str, dataset: &str) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let pipeline = pipeline(cli, &settings)?;
    let config = pipeline.resolve(dataset, task)?;
    let summary = pipeline
        .stage(&config)
        .with_context(|| format!("failed to stage {task}/{dataset}"))?;

    println!(
        "{dataset}: {} fetched, {} already staged",
        summary.fetched.len(),
        summary.skipped.len()
    );
    println!(
        "  {}",
        pipeline.staging().dataset_dir(&config.dataset_name).display()
    );
    Ok(())
}

fn run_list(cli: &Cli, task: Option<&str>) -> Result<()> {
    let resolver = resolver(cli);
    match task {
        Some(task) => {
            let names = resolver.list_datasets(task)?;
            if names.is_empty() {
                bail!(
                    "no datasets for task type '{task}' under {}",
                    resolver.root().display()
                );
            }
            for name in names {
                println!("{name}");
            }
        }
        None => {
            for task in resolver.list_task_types()? {
                for name in resolver.list_datasets(&task)? {
                    println!("{task}/{name}");
                }
            }
        }
    }
    Ok(())
}

fn run_show_config(cli: &Cli, task: &str, dataset: &str) -> Result<()> {
    let config = resolver(cli).resolve(dataset, task)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_takes_task_then_dataset() {
        let cli = Cli::try_parse_from(["datahub", "get", "classification", "iris", "--rows", "3"])
            .unwrap();
        match cli.command {
            Commands::Get {
                task,
                dataset,
                rows,
            } => {
                assert_eq!(task, "classification");
                assert_eq!(dataset, "iris");
                assert_eq!(rows, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "datahub",
            "fetch",
            "regression",
            "housing",
            "--data-path",
            "/tmp/dh",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.data_path, Some(PathBuf::from("/tmp/dh")));
        assert!(cli.quiet);
    }

    #[test]
    fn list_task_is_optional() {
        let cli = Cli::try_parse_from(["datahub", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { task: None }));
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["datahub", "--quiet", "--debug", "list"]).is_err());
    }
}
