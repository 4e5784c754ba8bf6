//! jtgrow CLI - grow and sample junction trees from the command line
//!
//! Builds a synthetic grid MRF, grows a bounded-width junction tree from a
//! root pixel and optionally runs the sequential engine over it.

mod cli;
mod config;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use jtgrow::{grow_junction_tree, sample_once, Mrf, SequentialEngine, VarId};
use serde_json::json;
use tracing::info;

use cli::{Cli, Commands, ConfigCommand, RunArgs};
use config::Config;
use output::{
    enable_colors, print_error, print_growth, print_header, print_info, print_report, print_success,
};

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let args = match &cli.command {
        Commands::Build(args) | Commands::Sample(args) => args,
        Commands::Config { command } => {
            enable_colors(!cli.no_color);
            return handle_config_command(command);
        }
    };

    let mut config = if cli.no_config {
        Config::default()
    } else {
        Config::load_default()?
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.no_color {
        config.colored = false;
    }

    enable_colors(config.colored);
    logging::init(&config.log_level, config.log_format)?;

    if matches!(cli.command, Commands::Sample(_)) {
        sample(config, args)
    } else {
        build(config, args)
    }
}

/// Grid model and root variable for a run.
fn prepare(config: &mut Config, args: &RunArgs) -> Result<(Mrf, VarId)> {
    config.apply_args(args);
    config
        .growth
        .validate()
        .context("Invalid growth configuration")?;

    let grid = &config.grid;
    if grid.rows == 0 || grid.cols == 0 {
        anyhow::bail!("Grid must have at least one row and one column");
    }
    let mrf = Mrf::grid(grid.rows, grid.cols, grid.arity);
    let root = args
        .root
        .unwrap_or((grid.rows / 2 * grid.cols + grid.cols / 2) as VarId);
    info!(rows = grid.rows, cols = grid.cols, root, "grid model ready");
    Ok((mrf, root))
}

fn build(mut config: Config, args: &RunArgs) -> Result<()> {
    let (mrf, root) = prepare(&mut config, args)?;
    let growth = grow_junction_tree(&mrf, root, &config.growth)
        .with_context(|| format!("Failed to grow junction tree from variable {}", root))?;
    let summary = growth.tree.summary();

    if args.json {
        let value = json!({
            "root": root,
            "strategy": config.growth.strategy,
            "summary": summary,
            "accepted": growth.accepted,
            "rejected": growth.rejected,
            "tree": growth.tree,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_header(&format!(
        "Junction tree ({}, {}x{} grid)",
        config.growth.strategy, config.grid.rows, config.grid.cols
    ));
    print_growth(&summary, growth.accepted.len(), growth.rejected.len());
    if growth.tree.verify_running_intersection_property() {
        print_success("Running intersection property holds");
    } else {
        anyhow::bail!("Running intersection property violated");
    }
    Ok(())
}

fn sample(mut config: Config, args: &RunArgs) -> Result<()> {
    let (mrf, root) = prepare(&mut config, args)?;
    let mut engine = SequentialEngine::new();
    let report = sample_once(&mrf, root, &config.growth, &mut engine)
        .with_context(|| format!("Sampling from variable {} failed", root))?;

    if args.json {
        let value = json!({
            "report": report,
            "schedule": engine.schedule(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_report(&report, engine.schedule().len());
    Ok(())
}

fn handle_config_command(command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = Config::load_default()?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
        }
        ConfigCommand::Path => {
            let path = Config::config_path();
            println!("{}", path.display());
        }
        ConfigCommand::Init => {
            let path = Config::config_path();
            if path.exists() {
                print_info(&format!("Config file already exists: {}", path.display()));
                return Ok(());
            }
            let path = Config::create_default()?;
            print_success(&format!("Created config file: {}", path.display()));
        }
    }

    Ok(())
}
