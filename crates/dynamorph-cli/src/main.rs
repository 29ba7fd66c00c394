use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dynamorph_cli::config::CliConfig;
use dynamorph_cli::error::{read_json_file, write_json_file, CliError};
use dynamorph_cli::planner_io::{build_planner, EdgeRegistry};
use dynamorph_cli::{diff_command, migrate_command, patch_command, plan_command};
use dynamorph_migration::Migration;
use dynamorph_patch::Patch;
use dynamorph_value::DynamicValue;

#[derive(Parser)]
#[command(name = "dynamorph")]
#[command(about = "Round-trip demonstrator for the dynamic-value patch and migration algebra")]
struct Cli {
    /// Path to a `dynamorph.toml` config (patch-mode default, output directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimal patch between two dynamic-value JSON files.
    Diff {
        old: PathBuf,
        new: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Apply a patch JSON file to a dynamic-value JSON file.
    Patch {
        value: PathBuf,
        patch: PathBuf,
        /// strict, lenient, or clobber. Falls back to the config default, then `strict`.
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run a migration action list against a dynamic-value JSON file.
    Migrate {
        value: PathBuf,
        migration: PathBuf,
        /// Run the migration's reverse instead of running it forward.
        #[arg(long)]
        reverse: bool,
        #[arg(long)]
        output: PathBuf,
    },
    /// Compose a registered migration path between two schema ids.
    Plan {
        /// JSON file holding a `{"edges": [{"from", "to", "migration"}, ...]}` registry.
        edges: PathBuf,
        from: String,
        to: String,
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CliConfig, CliError> {
    match path {
        Some(p) => CliConfig::load(p),
        None => Ok(CliConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Diff { old, new, output } => {
            let old_value: DynamicValue = read_json_file(&old)?;
            let new_value: DynamicValue = read_json_file(&new)?;
            let patch = diff_command(&old_value, &new_value);
            tracing::info!(ops = patch.ops.len(), "computed diff");
            let output = config.resolve_output(output);
            write_json_file(&output, &patch)?;
            println!("{}", dynamorph_patch::render::render(&patch));
            Ok(())
        }
        Commands::Patch { value, patch, mode, output } => {
            let value: DynamicValue = read_json_file(&value)?;
            let patch: Patch = read_json_file(&patch)?;
            let mode = config.resolve_mode(mode.as_deref())?;
            let result = patch_command(&value, &patch, mode)?;
            tracing::info!(?mode, "applied patch");
            let output = config.resolve_output(output);
            write_json_file(&output, &result)?;
            Ok(())
        }
        Commands::Migrate { value, migration, reverse, output } => {
            let value: DynamicValue = read_json_file(&value)?;
            let migration: Migration = read_json_file(&migration)?;
            let result = migrate_command(&value, &migration, reverse)?;
            tracing::info!(reverse, actions = migration.actions.len(), "ran migration");
            let output = config.resolve_output(output);
            write_json_file(&output, &result)?;
            Ok(())
        }
        Commands::Plan { edges, from, to, output } => {
            let registry: EdgeRegistry = read_json_file(&edges)?;
            let planner = build_planner(&registry);
            let plan = plan_command(&planner, &from, &to).ok_or_else(|| CliError::NoPlan { from: from.clone(), to: to.clone() })?;
            tracing::info!(from, to, actions = plan.actions.len(), "composed migration plan");
            let output = config.resolve_output(output);
            write_json_file(&output, &plan)?;
            Ok(())
        }
    }
}
