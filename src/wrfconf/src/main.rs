// wrfconf/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wrfconf::cli::{namelist, resolve, subdate, NamelistArgs, ResolveArgs, SubdateArgs};

#[derive(Parser)]
#[command(name = "wrfconf")]
#[command(about = "Resolve forecast configuration and fill WRF/WPS namelists", long_about = None)]
#[command(version = env!("WRFCONF_CLI_VERSION"))]
struct Cli {
    /// Configuration file (.json, .yaml or .yml)
    #[arg(short, long, value_name = "FILE", global = true, env = "WRFCONF_CONFIG")]
    config: Option<PathBuf>,

    /// Merge included files into the including tree instead of nesting them
    #[arg(long, global = true)]
    flatten: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged settings
    Resolve(ResolveArgs),
    /// Fill a namelist template from the merged settings
    Namelist(NamelistArgs),
    /// Substitute init/valid time placeholders in a string
    Subdate(SubdateArgs),
}

fn entrypoint() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Resolve(args) => resolve(config, cli.flatten, args),
        Commands::Namelist(args) => namelist(config, cli.flatten, args),
        Commands::Subdate(args) => subdate(args),
    }
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
