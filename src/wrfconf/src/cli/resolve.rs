// wrfconf/src/cli/resolve.rs

use super::LOG_TARGET;
use crate::loader::ConfigLoader;
use crate::merge::{merge, parse_flags};
use crate::tree::{ConfigTree, ConfigValue};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Output format for the merged settings
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Caller flags, given after `--` as --key=value or --key
    #[arg(last = true, value_name = "FLAGS")]
    pub flags: Vec<String>,
}

/// Merge pass-through flags with the configuration file.
///
/// The file comes from `--config`, or from a `--config=<file>` pass-through
/// flag when the global option is absent.
pub fn resolve_settings(
    config: Option<&Path>,
    flatten: bool,
    flags: &[String],
) -> anyhow::Result<ConfigTree> {
    let cli = parse_flags(flags).context("Error parsing pass-through flags")?;

    let config: Option<PathBuf> = config.map(Path::to_path_buf).or_else(|| {
        cli.get("config")
            .and_then(ConfigValue::as_str)
            .map(PathBuf::from)
    });

    let file = match config {
        Some(path) => {
            let mut loader = ConfigLoader::from_process_env().flatten(flatten);
            let tree = loader
                .load(&path)
                .context(format!("Error loading configuration {}", path.display()))?;
            loader.diagnostics().emit(LOG_TARGET);
            log::debug!("loaded {} settings from {}", tree.len(), path.display());
            tree
        }
        None => ConfigTree::new(),
    };

    Ok(merge(&cli, &file))
}

/// Print the merged settings.
pub fn resolve(config: Option<&Path>, flatten: bool, args: &ResolveArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(config, flatten, &args.flags)?;
    let text = match args.format {
        OutputFormat::Json => settings
            .to_json_string()
            .context("Error serializing settings to JSON")?,
        OutputFormat::Yaml => settings
            .to_yaml_string()
            .context("Error serializing settings to YAML")?,
    };
    println!("{}", text.trim_end());
    Ok(())
}
