// wrfconf/src/cli/namelist.rs

use super::resolve::resolve_settings;
use super::{forecast_times, LOG_TARGET};
use crate::apply::apply_tree;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use wrfnml::{NamelistDocument, Parser, WriteOptions};

#[derive(Debug, Args)]
pub struct NamelistArgs {
    /// Namelist template to fill
    #[arg(short, long, value_name = "FILE")]
    pub template: PathBuf,

    /// Where to write the filled namelist
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Cycle init time, e.g. "2013-06-14 00:00:00"
    #[arg(long)]
    pub init_time: Option<String>,

    /// Valid time for %v and %fH placeholders
    #[arg(long, conflicts_with = "lead")]
    pub valid_time: Option<String>,

    /// Forecast lead added to the init time, e.g. 6h
    #[arg(long)]
    pub lead: Option<String>,

    /// Overwrite the output if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Caller flags, given after `--` as --key=value or --key
    #[arg(last = true, value_name = "FLAGS")]
    pub flags: Vec<String>,
}

/// Fill a namelist template from the merged settings and return the document.
pub fn render_namelist(
    config: Option<&Path>,
    flatten: bool,
    args: &NamelistArgs,
) -> anyhow::Result<NamelistDocument> {
    let settings = resolve_settings(config, flatten, &args.flags)?;
    let dates = forecast_times(
        args.init_time.as_deref(),
        args.valid_time.as_deref(),
        args.lead.as_deref(),
    )?;

    let text = fs_err::read_to_string(&args.template)
        .context(format!("Error reading {} to string.", args.template.display()))?;
    let mut parser = Parser::from_process_env();
    let mut doc = parser
        .parse(&text)
        .context(format!("Error parsing namelist {}", args.template.display()))?;
    parser.diagnostics().emit(LOG_TARGET);

    let written = apply_tree(&mut doc, &settings, dates.as_ref())
        .context(format!("Error applying settings to {}", args.template.display()))?;
    log::info!(
        "applied {} settings to {}",
        written,
        args.template.display()
    );
    Ok(doc)
}

pub fn namelist(config: Option<&Path>, flatten: bool, args: &NamelistArgs) -> anyhow::Result<()> {
    let doc = render_namelist(config, flatten, args)?;
    wrfnml::write_with_options(&doc, &args.output, &WriteOptions::default().force(args.force))
        .context(format!("Error writing {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
