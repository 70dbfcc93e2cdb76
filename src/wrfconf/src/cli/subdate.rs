// wrfconf/src/cli/subdate.rs

use super::forecast_times;
use clap::Args;

#[derive(Debug, Args)]
pub struct SubdateArgs {
    /// Text containing %iY, %vH, %fH ... placeholders
    pub text: String,

    #[arg(long)]
    pub init_time: String,

    #[arg(long, conflicts_with = "lead")]
    pub valid_time: Option<String>,

    #[arg(long)]
    pub lead: Option<String>,
}

pub fn substitute_dates(args: &SubdateArgs) -> anyhow::Result<String> {
    let times = forecast_times(
        Some(args.init_time.as_str()),
        args.valid_time.as_deref(),
        args.lead.as_deref(),
    )?;
    Ok(match times {
        Some(times) => times.substitute(&args.text),
        None => args.text.clone(),
    })
}

pub fn subdate(args: &SubdateArgs) -> anyhow::Result<()> {
    println!("{}", substitute_dates(args)?);
    Ok(())
}
