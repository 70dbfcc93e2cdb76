// wrfconf/src/cli/mod.rs

mod namelist;
mod resolve;
mod subdate;

pub use namelist::{namelist, render_namelist, NamelistArgs};
pub use resolve::{resolve, resolve_settings, OutputFormat, ResolveArgs};
pub use subdate::{subdate, substitute_dates, SubdateArgs};

use crate::datetime::{parse_lead, parse_time, ForecastTimes};
use anyhow::Context;

/// Log target for notes recorded while loading and parsing.
pub const LOG_TARGET: &str = "wrfconf";

/// Build forecast times from the raw `--init-time`, `--valid-time` and `--lead` options.
pub fn forecast_times(
    init_time: Option<&str>,
    valid_time: Option<&str>,
    lead: Option<&str>,
) -> anyhow::Result<Option<ForecastTimes>> {
    let Some(init_time) = init_time else {
        if valid_time.is_some() || lead.is_some() {
            anyhow::bail!("--valid-time and --lead require --init-time");
        }
        return Ok(None);
    };
    let mut times = ForecastTimes::new(parse_time(init_time).context("Invalid --init-time")?);
    if let Some(valid) = valid_time {
        times = times.with_valid(parse_time(valid).context("Invalid --valid-time")?);
    } else if let Some(lead) = lead {
        times = times.with_lead(parse_lead(lead).context("Invalid --lead")?);
    }
    Ok(Some(times))
}
