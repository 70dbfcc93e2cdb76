// wrfconf/src/datetime.rs

//! Init/valid time placeholders such as `%iY-%im-%id_%iH` and `%fH`.

use crate::error::{ConfigError, Result};
use chrono::{Duration, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_TOKEN: Regex =
        Regex::new(r"%(?:(?P<which>[iv])(?P<field>[YymdHMS])|fH)").unwrap();
}

/// Accepted layouts for times given on the command line or in config files.
const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d_%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Init time of a cycle and, optionally, the valid time of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastTimes {
    pub init: NaiveDateTime,
    pub valid: Option<NaiveDateTime>,
}

impl ForecastTimes {
    pub fn new(init: NaiveDateTime) -> Self {
        Self { init, valid: None }
    }

    pub fn with_valid(mut self, valid: NaiveDateTime) -> Self {
        self.valid = Some(valid);
        self
    }

    /// Valid time as init time plus a forecast lead.
    pub fn with_lead(self, lead: Duration) -> Self {
        let valid = self.init + lead;
        self.with_valid(valid)
    }

    pub fn substitute(&self, text: &str) -> String {
        sub_date(text, self.init, self.valid)
    }
}

/// Replace `%i?`, `%v?` and `%fH` tokens.
///
/// `?` is one of `Y y m d H M S`. `%v?` needs a valid time and `%fH` needs
/// both; tokens that cannot be filled are left as they are.
pub fn sub_date(text: &str, init: NaiveDateTime, valid: Option<NaiveDateTime>) -> String {
    DATE_TOKEN
        .replace_all(text, |caps: &regex::Captures| {
            let whole = &caps[0];
            let (Some(which), Some(field)) = (caps.name("which"), caps.name("field")) else {
                return match valid {
                    Some(valid) => format!("{:02}", forecast_hours(init, valid)),
                    None => whole.to_string(),
                };
            };
            let time = match which.as_str() {
                "i" => init,
                _ => match valid {
                    Some(valid) => valid,
                    None => return whole.to_string(),
                },
            };
            time.format(&format!("%{}", field.as_str())).to_string()
        })
        .into_owned()
}

/// Whole hours from `init` to `valid`, rounded down.
pub fn forecast_hours(init: NaiveDateTime, valid: NaiveDateTime) -> i64 {
    let seconds = (valid - init).num_seconds();
    seconds.div_euclid(3600)
}

pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ConfigError::InvalidTime {
            value: text.to_string(),
            reason: "expected YYYY-MM-DD HH:MM:SS".to_string(),
        })
}

/// Forecast lead in humantime syntax, e.g. `6h` or `1day 12h`.
pub fn parse_lead(text: &str) -> Result<Duration> {
    let std_duration = humantime::parse_duration(text.trim()).map_err(|e| {
        ConfigError::InvalidTime {
            value: text.to_string(),
            reason: e.to_string(),
        }
    })?;
    Duration::from_std(std_duration).map_err(|e| ConfigError::InvalidTime {
        value: text.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_init_date() {
        assert_eq!(sub_date("%iY-%im-%id", at(14, 0, 0), None), "2013-06-14");
    }

    #[test]
    fn test_all_fields() {
        let out = sub_date(
            "%iy%im%id%iH%iM%iS/%vY-%vm-%vd_%vH:%vM:%vS f%fH",
            at(14, 0, 0),
            Some(at(14, 6, 30)),
        );
        assert_eq!(out, "130614000000/2013-06-14_06:30:00 f06");
    }

    #[test]
    fn test_valid_tokens_need_a_valid_time() {
        let out = sub_date("%vY %fH %iH", at(14, 12, 0), None);
        assert_eq!(out, "%vY %fH 12");
    }

    #[test]
    fn test_unknown_tokens_are_left() {
        let text = "%iQ %x %(base) 100%";
        assert_eq!(sub_date(text, at(14, 0, 0), Some(at(15, 0, 0))), text);
    }

    #[test]
    fn test_forecast_hours_round_down() {
        assert_eq!(forecast_hours(at(14, 0, 0), at(15, 6, 59)), 30);
        assert_eq!(forecast_hours(at(14, 0, 0), at(14, 0, 0)), 0);
        assert_eq!(sub_date("%fH", at(14, 0, 0), Some(at(18, 0, 0))), "96");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("2013-06-14 00:00:00").unwrap(), at(14, 0, 0));
        assert_eq!(parse_time("2013-06-14T06:30").unwrap(), at(14, 6, 30));
        assert_eq!(parse_time("2013-06-14_12:00:00").unwrap(), at(14, 12, 0));
        assert!(matches!(
            parse_time("June 14"),
            Err(ConfigError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_lead() {
        let times = ForecastTimes::new(at(14, 0, 0)).with_lead(parse_lead("6h").unwrap());
        assert_eq!(times.valid, Some(at(14, 6, 0)));
        assert_eq!(times.substitute("wrfout_%vH_f%fH"), "wrfout_06_f06");
        assert!(parse_lead("soon").is_err());
    }
}
