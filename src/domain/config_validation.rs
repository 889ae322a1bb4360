//! Configuration validation.
//!
//! Validates all config fields before an analysis runs.

use crate::domain::error::AttributionError;
use crate::domain::factor::{FactorDateConvention, FactorModel};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    validate_ticker(config)?;
    validate_dates(config)?;
    validate_factor_model(config)?;
    validate_data_sources(config)?;
    validate_date_convention(config)?;
    validate_report_format(config)?;
    Ok(())
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    let ticker = required(config, "analysis", "ticker")?;
    if ticker.contains(['/', '\\']) || ticker.contains("..") {
        return Err(AttributionError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "ticker".to_string(),
            reason: "ticker must not contain path separators".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    let start_date = parse_date(config.get_value("analysis", "start_date").as_deref(), "start_date")?;
    let end_date = config
        .get_value("analysis", "end_date")
        .map(|s| parse_date(Some(&s), "end_date"))
        .transpose()?;

    if let Some(end_date) = end_date {
        if start_date >= end_date {
            return Err(AttributionError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` value from the `[analysis]` section.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, AttributionError> {
    match value {
        None => Err(AttributionError::ConfigMissing {
            section: "analysis".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            AttributionError::ConfigInvalid {
                section: "analysis".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

/// Parse an optional enumerated value, falling back to its default.
pub fn parse_choice<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<T, AttributionError>
where
    T: FromStr<Err = String> + Default,
{
    match config.get_value(section, key) {
        None => Ok(T::default()),
        Some(s) => s.parse().map_err(|reason| AttributionError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason,
        }),
    }
}

fn validate_factor_model(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    parse_choice::<FactorModel>(config, "analysis", "factor_model").map(|_| ())
}

fn validate_data_sources(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    required(config, "data", "price_dir")?;
    required(config, "data", "factor_source")?;
    Ok(())
}

fn validate_date_convention(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    parse_choice::<FactorDateConvention>(config, "data", "factor_date_convention").map(|_| ())
}

fn validate_report_format(config: &dyn ConfigPort) -> Result<(), AttributionError> {
    let format = config.get_value("report", "format").map(|f| f.to_lowercase());
    match format.as_deref() {
        None | Some("text") | Some("json") => Ok(()),
        Some(other) => Err(AttributionError::ConfigInvalid {
            section: "report".to_string(),
            key: "format".to_string(),
            reason: format!("unknown format `{other}` (expected text or json)"),
        }),
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AttributionError> {
    config
        .get_value(section, key)
        .ok_or_else(|| AttributionError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}
