//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use crate::adapters::chart_svg::SvgChartAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::factor_file_adapter::FactorFileAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::analysis::{self, AnalysisConfig, AnalysisReport};
use crate::domain::config_validation::{parse_choice, parse_date, validate_analysis_config};
use crate::domain::error::AttributionError;
use crate::domain::factor::{FactorDateConvention, FactorModel};
use crate::ports::config_port::ConfigPort;
use crate::ports::factor_port::FactorPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "factor-attrib",
    about = "Fama-French factor return attribution for a single asset"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit the factor model and report the return attribution
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [analysis] ticker
        #[arg(long)]
        ticker: Option<String>,
        /// Overrides [analysis] start_date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Overrides [analysis] end_date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Overrides [data] factor_source
        #[arg(long)]
        factors: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// text or json
        #[arg(long)]
        format: Option<String>,
        /// Write an SVG bar chart of the annualized contributions
        #[arg(long)]
        chart: Option<PathBuf>,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Validate a configuration file without running the analysis
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            ticker,
            start,
            end,
            factors,
            output,
            format,
            chart,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = Overrides {
                ticker,
                start,
                end,
                factors,
                output,
                format,
                chart,
            };
            run_analyze(&config, &overrides)
        }
        Command::Validate { config } => {
            init_logging(false);
            run_validate(&config)
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AttributionError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub factors: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub chart: Option<PathBuf>,
}

/// A config view where selected keys are replaced by command-line values.
pub struct LayeredConfig<'a> {
    base: &'a dyn ConfigPort,
    layer: Vec<(&'static str, &'static str, String)>,
}

impl<'a> LayeredConfig<'a> {
    pub fn new(base: &'a dyn ConfigPort) -> Self {
        Self {
            base,
            layer: Vec::new(),
        }
    }

    pub fn with(mut self, section: &'static str, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.layer.push((section, key, v.to_string()));
        }
        self
    }

    pub fn from_overrides(base: &'a dyn ConfigPort, overrides: &Overrides) -> Self {
        let output = overrides.output.as_ref().map(|p| p.display().to_string());
        let chart = overrides.chart.as_ref().map(|p| p.display().to_string());
        Self::new(base)
            .with("analysis", "ticker", overrides.ticker.as_deref())
            .with("analysis", "start_date", overrides.start.as_deref())
            .with("analysis", "end_date", overrides.end.as_deref())
            .with("data", "factor_source", overrides.factors.as_deref())
            .with("report", "output", output.as_deref())
            .with("report", "format", overrides.format.as_deref())
            .with("report", "chart", chart.as_deref())
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.layer
            .iter()
            .rev()
            .find(|(s, k, _)| *s == section && *k == key)
            .map(|(_, _, v)| v.as_str())
    }
}

impl ConfigPort for LayeredConfig<'_> {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key)
            .map(str::to_string)
            .or_else(|| self.base.get_string(section, key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown format `{other}` (expected text or json)")),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

/// Where and how the finished report is written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// `None` prints to stdout.
    pub output: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

/// Build the run parameters from a validated config.
pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, AttributionError> {
    let ticker = config
        .get_value("analysis", "ticker")
        .ok_or_else(|| AttributionError::ConfigMissing {
            section: "analysis".into(),
            key: "ticker".into(),
        })?;
    let start_date = parse_date(config.get_value("analysis", "start_date").as_deref(), "start_date")?;
    let end_date = config
        .get_value("analysis", "end_date")
        .map(|s| parse_date(Some(&s), "end_date"))
        .transpose()?;
    let factor_source =
        config
            .get_value("data", "factor_source")
            .ok_or_else(|| AttributionError::ConfigMissing {
                section: "data".into(),
                key: "factor_source".into(),
            })?;

    Ok(AnalysisConfig {
        ticker: ticker.to_uppercase(),
        start_date,
        end_date,
        factor_source,
        factor_model: parse_choice::<FactorModel>(config, "analysis", "factor_model")?,
    })
}

pub fn build_report_options(config: &dyn ConfigPort) -> Result<ReportOptions, AttributionError> {
    Ok(ReportOptions {
        format: parse_choice(config, "report", "format")?,
        output: config.get_value("report", "output").map(PathBuf::from),
        chart: config.get_value("report", "chart").map(PathBuf::from),
    })
}

fn run_analyze(config_path: &Path, overrides: &Overrides) -> ExitCode {
    tracing::info!(path = %config_path.display(), "loading config");
    let file_config = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = LayeredConfig::from_overrides(&file_config, overrides);

    if let Err(e) = validate_analysis_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let resolved = build_analysis_config(&config).and_then(|a| {
        let options = build_report_options(&config)?;
        let convention =
            parse_choice::<FactorDateConvention>(&config, "data", "factor_date_convention")?;
        Ok((a, options, convention))
    });
    let (analysis_config, options, convention) = match resolved {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // validate_analysis_config guarantees price_dir is present
    let price_dir = config.get_value("data", "price_dir").unwrap_or_default();
    let price_port = CsvPriceAdapter::new(PathBuf::from(price_dir));
    let factor_port = FactorFileAdapter::new(convention);

    run_analysis_pipeline(&price_port, &factor_port, &analysis_config, &options)
}

/// Render the report (and chart, if requested). Returns the report text
/// when it is meant for stdout.
pub fn write_outputs(
    report: &AnalysisReport,
    options: &ReportOptions,
) -> Result<Option<String>, AttributionError> {
    let renderer: &dyn ReportPort = match options.format {
        ReportFormat::Text => &TextReportAdapter,
        ReportFormat::Json => &JsonReportAdapter,
    };

    if let Some(chart) = &options.chart {
        SvgChartAdapter.write(report, chart)?;
        tracing::info!(path = %chart.display(), "chart written");
    }

    match &options.output {
        Some(path) => {
            renderer.write(report, path)?;
            tracing::info!(path = %path.display(), "report written");
            Ok(None)
        }
        None => renderer.render(report).map(Some),
    }
}

pub fn run_analysis_pipeline(
    price_port: &dyn PricePort,
    factor_port: &dyn FactorPort,
    config: &AnalysisConfig,
    options: &ReportOptions,
) -> ExitCode {
    let report = match analysis::run_analysis(price_port, factor_port, config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match write_outputs(&report, options) {
        Ok(Some(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let resolved = validate_analysis_config(&config)
        .and_then(|_| build_analysis_config(&config))
        .and_then(|a| Ok((a, build_report_options(&config)?)));
    let (analysis_config, options) = match resolved {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("  ticker:        {}", analysis_config.ticker);
    eprintln!(
        "  window:        {} to {}",
        analysis_config.start_date,
        analysis_config
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "latest".to_string())
    );
    eprintln!("  factor model:  {}", analysis_config.factor_model);
    eprintln!("  factor source: {}", analysis_config.factor_source);
    eprintln!(
        "  report:        {} to {}",
        options.format,
        options
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    );
    eprintln!("\nConfig validated successfully");
    ExitCode::SUCCESS
}
