//! CLI integration tests for the analyze and validate commands.
//!
//! Tests cover:
//! - Config parsing and command-line overrides (build_analysis_config)
//! - Validate command with real INI files on disk
//! - Pipeline with mock ports (run_analysis_pipeline)
//! - End-to-end runs over CSV price and factor files

mod common;

use clap::Parser;
use common::*;
use factor_attrib::adapters::file_config_adapter::FileConfigAdapter;
use factor_attrib::cli::{self, Cli, LayeredConfig, Overrides, ReportFormat, ReportOptions};
use factor_attrib::domain::error::AttributionError;
use factor_attrib::domain::factor::FactorModel;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn code(c: ExitCode) -> String {
    format!("{:?}", c)
}

fn expect(n: u8) -> String {
    code(ExitCode::from(n))
}

const VALID_INI: &str = r#"
[analysis]
ticker = TEST
start_date = 2015-01-01
end_date = 2020-12-31
factor_model = ff3

[data]
price_dir = prices
factor_source = factors.csv
factor_date_convention = period_month

[report]
format = text
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_analysis_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_analysis_config(&adapter).unwrap();

        assert_eq!(config.ticker, "TEST");
        assert_eq!(config.start_date, d(2015, 1, 1));
        assert_eq!(config.end_date, Some(d(2020, 12, 31)));
        assert_eq!(config.factor_source, "factors.csv");
        assert_eq!(config.factor_model, FactorModel::FamaFrench3);
    }

    #[test]
    fn build_analysis_config_defaults() {
        let ini = "[analysis]\nticker = SPY\nstart_date = 2010-01-01\n[data]\nfactor_source = f.csv\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_analysis_config(&adapter).unwrap();

        assert_eq!(config.end_date, None);
        assert_eq!(config.factor_model, FactorModel::FamaFrench3);

        let options = cli::build_report_options(&adapter).unwrap();
        assert_eq!(options, ReportOptions::default());
    }

    #[test]
    fn build_analysis_config_missing_start_date() {
        let ini = "[analysis]\nticker = SPY\n[data]\nfactor_source = f.csv\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_analysis_config(&adapter).unwrap_err();
        assert!(matches!(err, AttributionError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn build_analysis_config_invalid_end_date() {
        let ini = "[analysis]\nticker = SPY\nstart_date = 2010-01-01\nend_date = 31/12/2020\n[data]\nfactor_source = f.csv\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_analysis_config(&adapter).unwrap_err();
        assert!(matches!(err, AttributionError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn invalid_report_format_is_rejected() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            format: Some("pdf".into()),
            ..Default::default()
        };
        let layered = LayeredConfig::from_overrides(&adapter, &overrides);
        let err = cli::build_report_options(&layered).unwrap_err();
        assert!(matches!(err, AttributionError::ConfigInvalid { key, .. } if key == "format"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            ticker: Some("qqq".into()),
            start: Some("2018-01-01".into()),
            format: Some("json".into()),
            ..Default::default()
        };
        let layered = LayeredConfig::from_overrides(&adapter, &overrides);
        let config = cli::build_analysis_config(&layered).unwrap();
        assert_eq!(config.ticker, "QQQ");
        assert_eq!(config.start_date, d(2018, 1, 1));
        assert_eq!(config.end_date, Some(d(2020, 12, 31)));
        assert_eq!(
            cli::build_report_options(&layered).unwrap().format,
            ReportFormat::Json
        );
    }
}

mod validate_command {
    use super::*;

    fn run_validate(path: &Path) -> ExitCode {
        let cli = Cli::try_parse_from([
            "factor-attrib",
            "validate",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        cli::run(cli)
    }

    #[test]
    fn valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        assert_eq!(code(run_validate(file.path())), code(ExitCode::SUCCESS));
    }

    #[test]
    fn missing_ticker_is_config_error() {
        let file = write_temp_ini(&VALID_INI.replace("ticker = TEST\n", ""));
        assert_eq!(code(run_validate(file.path())), expect(2));
    }

    #[test]
    fn unknown_factor_model_is_config_error() {
        let file = write_temp_ini(&VALID_INI.replace("factor_model = ff3", "factor_model = ff5"));
        assert_eq!(code(run_validate(file.path())), expect(2));
    }

    #[test]
    fn missing_file_is_config_error() {
        assert_eq!(
            code(run_validate(Path::new("/nonexistent/config.ini"))),
            expect(2)
        );
    }
}

mod pipeline {
    use super::*;
    use factor_attrib::domain::analysis::AnalysisConfig;
    use factor_attrib::domain::factor::FactorRow;

    fn analysis_config() -> AnalysisConfig {
        AnalysisConfig {
            ticker: "TEST".into(),
            start_date: d(2015, 1, 1),
            end_date: None,
            factor_source: "mock".into(),
            factor_model: FactorModel::FamaFrench3,
        }
    }

    #[test]
    fn pipeline_writes_report_and_chart() {
        let (prices, factors) = synthetic_market(60, 0.001, (1.1, 0.3, 0.2));
        let price_port = MockPricePort::new().with_prices("TEST", prices);
        let factor_port = MockFactorPort::new(factors);
        let dir = tempfile::TempDir::new().unwrap();
        let options = ReportOptions {
            format: ReportFormat::Text,
            output: Some(dir.path().join("report.txt")),
            chart: Some(dir.path().join("chart.svg")),
        };

        let exit = cli::run_analysis_pipeline(&price_port, &factor_port, &analysis_config(), &options);
        assert_eq!(code(exit), code(ExitCode::SUCCESS));

        let text = fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(text.starts_with("TEST Return Attribution"));
        assert!(text.contains("Interpretation"));
        let svg = fs::read_to_string(dir.path().join("chart.svg")).unwrap();
        assert!(svg.contains("TEST Return Attribution (Annualised)"));
    }

    #[test]
    fn pipeline_maps_stage_errors_to_exit_codes() {
        let (prices, _) = synthetic_market(24, 0.0, (1.0, 0.0, 0.0));
        let price_port = MockPricePort::new().with_prices("TEST", prices);
        let factor_port = MockFactorPort::new(vec![FactorRow::new(d(1990, 1, 1), 0.01, 0.0, 0.0, 0.0)]);

        let exit = cli::run_analysis_pipeline(
            &price_port,
            &factor_port,
            &analysis_config(),
            &ReportOptions::default(),
        );
        assert_eq!(code(exit), expect(5));
    }

    #[test]
    fn pipeline_reports_data_source_failure() {
        let price_port = MockPricePort::new().with_error("TEST", "disk on fire");
        let factor_port = MockFactorPort::new(Vec::new());
        let exit = cli::run_analysis_pipeline(
            &price_port,
            &factor_port,
            &analysis_config(),
            &ReportOptions::default(),
        );
        assert_eq!(code(exit), expect(3));
    }

    #[test]
    fn unwritable_output_is_report_error() {
        let (prices, factors) = synthetic_market(24, 0.0, (1.0, 0.2, 0.1));
        let price_port = MockPricePort::new().with_prices("TEST", prices);
        let factor_port = MockFactorPort::new(factors);
        let options = ReportOptions {
            output: Some("/nonexistent/dir/report.txt".into()),
            ..Default::default()
        };
        let exit = cli::run_analysis_pipeline(&price_port, &factor_port, &analysis_config(), &options);
        assert_eq!(code(exit), expect(1));
    }
}

mod end_to_end {
    use super::*;
    use serde_json::Value;

    /// Lays out `<dir>/prices/TEST.csv`, `<dir>/factors.csv` and a config.
    fn setup(months: usize) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let (prices, factors) = synthetic_market(months, 0.002, (0.8, -0.4, 0.6));

        fs::create_dir(dir.path().join("prices")).unwrap();
        fs::write(dir.path().join("prices/TEST.csv"), price_csv(&prices)).unwrap();
        fs::write(dir.path().join("factors.csv"), factor_csv(&factors)).unwrap();

        let ini = format!(
            "[analysis]\nticker = TEST\nstart_date = 2015-01-01\n\n[data]\nprice_dir = {}\nfactor_source = {}\n\n[report]\nformat = json\noutput = {}\n",
            dir.path().join("prices").display(),
            dir.path().join("factors.csv").display(),
            dir.path().join("report.json").display(),
        );
        let config_path = dir.path().join("config.ini");
        fs::write(&config_path, ini).unwrap();
        (dir, config_path)
    }

    fn analyze(args: &[&str]) -> ExitCode {
        let mut argv = vec!["factor-attrib", "analyze"];
        argv.extend_from_slice(args);
        cli::run(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn json_report_from_csv_inputs() {
        let (dir, config_path) = setup(60);
        let exit = analyze(&["--config", config_path.to_str().unwrap()]);
        assert_eq!(code(exit), code(ExitCode::SUCCESS));

        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let v: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["ticker"], "TEST");
        assert_eq!(v["regression"]["observations"], 60);
        let beta = v["regression"]["loadings"][0]["beta"]["value"].as_f64().unwrap();
        assert!((beta - 0.8).abs() < 0.05, "market beta {beta}");
        assert_eq!(v["interpretation"]["size"], "large_cap");
        assert_eq!(v["interpretation"]["style"], "value");
    }

    #[test]
    fn command_line_overrides_apply() {
        let (dir, config_path) = setup(60);
        let out = dir.path().join("capm.txt");
        let exit = analyze(&[
            "--config",
            config_path.to_str().unwrap(),
            "--end",
            "2016-12-31",
            "--format",
            "text",
            "--output",
            out.to_str().unwrap(),
            "--chart",
            dir.path().join("chart.svg").to_str().unwrap(),
        ]);
        assert_eq!(code(exit), code(ExitCode::SUCCESS));

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("2015-02-28 to 2016-12-31 (23 months)"));
        assert!(dir.path().join("chart.svg").exists());
        assert!(!dir.path().join("report.json").exists());
    }

    #[test]
    fn missing_price_file_is_data_source_error() {
        let (_dir, config_path) = setup(24);
        let exit = analyze(&["--config", config_path.to_str().unwrap(), "--ticker", "NOPE"]);
        assert_eq!(code(exit), expect(3));
    }

    #[test]
    fn path_like_ticker_is_rejected() {
        let (_dir, config_path) = setup(24);
        let exit = analyze(&["--config", config_path.to_str().unwrap(), "--ticker", "../TEST"]);
        assert_eq!(code(exit), expect(2));
    }
}
