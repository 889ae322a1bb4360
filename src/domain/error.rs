//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// Pipeline component that raised a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReturnSeries,
    FactorAligner,
    AttributionEngine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ReturnSeries => "return series",
            Stage::FactorAligner => "factor aligner",
            Stage::AttributionEngine => "attribution engine",
        };
        f.write_str(name)
    }
}

/// First and last date of a series, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan(pub Option<(NaiveDate, NaiveDate)>);

impl DateSpan {
    pub fn of<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let mut span: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            span = Some(match span {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        DateSpan(span)
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some((first, last)) => write!(f, "{first} to {last}"),
            None => f.write_str("no dates"),
        }
    }
}

/// Top-level error type for factor-attrib.
#[derive(Debug, thiserror::Error)]
pub enum AttributionError {
    #[error("return series: empty series, {monthly_points} monthly price(s) give no return (need 2 consecutive months)")]
    EmptySeries { monthly_points: usize },

    #[error("return series: non-positive price {price} on {date}")]
    NonPositivePrice { date: NaiveDate, price: f64 },

    #[error("factor aligner: no overlapping months between {returns} return(s) ({returns_span}) and {factors} factor row(s) ({factors_span})")]
    NoOverlap {
        returns: usize,
        returns_span: DateSpan,
        factors: usize,
        factors_span: DateSpan,
    },

    #[error("factor aligner: insufficient observations ({span}): have {observations}, need {minimum} ({dropped} dropped as non-finite)")]
    InsufficientObservations {
        observations: usize,
        minimum: usize,
        dropped: usize,
        span: DateSpan,
    },

    #[error("attribution engine: singular design matrix ({observations} x {parameters}): column `{column}` is constant or collinear")]
    SingularDesignMatrix {
        observations: usize,
        parameters: usize,
        column: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AttributionError {
    /// The pipeline component that raised this error, if it came from the core.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AttributionError::EmptySeries { .. } | AttributionError::NonPositivePrice { .. } => {
                Some(Stage::ReturnSeries)
            }
            AttributionError::NoOverlap { .. }
            | AttributionError::InsufficientObservations { .. } => Some(Stage::FactorAligner),
            AttributionError::SingularDesignMatrix { .. } => Some(Stage::AttributionEngine),
            _ => None,
        }
    }
}

impl From<&AttributionError> for std::process::ExitCode {
    fn from(err: &AttributionError) -> Self {
        let code: u8 = match err {
            AttributionError::Io(_) | AttributionError::Report { .. } => 1,
            AttributionError::ConfigParse { .. }
            | AttributionError::ConfigMissing { .. }
            | AttributionError::ConfigInvalid { .. } => 2,
            AttributionError::DataSource { .. } => 3,
            AttributionError::EmptySeries { .. }
            | AttributionError::NonPositivePrice { .. }
            | AttributionError::NoOverlap { .. }
            | AttributionError::InsufficientObservations { .. } => 5,
            AttributionError::SingularDesignMatrix { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
