//! Port traits between the analysis core and its collaborators.

pub mod config_port;
pub mod factor_port;
pub mod price_port;
pub mod report_port;
