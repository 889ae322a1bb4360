//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_price_adapter;
pub mod factor_file_adapter;
pub mod file_config_adapter;
pub mod json_report;
pub mod text_report;
