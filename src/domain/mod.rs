//! Core domain types and logic.

pub mod calendar;
pub mod price;
pub mod returns;
pub mod factor;
pub mod alignment;
pub mod regression;
pub mod attribution;
pub mod interpretation;
pub mod analysis;
pub mod config_validation;
pub mod error;
