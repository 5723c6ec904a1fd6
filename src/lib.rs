//! Formation cycle data processing.
//!
//! This crate provides:
//! - Parsing tab-separated cycler exports with `,` decimal separators
//! - Cycle boundary detection from current sign changes
//! - Cycle extraction, trimming and read-time time/capacity normalization
//! - Plot-ready per-file series for single and overlay plots
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cycle_plotter::config::ProcessorConfig;
//! use cycle_plotter::data::loader::load_file;
//!
//! let mut report = load_file(Path::new("formation.txt"), &ProcessorConfig::default()).unwrap();
//! report.dataset.trim_to_first_cycle();
//! report.dataset.normalize_time();
//! ```

pub mod config;
pub mod data;

pub use config::{ParseMode, ProcessorConfig};
pub use data::model::{Column, Dataset, RawRecord};
