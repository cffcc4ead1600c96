//! grading-core — shared types for the grading service.
//!
//! Holds the grade and scale data model, the GPA resolver, and the
//! `grading.toml` configuration parser. Nothing in this crate performs I/O
//! beyond reading a config file.

pub mod config;
pub mod resolver;
pub mod types;

pub use config::{ConfigError, ServiceConfig};
pub use resolver::{NOT_AVAILABLE, resolve};
pub use types::*;
