//! # Octodash - Octopus Agile price dashboard
//!
//! Renders today's (and, once published, tomorrow's) half-hourly Agile
//! electricity prices and the daily gas rate onto a small 320x240 display,
//! either as PNG snapshots or straight to a framebuffer panel.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration, environment overrides and validation
//! - `logging`: Structured logging and tracing
//! - `tariff`: Octopus REST client and the cache-first price source
//! - `cache`: Per-day JSON price cache with eviction
//! - `reconcile`: Today/tomorrow display window and statistics
//! - `chart`: Bar, gridline and marker geometry
//! - `render`: Frame composition with `embedded-graphics`
//! - `sink`: PNG file and framebuffer outputs
//! - `homeassistant`: Optional alert indicator and message of the day
//! - `mock`: Synthetic tomorrow prices for testing
//! - `app`: Fetch/redraw loop

pub mod app;
pub mod cache;
pub mod chart;
pub mod config;
pub mod error;
pub mod homeassistant;
pub mod logging;
pub mod mock;
pub mod reconcile;
pub mod render;
pub mod sink;
pub mod tariff;

// Re-export commonly used types
pub use app::{CycleReport, Dashboard};
pub use config::Config;
pub use error::{OctodashError, Result};
