// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains the data exchanged between fetching, extraction,
//! the diff engine, and the query path, plus the configuration types.

mod alert;
mod config;
mod product;

// Re-export all public types
pub use alert::{Alert, AlertKind, MonitoredEntry};
pub use config::{
    Config, ExtractorConfig, FetcherConfig, LoggingConfig, MonitorConfig, ServerConfig,
};
pub use product::{ProductId, ProductRecord, Snapshot};
