//! # SAM.gov Awardee Collector
//!
//! Collects Department of Defense contract awardee names from the SAM.gov
//! search portal, one US state at a time, and persists each run as a JSON
//! report. A thin HTTP wrapper exposes the collector and the persisted
//! reports.
//!
//! ## Architecture
//!
//! - `browser`: launches the headless Chromium session; the only place that
//!   knows how the browser is configured.
//! - `collector`: the sequential per-jurisdiction loop (navigate, wait,
//!   extract, dedupe). Per-jurisdiction failures are isolated; only a launch
//!   failure aborts a run.
//! - `report` / `storage`: the immutable run report and its flat-file
//!   persistence.
//! - `server`: axum façade with `POST /scrape` plus read-only views over the
//!   output directory.
//! - `jurisdictions` / `config`: the static state roster, injected into the
//!   run via the config rather than read as a global.

pub mod browser;
pub mod collector;
pub mod config;
pub mod error;
pub mod jurisdictions;
pub mod logging;
pub mod report;
pub mod server;
pub mod storage;

pub use config::{CollectorConfig, Config, ScrapeOptions};
pub use error::{CollectorError, Result};
pub use jurisdictions::Jurisdiction;
pub use report::{CollectionReport, JurisdictionResult};
