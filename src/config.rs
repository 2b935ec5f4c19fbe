use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::jurisdictions::{self, Jurisdiction};

/// Collector settings for one collection run.
///
/// The jurisdiction roster is carried here explicitly: it is loaded once when
/// the config is built and passed by reference into the run, so the loop never
/// reaches for a global.
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Directory report files are written to.
    pub output_dir: PathBuf,
    /// Jurisdictions to process, in order.
    pub jurisdictions: Vec<Jurisdiction>,
    /// Upper bound on a single page navigation.
    pub request_timeout_ms: u64,
    /// How long to wait for result cards to appear before treating the
    /// jurisdiction as having no results.
    pub results_wait_ms: u64,
    /// Settle time after the result cards appear, so late-rendering fields
    /// make it into the extraction.
    pub settle_delay_ms: u64,
    /// Politeness delay between jurisdictions.
    pub pacing_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            headless: true,
            output_dir: PathBuf::from("./output"),
            jurisdictions: jurisdictions::all(),
            request_timeout_ms: 8000,
            results_wait_ms: 5000,
            settle_delay_ms: 2000,
            pacing_delay_ms: 200,
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Build the configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let collector = CollectorConfig::default();
        let server = ServerConfig::default();
        Self {
            collector: CollectorConfig {
                headless: env_parsed("HEADLESS").unwrap_or(collector.headless),
                output_dir: std::env::var("OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(collector.output_dir),
                jurisdictions: collector.jurisdictions,
                request_timeout_ms: env_parsed("REQUEST_TIMEOUT_MS")
                    .unwrap_or(collector.request_timeout_ms),
                results_wait_ms: env_parsed("RESULTS_WAIT_MS").unwrap_or(collector.results_wait_ms),
                settle_delay_ms: env_parsed("SETTLE_DELAY_MS").unwrap_or(collector.settle_delay_ms),
                pacing_delay_ms: env_parsed("PACING_DELAY_MS").unwrap_or(collector.pacing_delay_ms),
            },
            server: ServerConfig {
                port: env_parsed("PORT").unwrap_or(server.port),
            },
        }
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

/// Per-request overrides accepted by `POST /scrape`.
///
/// Absent fields fall back to the server's configured defaults. Jurisdictions
/// are given as 2-letter codes and resolved against the roster; absent means
/// all 50.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeOptions {
    pub headless: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub jurisdictions: Option<Vec<String>>,
    pub request_timeout_ms: Option<u64>,
}

impl ScrapeOptions {
    /// Apply these overrides on top of a base collector config.
    pub fn apply(self, base: &CollectorConfig) -> Result<CollectorConfig> {
        let mut config = base.clone();
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(codes) = self.jurisdictions {
            config.jurisdictions = jurisdictions::resolve_codes(&codes)?;
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.request_timeout_ms = timeout;
        }
        Ok(config)
    }
}
