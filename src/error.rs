use thiserror::Error;

/// Errors surfaced by the collector and its storage layer.
///
/// Per-jurisdiction navigation and extraction failures are caught inside the
/// collection loop and recorded on the affected [`JurisdictionResult`]; only
/// failures before the loop starts (browser launch, page creation) propagate
/// out of [`collector::run`].
///
/// [`JurisdictionResult`]: crate::report::JurisdictionResult
/// [`collector::run`]: crate::collector::run
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The headless browser could not be configured or launched.
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// Navigating to a search URL failed outright.
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Navigation did not complete within the configured request timeout.
    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// A jurisdiction code supplied by the caller is not in the roster.
    #[error("unknown jurisdiction code: {code}")]
    UnknownJurisdiction { code: String },

    /// DevTools protocol error (page creation, script evaluation).
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
