use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::error::{CollectorError, Result};

/// Launch a Chromium instance and spawn its event handler task.
///
/// SAM.gov is an Angular app, so the collector needs a real browser session;
/// a plain HTTP fetch would only see the unbooted shell.
pub async fn launch(headless: bool) -> Result<Browser> {
    info!("🚀 launching browser (headless: {})", headless);

    let mut builder = BrowserConfig::builder().args(vec![
        "--disable-gpu",
        "--no-sandbox",            // avoids crashes in containerized deployments
        "--disable-dev-shm-usage", // avoids shared-memory exhaustion
    ]);
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    let config = builder.build().map_err(CollectorError::BrowserLaunch)?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("failed to launch browser: {}", e);
        CollectorError::BrowserLaunch(e.to_string())
    })?;
    debug!("browser launched");

    // Drive CDP events in the background for the lifetime of the browser.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    // Short pause to let the browser state settle before the first page.
    sleep(Duration::from_millis(300)).await;

    Ok(browser)
}
