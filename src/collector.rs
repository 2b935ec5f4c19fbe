//! The sequential collection loop.
//!
//! One browser page is reused serially across jurisdictions: navigate to the
//! parameterized SAM.gov search, wait for result cards, extract the "Awardee"
//! field from each card, dedupe, and move on. Per-jurisdiction failures are
//! recorded and never abort the run; only browser launch / page creation
//! failures propagate.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use tokio::time::{sleep, timeout, Duration};
use tracing::{error, info, warn};

use crate::browser;
use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::jurisdictions::Jurisdiction;
use crate::report::{self, CollectionReport, JurisdictionResult};
use crate::storage;

/// The search-result card element on the SAM.gov results page.
const RESULT_CARD_SELECTOR: &str = "app-opportunity-result";

/// Poll interval while waiting for result cards to appear.
const RESULT_POLL_MS: u64 = 250;

/// Pulls the value of every field labeled "Awardee" out of every result card,
/// in DOM order, trimmed. Duplicates are kept; deduplication happens on the
/// Rust side.
const EXTRACT_AWARDEES_JS: &str = r#"
(() => {
    const names = [];
    for (const card of document.querySelectorAll('app-opportunity-result')) {
        for (const field of card.querySelectorAll('.sds-field')) {
            const label = field.querySelector('.sds-field__name');
            const value = field.querySelector('.sds-field__value');
            if (label && value && label.textContent.trim() === 'Awardee') {
                const text = value.textContent.trim();
                if (text) {
                    names.push(text);
                }
            }
        }
    }
    return names;
})()
"#;

/// Build the SAM.gov search URL for one jurisdiction.
///
/// The query-parameter schema is an external contract of the portal: contract
/// opportunities, DOD only, NAICS 31-33 (manufacturing), updated in the past
/// week, active and inactive, filtered to awardees in the given state.
pub fn search_url(jurisdiction: &Jurisdiction) -> String {
    let encoded_name = jurisdiction.name.replace(' ', "%20");
    format!(
        "https://sam.gov/search/?page=1&pageSize=100&sort=-modifiedDate&index=opp\
         &sfm%5BsimpleSearch%5D%5BkeywordRadio%5D=ALL\
         &sfm%5BsimpleSearch%5D%5BkeywordEditorTextarea%5D=\
         &sfm%5Bstatus%5D%5Bis_active%5D=true\
         &sfm%5Bstatus%5D%5Bis_inactive%5D=true\
         &sfm%5Bdates%5D%5BupdatedDate%5D%5BupdatedDateSelect%5D=pastWeek\
         &sfm%5BserviceClassificationWrapper%5D%5Bnaics%5D%5B0%5D%5Bkey%5D=31-33\
         &sfm%5BserviceClassificationWrapper%5D%5Bnaics%5D%5B0%5D%5Bvalue%5D=31-33%20-%20Manufacturing\
         &sfm%5BawardeeDetails%5D%5Bstate%5D%5B0%5D%5Bkey%5D={code}\
         &sfm%5BawardeeDetails%5D%5Bstate%5D%5B0%5D%5Bvalue%5D={code}%20-%20{name}\
         &sfm%5BagencyPicker%5D%5B0%5D%5BorgKey%5D=100000000\
         &sfm%5BagencyPicker%5D%5B0%5D%5BorgText%5D=097%20-%20DEPT%20OF%20DEFENSE\
         &sfm%5BagencyPicker%5D%5B0%5D%5BlevelText%5D=Dept%20%2F%20Ind.%20Agency\
         &sfm%5BagencyPicker%5D%5B0%5D%5Bhighlighted%5D=true",
        code = jurisdiction.code,
        name = encoded_name,
    )
}

/// Collapse raw extracted strings into a sorted set of unique, non-empty
/// trimmed names. Identity is exact-match after trimming; no case folding.
pub fn dedupe_awardees(raw: Vec<String>) -> Vec<String> {
    let set: BTreeSet<String> = raw
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    set.into_iter().collect()
}

/// Run one full collection over the configured jurisdictions.
///
/// Returns the assembled report after writing it to the output directory.
pub async fn run(config: &CollectorConfig) -> Result<CollectionReport> {
    let total = config.jurisdictions.len();
    info!("starting collection for {} jurisdictions", total);

    let mut browser = browser::launch(config.headless).await?;
    let page = browser.new_page("about:blank").await?;

    let mut results_by_jurisdiction: BTreeMap<String, JurisdictionResult> = BTreeMap::new();

    for (index, jurisdiction) in config.jurisdictions.iter().enumerate() {
        info!(
            "processing {} ({}) - {}/{}",
            jurisdiction.name,
            jurisdiction.code,
            index + 1,
            total
        );

        let result = match collect_jurisdiction(&page, jurisdiction, config).await {
            Ok(raw) => {
                let total_found = raw.len();
                let awardees = dedupe_awardees(raw);
                info!(
                    "found {} awardees, {} unique for {}",
                    total_found,
                    awardees.len(),
                    jurisdiction.name
                );
                JurisdictionResult::collected(jurisdiction, awardees)
            }
            Err(e) => {
                error!("error processing {}: {}", jurisdiction.name, e);
                JurisdictionResult::failed(jurisdiction, e.to_string())
            }
        };
        results_by_jurisdiction.insert(jurisdiction.code.clone(), result);

        // Politeness delay between jurisdictions.
        sleep(Duration::from_millis(config.pacing_delay_ms)).await;
    }

    let report = CollectionReport::assemble(
        results_by_jurisdiction,
        report::jurisdictions_label(&config.jurisdictions),
    );

    let path = storage::write_report(&config.output_dir, &report)?;
    info!(
        "✅ collection complete: {} unique awardees across {} jurisdictions, saved to {}",
        report.summary.total_unique_awardees,
        report.summary.jurisdictions_processed,
        path.display()
    );

    if let Err(e) = browser.close().await {
        warn!("failed to close browser cleanly: {}", e);
    }

    Ok(report)
}

/// Navigate to one jurisdiction's search page and extract raw awardee names.
///
/// A timeout waiting for result cards is a normal no-results outcome and
/// returns an empty list; navigation or evaluation failures are errors the
/// caller records on the jurisdiction.
async fn collect_jurisdiction(
    page: &Page,
    jurisdiction: &Jurisdiction,
    config: &CollectorConfig,
) -> Result<Vec<String>> {
    let url = search_url(jurisdiction);
    navigate(page, &url, config.request_timeout_ms).await?;

    if !wait_for_results(page, config.results_wait_ms).await? {
        warn!(
            "no results for {} (timed out waiting for result cards)",
            jurisdiction.name
        );
        return Ok(Vec::new());
    }

    // Cards are present but fields may still be rendering.
    sleep(Duration::from_millis(config.settle_delay_ms)).await;

    let raw: Vec<String> = page
        .evaluate(EXTRACT_AWARDEES_JS)
        .await?
        .into_value()?;
    Ok(raw)
}

/// Navigate to a search URL, bounded by the request timeout.
async fn navigate(page: &Page, url: &str, timeout_ms: u64) -> Result<()> {
    bounded_navigation(load_page(page, url), url, timeout_ms).await
}

/// Load one page: navigate, then wait for the load to finish.
async fn load_page(page: &Page, url: &str) -> Result<()> {
    page.goto(url).await.map_err(|e| CollectorError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    // Best effort: the SPA keeps issuing requests after load, so a failure
    // here is not fatal; the result-card wait below decides.
    let _ = page.wait_for_navigation().await;
    Ok(())
}

/// Bound the whole navigation, load wait included, by the request timeout.
/// A stalled load event must not hang the run on one jurisdiction.
async fn bounded_navigation<F>(load: F, url: &str, timeout_ms: u64) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match timeout(Duration::from_millis(timeout_ms), load).await {
        Ok(result) => result,
        Err(_) => Err(CollectorError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms,
        }),
    }
}

/// Poll for the result-card selector until it appears or the wait expires.
///
/// `Ok(false)` means the cards never showed up, the normal no-results
/// outcome. A protocol error from the poll (dead page, closed session) is
/// not absence and propagates so the jurisdiction records it.
async fn wait_for_results(page: &Page, timeout_ms: u64) -> Result<bool> {
    let wait = timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match poll_step(page.find_element(RESULT_CARD_SELECTOR).await) {
                PollStep::Found => return Ok(()),
                PollStep::Absent => sleep(Duration::from_millis(RESULT_POLL_MS)).await,
                PollStep::Failed(e) => return Err(e),
            }
        }
    })
    .await;

    match wait {
        Ok(Ok(())) => Ok(true),
        Ok(Err(e)) => Err(e),
        Err(_) => Ok(false),
    }
}

enum PollStep {
    Found,
    Absent,
    Failed(CollectorError),
}

/// Classify one `find_element` poll: no matching node is plain absence,
/// anything else from the protocol is a failure.
fn poll_step<T>(result: std::result::Result<T, CdpError>) -> PollStep {
    match result {
        Ok(_) => PollStep::Found,
        Err(CdpError::NotFound) => PollStep::Absent,
        Err(e) => PollStep::Failed(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jurisdictions;

    #[test]
    fn search_url_embeds_jurisdiction_and_fixed_filters() {
        let ny = jurisdictions::by_code("NY").unwrap();
        let url = search_url(&ny);

        assert!(url.starts_with("https://sam.gov/search/?page=1&pageSize=100"));
        assert!(url.contains("%5Bstate%5D%5B0%5D%5Bkey%5D=NY"));
        assert!(url.contains("%5Bstate%5D%5B0%5D%5Bvalue%5D=NY%20-%20New%20York"));
        assert!(url.contains("097%20-%20DEPT%20OF%20DEFENSE"));
        assert!(url.contains("naics%5D%5B0%5D%5Bkey%5D=31-33"));
        assert!(url.contains("updatedDateSelect%5D=pastWeek"));
        assert!(url.contains("is_active%5D=true"));
        assert!(url.contains("is_inactive%5D=true"));
    }

    #[test]
    fn search_url_is_deterministic() {
        let tx = jurisdictions::by_code("TX").unwrap();
        assert_eq!(search_url(&tx), search_url(&tx));
    }

    #[test]
    fn dedupe_sorts_and_removes_duplicates() {
        let raw = vec![
            "Beta LLC".to_string(),
            "Acme Corp".to_string(),
            "Acme Corp".to_string(),
        ];
        assert_eq!(dedupe_awardees(raw), vec!["Acme Corp", "Beta LLC"]);
    }

    #[test]
    fn dedupe_drops_empty_and_whitespace_only_entries() {
        let raw = vec![
            "".to_string(),
            "   ".to_string(),
            "  Acme Corp  ".to_string(),
        ];
        assert_eq!(dedupe_awardees(raw), vec!["Acme Corp"]);
    }

    #[test]
    fn dedupe_is_case_sensitive() {
        let raw = vec!["acme corp".to_string(), "Acme Corp".to_string()];
        assert_eq!(dedupe_awardees(raw), vec!["Acme Corp", "acme corp"]);
    }

    #[tokio::test]
    async fn navigation_is_bounded_even_when_load_never_finishes() {
        let started = std::time::Instant::now();
        let result =
            bounded_navigation(std::future::pending(), "https://sam.gov/search/", 50).await;

        assert!(matches!(
            result,
            Err(CollectorError::NavigationTimeout { timeout_ms: 50, .. })
        ));
        // well under the run-stalling regime; generous bound for slow CI
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn navigation_errors_inside_the_window_are_preserved() {
        let failed = async {
            Err(CollectorError::Navigation {
                url: "https://sam.gov/search/".to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        };
        let result = bounded_navigation(failed, "https://sam.gov/search/", 5000).await;
        assert!(matches!(result, Err(CollectorError::Navigation { .. })));

        let ok = bounded_navigation(async { Ok(()) }, "https://sam.gov/search/", 5000).await;
        assert!(ok.is_ok());
    }

    #[test]
    fn missing_result_cards_are_absence_not_failure() {
        assert!(matches!(
            poll_step::<()>(Err(CdpError::NotFound)),
            PollStep::Absent
        ));
        assert!(matches!(poll_step(Ok(())), PollStep::Found));
    }

    #[test]
    fn protocol_errors_while_polling_are_failures() {
        let step = poll_step::<()>(Err(CdpError::NoResponse));
        match step {
            PollStep::Failed(CollectorError::Cdp(_)) => {}
            _ => panic!("a dead session must not read as an empty result page"),
        }
    }
}
