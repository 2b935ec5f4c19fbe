//! Report data model.
//!
//! One [`CollectionReport`] is assembled per run and never mutated after it is
//! written. Field names serialize in camelCase to keep the on-disk JSON schema
//! stable for downstream consumers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::jurisdictions::Jurisdiction;

/// The fixed SAM.gov search filters every run applies, recorded in the report
/// for traceability. Only the jurisdictions description varies between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub department: String,
    pub naics: String,
    pub jurisdictions: String,
    pub date_range: String,
    pub status: String,
}

impl ReportFilters {
    fn new(jurisdictions: String) -> Self {
        Self {
            department: "Department of Defense".to_string(),
            naics: "31-33 - Manufacturing".to_string(),
            jurisdictions,
            date_range: "Past Week".to_string(),
            status: "Active and Inactive".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_unique_awardees: usize,
    pub jurisdictions_processed: usize,
    pub jurisdictions_with_results: usize,
}

/// The outcome for a single jurisdiction: its sorted unique awardees, or a
/// recorded error if navigation/extraction failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionResult {
    pub jurisdiction_name: String,
    pub count: usize,
    pub awardees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JurisdictionResult {
    /// A successful extraction. `awardees` must already be sorted and unique;
    /// `count` is derived from it.
    pub fn collected(jurisdiction: &Jurisdiction, awardees: Vec<String>) -> Self {
        Self {
            jurisdiction_name: jurisdiction.name.clone(),
            count: awardees.len(),
            awardees,
            error: None,
        }
    }

    /// A jurisdiction whose result page never produced cards (timeout). Not
    /// an error: recorded as zero awardees.
    pub fn empty(jurisdiction: &Jurisdiction) -> Self {
        Self::collected(jurisdiction, Vec::new())
    }

    /// A jurisdiction where navigation or extraction failed.
    pub fn failed(jurisdiction: &Jurisdiction, error: String) -> Self {
        Self {
            jurisdiction_name: jurisdiction.name.clone(),
            count: 0,
            awardees: Vec::new(),
            error: Some(error),
        }
    }
}

/// The full output of one collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub timestamp: String,
    pub filters: ReportFilters,
    pub summary: ReportSummary,
    pub all_unique_awardees: Vec<String>,
    pub results_by_jurisdiction: BTreeMap<String, JurisdictionResult>,
}

impl CollectionReport {
    /// Assemble a report from per-jurisdiction results.
    ///
    /// `allUniqueAwardees` is recomputed here as the sorted union of every
    /// jurisdiction's awardee set, so the run-wide invariants hold no matter
    /// how the per-jurisdiction results were produced.
    pub fn assemble(
        results_by_jurisdiction: BTreeMap<String, JurisdictionResult>,
        jurisdictions_label: String,
    ) -> Self {
        let union: BTreeSet<String> = results_by_jurisdiction
            .values()
            .flat_map(|r| r.awardees.iter().cloned())
            .collect();
        let all_unique_awardees: Vec<String> = union.into_iter().collect();

        let summary = ReportSummary {
            total_unique_awardees: all_unique_awardees.len(),
            jurisdictions_processed: results_by_jurisdiction.len(),
            jurisdictions_with_results: results_by_jurisdiction
                .values()
                .filter(|r| r.count > 0)
                .count(),
        };

        Self {
            timestamp: Utc::now().to_rfc3339(),
            filters: ReportFilters::new(jurisdictions_label),
            summary,
            all_unique_awardees,
            results_by_jurisdiction,
        }
    }
}

/// Human-readable description of the jurisdiction selection, recorded in the
/// report filters. Distinguishes a full-roster run from a subset run.
pub fn jurisdictions_label(selected: &[Jurisdiction]) -> String {
    if selected.len() == crate::jurisdictions::all().len() {
        "All 50 US States".to_string()
    } else {
        let codes: Vec<&str> = selected.iter().map(|j| j.code.as_str()).collect();
        let noun = if selected.len() == 1 { "state" } else { "states" };
        format!("{} selected {} ({})", selected.len(), noun, codes.join(", "))
    }
}
