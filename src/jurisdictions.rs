//! The US state roster the collector iterates over.
//!
//! The table is static reference data, but consumers never read it through a
//! hidden global: [`all`] materializes it once at startup into the config and
//! the collection loop only ever sees the injected copy.

use serde::{Deserialize, Serialize};

use crate::error::{CollectorError, Result};

/// One of the 50 US states, identified by its 2-letter postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub code: String,
    pub name: String,
}

impl Jurisdiction {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// All 50 states, in the fixed order the collector processes them.
const ROSTER: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Materialize the full roster.
pub fn all() -> Vec<Jurisdiction> {
    ROSTER
        .iter()
        .map(|(code, name)| Jurisdiction::new(code, name))
        .collect()
}

/// Look up a jurisdiction by its 2-letter code (case-insensitive).
pub fn by_code(code: &str) -> Option<Jurisdiction> {
    ROSTER
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(c, n)| Jurisdiction::new(c, n))
}

/// Resolve a list of caller-supplied codes against the roster, preserving
/// the caller's order.
pub fn resolve_codes(codes: &[String]) -> Result<Vec<Jurisdiction>> {
    codes
        .iter()
        .map(|code| {
            by_code(code).ok_or_else(|| CollectorError::UnknownJurisdiction { code: code.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_has_fifty_unique_codes() {
        let all = all();
        assert_eq!(all.len(), 50);
        let mut codes: Vec<_> = all.iter().map(|j| j.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 50);
        assert!(all.iter().all(|j| j.code.len() == 2));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(by_code("ny").unwrap().name, "New York");
        assert_eq!(by_code("NY").unwrap().name, "New York");
        assert!(by_code("ZZ").is_none());
    }

    #[test]
    fn resolve_codes_preserves_order_and_rejects_unknown() {
        let resolved = resolve_codes(&["TX".into(), "AK".into()]).unwrap();
        assert_eq!(resolved[0].name, "Texas");
        assert_eq!(resolved[1].name, "Alaska");

        let err = resolve_codes(&["TX".into(), "XX".into()]).unwrap_err();
        assert!(err.to_string().contains("XX"));
    }
}
