//! Search service for the lookup page
//!
//! Pure filtering and aggregation over a loaded table, decoupled from the
//! HTTP layer so it can be exercised directly.

pub mod indicators;

pub use indicators::StatusCounts;

use crate::record::LaunchRecord;

/// A record with its requester pre-normalized for case-insensitive search
#[derive(Debug, Clone)]
pub struct SearchableRecord {
    pub record: LaunchRecord,
    pub requester_key: String,
}

/// The loaded table, normalized once per load
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchableRecord>,
}

impl SearchIndex {
    pub fn new(records: Vec<LaunchRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| {
                let requester_key = record
                    .requester
                    .as_deref()
                    .map(|r| r.trim().to_uppercase())
                    .unwrap_or_default();
                SearchableRecord {
                    record,
                    requester_key,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &LaunchRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Run a query: matches plus the status counters
    pub fn search(&self, query: &SearchQuery) -> SearchResult<'_> {
        if query.is_empty() {
            return SearchResult {
                counts: StatusCounts::from_records(self.records()),
                matches: None,
            };
        }

        let matches: Vec<&LaunchRecord> = self
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .map(|e| &e.record)
            .collect();

        let counts = if query.requester.is_some() {
            StatusCounts::from_records(matches.iter().copied())
        } else {
            StatusCounts::from_records(self.records())
        };

        SearchResult {
            counts,
            matches: Some(matches),
        }
    }
}

/// Optional code and requester filters, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring of the PLU or EAN, matched as typed
    pub code: Option<String>,
    /// Uppercased, trimmed substring of the requester
    pub requester: Option<String>,
}

impl SearchQuery {
    /// Build from the raw page inputs; blank inputs are no filter
    pub fn from_inputs(code: Option<&str>, requester: Option<&str>) -> Self {
        let code = code.filter(|c| !c.is_empty()).map(str::to_string);
        let requester = requester
            .map(|r| r.trim().to_uppercase())
            .filter(|r| !r.is_empty());
        Self { code, requester }
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.requester.is_none()
    }

    fn matches(&self, entry: &SearchableRecord) -> bool {
        if let Some(code) = &self.code {
            let record = &entry.record;
            let in_plu = record.plu.as_deref().is_some_and(|p| p.contains(code.as_str()));
            let in_ean = record.ean.as_deref().is_some_and(|e| e.contains(code.as_str()));
            if !in_plu && !in_ean {
                return false;
            }
        }
        if let Some(name) = &self.requester {
            if !entry.requester_key.contains(name.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Outcome of a query.
///
/// `matches` is `None` when no filter was given, in which case the page
/// only shows instructions.
#[derive(Debug)]
pub struct SearchResult<'a> {
    pub counts: StatusCounts,
    pub matches: Option<Vec<&'a LaunchRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(requester: Option<&str>, ean: Option<&str>, plu: Option<&str>, status: Option<&str>) -> LaunchRecord {
        LaunchRecord {
            requester: requester.map(str::to_string),
            ean: ean.map(str::to_string),
            plu: plu.map(str::to_string),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    fn index() -> SearchIndex {
        SearchIndex::new(vec![
            record(Some("JOAO"), Some("7891234567890"), Some("001"), Some("Aprovado")),
            record(Some("MARIA"), Some("111"), Some("789"), Some("Rejeitado")),
            record(Some("joana "), None, Some("555"), None),
            record(None, Some("222"), None, Some("em análise")),
        ])
    }

    #[test]
    fn test_query_from_inputs() {
        let query = SearchQuery::from_inputs(Some(""), Some("  joa "));
        assert_eq!(query.code, None);
        assert_eq!(query.requester.as_deref(), Some("JOA"));

        assert!(SearchQuery::from_inputs(None, Some("   ")).is_empty());
        // Code is kept as typed
        assert_eq!(SearchQuery::from_inputs(Some(" 78"), None).code.as_deref(), Some(" 78"));
    }

    #[test]
    fn test_code_query_matches_plu_or_ean() {
        let index = index();
        let result = index.search(&SearchQuery::from_inputs(Some("789"), None));
        let matches = result.matches.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].ean.as_deref(), Some("7891234567890"));
        assert_eq!(matches[1].plu.as_deref(), Some("789"));
    }

    #[test]
    fn test_name_query_is_case_insensitive() {
        let index = index();
        let result = index.search(&SearchQuery::from_inputs(None, Some("joa")));
        let matches = result.matches.unwrap();

        let requesters: Vec<_> = matches.iter().map(|r| r.requester.as_deref()).collect();
        assert_eq!(requesters, vec![Some("JOAO"), Some("joana ")]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let index = index();
        let result = index.search(&SearchQuery::from_inputs(Some("555"), Some("joao")));
        assert!(result.matches.unwrap().is_empty());
    }

    #[test]
    fn test_counts_follow_name_filter() {
        let index = index();

        // Name filter: counters over the filtered set
        let result = index.search(&SearchQuery::from_inputs(None, Some("joa")));
        assert_eq!(result.counts.approved, 1);
        assert_eq!(result.counts.rejected, 0);
        assert_eq!(result.counts.awaiting, 1);

        // Code filter only: counters over the whole table
        let result = index.search(&SearchQuery::from_inputs(Some("789"), None));
        assert_eq!(result.counts.approved, 1);
        assert_eq!(result.counts.rejected, 1);
        assert_eq!(result.counts.awaiting, 1);
    }

    #[test]
    fn test_empty_query_only_counts() {
        let index = index();
        let result = index.search(&SearchQuery::default());
        assert!(result.matches.is_none());
        assert_eq!(result.counts.approved + result.counts.rejected + result.counts.awaiting, 3);
    }
}
