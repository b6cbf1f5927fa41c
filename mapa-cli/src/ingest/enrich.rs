//! Provider and inconsistency enrichment of consolidated records

use super::keys::normalize_code;
use super::reference::{InconsistencyIndex, PostedProducts};
use crate::record::status::{classify_inconsistency, classify_provider};
use crate::record::LaunchRecord;

/// Reduce every EAN to digits; an empty result clears the field
pub fn normalize_eans(records: &mut [LaunchRecord]) {
    for record in records {
        let normalized = record.ean.as_deref().map(normalize_code).unwrap_or_default();
        record.ean = if normalized.is_empty() { None } else { Some(normalized) };
    }
}

/// Left-join the posted products by EAN and classify the provider
pub fn apply_providers(records: &mut [LaunchRecord], posted: &PostedProducts, accepted: &[String]) {
    for record in records {
        let ean = record.ean.as_deref().unwrap_or_default();
        let status = classify_provider(ean, posted.provider_for(ean), accepted);
        record.provider = Some(status.to_string());
    }
}

/// Left-join the grouped inconsistencies by EAN and classify them
pub fn apply_inconsistencies(records: &mut [LaunchRecord], index: &InconsistencyIndex) {
    for record in records {
        let ean = record.ean.as_deref().unwrap_or_default();
        let grouped = index.joined_for(ean);
        let status = classify_inconsistency(ean, grouped.as_deref());
        record.inconsistencies = Some(status.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::status::{EAN_NOT_INFORMED, NO_INCONSISTENCIES, PROVIDER_UNIDENTIFIED};

    fn record(ean: Option<&str>) -> LaunchRecord {
        LaunchRecord {
            requester: Some("JOAO".into()),
            ean: ean.map(str::to_string),
            ..Default::default()
        }
    }

    fn accepted() -> Vec<String> {
        vec!["Simplus".to_string(), "Portal de Produtos".to_string()]
    }

    #[test]
    fn test_normalize_eans() {
        let mut records = vec![record(Some("789.1234.567890")), record(Some("n/a")), record(None)];
        normalize_eans(&mut records);

        assert_eq!(records[0].ean.as_deref(), Some("7891234567890"));
        assert_eq!(records[1].ean, None);
        assert_eq!(records[2].ean, None);
    }

    #[test]
    fn test_apply_providers() {
        let posted = PostedProducts::from_rows(
            vec![("7891234567890".to_string(), "Simplus".to_string())],
            &accepted(),
        );
        let mut records = vec![record(Some("7891234567890")), record(Some("111")), record(None)];
        apply_providers(&mut records, &posted, &accepted());

        assert_eq!(records[0].provider.as_deref(), Some("Simplus"));
        assert_eq!(records[1].provider.as_deref(), Some(PROVIDER_UNIDENTIFIED));
        assert_eq!(records[2].provider.as_deref(), Some(EAN_NOT_INFORMED));
    }

    #[test]
    fn test_apply_inconsistencies() {
        let index = InconsistencyIndex::from_rows(vec![
            ("111".to_string(), "A".to_string()),
            ("111".to_string(), "A".to_string()),
        ]);
        let mut records = vec![record(Some("111")), record(Some("222")), record(None)];
        apply_inconsistencies(&mut records, &index);

        assert_eq!(records[0].inconsistencies.as_deref(), Some("A"));
        assert_eq!(records[1].inconsistencies.as_deref(), Some(NO_INCONSISTENCIES));
        assert_eq!(records[2].inconsistencies.as_deref(), Some(EAN_NOT_INFORMED));
    }
}
