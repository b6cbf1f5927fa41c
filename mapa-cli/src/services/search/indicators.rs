use crate::record::{LaunchRecord, StatusBucket};

/// Approved / rejected / awaiting totals shown above the results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub approved: usize,
    pub rejected: usize,
    pub awaiting: usize,
}

impl StatusCounts {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a LaunchRecord>,
    {
        let mut counts = StatusCounts::default();
        for record in records {
            match StatusBucket::of(record.status.as_deref()) {
                Some(StatusBucket::Approved) => counts.approved += 1,
                Some(StatusBucket::Rejected) => counts.rejected += 1,
                Some(StatusBucket::Awaiting) => counts.awaiting += 1,
                None => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(status: Option<&str>) -> LaunchRecord {
        LaunchRecord {
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_buckets_are_disjoint() {
        let records: Vec<_> = [
            Some("aprovado"),
            Some("APROVADO "),
            Some("rejeitado"),
            Some("aguardando atendimento"),
            Some("None"),
            None,
            Some("aprovado com ressalva"),
            Some("cancelado"),
        ]
        .into_iter()
        .map(with_status)
        .collect();

        let counts = StatusCounts::from_records(&records);
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.awaiting, 3);
        // Unrecognised statuses land in no bucket
        assert_eq!(counts.approved + counts.rejected + counts.awaiting, 6);
    }
}
