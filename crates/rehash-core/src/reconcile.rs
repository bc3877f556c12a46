// crates/rehash-core/src/reconcile.rs

use std::collections::HashSet;

use crate::types::{HashedCandidate, ResolvedRow};

/// Keeps the hashed candidates whose recomputed hash is actually in use,
/// i.e. appears in some offer's whitelist or blacklist. Fields pass through
/// unchanged and input order is preserved.
pub fn reconcile(hashed: Vec<HashedCandidate>, observed: &HashSet<String>) -> Vec<ResolvedRow> {
    let rows: Vec<ResolvedRow> = hashed
        .into_iter()
        .filter(|entry| observed.contains(&entry.hash_value.to_string()))
        .map(ResolvedRow::from_hashed)
        .collect();
    tracing::info!("All rehashed sources: {}", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateTuple;

    fn hashed(aff_id: i64, source: &str, hash_value: i32) -> HashedCandidate {
        HashedCandidate {
            candidate: CandidateTuple {
                aff_id,
                source: source.to_string(),
                account_id: "A".to_string(),
                segment_id: 5,
                offer_id: 10,
                advertiser: "X".to_string(),
                segment_name: "seg".to_string(),
            },
            hash_value,
        }
    }

    #[test]
    fn keeps_exactly_the_observed_hashes_in_input_order() {
        let input = vec![
            hashed(1, "fb", 111),
            hashed(2, "ig", -222),
            hashed(3, "yt", 333),
        ];
        let observed: HashSet<String> = ["111", "-222"].iter().map(|s| s.to_string()).collect();

        let rows = reconcile(input, &observed);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hash_value, 111);
        assert_eq!(rows[0].source, "fb");
        assert_eq!(rows[1].hash_value, -222);
        assert!(rows.iter().all(|row| observed.contains(&row.hash_value.to_string())));
    }

    #[test]
    fn passes_fields_through_unchanged() {
        let observed: HashSet<String> = std::iter::once("42".to_string()).collect();
        let rows = reconcile(vec![hashed(7, "fb", 42)], &observed);

        let row = &rows[0];
        assert_eq!(row.offer_id, 10);
        assert_eq!(row.aff_id, 7);
        assert_eq!(row.account_id, "A");
        assert_eq!(row.segment_id, 5);
        assert_eq!(row.advertiser, "X");
        assert_eq!(row.segment_name, "seg");
    }

    #[test]
    fn empty_input_or_empty_observed_set_yields_empty_output() {
        let observed: HashSet<String> = std::iter::once("111".to_string()).collect();
        assert!(reconcile(Vec::new(), &observed).is_empty());
        assert!(reconcile(vec![hashed(1, "fb", 111)], &HashSet::new()).is_empty());
    }
}
