// crates/rehash-core/src/candidates.rs

use std::collections::{BTreeSet, HashSet};

use crate::types::{CandidateTuple, ClickRecord, OfferRecord};

/// Cross-references click pairs against offer/segment rows and builds the
/// universe of candidate tuples whose hash could plausibly appear in a
/// whitelist or blacklist.
///
/// Offers without a segment id, without an account id, or with no tokens in
/// either list produce no candidates. Identity is full-tuple equality, so
/// offers that differ only in token list contents collapse to one candidate
/// per click. Pure function: no database access, no side effects beyond
/// skip logging.
pub fn generate_candidates(
    clicks: &[ClickRecord],
    offers: &[OfferRecord],
) -> Vec<CandidateTuple> {
    let mut eligible: Vec<(&OfferRecord, &str, i64)> = Vec::new();
    for offer in offers {
        let Some(segment_id) = offer.segment_id else {
            continue;
        };
        let Some(account_id) = offer.account_id.as_deref() else {
            // A null account could only hash as the nil UUID, which the
            // observed set never contains. Skip, don't abort.
            tracing::warn!("offer {} has no account id, skipping", offer.offer_id);
            continue;
        };
        if offer.whitelist.is_empty() && offer.blacklist.is_empty() {
            continue;
        }
        eligible.push((offer, account_id, segment_id));
    }

    let mut candidates = BTreeSet::new();
    for click in clicks {
        for (offer, account_id, segment_id) in &eligible {
            candidates.insert(CandidateTuple {
                aff_id: click.aff_id,
                source: click.source.clone(),
                account_id: (*account_id).to_string(),
                segment_id: *segment_id,
                offer_id: offer.offer_id,
                advertiser: offer.advertiser.clone(),
                segment_name: offer.segment_name.clone(),
            });
        }
    }

    candidates.into_iter().collect()
}

/// Collects every hash token currently stored in any offer's whitelist or
/// blacklist. Offers without an account id or segment id are excluded, the
/// same rows candidate generation ignores.
pub fn collect_observed_hashes(offers: &[OfferRecord]) -> HashSet<String> {
    let mut observed = HashSet::new();
    for offer in offers {
        if offer.account_id.is_none() || offer.segment_id.is_none() {
            continue;
        }
        observed.extend(offer.whitelist.iter().cloned());
        observed.extend(offer.blacklist.iter().cloned());
    }
    tracing::info!("All hashed sources: {}", observed.len());
    observed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(aff_id: i64, source: &str) -> ClickRecord {
        ClickRecord {
            aff_id,
            source: source.to_string(),
        }
    }

    fn offer(offer_id: i64, account_id: &str, segment_id: i64, whitelist: &[&str]) -> OfferRecord {
        OfferRecord {
            offer_id,
            account_id: Some(account_id.to_string()),
            segment_id: Some(segment_id),
            advertiser: "X".to_string(),
            segment_name: "seg".to_string(),
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            blacklist: Vec::new(),
        }
    }

    #[test]
    fn builds_cross_product_of_clicks_and_eligible_offers() {
        let clicks = vec![click(1, "fb"), click(2, "tiktok")];
        let offers = vec![offer(10, "A", 5, &["tok"]), offer(11, "B", 6, &["tok"])];

        let candidates = generate_candidates(&clicks, &offers);
        assert_eq!(candidates.len(), 4);
        assert!(candidates.contains(&CandidateTuple {
            aff_id: 1,
            source: "fb".to_string(),
            account_id: "A".to_string(),
            segment_id: 5,
            offer_id: 10,
            advertiser: "X".to_string(),
            segment_name: "seg".to_string(),
        }));
    }

    #[test]
    fn membership_is_independent_of_input_order() {
        let mut clicks = vec![click(1, "fb"), click(2, "ig"), click(3, "yt")];
        let mut offers = vec![offer(10, "A", 5, &["t1"]), offer(11, "B", 6, &["t2"])];

        let forward = generate_candidates(&clicks, &offers);
        clicks.reverse();
        offers.reverse();
        let backward = generate_candidates(&clicks, &offers);

        assert_eq!(forward, backward);
    }

    #[test]
    fn skips_offers_without_segment_account_or_tokens() {
        let clicks = vec![click(1, "fb")];

        let mut no_segment = offer(10, "A", 5, &["tok"]);
        no_segment.segment_id = None;
        let mut no_account = offer(11, "B", 6, &["tok"]);
        no_account.account_id = None;
        let no_tokens = offer(12, "C", 7, &[]);

        let candidates = generate_candidates(&clicks, &[no_segment, no_account, no_tokens]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn offers_identical_in_tuple_fields_collapse_to_one_candidate() {
        let clicks = vec![click(1, "fb")];
        let offers = vec![offer(10, "A", 5, &["w1"]), offer(10, "A", 5, &["w2"])];

        let candidates = generate_candidates(&clicks, &offers);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn empty_inputs_produce_empty_output() {
        assert!(generate_candidates(&[], &[offer(10, "A", 5, &["t"])]).is_empty());
        assert!(generate_candidates(&[click(1, "fb")], &[]).is_empty());
    }

    #[test]
    fn observed_hashes_union_both_lists_across_offers() {
        let mut first = offer(10, "A", 5, &["w1", "shared"]);
        first.blacklist = vec!["b1".to_string()];
        let second = offer(10, "A", 5, &["w2", "shared"]);

        let observed = collect_observed_hashes(&[first, second]);
        let expected: HashSet<String> = ["w1", "w2", "b1", "shared"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn observed_hashes_skip_null_account_and_null_segment() {
        let mut no_account = offer(10, "A", 5, &["dropped"]);
        no_account.account_id = None;
        let mut no_segment = offer(11, "B", 6, &["also-dropped"]);
        no_segment.segment_id = None;
        let kept = offer(12, "C", 7, &["kept"]);

        let observed = collect_observed_hashes(&[no_account, no_segment, kept]);
        assert_eq!(observed.len(), 1);
        assert!(observed.contains("kept"));
    }
}
