// crates/rehash-core/src/types.rs

use serde::{Deserialize, Serialize};

/// One distinct (affiliate, source) combination seen in recent click traffic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClickRecord {
    pub aff_id: i64,
    pub source: String,
}

/// One offer row joined to its SSP segment, with the hashed source token
/// lists currently configured on it.
///
/// `account_id` and `segment_id` stay optional: downstream stages filter on
/// their presence rather than the gateway rejecting the row outright.
#[derive(Debug, Clone)]
pub struct OfferRecord {
    pub offer_id: i64,
    pub account_id: Option<String>,
    pub segment_id: Option<i64>,
    pub advertiser: String,
    pub segment_name: String,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

/// A hypothesized plaintext combination whose hash might appear in a
/// whitelist or blacklist. Identity is full-tuple equality; the derived
/// `Ord` makes candidate sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateTuple {
    pub aff_id: i64,
    pub source: String,
    pub account_id: String,
    pub segment_id: i64,
    pub offer_id: i64,
    pub advertiser: String,
    pub segment_name: String,
}

/// A candidate plus the hash Postgres derived for it. `hashtext` returns
/// `int4`, so the value is an `i32` even though list tokens arrive as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCandidate {
    pub candidate: CandidateTuple,
    pub hash_value: i32,
}

/// Final output row: a candidate whose recomputed hash is actually in use.
/// Field order matches the report column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRow {
    pub hash_value: i32,
    pub offer_id: i64,
    pub aff_id: i64,
    pub source: String,
    pub account_id: String,
    pub segment_id: i64,
    pub advertiser: String,
    pub segment_name: String,
}

impl ResolvedRow {
    pub fn from_hashed(hashed: HashedCandidate) -> Self {
        let HashedCandidate {
            candidate,
            hash_value,
        } = hashed;
        Self {
            hash_value,
            offer_id: candidate.offer_id,
            aff_id: candidate.aff_id,
            source: candidate.source,
            account_id: candidate.account_id,
            segment_id: candidate.segment_id,
            advertiser: candidate.advertiser,
            segment_name: candidate.segment_name,
        }
    }
}
