// crates/rehash-core/src/queries.rs

/// Offer/segment listing with the token lists currently configured on each
/// offer. Integer ids are cast to BIGINT and the account id to TEXT so the
/// decode types do not depend on the underlying column widths; the token
/// list columns go through `to_jsonb` so heterogeneous arrays arrive as one
/// JSON value and are coerced on our side of the boundary.
pub const OFFER_SEGMENTS: &str = r#"
    SELECT o.id::BIGINT AS offer_id,
           to_jsonb(o.source_token_whitelist) AS source_token_whitelist,
           to_jsonb(o.source_token_blacklist) AS source_token_blacklist,
           o.ssp_account_id::TEXT AS ssp_account_id,
           o.ssp_segment_id::BIGINT AS ssp_segment_id,
           ss.name AS segment_name,
           o.advertiser::TEXT AS advertiser
    FROM offer o
    LEFT JOIN ssp_segment ss ON o.ssp_segment_id = ss.id
"#;

/// Distinct (affiliate, source) pairs observed in the click log over the
/// last 60 days. The database does the deduplication.
pub const RECENT_CLICK_PAIRS: &str = r#"
    SELECT bc.current_aff_id::BIGINT AS aff_id,
           bc.current_source AS source
    FROM banner_click bc
    WHERE bc.created::date >= current_date - INTERVAL '60 days'
      AND bc.current_aff_id IS NOT NULL
    GROUP BY 1, 2
"#;
