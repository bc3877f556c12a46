// crates/rehash-core/src/gateway.rs

use serde_json::Value;
use sqlx::Row;

use crate::db::DbPool;
use crate::error::Result;
use crate::queries;
use crate::types::{ClickRecord, OfferRecord};

/// Fetches the offer/segment listing, parsing each row into a typed record
/// at the boundary. A row that fails to decode is logged and skipped; it
/// must never abort the batch.
pub async fn fetch_offers(pool: &DbPool) -> Result<Vec<OfferRecord>> {
    let rows = sqlx::query(queries::OFFER_SEGMENTS).fetch_all(pool).await?;

    let mut offers = Vec::with_capacity(rows.len());
    for row in rows {
        match parse_offer_row(&row) {
            Ok(offer) => offers.push(offer),
            Err(err) => tracing::error!("skipping offer row: {err}"),
        }
    }
    tracing::info!("fetched {} offer rows", offers.len());
    Ok(offers)
}

/// Fetches the deduplicated (affiliate, source) click pairs.
pub async fn fetch_clicks(pool: &DbPool) -> Result<Vec<ClickRecord>> {
    let rows = sqlx::query(queries::RECENT_CLICK_PAIRS)
        .fetch_all(pool)
        .await?;

    let mut clicks = Vec::with_capacity(rows.len());
    for row in rows {
        match parse_click_row(&row) {
            Ok(click) => clicks.push(click),
            Err(err) => tracing::error!("skipping click row: {err}"),
        }
    }
    tracing::info!("fetched {} click pairs", clicks.len());
    Ok(clicks)
}

fn parse_offer_row(row: &sqlx::postgres::PgRow) -> Result<OfferRecord> {
    let offer_id: i64 = row.try_get("offer_id")?;
    let account_id: Option<String> = row.try_get("ssp_account_id")?;
    let segment_id: Option<i64> = row.try_get("ssp_segment_id")?;
    let advertiser: Option<String> = row.try_get("advertiser")?;
    let segment_name: Option<String> = row.try_get("segment_name")?;
    let whitelist: Option<Value> = row.try_get("source_token_whitelist")?;
    let blacklist: Option<Value> = row.try_get("source_token_blacklist")?;

    Ok(OfferRecord {
        offer_id,
        account_id,
        segment_id,
        advertiser: advertiser.unwrap_or_default(),
        segment_name: segment_name.unwrap_or_default(),
        whitelist: token_strings(whitelist.as_ref()),
        blacklist: token_strings(blacklist.as_ref()),
    })
}

fn parse_click_row(row: &sqlx::postgres::PgRow) -> Result<ClickRecord> {
    Ok(ClickRecord {
        aff_id: row.try_get("aff_id")?,
        source: row.try_get("source")?,
    })
}

/// Coerces a jsonb token list into strings. The source columns tolerate
/// heterogeneous element types, so string tokens pass through as-is,
/// numeric tokens are stringified, and anything else is logged and dropped.
fn token_strings(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Value::Array(items) = value else {
        tracing::error!("token list is not an array: {value}");
        return Vec::new();
    };

    let mut tokens = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => tokens.push(s.clone()),
            Value::Number(n) => tokens.push(n.to_string()),
            other => tracing::error!("skipping non-scalar token: {other}"),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_strings_coerces_mixed_scalars() {
        let value = json!(["-1651622045", 212385612, "fb", 3.5]);
        assert_eq!(
            token_strings(Some(&value)),
            vec!["-1651622045", "212385612", "fb", "3.5"]
        );
    }

    #[test]
    fn token_strings_drops_non_scalars() {
        let value = json!(["ok", {"nested": true}, ["inner"], null]);
        assert_eq!(token_strings(Some(&value)), vec!["ok"]);
    }

    #[test]
    fn token_strings_handles_missing_and_malformed_lists() {
        assert!(token_strings(None).is_empty());
        assert!(token_strings(Some(&json!("not-a-list"))).is_empty());
    }
}
