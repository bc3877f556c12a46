// crates/rehash-core/src/hashing.rs
//
// Re-derives candidate hashes inside Postgres itself. The hash expression
// below is the exact expression the database evaluated when it originally
// materialized the whitelist/blacklist tokens; recomputing anywhere else
// risks drifting from its normalization rules.

use sqlx::Row;

use crate::db::DbPool;
use crate::error::{RehashError, Result};
use crate::types::{CandidateTuple, HashedCandidate};

/// Rows per batched VALUES query. Five binds per row keeps this far under
/// the 65535-parameter protocol limit.
const CHUNK_ROWS: usize = 1000;

const BINDS_PER_ROW: usize = 5;

/// Recomputes the canonical hash for every candidate, order- and
/// length-preserving. Each literal row carries its global index through the
/// query, so re-association does not depend on the engine preserving
/// VALUES order.
pub async fn recompute_hashes(
    pool: &DbPool,
    candidates: &[CandidateTuple],
) -> Result<Vec<HashedCandidate>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut results: Vec<(i64, i32)> = Vec::with_capacity(candidates.len());
    for (chunk_index, chunk) in candidates.chunks(CHUNK_ROWS).enumerate() {
        let offset = chunk_index * CHUNK_ROWS;
        let sql = hash_query_sql(chunk.len());

        let mut query = sqlx::query(&sql);
        for (i, candidate) in chunk.iter().enumerate() {
            query = query
                .bind((offset + i) as i64)
                .bind(candidate.aff_id)
                .bind(&candidate.source)
                .bind(&candidate.account_id)
                .bind(candidate.segment_id);
        }

        for row in query.fetch_all(pool).await? {
            let idx: i64 = row.try_get("idx")?;
            let hash_value: i32 = row.try_get("hash_value")?;
            results.push((idx, hash_value));
        }
    }

    let hashed = attach_hashes(candidates, results)?;
    tracing::info!("rehashed {} candidates", hashed.len());
    Ok(hashed)
}

/// Builds the batched hash query for `rows` literal rows. The COALESCE
/// defaults (0, '', nil UUID, 0) and the `_` delimiter must stay
/// byte-identical to the expression that produced the stored tokens.
fn hash_query_sql(rows: usize) -> String {
    let values = (0..rows)
        .map(|row| {
            let base = row * BINDS_PER_ROW;
            format!(
                "(${}::BIGINT, ${}::BIGINT, ${}::TEXT, ${}::TEXT, ${}::BIGINT)",
                base + 1,
                base + 2,
                base + 3,
                base + 4,
                base + 5
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT idx, hashtext(\
         CAST(COALESCE(aff_id, 0) AS VARCHAR) || '_' || \
         CAST(COALESCE(source, '') AS VARCHAR) || '_' || \
         CAST(COALESCE(account_id, '00000000-0000-0000-0000-000000000000') AS VARCHAR) || '_' || \
         CAST(COALESCE(segment_id, 0) AS VARCHAR)\
         ) AS hash_value \
         FROM (VALUES {values}) AS vals (idx, aff_id, source, account_id, segment_id) \
         ORDER BY idx"
    )
}

/// Re-associates returned (index, hash) pairs with their candidates. Any
/// length mismatch, gap, or duplicate index is an alignment error rather
/// than a silently shifted result.
fn attach_hashes(
    candidates: &[CandidateTuple],
    mut results: Vec<(i64, i32)>,
) -> Result<Vec<HashedCandidate>> {
    if results.len() != candidates.len() {
        return Err(RehashError::HashAlignment(format!(
            "expected {} hash rows, got {}",
            candidates.len(),
            results.len()
        )));
    }

    results.sort_by_key(|(idx, _)| *idx);
    let mut hashed = Vec::with_capacity(candidates.len());
    for (position, (candidate, (idx, hash_value))) in
        candidates.iter().zip(results).enumerate()
    {
        if idx != position as i64 {
            return Err(RehashError::HashAlignment(format!(
                "hash row index {} where {} was expected",
                idx, position
            )));
        }
        hashed.push(HashedCandidate {
            candidate: candidate.clone(),
            hash_value,
        });
    }
    Ok(hashed)
}
