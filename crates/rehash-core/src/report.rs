// crates/rehash-core/src/report.rs

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::ResolvedRow;

/// `rehash_<ISO-date>.csv`, overwritten on a same-day rerun.
pub fn report_filename(date: NaiveDate) -> String {
    format!("rehash_{date}.csv")
}

/// Writes the resolved rows as CSV into `dir`, one header row plus one row
/// per resolved candidate, and returns the path written.
pub fn write_report(rows: &[ResolvedRow], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_filename(chrono::Local::now().date_naive()));
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hash_value: i32, offer_id: i64, aff_id: i64, source: &str) -> ResolvedRow {
        ResolvedRow {
            hash_value,
            offer_id,
            aff_id,
            source: source.to_string(),
            account_id: "A".to_string(),
            segment_id: 5,
            advertiser: "X".to_string(),
            segment_name: "seg".to_string(),
        }
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_filename(date), "rehash_2024-03-07.csv");
    }

    #[test]
    fn round_trips_resolved_rows_through_csv() {
        let dir = std::env::temp_dir().join("rehash-report-roundtrip");
        std::fs::create_dir_all(&dir).expect("create temp dir");

        let rows = vec![row(111, 10, 1, "fb"), row(-222, 11, 2, "ig, with comma")];
        let path = write_report(&rows, &dir).expect("write report");

        let mut reader = csv::Reader::from_path(&path).expect("open report");
        assert_eq!(
            reader.headers().expect("headers"),
            &csv::StringRecord::from(vec![
                "hash_value",
                "offer_id",
                "aff_id",
                "source",
                "account_id",
                "segment_id",
                "advertiser",
                "segment_name",
            ])
        );

        let read_back: Vec<ResolvedRow> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .expect("read rows");
        assert_eq!(read_back, rows);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_input_writes_empty_report() {
        let dir = std::env::temp_dir().join("rehash-report-empty");
        std::fs::create_dir_all(&dir).expect("create temp dir");

        let path = write_report(&[], &dir).expect("write report");
        let mut reader = csv::Reader::from_path(&path).expect("open report");
        assert_eq!(reader.records().count(), 0);

        std::fs::remove_file(&path).ok();
    }
}
