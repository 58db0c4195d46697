use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

pub const DAILY_CSV: &str = "daily.csv";
pub const CITIES_CSV: &str = "cities.csv";

/// Write `recs` as CSV with a header row taken from the field names.
pub fn write_csv<T: Serialize>(path: &Path, recs: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in recs {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = recs.len(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::DailyRecord;
    use crate::distribution::CityRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn daily_rows_use_iso_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DAILY_CSV);
        let recs = vec![DailyRecord {
            date: chrono::NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
            confirmed: 571,
            suspected: 393,
            dead: 17,
            healed: 25,
        }];
        write_csv(&path, &recs).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "date,confirmed,suspected,dead,healed\n2020-01-22,571,393,17,25\n"
        );
    }

    #[test]
    fn city_rows_carry_the_tree_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CITIES_CSV);
        let recs = vec![CityRecord {
            country: "中国".to_string(),
            province: "湖北".to_string(),
            city: "武汉".to_string(),
            total_confirm: 5,
            total_suspect: 0,
            total_dead: 1,
            total_heal: 2,
            today_confirm: 1,
            today_suspect: 0,
            today_dead: 0,
            today_heal: 0,
        }];
        write_csv(&path, &recs).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("country,province,city,total_confirm,total_suspect,total_dead,total_heal,today_confirm,today_suspect,today_dead,today_heal")
        );
        assert_eq!(lines.next(), Some("中国,湖北,武汉,5,0,1,2,1,0,0,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(DAILY_CSV);
        assert!(write_csv::<DailyRecord>(&path, &[]).is_err());
    }
}
