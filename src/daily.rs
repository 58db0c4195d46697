use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::counts;
use crate::fetch::Fetcher;

/// Feed name of the national day-by-day counts.
pub const DAILY_FEED: &str = "wuwei_ww_cn_day_counts";

/// One entry of the daily feed as it comes off the wire.
///
/// Dates are "M/D" without a year, counts may be numbers or numeric strings.
#[derive(Debug, Deserialize, Clone)]
pub struct RawDailyRecord {
    pub date: String,
    #[serde(deserialize_with = "counts::deserialize")]
    pub confirm: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub suspect: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub dead: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub heal: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    #[serde(with = "ymd_date_format")]
    pub date: chrono::NaiveDate,
    pub confirmed: u64,
    pub suspected: u64,
    pub dead: u64,
    pub healed: u64,
}

mod ymd_date_format {
    use serde::Serializer;

    const FORMAT: &str = "%Y-%m-%d";
    pub fn serialize<S>(nd: &chrono::NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!("{}", nd.format(FORMAT));
        serializer.serialize_str(&s)
    }
}

/// The daily records unzipped into parallel columns, ready for plotting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DailySeries {
    pub dates: Vec<chrono::NaiveDate>,
    pub confirmed: Vec<u64>,
    pub suspected: Vec<u64>,
    pub dead: Vec<u64>,
    pub healed: Vec<u64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Largest value across all four count columns.
    pub fn max_count(&self) -> u64 {
        self.confirmed
            .iter()
            .chain(&self.suspected)
            .chain(&self.dead)
            .chain(&self.healed)
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl From<&[DailyRecord]> for DailySeries {
    fn from(recs: &[DailyRecord]) -> Self {
        let mut series = DailySeries::default();
        for r in recs {
            series.dates.push(r.date);
            series.confirmed.push(r.confirmed);
            series.suspected.push(r.suspected);
            series.dead.push(r.dead);
            series.healed.push(r.healed);
        }
        series
    }
}

/// Parse an "M/D" feed date into a calendar date in `year`.
pub fn parse_month_day(s: &str, year: i32) -> Result<chrono::NaiveDate> {
    let (month, day) = s
        .trim()
        .split_once('/')
        .ok_or_else(|| anyhow!("date {:?} is not in M/D form", s))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("bad month in date {:?}", s))?;
    let day: u32 = day
        .parse()
        .with_context(|| format!("bad day in date {:?}", s))?;
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("{:?} is not a valid date in {}", s, year))
}

/// Resolve the dates of the raw records and sort them ascending.
///
/// Duplicates are kept; records with equal dates keep their feed order.
pub fn sort_records(raw: &[RawDailyRecord], year: i32) -> Result<Vec<DailyRecord>> {
    let recs = raw
        .iter()
        .map(|r| {
            Ok(DailyRecord {
                date: parse_month_day(&r.date, year)?,
                confirmed: r.confirm,
                suspected: r.suspect,
                dead: r.dead,
                healed: r.heal,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(recs.into_iter().sorted_by_key(|r| r.date).collect())
}

/// Fetch the daily feed and return its records sorted by date.
pub fn catch_daily(fetcher: &Fetcher, year: i32) -> Result<Vec<DailyRecord>> {
    let raw: Vec<RawDailyRecord> = fetcher.get_payload(DAILY_FEED)?;
    tracing::info!(records = raw.len(), "fetched daily counts");
    sort_records(&raw, year)
}
