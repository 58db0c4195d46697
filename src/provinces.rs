//! Fixed province knowledge for the distribution map: where each label
//! goes, how names are shortened, and how case totals map to fill colors.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use plotters::style::RGBColor;

use crate::shapes::ProvinceShape;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("province {0:?} has no label position")]
    UnknownProvince(String),
}

/// Label anchor (longitude, latitude) for every province as named in the
/// province shapefile.
pub const PROVINCE_POSITIONS: [(&str, (f64, f64)); 34] = [
    ("辽宁省", (121.7, 40.9)),
    ("吉林省", (124.5, 43.5)),
    ("黑龙江省", (125.6, 46.5)),
    ("北京市", (116.0, 39.9)),
    ("天津市", (117.0, 38.7)),
    ("内蒙古自治区", (110.0, 41.5)),
    ("宁夏回族自治区", (105.2, 37.0)),
    ("山西省", (111.0, 37.0)),
    ("河北省", (114.0, 37.8)),
    ("山东省", (116.5, 36.0)),
    ("河南省", (111.8, 33.5)),
    ("陕西省", (107.5, 33.5)),
    ("湖北省", (111.0, 30.5)),
    ("江苏省", (119.2, 32.5)),
    ("安徽省", (115.5, 31.8)),
    ("上海市", (121.0, 31.0)),
    ("湖南省", (110.3, 27.0)),
    ("江西省", (114.0, 27.0)),
    ("浙江省", (118.8, 28.5)),
    ("福建省", (116.2, 25.5)),
    ("广东省", (113.2, 23.1)),
    ("台湾省", (120.5, 23.5)),
    ("海南省", (108.0, 19.0)),
    ("广西壮族自治区", (107.3, 23.0)),
    ("重庆市", (106.5, 29.5)),
    ("云南省", (101.0, 24.0)),
    ("贵州省", (106.0, 26.5)),
    ("四川省", (102.0, 30.5)),
    ("甘肃省", (103.0, 35.0)),
    ("青海省", (95.0, 35.0)),
    ("新疆维吾尔自治区", (85.5, 42.5)),
    ("西藏自治区", (85.0, 31.5)),
    ("香港特别行政区", (115.1, 21.2)),
    ("澳门特别行政区", (112.5, 21.2)),
];

// Removed from full names in this order to get the short label.
const LABEL_AFFIXES: [&str; 7] = ["自治区", "特别行政区", "壮族", "维吾尔", "回族", "省", "市"];

pub fn province_position(name: &str) -> Result<(f64, f64), MapError> {
    PROVINCE_POSITIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, pos)| *pos)
        .ok_or_else(|| MapError::UnknownProvince(name.to_string()))
}

/// "广西壮族自治区" -> "广西", "北京市" -> "北京".
pub fn clean_label(name: &str) -> String {
    LABEL_AFFIXES
        .iter()
        .fold(name.to_string(), |s, affix| s.replace(affix, ""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBucket {
    Zero,
    Ones,
    Tens,
    Hundreds,
    Thousands,
}

impl ColorBucket {
    /// Buckets shown in the legend; `Zero` has no entry.
    pub const LEGEND: [ColorBucket; 4] = [
        ColorBucket::Ones,
        ColorBucket::Tens,
        ColorBucket::Hundreds,
        ColorBucket::Thousands,
    ];

    /// Thresholds are strict upper bounds checked in ascending order.
    pub fn for_count(count: u64) -> Self {
        if count == 0 {
            ColorBucket::Zero
        } else if count < 10 {
            ColorBucket::Ones
        } else if count < 100 {
            ColorBucket::Tens
        } else if count < 1000 {
            ColorBucket::Hundreds
        } else {
            ColorBucket::Thousands
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ColorBucket::Zero => "#f0f0f0",
            ColorBucket::Ones => "#ffaa85",
            ColorBucket::Tens => "#ff7b69",
            ColorBucket::Hundreds => "#bf2121",
            ColorBucket::Thousands => "#7f1818",
        }
    }

    pub fn legend_label(self) -> &'static str {
        match self {
            ColorBucket::Zero => "0人",
            ColorBucket::Ones => "1-9人",
            ColorBucket::Tens => "10-99人",
            ColorBucket::Hundreds => "100-999人",
            ColorBucket::Thousands => ">1000人",
        }
    }

    pub fn color(self) -> Result<RGBColor> {
        hex_color(self.hex())
    }
}

pub fn hex_color(hex: &str) -> Result<RGBColor> {
    let rgb: palette::Srgb<u8> = hex
        .parse()
        .with_context(|| format!("Invalid color {}", hex))?;
    Ok(RGBColor(rgb.red, rgb.green, rgb.blue))
}

/// Count of the first aggregate key (in key order) contained in `owner`.
///
/// Feed names are short ("湖北") while shapefile names are full ("湖北省").
pub fn find_count(aggregate: &BTreeMap<String, u64>, owner: &str) -> Option<u64> {
    aggregate
        .iter()
        .find(|(key, _)| owner.contains(key.as_str()))
        .map(|(_, count)| *count)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub lon: f64,
    pub lat: f64,
}

/// What to draw on the map, independent of projection and backend.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapPlan {
    /// Index into the province shapes and the bucket to fill it with.
    pub fills: Vec<(usize, ColorBucket)>,
    pub labels: Vec<Label>,
}

/// Decide fills and labels for the province shapes.
///
/// Shapes whose `OWNER` differs from their `FCNAME` are island parts and are
/// neither filled nor labelled. Every other shape must have a known label
/// position, and each cleaned name is labelled once.
pub fn plan_map(
    shapes: &[ProvinceShape],
    aggregate: &BTreeMap<String, u64>,
) -> Result<MapPlan, MapError> {
    let mut plan = MapPlan::default();
    let mut seen = HashSet::new();
    for (idx, shape) in shapes.iter().enumerate() {
        if shape.owner != shape.fcname {
            tracing::debug!(owner = %shape.owner, fcname = %shape.fcname, "skipping island shape");
            continue;
        }
        match find_count(aggregate, &shape.owner) {
            Some(count) => plan.fills.push((idx, ColorBucket::for_count(count))),
            None => tracing::debug!(owner = %shape.owner, "no case data for province"),
        }

        let (lon, lat) = province_position(&shape.owner)?;
        let text = clean_label(&shape.owner);
        if seen.insert(text.clone()) {
            plan.labels.push(Label { text, lon, lat });
        }
    }
    Ok(plan)
}
