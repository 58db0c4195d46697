use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::counts;
use crate::fetch::Fetcher;

/// Feed name of the country/province/city case tree.
pub const DISTRIBUTION_FEED: &str = "disease_h5";

#[derive(Debug, Deserialize)]
pub struct DiseasePayload {
    #[serde(rename = "areaTree")]
    pub area_tree: Vec<AreaNode>,
}

/// A node of the area tree: a country, a province or a city.
#[derive(Debug, Deserialize, Clone)]
pub struct AreaNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<AreaNode>,
    /// Only read on city nodes, where a missing value is an error.
    #[serde(default)]
    pub total: Option<CaseCounts>,
    #[serde(default)]
    pub today: Option<CaseCounts>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaseCounts {
    #[serde(deserialize_with = "counts::deserialize")]
    pub confirm: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub suspect: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub dead: u64,
    #[serde(deserialize_with = "counts::deserialize")]
    pub heal: u64,
}

/// One city of the tree, flattened together with its country and province.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CityRecord {
    pub country: String,
    pub province: String,
    pub city: String,
    pub total_confirm: u64,
    pub total_suspect: u64,
    pub total_dead: u64,
    pub total_heal: u64,
    pub today_confirm: u64,
    pub today_suspect: u64,
    pub today_dead: u64,
    pub today_heal: u64,
}

/// Walk the first country of the tree down to its cities.
pub fn city_records(payload: &DiseasePayload) -> Result<Vec<CityRecord>> {
    let country = payload
        .area_tree
        .first()
        .ok_or_else(|| anyhow!("areaTree has no country node"))?;
    country
        .children
        .iter()
        .flat_map(|province| province.children.iter().map(move |city| (province, city)))
        .map(|(province, city)| -> Result<CityRecord> {
            let total = city
                .total
                .ok_or_else(|| anyhow!("city {} has no total counts", city.name))?;
            let today = city
                .today
                .ok_or_else(|| anyhow!("city {} has no today counts", city.name))?;
            Ok(CityRecord {
                country: country.name.clone(),
                province: province.name.clone(),
                city: city.name.clone(),
                total_confirm: total.confirm,
                total_suspect: total.suspect,
                total_dead: total.dead,
                total_heal: total.heal,
                today_confirm: today.confirm,
                today_suspect: today.suspect,
                today_dead: today.dead,
                today_heal: today.heal,
            })
        })
        .collect()
}

/// Sum `total_confirm` per province.
///
/// A province without any city record gets no entry at all, which the map
/// renders as "no data" rather than as zero cases.
pub fn aggregate_by_province(recs: &[CityRecord]) -> BTreeMap<String, u64> {
    recs.iter()
        .into_grouping_map_by(|r| r.province.clone())
        .fold(0u64, |acc, _province, r| acc + r.total_confirm)
        .into_iter()
        .collect()
}

/// Fetch the case tree and return the flat city records.
pub fn catch_distribution(fetcher: &Fetcher) -> Result<Vec<CityRecord>> {
    let payload: DiseasePayload = fetcher.get_payload(DISTRIBUTION_FEED)?;
    let recs = city_records(&payload)?;
    tracing::info!(cities = recs.len(), "fetched case distribution");
    Ok(recs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYLOAD: &str = r#"{
        "chinaTotal": {"confirm": 12},
        "areaTree": [{
            "name": "中国",
            "total": {"confirm": 12, "suspect": 0, "dead": 0, "heal": 0},
            "today": {"confirm": 1, "suspect": 0, "dead": 0, "heal": 0},
            "children": [
                {
                    "name": "湖北",
                    "total": {"confirm": 12, "suspect": 0, "dead": 0, "heal": 0},
                    "today": {"confirm": 1, "suspect": 0, "dead": 0, "heal": 0},
                    "children": [
                        {
                            "name": "武汉",
                            "total": {"confirm": 5, "suspect": 1, "dead": 2, "heal": "3"},
                            "today": {"confirm": 1, "suspect": null, "dead": 0, "heal": 0}
                        },
                        {
                            "name": "孝感",
                            "total": {"confirm": "7", "suspect": 0, "dead": 0, "heal": 0},
                            "today": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0}
                        }
                    ]
                },
                {
                    "name": "西藏",
                    "total": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0},
                    "today": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0},
                    "children": [
                        {
                            "name": "拉萨",
                            "total": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0},
                            "today": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0}
                        }
                    ]
                },
                {
                    "name": "台湾",
                    "total": {"confirm": 3, "suspect": 0, "dead": 0, "heal": 0},
                    "today": {"confirm": 0, "suspect": 0, "dead": 0, "heal": 0}
                }
            ]
        }]
    }"#;

    fn records() -> Vec<CityRecord> {
        let payload: DiseasePayload = serde_json::from_str(PAYLOAD).unwrap();
        city_records(&payload).unwrap()
    }

    #[test]
    fn flattens_every_city() {
        let recs = records();
        assert_eq!(recs.len(), 3);
        assert_eq!(
            recs[0],
            CityRecord {
                country: "中国".to_string(),
                province: "湖北".to_string(),
                city: "武汉".to_string(),
                total_confirm: 5,
                total_suspect: 1,
                total_dead: 2,
                total_heal: 3,
                today_confirm: 1,
                today_suspect: 0,
                today_dead: 0,
                today_heal: 0,
            }
        );
    }

    #[test]
    fn sums_cities_per_province() {
        let agg = aggregate_by_province(&records());
        assert_eq!(agg.get("湖北"), Some(&12));
    }

    #[test]
    fn zero_and_missing_provinces_differ() {
        let agg = aggregate_by_province(&records());
        // Reported with a zero-count city.
        assert_eq!(agg.get("西藏"), Some(&0));
        // No city children, so no entry.
        assert_eq!(agg.get("台湾"), None);
    }

    #[test]
    fn counts_are_optional_above_city_level() {
        let json = r#"{"areaTree": [{
            "name": "中国",
            "children": [{
                "name": "湖北",
                "children": [{
                    "name": "武汉",
                    "total": {"confirm": 5, "suspect": 0, "dead": 0, "heal": 0},
                    "today": {"confirm": 1, "suspect": 0, "dead": 0, "heal": 0}
                }]
            }]
        }]}"#;
        let payload: DiseasePayload = serde_json::from_str(json).unwrap();
        let recs = city_records(&payload).unwrap();
        assert_eq!(aggregate_by_province(&recs).get("湖北"), Some(&5));
    }

    #[test]
    fn city_without_totals_is_an_error() {
        let json = r#"{"areaTree": [{
            "name": "中国",
            "children": [{
                "name": "湖北",
                "children": [{
                    "name": "武汉",
                    "today": {"confirm": 1, "suspect": 0, "dead": 0, "heal": 0}
                }]
            }]
        }]}"#;
        let payload: DiseasePayload = serde_json::from_str(json).unwrap();
        assert!(city_records(&payload).is_err());
    }

    #[test]
    fn empty_tree_is_an_error() {
        let payload: DiseasePayload = serde_json::from_str(r#"{"areaTree": []}"#).unwrap();
        assert!(city_records(&payload).is_err());
    }
}
