//! Case counts arrive either as JSON numbers or as numeric strings
//! (`"confirm": "17"`), and the distribution feed sometimes sends `null`.
//! Use with `#[serde(deserialize_with = "counts::deserialize")]`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Int(u64),
    Float(f64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawCount::Int(n)) => Ok(n),
        Some(RawCount::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        Some(RawCount::Float(f)) => Err(serde::de::Error::custom(format!(
            "count {} is not a non-negative integer",
            f
        ))),
        Some(RawCount::Text(s)) => s.trim().parse::<u64>().map_err(serde::de::Error::custom),
    }
}
