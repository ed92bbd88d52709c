//! Tolerant decoders for catalog fields.
//!
//! The source catalog was hand-maintained: numeric release attributes show up
//! as numbers, numeric strings, or empty strings depending on who edited the
//! entry. These helpers accept all of those and normalise to typed values.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if *f >= 0.0 && f.fract().abs() < f64::EPSILON => Some(*f as u64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

/// Decode an optional number from a number, numeric string, `""` or `null`.
///
/// Anything that does not parse as a number decodes to `None`.
///
/// # Errors
///
/// Only fails when the input is not a scalar at all (e.g. an object).
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(|s| s.as_f64()))
}

/// Decode an optional non-negative integer, with the same tolerance as [`opt_f64`].
///
/// # Errors
///
/// Only fails when the input is not a scalar at all.
pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(|s| s.as_u64()))
}

/// Decode a list of numbers whose items may be numbers or numeric strings.
///
/// A bare scalar is treated as a one-element list; unparseable items are dropped.
///
/// # Errors
///
/// Fails when the input is neither a scalar nor a list of scalars.
pub fn f64_list<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items.iter().filter_map(Scalar::as_f64).collect(),
        Some(OneOrMany::One(item)) => item.as_f64().into_iter().collect(),
        None => Vec::new(),
    };
    Ok(values)
}

/// Parse a release date from `YYYY-MM-DD` or a timestamp starting with one.
///
/// Accepts RFC 3339 (`2023-06-01T12:00:00+02:00`) and the catalog's
/// `2023-06-01T12:00:00Z` form; only the calendar date is kept.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    match (s.get(..10), s.as_bytes().get(10)) {
        (Some(day), Some(b'T' | b' ')) => NaiveDate::parse_from_str(day, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Serde adapter for release dates: lenient on input, `YYYY-MM-DD` on output.
pub mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serialize a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)] // signature fixed by serde's `with`
    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    /// Deserialize a date via [`super::parse_date`].
    ///
    /// # Errors
    ///
    /// Fails when the string is not a recognisable date.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid release date '{raw}'")))
    }
}
