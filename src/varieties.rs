//! Rice Variety Filter
//!
//! Static reference table of rice varieties keyed by district, soil texture
//! and a sowing-month range. The table is loaded from CSV with Polars and
//! normalized once at load, then shared read-only.
//!
//! CSV columns:
//! - `TNDST`: district
//! - `STXT`: soil texture
//! - `STMT`: first sowing month
//! - `EDMT`: last sowing month
//! - `VRTS`: variety name

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;
use serde::ser::{Serialize, Serializer};

use crate::utils::{normalize_key, normalize_month};

pub const DISTRICT_COL: &str = "TNDST";
pub const SOIL_TEXTURE_COL: &str = "STXT";
pub const START_MONTH_COL: &str = "STMT";
pub const END_MONTH_COL: &str = "EDMT";
pub const VARIETY_COL: &str = "VRTS";

/// Literal sent on the wire when nothing matches
pub const NO_VARIETIES_FOUND: &str = "No varieties found";

const CALENDAR: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// One reference row, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiceVarietyRow {
    pub district: String,
    pub soil_texture: String,
    pub start_month: String,
    pub end_month: String,
    pub variety: String,
}

impl RiceVarietyRow {
    /// Build a row, normalizing its key fields
    pub fn new(district: &str, soil_texture: &str, start_month: &str, end_month: &str, variety: &str) -> Self {
        Self {
            district: normalize_key(district),
            soil_texture: normalize_key(soil_texture),
            start_month: normalize_month(start_month),
            end_month: normalize_month(end_month),
            variety: variety.to_string(),
        }
    }
}

/// How a month is tested against a row's `[start, end]` range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonthOrdering {
    /// Plain string comparison of capitalized month names ("April" < "August" < "June").
    /// Not calendar order: "June".."September" does not contain "August".
    #[default]
    Lexicographic,
    /// Calendar position; ranges with start after end wrap over the new year.
    /// Unrecognised month names never match.
    Calendar,
}

impl MonthOrdering {
    pub fn contains(self, start: &str, end: &str, month: &str) -> bool {
        match self {
            MonthOrdering::Lexicographic => start <= month && month <= end,
            MonthOrdering::Calendar => {
                match (month_number(start), month_number(end), month_number(month)) {
                    (Some(s), Some(e), Some(m)) if s <= e => s <= m && m <= e,
                    (Some(s), Some(e), Some(m)) => m >= s || m <= e,
                    _ => false,
                }
            }
        }
    }
}

impl FromStr for MonthOrdering {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "lexicographic" => Ok(MonthOrdering::Lexicographic),
            "calendar" => Ok(MonthOrdering::Calendar),
            other => anyhow::bail!("Unknown month ordering '{}' (expected lexicographic or calendar)", other),
        }
    }
}

impl fmt::Display for MonthOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthOrdering::Lexicographic => write!(f, "lexicographic"),
            MonthOrdering::Calendar => write!(f, "calendar"),
        }
    }
}

/// 1-based calendar month from a full name or three-letter abbreviation
fn month_number(name: &str) -> Option<u32> {
    let name = normalize_key(name);
    if name.len() < 3 {
        return None;
    }
    CALENDAR
        .iter()
        .position(|m| *m == name || m[..3] == name)
        .map(|idx| idx as u32 + 1)
}

/// Outcome of a variety lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarietyMatch {
    /// Distinct names in first-occurrence order (never empty)
    Found(Vec<String>),
    NoneFound,
}

impl VarietyMatch {
    pub fn varieties(&self) -> &[String] {
        match self {
            VarietyMatch::Found(names) => names,
            VarietyMatch::NoneFound => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, VarietyMatch::Found(_))
    }
}

/// `Found` as a plain list; `NoneFound` as `["No varieties found"]`
impl Serialize for VarietyMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            VarietyMatch::Found(names) => names.serialize(serializer),
            VarietyMatch::NoneFound => [NO_VARIETIES_FOUND].serialize(serializer),
        }
    }
}

/// Immutable, normalized rice variety reference table
#[derive(Debug, Clone, Default)]
pub struct RiceVarietyTable {
    rows: Vec<RiceVarietyRow>,
    ordering: MonthOrdering,
}

impl RiceVarietyTable {
    pub fn from_rows(rows: Vec<RiceVarietyRow>, ordering: MonthOrdering) -> Self {
        Self { rows, ordering }
    }

    /// Load and normalize the reference CSV
    pub fn from_csv(path: &Path, ordering: MonthOrdering) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load rice variety CSV: {:?}", path))?;

        let table = Self::from_dataframe(&df, ordering)
            .with_context(|| format!("Malformed rice variety table: {:?}", path))?;

        tracing::info!(
            "Loaded {} rice variety rows from {:?} (month ordering: {})",
            table.len(),
            path,
            ordering
        );
        Ok(table)
    }

    /// Build from a loaded DataFrame.
    ///
    /// Rows with a missing key field or variety can never match and are skipped.
    pub fn from_dataframe(df: &DataFrame, ordering: MonthOrdering) -> Result<Self> {
        let district = string_column(df, DISTRICT_COL)?;
        let texture = string_column(df, SOIL_TEXTURE_COL)?;
        let start = string_column(df, START_MONTH_COL)?;
        let end = string_column(df, END_MONTH_COL)?;
        let variety = string_column(df, VARIETY_COL)?;

        let mut rows = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for idx in 0..df.height() {
            match (
                district.get(idx),
                texture.get(idx),
                start.get(idx),
                end.get(idx),
                variety.get(idx),
            ) {
                (Some(d), Some(t), Some(s), Some(e), Some(v)) => {
                    rows.push(RiceVarietyRow::new(d, t, s, e, v));
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} rice variety rows with missing fields", skipped);
        }

        Ok(Self { rows, ordering })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RiceVarietyRow] {
        &self.rows
    }

    pub fn ordering(&self) -> MonthOrdering {
        self.ordering
    }

    /// Varieties suited to a district, sowing month and soil texture.
    ///
    /// Inputs are normalized the same way the table was; matching is exact on
    /// district and texture and range containment on month.
    pub fn find_varieties(&self, district: &str, month: &str, soil_texture: &str) -> VarietyMatch {
        let district = normalize_key(district);
        let texture = normalize_key(soil_texture);
        let month = normalize_month(month);

        let mut seen = FxHashSet::default();
        let varieties: Vec<String> = self
            .rows
            .iter()
            .filter(|row| {
                row.district == district
                    && row.soil_texture == texture
                    && self.ordering.contains(&row.start_month, &row.end_month, &month)
            })
            .filter(|row| seen.insert(row.variety.as_str()))
            .map(|row| row.variety.clone())
            .collect();

        if varieties.is_empty() {
            VarietyMatch::NoneFound
        } else {
            VarietyMatch::Found(varieties)
        }
    }
}

/// Fetch a column as strings, casting non-string inference (e.g. numeric codes)
fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;

    let values = column
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?
        .clone();
    Ok(values)
}
