//! Schema classification for feedback exports.
//!
//! Exporters disagree on column naming and keep adding incidental columns, so
//! a schema is recognized by the *presence* of a required column set rather
//! than exact equality. Rules are checked in a fixed order and the first
//! match wins:
//!
//! 1. `nps_app_internal` - `source`, `buyer`, `comment`, `reason`
//! 2. `play_store` - `id`, `sentiment`, `user`, `reason`, `reason2`,
//!    `comment`, `ratingmeaning`, `rating`, `reviewer_type`
//! 3. `seller_relevance` - `fk_glusr_buyer_id`, `iil_glusr_seller_id`,
//!    `feedback_date`
//!
//! Anything else is `unknown`, which is a valid result rather than an error.

use std::{collections::HashSet, fmt, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::source::LogicalSource;

const NPS_APP_INTERNAL_COLUMNS: &[&str] = &["source", "buyer", "comment", "reason"];
const PLAY_STORE_COLUMNS: &[&str] = &[
    "id",
    "sentiment",
    "user",
    "reason",
    "reason2",
    "comment",
    "ratingmeaning",
    "rating",
    "reviewer_type",
];
const SELLER_RELEVANCE_COLUMNS: &[&str] =
    &["fk_glusr_buyer_id", "iil_glusr_seller_id", "feedback_date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaTag {
    NpsAppInternal,
    PlayStore,
    SellerRelevance,
    Unknown,
    /// No single schema assumed; used for the unfiltered union of all files.
    All,
}

impl SchemaTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaTag::NpsAppInternal => "nps_app_internal",
            SchemaTag::PlayStore => "play_store",
            SchemaTag::SellerRelevance => "seller_relevance",
            SchemaTag::Unknown => "unknown",
            SchemaTag::All => "all",
        }
    }

    /// Columns whose presence identifies this schema. `Unknown` and `All`
    /// have no rule.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SchemaTag::NpsAppInternal => NPS_APP_INTERNAL_COLUMNS,
            SchemaTag::PlayStore => PLAY_STORE_COLUMNS,
            SchemaTag::SellerRelevance => SELLER_RELEVANCE_COLUMNS,
            SchemaTag::Unknown | SchemaTag::All => &[],
        }
    }

    /// Whether the schema defines a finer-grained `reason2` column.
    pub fn prefers_sub_reason(&self) -> bool {
        matches!(self, SchemaTag::PlayStore | SchemaTag::SellerRelevance)
    }
}

impl fmt::Display for SchemaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaTag {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nps_app_internal" => Ok(SchemaTag::NpsAppInternal),
            "play_store" => Ok(SchemaTag::PlayStore),
            "seller_relevance" => Ok(SchemaTag::SellerRelevance),
            "unknown" => Ok(SchemaTag::Unknown),
            "all" => Ok(SchemaTag::All),
            other => Err(anyhow!("Unknown schema tag '{other}'")),
        }
    }
}

const RULES: &[SchemaTag] = &[
    SchemaTag::NpsAppInternal,
    SchemaTag::PlayStore,
    SchemaTag::SellerRelevance,
];

pub fn classify<I, S>(columns: I) -> SchemaTag
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized = columns
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .collect::<HashSet<_>>();
    RULES
        .iter()
        .copied()
        .find(|tag| {
            tag.required_columns()
                .iter()
                .all(|required| normalized.contains(*required))
        })
        .unwrap_or(SchemaTag::Unknown)
}

/// `All` never assumes a schema; every other selection is classified from
/// its merged columns.
pub fn detect_for<I, S>(source: LogicalSource, columns: I) -> SchemaTag
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if source == LogicalSource::All {
        SchemaTag::All
    } else {
        classify(columns)
    }
}
