//! File sources and the logical feedback sources selected from them.
//!
//! A [`FileSource`] is anything that can list the CSV files of a collection
//! and fetch their bytes. Backends only ever list CSV-kind, non-trashed
//! files. [`LogicalSource`] maps a user-facing feedback category to files by
//! naming convention.

pub mod auth;
pub mod drive;
pub mod folder;
pub mod memory;

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, RwLock},
};

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

pub use drive::DriveSource;
pub use folder::FolderSource;
pub use memory::MemorySource;

pub const CSV_MIME_TYPE: &str = "text/csv";
pub const QUARTERLY_MARKER: &str = "qtr";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
}

impl FileDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_quarterly(&self) -> bool {
        self.name.to_lowercase().contains(QUARTERLY_MARKER)
    }
}

pub trait FileSource {
    /// Non-trashed CSV files of `collection`, in the backend's listing order.
    fn list(&self, collection: &str) -> Result<Vec<FileDescriptor>>;
    fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

impl<T: FileSource + ?Sized> FileSource for Box<T> {
    fn list(&self, collection: &str) -> Result<Vec<FileDescriptor>> {
        (**self).list(collection)
    }

    fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        (**self).fetch(file_id)
    }
}

/// Whether a listed entry counts as a CSV file that still exists.
pub fn is_listable(mime_type: &str, trashed: bool) -> bool {
    !trashed && mime_type.trim().eq_ignore_ascii_case(CSV_MIME_TYPE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum LogicalSource {
    #[serde(rename = "All")]
    All,
    #[serde(rename = "Seller Relevance")]
    SellerRelevance,
    #[serde(rename = "Play Store")]
    PlayStore,
    #[serde(rename = "NPS")]
    Nps,
    #[serde(rename = "App Internal")]
    AppInternal,
}

impl LogicalSource {
    pub const ALL_SOURCES: [LogicalSource; 5] = [
        LogicalSource::All,
        LogicalSource::SellerRelevance,
        LogicalSource::PlayStore,
        LogicalSource::Nps,
        LogicalSource::AppInternal,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LogicalSource::All => "All",
            LogicalSource::SellerRelevance => "Seller Relevance",
            LogicalSource::PlayStore => "Play Store",
            LogicalSource::Nps => "NPS",
            LogicalSource::AppInternal => "App Internal",
        }
    }

    /// Substring a file name must contain; `All` has none.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            LogicalSource::All => None,
            LogicalSource::SellerRelevance => Some("seller"),
            LogicalSource::PlayStore => Some("play"),
            LogicalSource::Nps => Some("nps"),
            LogicalSource::AppInternal => Some("internal"),
        }
    }

    pub fn quarterly_keyword(&self) -> Option<&'static str> {
        match self {
            LogicalSource::All => None,
            LogicalSource::SellerRelevance => Some("seller relevance qtr"),
            LogicalSource::PlayStore => Some("play store qtr"),
            LogicalSource::Nps => Some("nps_qtr"),
            LogicalSource::AppInternal => Some("app internal qtr"),
        }
    }

    /// Row-level selection: keyword match, never a quarterly file.
    pub fn selects(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        if lowered.contains(QUARTERLY_MARKER) {
            return false;
        }
        match self.keyword() {
            Some(keyword) => lowered.contains(keyword),
            None => true,
        }
    }

    /// Quarterly lookup. Separators (`_`, `-`, space) are interchangeable on
    /// both sides, so `Seller_Relevance_QTR.csv` matches
    /// `seller relevance qtr`.
    pub fn matches_quarterly(&self, file_name: &str) -> bool {
        match self.quarterly_keyword() {
            Some(keyword) => normalize_separators(file_name).contains(&normalize_separators(keyword)),
            None => false,
        }
    }
}

fn normalize_separators(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect()
}

impl fmt::Display for LogicalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LogicalSource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = normalize_separators(value.trim());
        LogicalSource::ALL_SOURCES
            .into_iter()
            .find(|source| normalize_separators(source.display_name()) == wanted)
            .ok_or_else(|| anyhow!("Unknown feedback source '{value}'"))
    }
}

/// Lazily populated listing of one collection. The listing is replaced as a
/// whole on [`ListingCache::refresh`] and never partially updated.
pub struct ListingCache<S> {
    source: S,
    collection: String,
    listing: RwLock<Option<Arc<[FileDescriptor]>>>,
}

impl<S: FileSource> ListingCache<S> {
    pub fn new(source: S, collection: impl Into<String>) -> Self {
        Self {
            source,
            collection: collection.into(),
            listing: RwLock::new(None),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn files(&self) -> Result<Arc<[FileDescriptor]>> {
        {
            let guard = self
                .listing
                .read()
                .map_err(|_| anyhow!("Listing cache lock poisoned"))?;
            if let Some(listing) = guard.as_ref() {
                return Ok(Arc::clone(listing));
            }
        }
        self.refresh()
    }

    pub fn refresh(&self) -> Result<Arc<[FileDescriptor]>> {
        let fresh: Arc<[FileDescriptor]> = self.source.list(&self.collection)?.into();
        debug!(
            "Listed {} file(s) in collection '{}'",
            fresh.len(),
            self.collection
        );
        let mut guard = self
            .listing
            .write()
            .map_err(|_| anyhow!("Listing cache lock poisoned"))?;
        *guard = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    pub fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        self.source.fetch(file_id)
    }
}
