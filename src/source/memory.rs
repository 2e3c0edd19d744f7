use std::sync::RwLock;

use anyhow::{Result, anyhow};

use super::{CSV_MIME_TYPE, FileDescriptor, FileSource, is_listable};

#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub trashed: bool,
    pub bytes: Vec<u8>,
}

/// In-memory file store. Every collection name sees the same entries.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: RwLock<Vec<MemoryEntry>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a CSV file.
    pub fn insert(&self, id: &str, name: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        self.insert_entry(MemoryEntry {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: CSV_MIME_TYPE.to_string(),
            trashed: false,
            bytes: contents.as_ref().to_vec(),
        })
    }

    pub fn insert_entry(&self, entry: MemoryEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("Memory source lock poisoned"))?;
        entries.push(entry);
        Ok(())
    }
}

impl FileSource for MemorySource {
    fn list(&self, _collection: &str) -> Result<Vec<FileDescriptor>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("Memory source lock poisoned"))?;
        Ok(entries
            .iter()
            .filter(|entry| is_listable(&entry.mime_type, entry.trashed))
            .map(|entry| FileDescriptor::new(entry.id.clone(), entry.name.clone()))
            .collect())
    }

    fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("Memory source lock poisoned"))?;
        entries
            .iter()
            .find(|entry| entry.id == file_id && !entry.trashed)
            .map(|entry| entry.bytes.clone())
            .ok_or_else(|| anyhow!("File '{file_id}' not found"))
    }
}
