//! Local directory backend.
//!
//! The collection name is a subdirectory of the root (an empty name or `.`
//! means the root itself). Files with a `.csv` extension are CSV-kind; a
//! `.trash` directory is never descended into, so anything moved there is
//! reported as absent. File ids are paths relative to the root.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};

use super::{FileDescriptor, FileSource};

pub const TRASH_DIR: &str = ".trash";

#[derive(Debug, Clone)]
pub struct FolderSource {
    root: PathBuf,
}

impl FolderSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        let trimmed = collection.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(self.root.clone());
        }
        let relative = safe_relative(trimmed)?;
        Ok(self.root.join(relative))
    }
}

fn safe_relative(value: &str) -> Result<&Path> {
    let path = Path::new(value);
    if path
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
    {
        Ok(path)
    } else {
        bail!("Path '{value}' escapes the source root")
    }
}

fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

impl FileSource for FolderSource {
    fn list(&self, collection: &str) -> Result<Vec<FileDescriptor>> {
        let dir = self.collection_dir(collection)?;
        let entries =
            fs::read_dir(&dir).with_context(|| format!("Listing collection directory {dir:?}"))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Reading entry in {dir:?}"))?;
            let path = entry.path();
            if !path.is_file() || !is_csv_file(&path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let id = path
                .strip_prefix(&self.root)
                .map(|relative| relative.to_string_lossy().into_owned())
                .unwrap_or_else(|_| name.clone());
            files.push(FileDescriptor::new(id, name));
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let relative = safe_relative(file_id)?;
        if relative
            .components()
            .any(|component| component.as_os_str() == TRASH_DIR)
        {
            return Err(anyhow!("File '{file_id}' is trashed"));
        }
        let path = self.root.join(relative);
        fs::read(&path).with_context(|| format!("Reading file {path:?}"))
    }
}
