//! Google Drive v3 backend over blocking HTTP.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{FileDescriptor, FileSource, auth::Authenticator, is_listable};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    trashed: bool,
}

pub struct DriveSource {
    client: Client,
    api_base: String,
    auth: Box<dyn Authenticator>,
}

impl DriveSource {
    pub fn new(auth: Box<dyn Authenticator>) -> Self {
        Self::with_api_base(auth, DEFAULT_API_BASE)
    }

    pub fn with_api_base(auth: Box<dyn Authenticator>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn list_page(&self, collection: &str, page_token: Option<&str>) -> Result<FileListPage> {
        let mut request = self
            .client
            .get(format!("{}/files", self.api_base))
            .query(&[
                ("q", list_query(collection).as_str()),
                ("fields", "nextPageToken, files(id, name, mimeType, trashed)"),
                ("pageSize", PAGE_SIZE),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        let response = self
            .auth
            .authorize(request)?
            .send()
            .with_context(|| format!("Listing Drive folder '{collection}'"))?
            .error_for_status()
            .with_context(|| format!("Listing Drive folder '{collection}'"))?;
        response
            .json::<FileListPage>()
            .context("Parsing Drive file listing")
    }
}

/// Drive search expression for the non-trashed CSV files of one folder.
pub fn list_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}' in parents and mimeType='text/csv' and trashed=false")
}

fn collect_page(page: FileListPage, into: &mut Vec<FileDescriptor>) -> Option<String> {
    into.extend(
        page.files
            .into_iter()
            .filter(|file| {
                is_listable(
                    file.mime_type.as_deref().unwrap_or(super::CSV_MIME_TYPE),
                    file.trashed,
                )
            })
            .map(|file| FileDescriptor::new(file.id, file.name)),
    );
    page.next_page_token.filter(|token| !token.is_empty())
}

impl FileSource for DriveSource {
    fn list(&self, collection: &str) -> Result<Vec<FileDescriptor>> {
        debug!(
            "Listing Drive folder '{collection}' using {} authentication",
            self.auth.describe()
        );
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(collection, page_token.as_deref())?;
            match collect_page(page, &mut files) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(files)
    }

    fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(format!("{}/files/{}", self.api_base, file_id))
            .query(&[("alt", "media")]);
        let response = self
            .auth
            .authorize(request)?
            .send()
            .with_context(|| format!("Downloading Drive file '{file_id}'"))?
            .error_for_status()
            .with_context(|| format!("Downloading Drive file '{file_id}'"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("Reading Drive file '{file_id}'"))?;
        Ok(bytes.to_vec())
    }
}
