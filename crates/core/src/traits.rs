//! FileStore trait definition
//!
//! This trait defines the interface for remote file operations. It is
//! independent of the HTTP client in use, so front ends and the directory
//! materializer can be tested against a mock.

use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Progress observer for transfers: `(bytes_so_far, total)`.
///
/// `total` is 0 when the size is unknown. The observer runs on the transfer's
/// own task, so it should return quickly.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Metadata for a remote file or directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry name (last path component)
    pub name: String,

    /// Size in bytes (0 for directories)
    #[serde(default)]
    pub size: i64,

    /// Whether this is a directory
    #[serde(default)]
    pub is_dir: bool,

    /// Last modification time
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub modified: Option<Timestamp>,

    /// Direct download address, only filled by file-info lookups
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_url: String,

    /// Download signature
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,

    /// Thumbnail address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumb: String,

    /// Server-side file type classification
    #[serde(default, rename = "type")]
    pub kind: i32,

    /// Storage provider backing this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl FileEntry {
    /// Create a file entry with the given name and size
    pub fn file(name: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }

    /// Create a directory entry
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            ..Default::default()
        }
    }
}

/// Servers emit a zero date or an empty string for unknown times; neither
/// should fail a whole listing.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| s.parse::<Timestamp>().ok())
        .filter(|ts| ts.as_second() > 0))
}

/// One page of a directory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Entries in this page
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<FileEntry>,

    /// Total number of entries in the directory
    #[serde(default)]
    pub total: u64,

    /// Directory readme, if the server renders one
    #[serde(default)]
    pub readme: String,

    /// Whether the current user may write here
    #[serde(default)]
    pub write: bool,

    /// Storage provider name
    #[serde(default)]
    pub provider: String,
}

/// A single search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Directory containing the hit
    pub parent: String,

    /// Entry name
    pub name: String,

    /// Whether the hit is a directory
    #[serde(default)]
    pub is_dir: bool,

    /// Size in bytes
    #[serde(default)]
    pub size: i64,

    /// Server-side file type classification
    #[serde(default, rename = "type")]
    pub kind: i32,
}

impl SearchHit {
    /// Full remote path of the hit
    pub fn path(&self) -> String {
        crate::path::join_remote(&self.parent, &self.name)
    }
}

/// Search results page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<SearchHit>,

    #[serde(default)]
    pub total: u64,
}

/// The service sends `null` instead of `[]` for empty directories.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Options for listing a directory
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Page number, starting from 1
    pub page: u32,

    /// Entries per page (0 = everything)
    pub per_page: u32,

    /// Ask the server to bypass its directory cache
    pub refresh: bool,

    /// Directory password, if the path is protected
    pub password: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 0,
            refresh: true,
            password: String::new(),
        }
    }
}

impl ListOptions {
    /// The cheapest listing the server accepts: one item, cached.
    ///
    /// Used as an existence probe.
    pub fn probe() -> Self {
        Self {
            page: 1,
            per_page: 1,
            refresh: false,
            password: String::new(),
        }
    }
}

/// Options for a search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// 0 = all, 1 = directories only, 2 = files only
    pub scope: u8,
    pub page: u32,
    pub per_page: u32,
    pub password: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            scope: 0,
            page: 1,
            per_page: 100,
            password: String::new(),
        }
    }
}

/// Remote file operations
///
/// Every method authenticates on first use; callers never log in
/// explicitly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List a directory
    async fn list(&self, path: &str, options: ListOptions) -> Result<Listing>;

    /// Search below `parent` for `keywords`
    async fn search(
        &self,
        parent: &str,
        keywords: &str,
        options: SearchOptions,
    ) -> Result<SearchResults>;

    /// Metadata for a single path, including its direct download address
    async fn stat(&self, path: &str) -> Result<FileEntry>;

    /// Remove `names` from directory `dir`
    async fn remove(&self, dir: &str, names: Vec<String>) -> Result<()>;

    /// Create a single directory
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Upload `local` into `remote_dir`, returning the remote path written
    async fn upload(&self, local: &Path, remote_dir: &str) -> Result<String>;

    /// Download `remote` into `local`, reporting progress to `on_progress`
    async fn download(
        &self,
        remote: &str,
        local: &Path,
        on_progress: Option<ProgressFn>,
    ) -> Result<()>;
}
