//! ol-core: Core library for the ol OpenList client
//!
//! This crate provides the backend-independent pieces of the client:
//! - Error taxonomy shared by every crate
//! - Configuration management
//! - Remote path normalization and header encoding
//! - FileStore trait for storage operations
//! - Directory materialization (recursive, idempotent mkdir)
//!
//! Nothing in here talks HTTP; the `ol-openlist` crate implements
//! `FileStore` on top of the service's JSON API.

pub mod config;
pub mod error;
pub mod materialize;
pub mod path;
pub mod traits;

pub use config::{Config, ConfigManager, ServerConfig, Timeouts};
pub use error::{Error, Result};
pub use materialize::mkdirs;
pub use path::{base_name, encode_path_header, join_remote, normalize_remote, path_prefixes};
pub use traits::{
    FileEntry, FileStore, ListOptions, Listing, ProgressFn, SearchHit, SearchOptions,
    SearchResults,
};
