//! ol-openlist: OpenList adapter for ol
//!
//! Implements the `FileStore` trait from ol-core against the OpenList
//! (AList-compatible) HTTP/JSON API.
//!
//! ```ignore
//! let client = OpenListClient::new(&server, &Timeouts::default())?;
//! let listing = client.list("/docs", ListOptions::default()).await?;
//! client.mkdirs("/backups/2024").await?;
//! let remote = client.upload(Path::new("report.txt"), "/backups/2024").await?;
//! ```

mod client;
mod dispatch;
mod progress;
mod proxy;
mod transfer;
mod types;

pub use client::OpenListClient;
pub use dispatch::{Dispatcher, RequestEnvelope, ResponseEnvelope, SUCCESS_CODE};
pub use progress::ProgressReader;
pub use proxy::{ProxyProber, ProxyStatus};
