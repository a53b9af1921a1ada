//! Error types for ol-core
//!
//! One error enum covers the whole client. Variants line up with the
//! failure points of a request: building it, sending it, reading the outer
//! HTTP status, decoding the business envelope, and local file I/O.

use thiserror::Error;

/// Result type alias for ol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Phrasings the service uses when a directory or file is already present.
const ALREADY_EXISTS_MARKERS: &[&str] = &["已存在", "already exist"];

/// Errors produced by the client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file missing values or unparsable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login rejected or the service could not be reached to log in
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Request body could not be serialized to JSON
    #[error("Failed to serialize request body: {0}")]
    Serialize(String),

    /// Request could not be constructed (bad URL, bad header value)
    #[error("Failed to build request: {0}")]
    Request(String),

    /// DNS, connect, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Outer HTTP status was not a success
    #[error("HTTP request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body was not the expected JSON
    #[error("Failed to decode response ({reason}), body: {body}")]
    Decode { body: String, reason: String },

    /// Business envelope carried a non-success code
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Business envelope reported that the target already exists
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Upload rejected, either by HTTP status or business code
    #[error("Upload failed, HTTP status: {status}, code: {code}, message: {message}")]
    Upload {
        status: u16,
        code: i64,
        message: String,
    },

    /// Local file not found
    #[error("Local file not found: {0}")]
    NotFound(String),

    /// Remote path could not be interpreted
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A directory in a mkdirs chain could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the target already exists on the server.
    ///
    /// `Conflict` is the typed signal. Older servers only say so in the
    /// message text, so business errors are matched against known phrasings
    /// too.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Conflict(_) => true,
            Error::Api { message, .. } | Error::Upload { message, .. } => {
                let lower = message.to_lowercase();
                ALREADY_EXISTS_MARKERS.iter().any(|m| lower.contains(m))
            }
            Error::CreateDir { source, .. } => source.is_already_exists(),
            _ => false,
        }
    }

    /// Whether this error came from the transport rather than the service
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Request(_) | Error::Http { .. }
        )
    }
}
