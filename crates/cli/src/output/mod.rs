//! Output formatting
//!
//! Every command prints through a `Formatter`, which switches between
//! styled human output and strict JSON.

mod formatter;

pub use formatter::{Formatter, format_size, format_time};

/// Output options shared by all commands
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Print JSON instead of human-readable text
    pub json: bool,

    /// Disable colors
    pub no_color: bool,

    /// Suppress everything except errors
    pub quiet: bool,
}
