//! Output formatter for human-readable and JSON output
//!
//! JSON output is printed to stdout as a single pretty-printed document per
//! command; errors go to stderr in both modes.

use console::Style;
use jiff::Timestamp;
use serde::Serialize;

use super::OutputConfig;

/// What a piece of styled text is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Dir,
    File,
    Size,
    Date,
    Key,
    Url,
    Name,
    Success,
    Failure,
    Warning,
}

impl Role {
    fn style(self) -> Style {
        let style = Style::new();
        match self {
            Role::Dir => style.blue().bold(),
            Role::File => style,
            Role::Size | Role::Success => style.green(),
            Role::Date => style.dim(),
            Role::Key => style.cyan(),
            Role::Url => style.cyan().underlined(),
            Role::Name => style.bold(),
            Role::Failure => style.red(),
            Role::Warning => style.yellow(),
        }
    }
}

/// Human-readable byte count in binary units
pub fn format_size(bytes: i64) -> String {
    humansize::format_size(bytes.max(0) as u64, humansize::BINARY)
}

/// Modification time in local-agnostic `YYYY-MM-DD HH:MM:SS` form
pub fn format_time(ts: Option<Timestamp>) -> String {
    match ts {
        Some(ts) => ts.strftime("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'a str,
}

/// Formatter for CLI output
///
/// JSON mode prints strict JSON: no colors, no progress bars, no status
/// lines on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Whether a progress bar may be drawn
    pub fn show_progress(&self) -> bool {
        !self.is_json() && !self.is_quiet()
    }

    fn paint(&self, role: Role, text: &str) -> String {
        if self.colors_enabled() {
            role.style().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn style_dir(&self, text: &str) -> String {
        self.paint(Role::Dir, text)
    }

    pub fn style_file(&self, text: &str) -> String {
        self.paint(Role::File, text)
    }

    pub fn style_size(&self, text: &str) -> String {
        self.paint(Role::Size, text)
    }

    pub fn style_date(&self, text: &str) -> String {
        self.paint(Role::Date, text)
    }

    pub fn style_key(&self, text: &str) -> String {
        self.paint(Role::Key, text)
    }

    pub fn style_url(&self, text: &str) -> String {
        self.paint(Role::Url, text)
    }

    pub fn style_name(&self, text: &str) -> String {
        self.paint(Role::Name, text)
    }

    /// `✓ message` on stdout, human mode only
    pub fn success(&self, message: &str) {
        if self.show_progress() {
            println!("{} {message}", self.paint(Role::Success, "✓"));
        }
    }

    /// `⚠ message` on stderr, human mode only
    pub fn warning(&self, message: &str) {
        if self.show_progress() {
            eprintln!("{} {message}", self.paint(Role::Warning, "⚠"));
        }
    }

    /// Report an error on stderr, even in quiet mode.
    ///
    /// JSON mode prints `{"error": "..."}`.
    pub fn error(&self, message: &str) {
        if self.is_json() {
            let rendered = serde_json::to_string_pretty(&ErrorOutput { error: message });
            eprintln!("{}", rendered.unwrap_or_else(|_| message.to_string()));
        } else {
            eprintln!("{} {message}", self.paint(Role::Failure, "✗"));
        }
    }

    /// Pretty-print `value` as the command's JSON document
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// A plain line on stdout, suppressed by `--quiet`
    pub fn println(&self, message: &str) {
        if !self.is_quiet() {
            println!("{message}");
        }
    }
}
