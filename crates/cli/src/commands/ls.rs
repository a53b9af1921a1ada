//! ls command - List a remote directory

use clap::Args;
use serde::Serialize;

use ol_core::{FileEntry, ListOptions, Listing, normalize_remote};

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_time};

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote directory (default: /)
    #[arg(default_value = "/")]
    pub path: String,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Entries per page (0 = all)
    #[arg(long, default_value = "0")]
    pub per_page: u32,

    /// Ask the server to re-read the storage instead of its cache
    #[arg(long)]
    pub refresh: bool,

    /// Only show names matching a glob pattern (e.g. "*.mp4")
    #[arg(long)]
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
struct LsOutput {
    path: String,
    total: u64,
    write: bool,
    provider: String,
    entries: Vec<EntryInfo>,
}

#[derive(Debug, Serialize)]
struct EntryInfo {
    name: String,
    is_dir: bool,
    size_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

impl From<&FileEntry> for EntryInfo {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            is_dir: entry.is_dir,
            size_bytes: entry.size,
            modified: entry.modified.map(|ts| ts.to_string()),
        }
    }
}

pub async fn execute(args: LsArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let pattern = match args.pattern.as_deref().map(glob::Pattern::new).transpose() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid pattern: {e}"));
            return ExitCode::UsageError;
        }
    };

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = normalize_remote(&args.path);
    let options = ListOptions {
        page: args.page,
        per_page: args.per_page,
        refresh: args.refresh,
        ..Default::default()
    };

    let listing = match client.list_files(&path, &options).await {
        Ok(l) => l,
        Err(e) => return fail(&formatter, &format!("Failed to list {path}"), &e),
    };

    let output = build_output(path, listing, pattern.as_ref());
    if formatter.is_json() {
        formatter.json(&output);
    } else {
        print_listing(&output, &formatter);
    }
    ExitCode::Success
}

fn build_output(path: String, listing: Listing, pattern: Option<&glob::Pattern>) -> LsOutput {
    let entries = listing
        .content
        .iter()
        .filter(|e| pattern.is_none_or(|p| p.matches(&e.name)))
        .map(EntryInfo::from)
        .collect();

    LsOutput {
        path,
        total: listing.total,
        write: listing.write,
        provider: listing.provider,
        entries,
    }
}

fn print_listing(output: &LsOutput, formatter: &Formatter) {
    if output.entries.is_empty() {
        formatter.println("Empty directory.");
        return;
    }

    for entry in &output.entries {
        let modified = entry
            .modified
            .as_deref()
            .and_then(|m| m.parse().ok());
        let date = formatter.style_date(&format!("[{}]", format_time(modified)));
        if entry.is_dir {
            let size = formatter.style_size(&format!("{:>10}", "DIR"));
            let name = formatter.style_dir(&format!("{}/", entry.name));
            formatter.println(&format!("{date} {size} {name}"));
        } else {
            let size = formatter.style_size(&format!("{:>10}", format_size(entry.size_bytes)));
            let name = formatter.style_file(&entry.name);
            formatter.println(&format!("{date} {size} {name}"));
        }
    }

    if output.total as usize > output.entries.len() {
        formatter.println(&format!(
            "\nShowing {} of {} entries.",
            output.entries.len(),
            output.total
        ));
    }
}
