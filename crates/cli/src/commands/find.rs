//! find command - Search the server index by keyword
//!
//! Search only covers what the server has indexed; freshly uploaded files
//! may not show up until the index is rebuilt.

use clap::Args;
use serde::Serialize;

use ol_core::{SearchOptions, SearchResults, normalize_remote};

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Keywords to search for
    pub keywords: String,

    /// Directory to search below
    #[arg(long, default_value = "/")]
    pub parent: String,

    /// Only match directories
    #[arg(long, conflicts_with = "files")]
    pub dirs: bool,

    /// Only match files
    #[arg(long)]
    pub files: bool,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value = "100")]
    pub per_page: u32,
}

impl FindArgs {
    fn scope(&self) -> u8 {
        match (self.dirs, self.files) {
            (true, _) => 1,
            (_, true) => 2,
            _ => 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct FindOutput {
    keywords: String,
    parent: String,
    total: u64,
    matches: Vec<MatchInfo>,
}

#[derive(Debug, Serialize)]
struct MatchInfo {
    path: String,
    is_dir: bool,
    size_bytes: i64,
}

pub async fn execute(args: FindArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.keywords.trim().is_empty() {
        formatter.error("Keywords cannot be empty");
        return ExitCode::UsageError;
    }

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let parent = normalize_remote(&args.parent);
    let options = SearchOptions {
        scope: args.scope(),
        page: args.page,
        per_page: args.per_page,
        ..Default::default()
    };

    let results = match client.search_files(&args.keywords, &parent, &options).await {
        Ok(r) => r,
        Err(e) => return fail(&formatter, "Search failed", &e),
    };

    let output = build_output(args.keywords, parent, results);
    if formatter.is_json() {
        formatter.json(&output);
    } else if output.matches.is_empty() {
        formatter.println("No matches found.");
    } else {
        for m in &output.matches {
            if m.is_dir {
                let size = formatter.style_size(&format!("{:>10}", "DIR"));
                formatter.println(&format!("{size} {}", formatter.style_dir(&m.path)));
            } else {
                let size = formatter.style_size(&format!("{:>10}", format_size(m.size_bytes)));
                formatter.println(&format!("{size} {}", m.path));
            }
        }
        formatter.println(&format!("\nTotal: {} match(es)", output.total));
    }

    ExitCode::Success
}

fn build_output(keywords: String, parent: String, results: SearchResults) -> FindOutput {
    FindOutput {
        keywords,
        parent,
        total: results.total,
        matches: results
            .content
            .iter()
            .map(|hit| MatchInfo {
                path: hit.path(),
                is_dir: hit.is_dir,
                size_bytes: hit.size,
            })
            .collect(),
    }
}
