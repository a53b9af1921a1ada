//! rm command - Remove remote entries
//!
//! The server removes names relative to one directory per call, so paths are
//! grouped by parent and each group goes out as a single request.

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use ol_core::path::split_parent;

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Remote paths to remove
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    removed: Vec<String>,
}

pub async fn execute(args: RmArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let groups = match group_by_parent(&args.paths) {
        Ok(g) => g,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut removed = Vec::new();
    for (dir, names) in &groups {
        if let Err(e) = client.remove_files(dir, names).await {
            return fail(&formatter, &format!("Failed to remove from {dir}"), &e);
        }
        for name in names {
            let path = ol_core::join_remote(dir, name);
            formatter.success(&format!("Removed {}", formatter.style_name(&path)));
            removed.push(path);
        }
    }

    if formatter.is_json() {
        formatter.json(&RmOutput { removed });
    }
    ExitCode::Success
}

/// Group paths by parent directory, dropping duplicates
fn group_by_parent(paths: &[String]) -> Result<BTreeMap<String, Vec<String>>, String> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in paths {
        let (parent, name) =
            split_parent(path).map_err(|_| format!("Refusing to remove '{path}'"))?;
        let names = groups.entry(parent).or_default();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(groups)
}
