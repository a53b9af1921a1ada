//! get command - Download a remote file

use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use ol_core::{ProgressFn, normalize_remote, path::split_parent};

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Remote file to download
    pub remote: String,

    /// Local destination (default: remote file name in the current directory)
    pub local: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    remote: String,
    local: String,
    size_bytes: u64,
}

pub async fn execute(args: GetArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let remote = normalize_remote(&args.remote);
    let local = match destination(&remote, args.local.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if local.is_file() {
        formatter.warning(&format!("Overwriting {}", local.display()));
    }

    let progress = formatter.show_progress().then(progress_bar);
    let observer: Option<ProgressFn> = progress.clone().map(|pb| {
        Box::new(move |done: u64, total: u64| {
            if total > 0 {
                pb.set_length(total);
            }
            pb.set_position(done);
        }) as ProgressFn
    });

    let result = client.download_file(&remote, &local, observer).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    if let Err(e) = result {
        return fail(&formatter, &format!("Failed to download {remote}"), &e);
    }

    let size = std::fs::metadata(&local).map(|m| m.len()).unwrap_or(0);
    if formatter.is_json() {
        formatter.json(&GetOutput {
            remote,
            local: local.display().to_string(),
            size_bytes: size,
        });
    } else {
        formatter.success(&format!(
            "Downloaded {} -> {} ({})",
            formatter.style_name(&remote),
            local.display(),
            format_size(size as i64)
        ));
    }
    ExitCode::Success
}

/// Where to write the download
///
/// A missing destination means the remote file name in the current
/// directory; an existing directory gets the remote file name appended.
fn destination(remote: &str, local: Option<&Path>) -> Result<PathBuf, String> {
    let (_, name) = split_parent(remote).map_err(|e| format!("Invalid remote path: {e}"))?;
    Ok(match local {
        None => PathBuf::from(name),
        Some(dir) if dir.is_dir() => dir.join(name),
        Some(path) => path.to_path_buf(),
    })
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .expect("Valid template")
            .progress_chars("#>-"),
    );
    pb
}
