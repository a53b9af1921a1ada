//! put command - Upload a local file

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use ol_core::normalize_remote;

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub local: PathBuf,

    /// Remote directory to upload into
    pub remote_dir: String,

    /// Create the remote directory and its parents first
    #[arg(short = 'p', long)]
    pub mkdirs: bool,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    local: String,
    remote: String,
    size_bytes: u64,
}

pub async fn execute(args: PutArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    // Check locally before touching the network
    let size = match std::fs::metadata(&args.local) {
        Ok(m) if m.is_file() => m.len(),
        Ok(_) => {
            formatter.error(&format!("Not a regular file: {}", args.local.display()));
            return ExitCode::UsageError;
        }
        Err(_) => {
            formatter.error(&format!("File not found: {}", args.local.display()));
            return ExitCode::NotFound;
        }
    };

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let remote_dir = normalize_remote(&args.remote_dir);
    if args.mkdirs
        && let Err(e) = client.mkdirs(&remote_dir).await
    {
        return fail(&formatter, &format!("Failed to create {remote_dir}"), &e);
    }

    let remote = match client.upload_file(&args.local, &remote_dir).await {
        Ok(r) => r,
        Err(e) => return fail(&formatter, "Upload failed", &e),
    };

    if formatter.is_json() {
        formatter.json(&PutOutput {
            local: args.local.display().to_string(),
            remote,
            size_bytes: size,
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} -> {} ({})",
            args.local.display(),
            formatter.style_name(&remote),
            format_size(size as i64)
        ));
    }
    ExitCode::Success
}
