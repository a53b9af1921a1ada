//! mkdir command - Create a remote directory

use clap::Args;
use serde::Serialize;

use ol_core::normalize_remote;

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Remote directory to create
    pub path: String,

    /// Create missing parents; an existing directory is not an error
    #[arg(short, long)]
    pub parents: bool,
}

#[derive(Debug, Serialize)]
struct MkdirOutput {
    path: String,
    parents: bool,
}

pub async fn execute(args: MkdirArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = normalize_remote(&args.path);
    if path == "/" {
        formatter.error("Cannot create the root directory");
        return ExitCode::UsageError;
    }

    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let result = if args.parents {
        client.mkdirs(&path).await
    } else {
        client.create_dir(&path).await
    };
    if let Err(e) = result {
        return fail(&formatter, &format!("Failed to create {path}"), &e);
    }

    if formatter.is_json() {
        formatter.json(&MkdirOutput {
            path,
            parents: args.parents,
        });
    } else {
        formatter.success(&format!("Created {}", formatter.style_dir(&path)));
    }
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_is_rejected() {
        let args = MkdirArgs {
            path: "//".to_string(),
            parents: true,
        };
        let code = execute(args, &ConnectionArgs::default(), OutputConfig::default()).await;
        assert_eq!(code, ExitCode::UsageError);
    }
}
