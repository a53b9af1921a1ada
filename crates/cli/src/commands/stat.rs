//! stat command - Show metadata for a remote path

use clap::Args;
use comfy_table::{Table, presets};

use ol_core::{FileEntry, normalize_remote};

use super::{ConnectionArgs, connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size, format_time};

#[derive(Args, Debug)]
pub struct StatArgs {
    /// Remote path
    pub path: String,
}

pub async fn execute(args: StatArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match connect(connection, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = normalize_remote(&args.path);
    let entry = match client.get_file_info(&path).await {
        Ok(e) => e,
        Err(e) => return fail(&formatter, &format!("Failed to stat {path}"), &e),
    };

    if formatter.is_json() {
        formatter.json(&entry);
    } else {
        formatter.println(&render(&path, &entry, &formatter));
    }
    ExitCode::Success
}

fn render(path: &str, entry: &FileEntry, formatter: &Formatter) -> String {
    let kind = if entry.is_dir { "directory" } else { "file" };
    let mut rows = vec![
        ("Path", path.to_string()),
        ("Name", entry.name.clone()),
        ("Type", kind.to_string()),
        (
            "Size",
            format!("{} ({} bytes)", format_size(entry.size), entry.size.max(0)),
        ),
        ("Modified", format_time(entry.modified)),
    ];
    if let Some(provider) = &entry.provider {
        rows.push(("Provider", provider.clone()));
    }
    if !entry.raw_url.is_empty() {
        rows.push(("Raw URL", formatter.style_url(&entry.raw_url)));
    }
    if !entry.sign.is_empty() {
        rows.push(("Sign", entry.sign.clone()));
    }

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    for (key, value) in rows {
        table.add_row(vec![formatter.style_key(key), value]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_known_fields() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        let mut entry = FileEntry::file("movie.mkv", 3 * 1024 * 1024);
        entry.raw_url = "http://cdn.example/movie.mkv".to_string();

        let text = render("/media/movie.mkv", &entry, &formatter);
        assert!(text.contains("/media/movie.mkv"));
        assert!(text.contains("MiB (3145728 bytes)"));
        assert!(text.contains("http://cdn.example/movie.mkv"));
        assert!(!text.contains("Provider"));
    }
}
