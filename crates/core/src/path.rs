//! Remote path handling
//!
//! Remote paths are absolute, `/`-separated strings as the server sees them.
//! Nothing here touches the network; the functions only shape strings.

use std::path::Path;

use crate::error::{Error, Result};

/// Collapse every run of `/` into a single separator.
fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_sep {
                out.push(c);
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    out
}

/// Normalize a remote path: one leading `/`, no doubled or trailing separators.
///
/// An empty path is the root.
pub fn normalize_remote(path: &str) -> String {
    let collapsed = collapse_separators(&format!("/{}", path.trim()));
    if collapsed.len() > 1 {
        collapsed.trim_end_matches('/').to_string()
    } else {
        collapsed
    }
}

/// Join a remote directory and a file name, collapsing doubled separators.
///
/// `join_remote("/docs/", "report.txt")` is `/docs/report.txt`.
pub fn join_remote(dir: &str, name: &str) -> String {
    collapse_separators(&format!("{dir}/{name}"))
}

/// Percent-encode a remote path for use as a header value.
///
/// Separators stay literal so the server can read the path back verbatim.
pub fn encode_path_header(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}

/// Every ancestor of `path`, shallowest first, including the path itself.
///
/// `path_prefixes("a//b/c")` is `["/a", "/a/b", "/a/b/c"]`.
pub fn path_prefixes(path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut current = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        current.push('/');
        current.push_str(component);
        prefixes.push(current.clone());
    }
    prefixes
}

/// Split a remote path into its parent directory and final component.
pub fn split_parent(path: &str) -> Result<(String, String)> {
    let normalized = normalize_remote(path);
    match normalized.rsplit_once('/') {
        Some((_, name)) if name.is_empty() => Err(Error::InvalidPath(format!(
            "'{path}' has no final component"
        ))),
        Some(("", name)) => Ok(("/".to_string(), name.to_string())),
        Some((parent, name)) => Ok((parent.to_string(), name.to_string())),
        None => Err(Error::InvalidPath(path.to_string())),
    }
}

/// File name of a local path as UTF-8.
pub fn base_name(local: &Path) -> Result<String> {
    local
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidPath(format!("no file name in {}", local.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_remote() {
        assert_eq!(normalize_remote(""), "/");
        assert_eq!(normalize_remote("/"), "/");
        assert_eq!(normalize_remote("docs"), "/docs");
        assert_eq!(normalize_remote("//docs///a/"), "/docs/a");
    }

    #[test]
    fn test_join_remote_collapses_separators() {
        assert_eq!(join_remote("/docs/", "report.txt"), "/docs/report.txt");
        assert_eq!(join_remote("/docs", "report.txt"), "/docs/report.txt");
        assert_eq!(join_remote("/", "report.txt"), "/report.txt");
        assert_eq!(join_remote("/a//b//", "c"), "/a/b/c");
    }

    #[test]
    fn test_encode_path_header_keeps_separators() {
        assert_eq!(encode_path_header("/docs/report.txt"), "/docs/report.txt");
        assert_eq!(
            encode_path_header("/my docs/报告 1.txt"),
            "/my%20docs/%E6%8A%A5%E5%91%8A%201.txt"
        );
        assert_eq!(encode_path_header("/a+b/c&d"), "/a%2Bb/c%26d");
    }

    #[test]
    fn test_encode_path_header_decodes_back() {
        let path = "/备份/2024 q1/report #1.txt";
        let encoded = encode_path_header(path);
        assert!(!encoded.contains(' '));
        assert_eq!(urlencoding::decode(&encoded).unwrap(), path);
    }

    #[test]
    fn test_path_prefixes() {
        assert_eq!(path_prefixes("/a/b/c"), vec!["/a", "/a/b", "/a/b/c"]);
        assert_eq!(path_prefixes("a//b/"), vec!["/a", "/a/b"]);
        assert!(path_prefixes("/").is_empty());
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(
            split_parent("/docs/a.txt").unwrap(),
            ("/docs".to_string(), "a.txt".to_string())
        );
        assert_eq!(
            split_parent("top").unwrap(),
            ("/".to_string(), "top".to_string())
        );
        assert!(split_parent("/").is_err());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(
            base_name(Path::new("/tmp/x/report.txt")).unwrap(),
            "report.txt"
        );
        assert!(base_name(Path::new("/")).is_err());
    }
}
