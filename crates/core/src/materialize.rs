//! Directory materialization
//!
//! Creates every ancestor of a remote path, shallowest first. Directories
//! that already exist are skipped, either because a one-item listing of
//! them succeeds or because the server answers the mkdir with an
//! "already exists" error. The walk is not atomic: when a deeper component
//! fails, the shallower ones it already created stay in place.

use crate::error::{Error, Result};
use crate::path::{normalize_remote, path_prefixes};
use crate::traits::{FileStore, ListOptions};

/// Create `path` and all of its missing ancestors.
pub async fn mkdirs<S>(store: &S, path: &str) -> Result<()>
where
    S: FileStore + ?Sized,
{
    let path = normalize_remote(path);

    for prefix in path_prefixes(&path) {
        if store.list(&prefix, ListOptions::probe()).await.is_ok() {
            tracing::trace!(path = %prefix, "Directory exists");
            continue;
        }

        match store.mkdir(&prefix).await {
            Ok(()) => tracing::debug!(path = %prefix, "Created directory"),
            Err(e) if e.is_already_exists() => {
                tracing::debug!(path = %prefix, error = %e, "Directory already exists");
            }
            Err(e) => {
                return Err(Error::CreateDir {
                    path: prefix,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(())
}
