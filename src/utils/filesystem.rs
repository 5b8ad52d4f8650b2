use glob::glob;
use tracing::{debug, warn};

/// Expand a glob into lexicographically sorted, de-duplicated paths.
///
/// An invalid pattern or an unreadable entry is logged and skipped rather than
/// reported, so a bad glob simply resolves to no files.
pub fn expand_glob(pattern: &str) -> Vec<String> {
    let entries = match glob(pattern) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(pattern, error = %e, "invalid glob pattern; resolving to no files");
            return Vec::new();
        }
    };

    let mut paths: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                warn!(pattern, error = %e, "skipping unreadable glob entry");
                None
            }
        })
        .collect();

    paths.sort();
    paths.dedup();

    debug!(pattern, matches = paths.len(), "expanded glob");
    paths
}
