//! Fork-notice banner for the upstream README
//!
//! The banner links to both the fork project (the code that builds the
//! published package) and the original upstream project, and is prepended
//! exactly once.

use crate::core::config::ForkConfig;
use crate::core::error::RepublishError;
use std::path::Path;

/// Build the fork-notice banner for the given configuration
pub fn fork_notice(config: &ForkConfig) -> String {
    let fork_label = project_label(&config.fork.project_url);
    let upstream_label = project_label(&config.upstream.project_url);

    format!(
        "> This is a fork of {upstream_label}. See [{fork_label}]({fork_url}) for the code \
         that builds this package, or [{upstream_label}]({upstream_url}) for the original \
         source.",
        fork_url = config.fork.project_url,
        upstream_url = config.upstream.project_url,
    )
}

/// Prepend the fork notice to the README content.
///
/// Idempotent: content already carrying the notice is returned unchanged.
pub fn apply_fork_notice(readme: &str, config: &ForkConfig) -> String {
    let notice = fork_notice(config);

    if readme.starts_with(&notice) {
        return readme.to_string();
    }

    format!("{notice}\n\n{readme}")
}

/// Read the README, prepend the notice, and persist it
pub async fn prepend_fork_notice<P: AsRef<Path>>(
    path: P,
    config: &ForkConfig,
) -> Result<(), RepublishError> {
    let path = path.as_ref();

    let readme =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepublishError::ReadmeUpdateFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

    let patched = apply_fork_notice(&readme, config);

    tokio::fs::write(path, patched)
        .await
        .map_err(|e| RepublishError::ReadmeUpdateFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Short "owner/repo" label derived from a project URL
fn project_label(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segments: Vec<&str> = trimmed
        .rsplit('/')
        .take(2)
        .collect();

    match segments.as_slice() {
        [repo, owner] => format!("{owner}/{repo}"),
        _ => trimmed.to_string(),
    }
}
