//! Queries against the project's git repository.

use anyhow::{Context, Result, bail};
use std::path::Path;

/// Lists the paths changed between `rev` and the working tree.
///
/// Uses `-z` so paths come back verbatim: no C-style quoting of non-ASCII
/// or special characters.
pub async fn changed_paths_since(project_root: &Path, rev: &str) -> Result<Vec<String>> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--name-only", "-z", rev])
        .current_dir(project_root)
        .output()
        .await
        .context("Failed to execute 'git diff'")?;

    if !output.status.success() {
        bail!(
            "'git diff --name-only {}' failed: {}",
            rev,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_name_only(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses NUL-separated `git diff --name-only -z` output.
pub fn parse_name_only(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
