//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations,
//! such as creating isolated job workspaces and checking out the project.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如创建隔离的作业工作区和检出项目。

use anyhow::{Context, Result};
use fs_extra::dir::CopyOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Entries never copied into a workspace.
const CHECKOUT_EXCLUDES: &[&str] = &["target", ".git"];

/// Creates a unique, temporary workspace for a job instance.
/// The directory is deleted when the returned `TempDir` is dropped.
///
/// # Arguments
/// * `job_name` - Display name of the job instance, used in the directory prefix
///
/// 为作业实例创建一个唯一的临时工作区。
/// 当返回的 `TempDir` 被丢弃时，该目录会被删除。
pub fn create_workspace(job_name: &str) -> Result<TempDir> {
    let sanitized_name = job_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();

    tempfile::Builder::new()
        .prefix(&format!("workflow_runner_{}_", sanitized_name))
        .tempdir()
        .with_context(|| format!("Failed to create workspace for job '{}'", job_name))
}

/// Copies the project tree into `dest`, skipping build output and VCS metadata.
///
/// # Returns
/// The number of top-level entries copied.
///
/// 将项目树复制到 `dest`，跳过构建输出和版本控制元数据。
pub fn copy_project(project_root: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create checkout directory: {}", dest.display()))?;

    let mut items: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(project_root)
        .with_context(|| format!("Failed to read project directory: {}", project_root.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if CHECKOUT_EXCLUDES.iter().any(|ex| name == *ex) {
            continue;
        }
        // Never copy the destination into itself.
        if dest.starts_with(entry.path()) {
            continue;
        }
        items.push(entry.path());
    }

    if items.is_empty() {
        return Ok(0);
    }

    let mut options = CopyOptions::new();
    options.overwrite = true;
    fs_extra::copy_items(&items, dest, &options).with_context(|| {
        format!(
            "Failed to copy {} into {}",
            project_root.display(),
            dest.display()
        )
    })?;
    Ok(items.len())
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
