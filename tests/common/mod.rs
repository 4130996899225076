// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

use workflow_runner::core::config::{Workflow, parse_workflow};
use workflow_runner::core::matrix::{JobInstance, MatrixValues};

/// The workflow used by the scenario tests: two systems, two TLS backends,
/// documentation changes ignored and any tag accepted.
pub const CI_WORKFLOW: &str = r#"
name = "ci"

[on.push]
tags = ["**"]
paths_ignore = ["*.md"]

[on.pull_request]
paths_ignore = ["*.md"]

[job]
name = "build"
runs_on = "${{ matrix.os }}"

[[job.matrix.axis]]
name = "os"
values = ["ubuntu-latest", "windows-latest"]

[[job.matrix.axis]]
name = "features"
values = ["rust-tls", "native-tls"]

[[job.steps]]
uses = "checkout"

[[job.steps]]
uses = "toolchain"
with = { toolchain = "stable" }

[[job.steps]]
name = "Build"
run = "cargo build --features ${{ matrix.features }}"

[[job.steps]]
name = "Test"
run = "cargo test --features ${{ matrix.features }}"
"#;

pub fn ci_workflow() -> Workflow {
    parse_workflow(CI_WORKFLOW).expect("CI workflow parses")
}

/// Creates a small project tree with a source file and a README.
pub fn setup_test_project() -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let src_path = temp_dir.path().join("src");
    fs::create_dir_all(&src_path).expect("Failed to create src directory");
    fs::write(src_path.join("main.rs"), "fn main() {}\n").expect("Failed to write main.rs");
    fs::write(temp_dir.path().join("README.md"), "# sample\n").expect("Failed to write README");
    temp_dir
}

/// Runs git in `dir` with a throwaway identity and no signing.
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=workflow-runner",
            "-c",
            "user.email=ci@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// Turns `dir` into a git repository with everything in it committed.
pub fn init_git_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", "initial"]);
}

/// Writes `content` as `Workflow.toml` in `dir`.
pub fn write_workflow(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("Workflow.toml");
    fs::write(&path, content).expect("Failed to write workflow file");
    path
}

/// A workflow with no matrix, subscribed to every push, running `steps`.
pub fn single_job_workflow(steps: &str) -> String {
    format!(
        r#"
name = "single"

[on.push]

[job]
name = "check"

{steps}
"#
    )
}

/// An instance with the given axis values.
pub fn instance(index: usize, values: &[(&str, &str)]) -> JobInstance {
    let values = MatrixValues::new(
        values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    JobInstance {
        index,
        name: format!("job ({})", values),
        values,
    }
}
