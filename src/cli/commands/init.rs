//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which creates a new workflow
//! file. With `--non-interactive` the default template is written as is;
//! otherwise a short wizard asks for the matrix axes and the steps.
//!
//! 此模块实现了 `init` 命令，用于创建新的工作流文件。
//! 使用 `--non-interactive` 时直接写入默认模板；
//! 否则一个简短的向导会询问矩阵轴和步骤。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, MultiSelect, theme::ColorfulTheme};
use std::collections::BTreeMap;
use std::{fs, path::Path, path::PathBuf};

use crate::core::config::{
    AxisSpec, JobSpec, MatrixSpec, PullRequestTrigger, PushTrigger, StepSpec, Triggers, Workflow,
};
use crate::infra::t;

/// The default workflow: build and test on two systems with two TLS backends.
/// 默认工作流：在两个系统上使用两种 TLS 后端进行构建和测试。
pub const DEFAULT_WORKFLOW: &str = r#"# Workflow definition / 工作流定义
name = "ci"

# Run on tag pushes and pull requests, but not for documentation-only changes.
# 在推送标签和拉取请求时运行，但仅修改文档时不运行。
[on.push]
tags = ["**"]
paths_ignore = ["*.md"]

[on.pull_request]
paths_ignore = ["*.md"]

[job]
name = "build"
runs_on = "${{ matrix.os }}"
# Optional timeout in seconds / 可选的超时时间（秒）
# timeout_secs = 1800

[job.env]
CARGO_TERM_COLOR = "always"

[job.matrix]
fail_fast = false

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

/// Executes the init command with the provided arguments.
///
/// # Arguments
/// * `output` - Path for the new workflow file
/// * `force` - Whether to overwrite an existing file without asking
/// * `non_interactive` - Write the default template without prompting
/// * `language` - Stored in the generated workflow by the wizard
pub fn execute(output: PathBuf, force: bool, non_interactive: bool, language: &str) -> Result<()> {
    if non_interactive {
        if output.exists() && !force {
            println!("{}", t!("init.file_exists", path = output.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
        write_workflow(&output, DEFAULT_WORKFLOW)?;
    } else {
        let theme = ColorfulTheme::default();
        println!("\n{}", t!("init.wizard_welcome").bold().cyan());
        println!("{}\n", t!("init.wizard_description"));

        if output.exists() && !force && !confirm_overwrite(&theme, &output)? {
            println!("{}", t!("init.aborted").yellow());
            return Ok(());
        }

        let workflow = prompt_for_workflow(&theme, language)?;
        let content = toml::to_string_pretty(&workflow)
            .context(t!("init.serialize_failed").to_string())?;
        write_workflow(&output, &content)?;
    }

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = output.display()).bold()
    );
    println!("{}", t!("init.next_steps"));
    Ok(())
}

fn write_workflow(output: &Path, content: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(output, content)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())
}

fn confirm_overwrite(theme: &ColorfulTheme, output: &Path) -> Result<bool> {
    Confirm::with_theme(theme)
        .with_prompt(t!("init.overwrite_prompt", path = output.display()).to_string())
        .default(false)
        .interact()
        .context(t!("init.confirmation_failed").to_string())
}

/// Splits a comma-separated answer into trimmed, non-empty values.
pub fn split_values(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_for_workflow(theme: &ColorfulTheme, language: &str) -> Result<Workflow> {
    let name: String = Input::with_theme(theme)
        .with_prompt(t!("init.name_prompt").to_string())
        .default("ci".into())
        .interact_text()?;

    let os_values: String = Input::with_theme(theme)
        .with_prompt(t!("init.os_prompt").to_string())
        .default("ubuntu-latest, windows-latest".into())
        .interact_text()?;

    let feature_values: String = Input::with_theme(theme)
        .with_prompt(t!("init.features_prompt").to_string())
        .default("rust-tls, native-tls".into())
        .allow_empty(true)
        .interact_text()?;

    let mut axes = vec![AxisSpec {
        name: "os".to_string(),
        values: split_values(&os_values),
    }];
    let features = split_values(&feature_values);
    let has_features = !features.is_empty();
    if has_features {
        axes.push(AxisSpec {
            name: "features".to_string(),
            values: features,
        });
    }

    let step_templates = vec![
        t!("init.step_build").to_string(),
        t!("init.step_test").to_string(),
        t!("init.step_clippy").to_string(),
    ];
    let selections = MultiSelect::with_theme(theme)
        .with_prompt(t!("init.steps_prompt").to_string())
        .items(&step_templates)
        .defaults(&[true, true, false])
        .interact()?;

    let feature_args = if has_features {
        " --features ${{ matrix.features }}"
    } else {
        ""
    };

    let mut steps = vec![
        StepSpec {
            uses: Some("checkout".to_string()),
            ..StepSpec::default()
        },
        StepSpec {
            uses: Some("toolchain".to_string()),
            with: BTreeMap::from([("toolchain".to_string(), "stable".to_string())]),
            ..StepSpec::default()
        },
    ];
    for (index, (label, command)) in [("Build", "cargo build"), ("Test", "cargo test"), ("Clippy", "cargo clippy")]
        .into_iter()
        .enumerate()
    {
        if selections.contains(&index) {
            steps.push(StepSpec {
                name: Some(label.to_string()),
                run: Some(format!("{}{}", command, feature_args)),
                ..StepSpec::default()
            });
        }
    }

    if selections.is_empty() {
        println!("{}", t!("init.no_steps_selected").yellow());
    }

    let ignore_docs = vec!["*.md".to_string()];
    Ok(Workflow {
        name,
        language: Some(language.to_string()),
        on: Triggers {
            push: Some(PushTrigger {
                tags: vec!["**".to_string()],
                paths_ignore: ignore_docs.clone(),
                ..PushTrigger::default()
            }),
            pull_request: Some(PullRequestTrigger {
                paths_ignore: ignore_docs,
                ..PullRequestTrigger::default()
            }),
        },
        job: JobSpec {
            name: "build".to_string(),
            runs_on: Some("${{ matrix.os }}".to_string()),
            timeout_secs: None,
            env: BTreeMap::new(),
            matrix: MatrixSpec {
                axes,
                ..MatrixSpec::default()
            },
            steps,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::ActionRegistry;
    use crate::core::config::parse_workflow;

    #[test]
    fn default_template_is_valid() {
        let workflow = parse_workflow(DEFAULT_WORKFLOW).unwrap();
        workflow.validate(&ActionRegistry::with_builtins()).unwrap();
        assert_eq!(workflow.job.matrix.axes.len(), 2);
        assert_eq!(workflow.job.steps.len(), 4);
    }

    #[test]
    fn split_values_drops_blanks() {
        assert_eq!(split_values(" a, ,b ,"), vec!["a", "b"]);
        assert!(split_values("").is_empty());
    }
}
