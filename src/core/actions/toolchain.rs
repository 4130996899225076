use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{Action, StepContext, StepOutcome};
use crate::infra::command;

const DEFAULT_TOOLCHAIN: &str = "stable";

/// Installs a Rust toolchain through `rustup` and selects it for the
/// remaining steps of the instance via `RUSTUP_TOOLCHAIN`.
///
/// Arguments:
/// - `toolchain` - toolchain name (default `stable`)
/// - `components` - comma-separated extra components, e.g. `clippy,rustfmt`
/// - `profile` - rustup profile (default `minimal`)
/// - `install` - `false` only checks that the toolchain is usable
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolchainAction;

impl ToolchainAction {
    /// The `rustup` arguments for the given step arguments.
    pub fn rustup_args(args: &BTreeMap<String, String>) -> Vec<String> {
        let toolchain = Self::toolchain(args);

        if args.get("install").is_some_and(|v| v == "false") {
            return vec![
                "run".to_string(),
                toolchain.to_string(),
                "rustc".to_string(),
                "--version".to_string(),
            ];
        }

        let profile = args.get("profile").map_or("minimal", String::as_str);
        let mut rustup_args = vec![
            "toolchain".to_string(),
            "install".to_string(),
            toolchain.to_string(),
            "--profile".to_string(),
            profile.to_string(),
        ];
        if let Some(components) = args.get("components") {
            for component in components.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                rustup_args.push("--component".to_string());
                rustup_args.push(component.to_string());
            }
        }
        rustup_args
    }

    fn toolchain(args: &BTreeMap<String, String>) -> &str {
        args.get("toolchain")
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOOLCHAIN)
    }
}

#[async_trait]
impl Action for ToolchainAction {
    async fn execute(
        &self,
        ctx: &StepContext<'_>,
        args: &BTreeMap<String, String>,
    ) -> Result<StepOutcome> {
        let toolchain = Self::toolchain(args).to_string();
        let rustup_args = Self::rustup_args(args);

        let mut cmd = tokio::process::Command::new("rustup");
        cmd.args(&rustup_args)
            .envs(&ctx.env)
            .env_remove("RUSTUP_TOOLCHAIN")
            .current_dir(ctx.workspace)
            .kill_on_drop(true);

        let (status_res, output) = command::spawn_and_capture(cmd).await;
        let status = status_res.context("Failed to run 'rustup'")?;
        let output = format!(
            "$ {}\n{}",
            command::display_command("rustup", &rustup_args),
            output
        );

        if status.success() {
            Ok(StepOutcome::passed(output).with_export("RUSTUP_TOOLCHAIN", toolchain))
        } else {
            Ok(StepOutcome::failed(output, status.code()))
        }
    }
}
