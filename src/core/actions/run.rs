use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{Action, RUN_COMMAND_ARG, StepContext, StepOutcome};
use crate::core::interpolation::Scope;
use crate::infra::{command, t};

/// Runs a command line in the step's working directory.
///
/// The line as written is shell-expanded (`$VAR`, `${VAR}`, a leading `~`)
/// against the step environment, then its `${{ ... }}` placeholders are
/// resolved, then it is split with POSIX quoting rules. Matrix and env values
/// are inserted after expansion, so they reach the command literally. No
/// shell is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunAction;

impl RunAction {
    /// Expands, resolves and splits a command line into program and arguments.
    pub fn parse_command_line(line: &str, scope: &Scope<'_>) -> Result<(String, Vec<String>)> {
        let expanded = shellexpand::env_with_context_no_errors(line, |var: &str| {
            // `${{ ... }}` placeholders are left for `Scope`.
            if var.starts_with('{') {
                return None;
            }
            scope
                .env
                .get(var)
                .cloned()
                .or_else(|| std::env::var(var).ok())
        });
        let expanded = shellexpand::tilde(&*expanded);
        let resolved = scope.interpolate(&expanded)?;

        let mut parts = shlex::split(&resolved)
            .ok_or_else(|| anyhow!("Failed to parse command: {}", resolved))?;
        if parts.is_empty() {
            return Err(anyhow!("Empty command after parsing."));
        }
        let program = parts.remove(0);
        Ok((program, parts))
    }
}

#[async_trait]
impl Action for RunAction {
    async fn execute(
        &self,
        ctx: &StepContext<'_>,
        args: &BTreeMap<String, String>,
    ) -> Result<StepOutcome> {
        let line = args
            .get(RUN_COMMAND_ARG)
            .ok_or_else(|| anyhow!("`run` step without a command"))?;
        let scope = Scope::new(ctx.matrix, &ctx.env);
        let (program, program_args) = Self::parse_command_line(line, &scope)?;

        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&program_args)
            .envs(&ctx.env)
            .current_dir(&ctx.working_dir)
            .kill_on_drop(true);

        let (status_res, output) = command::spawn_and_capture(cmd).await;
        let rendered = command::display_command(&program, &program_args);
        let status = status_res.with_context(|| format!("Failed to run '{}'", rendered))?;

        let output = format!(
            "{} {}\n{}",
            t!("run.command_prefix"),
            rendered,
            output
        );

        if status.success() {
            Ok(StepOutcome::passed(output))
        } else {
            Ok(StepOutcome::failed(output, status.code()))
        }
    }
}
