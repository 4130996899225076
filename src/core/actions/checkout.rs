use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{Action, StepContext, StepOutcome};
use crate::infra::{fs, t};

/// Copies the project into the job workspace.
///
/// Arguments:
/// - `path` - subdirectory of the workspace to check out into (default: the workspace root)
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutAction;

#[async_trait]
impl Action for CheckoutAction {
    async fn execute(
        &self,
        ctx: &StepContext<'_>,
        args: &BTreeMap<String, String>,
    ) -> Result<StepOutcome> {
        let dest = match args.get("path") {
            Some(sub) => ctx.workspace.join(sub),
            None => ctx.workspace.to_path_buf(),
        };
        let source = ctx.project_root.to_path_buf();
        let dest_for_copy = dest.clone();

        let copied = tokio::task::spawn_blocking(move || fs::copy_project(&source, &dest_for_copy))
            .await
            .context("Checkout task panicked")??;

        Ok(StepOutcome::passed(
            t!(
                "actions.checkout_done",
                count = copied,
                from = ctx.project_root.display(),
                to = dest.display()
            )
            .to_string(),
        ))
    }
}
