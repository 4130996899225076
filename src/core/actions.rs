//! # Actions Module / 动作模块
//!
//! Steps are dispatched by name through an [`ActionRegistry`]. Each entry
//! implements [`Action`], a single `execute(context, args)` capability.
//! Built-in actions:
//!
//! - `checkout` - copy the project into the job workspace
//! - `toolchain` - install a Rust toolchain with `rustup`
//! - `run` - run a command line (used by `run = "..."` steps)
//!
//! 步骤通过 [`ActionRegistry`] 按名称分派。每个条目实现 [`Action`]，
//! 即单一的 `execute(context, args)` 能力。

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::matrix::MatrixValues;

pub mod checkout;
pub mod run;
pub mod toolchain;

pub use checkout::CheckoutAction;
pub use run::RunAction;
pub use toolchain::ToolchainAction;

/// Registry id of the command action behind `run = "..."` steps.
pub const RUN_ACTION: &str = "run";
/// Argument carrying the command line of a `run` step, placeholders unresolved.
pub const RUN_COMMAND_ARG: &str = "command";

/// Everything an action may read about the step it runs in.
/// 动作可读取的、关于其所在步骤的全部信息。
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    /// Display name of the job instance.
    pub job_name: &'a str,
    /// The instance's matrix values.
    pub matrix: &'a MatrixValues,
    /// The project being built; source of `checkout`.
    pub project_root: &'a Path,
    /// The instance's isolated workspace.
    pub workspace: &'a Path,
    /// Where commands start.
    pub working_dir: PathBuf,
    /// Job env, exports of earlier steps, then step env.
    pub env: BTreeMap<String, String>,
}

/// The outcome of one action invocation.
/// 一次动作调用的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub success: bool,
    pub output: String,
    pub exit_code: Option<i32>,
    /// Environment variables made visible to later steps of the same instance.
    /// 对同一实例后续步骤可见的环境变量。
    pub exports: BTreeMap<String, String>,
}

impl StepOutcome {
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            exit_code: Some(0),
            exports: BTreeMap::new(),
        }
    }

    pub fn failed(output: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            output: output.into(),
            exit_code,
            exports: BTreeMap::new(),
        }
    }

    pub fn with_export(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.exports.insert(key.into(), value.into());
        self
    }
}

/// A named unit of work a step can invoke.
///
/// An `Err` means the action could not be invoked at all (e.g. the program
/// does not exist); the step runner records it as a failed step.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(
        &self,
        ctx: &StepContext<'_>,
        args: &BTreeMap<String, String>,
    ) -> Result<StepOutcome>;
}

/// Maps action ids to implementations.
/// 将动作 id 映射到其实现。
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `checkout`, `toolchain` and `run`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("checkout", CheckoutAction);
        registry.register("toolchain", ToolchainAction);
        registry.register(RUN_ACTION, RunAction);
        registry
    }

    /// Adds or replaces an action.
    pub fn register(&mut self, id: impl Into<String>, action: impl Action + 'static) {
        self.actions.insert(id.into(), Arc::new(action));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.ids())
            .finish()
    }
}
