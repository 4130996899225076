//! # Workflow Configuration Module / 工作流配置模块
//!
//! Defines the TOML workflow file: trigger subscriptions, the job with its
//! matrix, and the ordered steps. `Workflow::validate` rejects every
//! malformation before any job instance is created.
//!
//! 定义 TOML 工作流文件：触发器订阅、带矩阵的作业以及有序的步骤。
//! `Workflow::validate` 会在创建任何作业实例之前拒绝所有格式错误。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::actions::{ActionRegistry, RUN_ACTION};
use crate::core::error::ConfigError;
use crate::core::interpolation;
use crate::core::matrix::MatrixExpander;
use crate::core::trigger::TriggerEvaluator;
use crate::infra::t;

/// The default name of the workflow file.
/// 工作流文件的默认名称。
pub const DEFAULT_WORKFLOW_FILE: &str = "Workflow.toml";

/// The complete workflow, loaded from a TOML file.
/// 从 TOML 文件加载的完整工作流。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Workflow {
    /// Human readable workflow name, shown in reports.
    /// 人类可读的工作流名称，显示在报告中。
    #[serde(default = "default_workflow_name")]
    pub name: String,

    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// Ignored when `--lang` is given on the command line.
    ///
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    /// 当命令行给出 `--lang` 时忽略此项。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Event subscriptions. Without any, every event is rejected.
    /// 事件订阅。若没有任何订阅，所有事件都会被拒绝。
    #[serde(default)]
    pub on: Triggers,

    /// The job to run for every matrix combination.
    /// 为每个矩阵组合运行的作业。
    pub job: JobSpec,
}

fn default_workflow_name() -> String {
    "workflow".to_string()
}

fn default_job_name() -> String {
    "build".to_string()
}

/// Event subscriptions of a workflow.
/// 工作流的事件订阅。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Triggers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestTrigger>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PushTrigger {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths_ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PullRequestTrigger {
    /// Patterns matched against the pull request's base branch.
    /// 与拉取请求的目标分支匹配的模式。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths_ignore: Vec<String>,
}

/// The job definition shared by all matrix instances.
/// 所有矩阵实例共享的作业定义。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobSpec {
    #[serde(default = "default_job_name")]
    pub name: String,

    /// The host label this job needs, usually `${{ matrix.os }}`.
    /// If absent, every host is eligible.
    ///
    /// 此作业需要的主机标签，通常为 `${{ matrix.os }}`。
    /// 若未设置，则所有主机都符合条件。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_on: Option<String>,

    /// An optional timeout in seconds for a whole job instance.
    /// 单个作业实例的可选超时时间（秒）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Environment variables for every step of the job.
    /// 作业每个步骤的环境变量。
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub matrix: MatrixSpec,

    pub steps: Vec<StepSpec>,
}

/// The matrix declaration: ordered axes plus include/exclude adjustments.
/// 矩阵声明：有序的轴以及 include/exclude 调整。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatrixSpec {
    #[serde(default, rename = "axis", skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<BTreeMap<String, String>>,

    /// Cancel the remaining instances once one of them fails.
    /// 一旦某个实例失败，取消其余实例。
    #[serde(default)]
    pub fail_fast: bool,

    /// Upper bound on concurrently running instances.
    /// 同时运行的实例数上限。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AxisSpec {
    pub name: String,
    pub values: Vec<String>,
}

/// A single step: either an action (`uses`) or a command line (`run`).
/// 单个步骤：动作（`uses`）或命令行（`run`）。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StepSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Arguments passed to the action.
    /// 传递给动作的参数。
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub with: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Relative to the job workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl StepSpec {
    /// The registry id this step dispatches to. `run` steps use the
    /// built-in command action.
    pub fn action_id(&self, index: usize) -> Result<&str, ConfigError> {
        match (&self.uses, &self.run) {
            (Some(uses), None) => Ok(uses.as_str()),
            (None, Some(_)) => Ok(RUN_ACTION),
            _ => Err(ConfigError::AmbiguousStep { index }),
        }
    }

    /// The label used in logs and reports.
    pub fn display_name(&self, index: usize) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (&self.uses, &self.run) {
            (Some(uses), _) => uses.clone(),
            (_, Some(run)) => run.clone(),
            _ => format!("step-{}", index + 1),
        }
    }

    fn expression_fields(&self) -> impl Iterator<Item = &str> {
        self.name
            .iter()
            .chain(self.run.iter())
            .chain(self.working_directory.iter())
            .chain(self.with.values())
            .chain(self.env.values())
            .map(String::as_str)
    }
}

impl Workflow {
    /// Checks everything that can be checked before dispatch: step shapes,
    /// action references, the matrix, trigger patterns and expressions.
    pub fn validate(&self, registry: &ActionRegistry) -> Result<(), ConfigError> {
        TriggerEvaluator::new(&self.on)?;
        let expander = MatrixExpander::new(&self.job.matrix)?;
        let axes = expander.axis_names();

        if self.job.matrix.max_parallel == Some(0) {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.job.steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }

        for (index, step) in self.job.steps.iter().enumerate() {
            let action = step.action_id(index)?;
            if !registry.contains(action) {
                return Err(ConfigError::UnknownAction {
                    index,
                    action: action.to_string(),
                });
            }
            for field in step.expression_fields() {
                interpolation::check(field, &axes)?;
            }
        }

        for field in self
            .job
            .runs_on
            .iter()
            .chain(self.job.env.values())
            .map(String::as_str)
        {
            interpolation::check(field, &axes)?;
        }

        Ok(())
    }
}

/// Reads and parses a workflow file.
/// 读取并解析工作流文件。
pub fn load_workflow(path: &Path) -> Result<Workflow> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    parse_workflow(&content)
}

pub fn parse_workflow(content: &str) -> Result<Workflow> {
    toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())
}
