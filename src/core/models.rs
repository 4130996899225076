//! # Data Models Module / 数据模型模块
//!
//! This module defines the result types produced by the step runner:
//! the per-instance state machine, step records, job results and the
//! aggregate run status.
//!
//! 此模块定义了步骤运行器产生的结果类型：
//! 每个实例的状态机、步骤记录、作业结果以及汇总的运行状态。

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::core::matrix::JobInstance;
use crate::infra::t;

/// The lifecycle of a job instance: pending → running → passed | failed.
/// 作业实例的生命周期：pending → running → passed | failed。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid job state transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl JobStatus {
    /// Pending instances may also fail directly, when cancelled before they start.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Passed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn transition(self, next: JobStatus) -> Result<JobStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Passed | JobStatus::Failed)
    }
}

/// Enumerates the possible reasons for a job instance failure.
/// 枚举作业实例失败的可能原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// A step returned a non-success status or could not be invoked.
    /// 某个步骤返回了非成功状态或无法被调用。
    StepFailed,
    /// The instance exceeded its configured timeout.
    /// 实例超出了其配置的超时时间。
    Timeout,
    /// The run was interrupted, or another instance failed under `fail_fast`.
    /// 运行被中断，或在 `fail_fast` 下另一个实例失败。
    Cancelled,
    /// The runner itself failed (workspace setup, task panic).
    /// 运行器自身失败（工作区创建、任务崩溃）。
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    NotRun,
}

/// The outcome of one step of one instance.
/// 单个实例中一个步骤的结果。
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    /// Captured stdout and stderr.
    /// 捕获的 stdout 和 stderr。
    pub output: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl StepRecord {
    pub fn not_run(name: String) -> Self {
        Self {
            name,
            status: StepStatus::NotRun,
            output: String::new(),
            exit_code: None,
            duration: Duration::ZERO,
        }
    }
}

/// The final result of one job instance.
/// 单个作业实例的最终结果。
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub instance: JobInstance,
    pub status: JobStatus,
    pub reason: Option<FailureReason>,
    pub steps: Vec<StepRecord>,
    pub duration: Duration,
    /// Runner-side error text, when `reason` is `Internal`.
    /// 当 `reason` 为 `Internal` 时的运行器错误信息。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    /// A failure that happened outside of any step.
    pub fn internal_failure(instance: JobInstance, error: String) -> Self {
        Self {
            instance,
            status: JobStatus::Failed,
            reason: Some(FailureReason::Internal),
            steps: Vec::new(),
            duration: Duration::ZERO,
            error: Some(error),
        }
    }

    pub fn name(&self) -> &str {
        &self.instance.name
    }

    pub fn is_failure(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// The step that failed, if any.
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn steps_run(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::NotRun)
            .count()
    }

    /// Gets the status of the job as a localized string for display.
    /// 以本地化字符串形式获取作业状态以供显示。
    pub fn status_str(&self) -> String {
        match (self.status, self.reason) {
            (JobStatus::Passed, _) => t!("report.status_passed").to_string(),
            (JobStatus::Failed, Some(FailureReason::Timeout)) => {
                t!("report.status_timeout").to_string()
            }
            (JobStatus::Failed, Some(FailureReason::Cancelled)) => {
                t!("report.status_cancelled").to_string()
            }
            (JobStatus::Failed, _) => t!("report.status_failed").to_string(),
            (JobStatus::Pending, _) | (JobStatus::Running, _) => {
                t!("report.status_incomplete").to_string()
            }
        }
    }

    /// Gets the appropriate CSS class for the job status.
    pub fn status_class(&self) -> &'static str {
        match (self.status, self.reason) {
            (JobStatus::Passed, _) => "status-passed",
            (JobStatus::Failed, Some(FailureReason::Timeout)) => "status-timeout",
            (JobStatus::Failed, Some(FailureReason::Cancelled)) => "status-cancelled",
            _ => "status-failed",
        }
    }
}

/// The aggregate status of a whole run.
/// 整个运行的汇总状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    /// Failure if any instance did not pass.
    pub fn aggregate(results: &[JobResult]) -> Self {
        if results.iter().all(|r| r.status == JobStatus::Passed) {
            RunStatus::Success
        } else {
            RunStatus::Failure
        }
    }

    pub fn is_success(self) -> bool {
        self == RunStatus::Success
    }
}
