//! # Step Runner Module / 步骤运行器模块
//!
//! Runs the ordered steps of one job instance in its own workspace.
//! Steps run strictly in sequence; the first failure marks the instance
//! failed and the remaining steps are recorded as not run. Cancellation
//! and the optional job timeout abort the current step (its child process
//! is killed on drop); completed steps are not undone.
//!
//! 在独立工作区中运行单个作业实例的有序步骤。
//! 步骤严格按顺序执行；第一次失败会将实例标记为失败，
//! 其余步骤记录为未运行。取消和可选的作业超时会中止当前步骤
//! （其子进程在丢弃时被终止）；已完成的步骤不会被撤销。

use anyhow::{Result, anyhow};
use colored::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::actions::{
    Action, ActionRegistry, RUN_COMMAND_ARG, StepContext, StepOutcome,
};
use crate::core::config::{JobSpec, StepSpec};
use crate::core::interpolation::Scope;
use crate::core::matrix::JobInstance;
use crate::core::models::{FailureReason, JobResult, JobStatus, StepRecord, StepStatus};
use crate::infra::{fs, t};

/// How a single step ended.
enum StepRun {
    Finished(StepOutcome),
    TimedOut,
    Cancelled,
}

/// Shared, read-only state for running the instances of one job.
/// 运行同一作业各实例时共享的只读状态。
#[derive(Debug)]
pub struct JobRunner {
    pub project_root: PathBuf,
    pub job: JobSpec,
    pub registry: ActionRegistry,
}

fn advance(status: &mut JobStatus, next: JobStatus) {
    debug_assert!(
        status.can_transition_to(next),
        "invalid transition {:?} -> {:?}",
        status,
        next
    );
    *status = next;
}

impl JobRunner {
    pub fn new(project_root: PathBuf, job: JobSpec, registry: ActionRegistry) -> Self {
        Self {
            project_root,
            job,
            registry,
        }
    }

    /// The main entry point for running a single job instance.
    ///
    /// # Arguments
    /// * `instance` - The matrix combination to run
    /// * `cancel` - Cancels the instance at its current step
    ///
    /// # Returns
    /// A `JobResult` in a terminal state.
    pub async fn run_job(&self, instance: JobInstance, cancel: CancellationToken) -> JobResult {
        let start = Instant::now();
        let mut status = JobStatus::Pending;

        if cancel.is_cancelled() {
            advance(&mut status, JobStatus::Failed);
            let steps = self.step_names(&instance).into_iter().map(StepRecord::not_run).collect();
            return JobResult {
                instance,
                status,
                reason: Some(FailureReason::Cancelled),
                steps,
                duration: Duration::ZERO,
                error: None,
            };
        }

        let workspace = match fs::create_workspace(&instance.name) {
            Ok(workspace) => workspace,
            Err(e) => return JobResult::internal_failure(instance, format!("{:#}", e)),
        };

        let base_env = match self.job_env(&instance) {
            Ok(env) => env,
            Err(e) => return JobResult::internal_failure(instance, format!("{:#}", e)),
        };

        advance(&mut status, JobStatus::Running);
        println!("{}", t!("run.job_started", name = &instance.name).blue());

        let deadline = self
            .job
            .timeout_secs
            .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

        let mut env = base_env;
        let mut records = Vec::with_capacity(self.job.steps.len());
        let mut reason: Option<FailureReason> = None;

        for (index, (step, name)) in self
            .job
            .steps
            .iter()
            .zip(self.step_names(&instance))
            .enumerate()
        {
            if reason.is_some() {
                records.push(StepRecord::not_run(name));
                continue;
            }

            let step_start = Instant::now();
            let run = self
                .run_step(step, &instance, workspace.path(), &env, deadline, &cancel)
                .await;
            let duration = step_start.elapsed();

            let record = match run {
                StepRun::Finished(outcome) => {
                    if outcome.success {
                        env.extend(outcome.exports);
                    } else {
                        reason = Some(FailureReason::StepFailed);
                    }
                    StepRecord {
                        name,
                        status: if outcome.success {
                            StepStatus::Passed
                        } else {
                            StepStatus::Failed
                        },
                        output: outcome.output,
                        exit_code: outcome.exit_code,
                        duration,
                    }
                }
                StepRun::TimedOut => {
                    reason = Some(FailureReason::Timeout);
                    StepRecord {
                        name,
                        status: StepStatus::Failed,
                        output: t!(
                            "run.job_timeout_message",
                            timeout = self.job.timeout_secs.unwrap_or_default()
                        )
                        .to_string(),
                        exit_code: None,
                        duration,
                    }
                }
                StepRun::Cancelled => {
                    reason = Some(FailureReason::Cancelled);
                    StepRecord {
                        name,
                        status: StepStatus::Failed,
                        output: t!("run.step_cancelled_message").to_string(),
                        exit_code: None,
                        duration,
                    }
                }
            };

            print_step_line(&instance.name, index, &record);
            records.push(record);
        }

        let duration = start.elapsed();
        match reason {
            None => {
                advance(&mut status, JobStatus::Passed);
                println!(
                    "{}",
                    t!(
                        "run.job_passed",
                        name = &instance.name,
                        duration = format!("{:.2}", duration.as_secs_f64())
                    )
                    .green()
                );
            }
            Some(reason) => {
                advance(&mut status, JobStatus::Failed);
                let message = match reason {
                    FailureReason::Timeout => t!(
                        "run.job_timed_out",
                        name = &instance.name,
                        timeout = self.job.timeout_secs.unwrap_or_default()
                    ),
                    FailureReason::Cancelled => t!("run.job_cancelled", name = &instance.name),
                    _ => t!(
                        "run.job_failed",
                        name = &instance.name,
                        duration = format!("{:.2}", duration.as_secs_f64())
                    ),
                };
                println!("{}", message.red());
            }
        }

        JobResult {
            instance,
            status,
            reason,
            steps: records,
            duration,
            error: None,
        }
    }

    /// Display names of the steps, with expressions resolved where possible.
    fn step_names(&self, instance: &JobInstance) -> Vec<String> {
        let env = BTreeMap::new();
        let scope = Scope::new(&instance.values, &env);
        self.job
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let raw = step.display_name(index);
                scope.interpolate(&raw).unwrap_or(raw)
            })
            .collect()
    }

    /// The job-level environment with expressions resolved for this instance.
    fn job_env(&self, instance: &JobInstance) -> Result<BTreeMap<String, String>> {
        let empty = BTreeMap::new();
        let scope = Scope::new(&instance.values, &empty);
        self.job
            .env
            .iter()
            .map(|(key, value)| Ok((key.clone(), scope.interpolate(value)?)))
            .collect()
    }

    async fn run_step(
        &self,
        step: &StepSpec,
        instance: &JobInstance,
        workspace: &Path,
        env: &BTreeMap<String, String>,
        deadline: Option<tokio::time::Instant>,
        cancel: &CancellationToken,
    ) -> StepRun {
        let (action, args, ctx) = match self.prepare_step(step, instance, workspace, env) {
            Ok(prepared) => prepared,
            Err(e) => return StepRun::Finished(StepOutcome::failed(format!("{:#}", e), None)),
        };

        let execution = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, action.execute(&ctx, &args))
                    .await
                    .ok(),
                None => Some(action.execute(&ctx, &args).await),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => StepRun::Cancelled,
            result = execution => match result {
                None => StepRun::TimedOut,
                Some(Ok(outcome)) => StepRun::Finished(outcome),
                Some(Err(e)) => StepRun::Finished(StepOutcome::failed(format!("{:#}", e), None)),
            },
        }
    }

    /// Resolves the action, its interpolated arguments and the step context.
    /// A `run` line is passed through as written; the run action resolves it.
    fn prepare_step<'a>(
        &'a self,
        step: &StepSpec,
        instance: &'a JobInstance,
        workspace: &'a Path,
        env: &BTreeMap<String, String>,
    ) -> Result<(Arc<dyn Action>, BTreeMap<String, String>, StepContext<'a>)> {
        let scope = Scope::new(&instance.values, env);

        let action_id = match (&step.uses, &step.run) {
            (Some(uses), None) => uses.as_str(),
            (None, Some(_)) => crate::core::actions::RUN_ACTION,
            _ => return Err(anyhow!("step must set exactly one of `uses` or `run`")),
        };
        let action = self
            .registry
            .get(action_id)
            .ok_or_else(|| anyhow!("unknown action '{}'", action_id))?;

        let mut args = BTreeMap::new();
        for (key, value) in &step.with {
            args.insert(key.clone(), scope.interpolate(value)?);
        }
        if let Some(run) = &step.run {
            args.insert(RUN_COMMAND_ARG.to_string(), run.clone());
        }

        let mut step_env = env.clone();
        for (key, value) in &step.env {
            step_env.insert(key.clone(), scope.interpolate(value)?);
        }

        let working_dir = match &step.working_directory {
            Some(dir) => workspace.join(scope.interpolate(dir)?),
            None => workspace.to_path_buf(),
        };

        let ctx = StepContext {
            job_name: &instance.name,
            matrix: &instance.values,
            project_root: &self.project_root,
            workspace,
            working_dir,
            env: step_env,
        };
        Ok((action, args, ctx))
    }
}

fn print_step_line(job_name: &str, index: usize, record: &StepRecord) {
    let line = t!(
        "run.step_finished",
        job = job_name,
        index = index + 1,
        name = &record.name,
        duration = format!("{:.2}", record.duration.as_secs_f64())
    );
    match record.status {
        StepStatus::Passed => println!("  {} {}", "✔".green(), line),
        StepStatus::Failed => println!("  {} {}", "✘".red(), line.red()),
        StepStatus::NotRun => {}
    }
}
