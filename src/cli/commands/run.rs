//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which evaluates the event,
//! expands the matrix and runs every instance planned for this host.
//!
//! 此模块实现了 `run` 命令：评估事件、展开矩阵，
//! 并运行为本主机计划的所有实例。

use anyhow::Result;
use chrono::Local;
use colored::*;
use std::{env, path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use super::{EventArgs, HostArgs, WorkflowArgs, prepare, print_decision};
use crate::{
    core::{
        actions::ActionRegistry,
        dispatch::{self, DispatchOptions},
        execution::JobRunner,
        planner,
    },
    infra::t,
    reporting::{
        RunSummary, generate_html_report, print_failure_details, print_summary, write_json_report,
    },
};

/// Options that only `run` has.
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    /// Number of instances to run at once. Defaults to half the CPUs plus one.
    pub jobs: Option<usize>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

/// Executes the run command with the provided arguments.
///
/// A rejected event is not an error: nothing runs and the command succeeds.
///
/// # Returns
/// An error if the workflow is invalid or any instance failed.
pub async fn execute(
    workflow_args: WorkflowArgs,
    event_args: EventArgs,
    host_args: HostArgs,
    report_args: ReportArgs,
) -> Result<()> {
    let registry = ActionRegistry::with_builtins();
    let prepared = prepare(&workflow_args, &event_args, &registry).await?;

    println!(
        "{}",
        t!("cli.project_root", path = prepared.project_root.display())
    );
    print_decision(&prepared);

    if !prepared.should_run() {
        println!("{}", t!("run.nothing_to_do").dimmed());
        return Ok(());
    }

    let plan = planner::plan_execution(
        prepared.instances,
        &prepared.workflow.job,
        &host_args.host_labels(),
        host_args.total_runners,
        host_args.runner_index,
    )?;

    println!(
        "{}",
        t!("run.matrix_expanded", count = plan.total, os = env::consts::OS).cyan()
    );
    for (instance, label) in &plan.not_scheduled {
        println!(
            "{}",
            t!("run.instance_not_scheduled", name = &instance.name, label = label).yellow()
        );
    }

    if let (true, Some(total), Some(index)) =
        (plan.is_distributed, host_args.total_runners, host_args.runner_index)
    {
        println!(
            "{}",
            t!(
                "run.split_runner",
                index = index + 1,
                total = total,
                count = plan.instances.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("run.single_runner").bold());
    }

    if plan.instances.is_empty() {
        println!("{}", t!("run.no_instances").green());
        return Ok(());
    }

    let stop_token = setup_signal_handler();

    let workflow = prepared.workflow;
    let options = DispatchOptions::new(
        report_args.jobs.unwrap_or(num_cpus::get() / 2 + 1),
        workflow.job.matrix.max_parallel,
        workflow.job.matrix.fail_fast,
    );
    let runner = Arc::new(JobRunner::new(
        prepared.project_root,
        workflow.job.clone(),
        registry,
    ));

    let started_at = Local::now();
    let results = dispatch::run_all(runner, plan.instances, options, stop_token).await;
    let finished_at = Local::now();

    let summary = RunSummary {
        workflow: &workflow.name,
        results: &results,
        not_scheduled: plan.not_scheduled.len(),
        started_at,
        finished_at,
    };

    print_summary(&summary);

    if let Some(report_path) = &report_args.html {
        println!("\n{}", t!("run.html_report", path = report_path.display()));
        if let Err(e) = generate_html_report(&summary, report_path) {
            eprintln!("{} {:#}", t!("run.report_failed").red(), e);
        }
    }

    if let Some(report_path) = &report_args.json {
        println!("{}", t!("run.json_report", path = report_path.display()));
        if let Err(e) = write_json_report(&summary, report_path) {
            eprintln!("{} {:#}", t!("run.report_failed").red(), e);
        }
    }

    if summary.status().is_success() {
        println!("\n{}", t!("run.all_passed").green().bold());
        Ok(())
    } else {
        print_failure_details(&summary.failures());
        anyhow::bail!(t!("run.run_failed", failed = summary.failed()).to_string());
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
