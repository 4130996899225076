//! # Plan Command Module / 计划命令模块
//!
//! Shows what `run` would do without running anything: the trigger decision,
//! every expanded instance with its resolved steps, and whether this host
//! would run it.
//!
//! 在不执行任何操作的情况下显示 `run` 将做什么：触发器决定、
//! 每个展开实例及其解析后的步骤，以及本主机是否会运行它。

use anyhow::Result;
use colored::*;
use std::collections::HashSet;

use super::{EventArgs, HostArgs, WorkflowArgs, prepare, print_decision};
use crate::core::{
    actions::ActionRegistry, config::JobSpec, interpolation::Scope, matrix::JobInstance, planner,
};
use crate::infra::t;

/// Executes the plan command with the provided arguments.
pub async fn execute(
    workflow_args: WorkflowArgs,
    event_args: EventArgs,
    host_args: HostArgs,
) -> Result<()> {
    let registry = ActionRegistry::with_builtins();
    let prepared = prepare(&workflow_args, &event_args, &registry).await?;

    print_decision(&prepared);
    if !prepared.should_run() {
        return Ok(());
    }

    let job = &prepared.workflow.job;
    let plan = planner::plan_execution(
        prepared.instances.clone(),
        job,
        &host_args.host_labels(),
        host_args.total_runners,
        host_args.runner_index,
    )?;
    let selected: HashSet<usize> = plan.instances.iter().map(|i| i.index).collect();

    println!(
        "\n{}",
        t!("plan.header", count = plan.total, selected = selected.len()).bold()
    );

    for instance in &prepared.instances {
        let marker = if selected.contains(&instance.index) {
            "✔".green()
        } else {
            "✘".red()
        };
        println!("{} #{} {}", marker, instance.index, instance.name.cyan());

        if let Some((_, label)) = plan
            .not_scheduled
            .iter()
            .find(|(i, _)| i.index == instance.index)
        {
            println!(
                "    {}",
                t!("plan.not_on_this_host", label = label).dimmed()
            );
        }

        for line in describe_steps(job, instance)? {
            println!("    {}", line);
        }
    }

    Ok(())
}

/// One line per step, with the instance's matrix values filled in.
fn describe_steps(job: &JobSpec, instance: &JobInstance) -> Result<Vec<String>> {
    let scope = Scope::new(&instance.values, &job.env);
    job.steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let name = scope.interpolate(&step.display_name(index))?;
            let line = match &step.run {
                Some(command) if step.name.is_some() => {
                    format!("{}. {} ({})", index + 1, name, scope.interpolate(command)?)
                }
                _ => format!("{}. {}", index + 1, name),
            };
            Ok(line)
        })
        .collect()
}
