//! # Commands Module / 命令模块
//!
//! Argument groups shared by the `run` and `plan` commands, and the common
//! preparation both perform: load and validate the workflow, build the event,
//! evaluate the triggers and expand the matrix.
//!
//! `run` 和 `plan` 命令共享的参数组，以及两者共同的准备流程：
//! 加载并验证工作流、构建事件、评估触发器并展开矩阵。

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::core::actions::ActionRegistry;
use crate::core::config::{Workflow, load_workflow};
use crate::core::matrix::{JobInstance, MatrixExpander};
use crate::core::planner::HostLabels;
use crate::core::trigger::{Event, EventKind, GitRef, RejectReason, TriggerDecision, TriggerEvaluator};
use crate::infra::{fs::absolute_path, git, t};

pub mod init;
pub mod plan;
pub mod run;

/// Where the workflow and the project live.
#[derive(Debug, Clone)]
pub struct WorkflowArgs {
    pub config: PathBuf,
    pub project_dir: PathBuf,
    /// `--lang` was given; the workflow's `language` is then ignored.
    pub explicit_lang: bool,
}

/// How to describe the triggering event. Without `kind` or `event_file` the
/// run is manual and the trigger stage is skipped.
#[derive(Debug, Clone, Default)]
pub struct EventArgs {
    pub kind: Option<EventKind>,
    pub changed: Vec<String>,
    pub since: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub event_file: Option<PathBuf>,
}

/// Which instances this host may run.
#[derive(Debug, Clone, Default)]
pub struct HostArgs {
    pub labels: Vec<String>,
    pub any_host: bool,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
}

impl HostArgs {
    pub fn host_labels(&self) -> HostLabels {
        if self.any_host {
            HostLabels::Any
        } else if !self.labels.is_empty() {
            HostLabels::Labels(self.labels.clone())
        } else {
            HostLabels::current()
        }
    }
}

/// The result of the common preparation.
/// 公共准备流程的结果。
#[derive(Debug)]
pub struct Prepared {
    pub workflow: Workflow,
    pub project_root: PathBuf,
    /// `None` for a manual run.
    pub event: Option<Event>,
    /// `None` for a manual run.
    pub decision: Option<TriggerDecision>,
    /// The full matrix expansion, in matrix order.
    pub instances: Vec<JobInstance>,
}

impl Prepared {
    /// A manual run or an accepted event.
    pub fn should_run(&self) -> bool {
        self.decision.is_none_or(TriggerDecision::is_accepted)
    }
}

/// Loads, validates and expands the workflow, and evaluates the event.
///
/// Any configuration error is returned before a single instance exists.
///
/// 加载、验证并展开工作流，然后评估事件。
/// 任何配置错误都会在创建任何实例之前返回。
pub async fn prepare(
    args: &WorkflowArgs,
    event_args: &EventArgs,
    registry: &ActionRegistry,
) -> Result<Prepared> {
    let config_path = absolute_path(&args.config)?;
    let workflow = load_workflow(&config_path)?;

    if !args.explicit_lang {
        if let Some(language) = &workflow.language {
            crate::init_locale(Some(language));
        }
    }

    println!(
        "{}",
        t!("cli.workflow_loaded", name = &workflow.name, path = config_path.display()).cyan()
    );

    workflow
        .validate(registry)
        .with_context(|| t!("cli.workflow_invalid", path = config_path.display()).to_string())?;

    let project_root = absolute_path(&args.project_dir)?;

    let event = build_event(event_args, &project_root).await?;
    let decision = match &event {
        Some(event) => {
            let evaluator = TriggerEvaluator::new(&workflow.on)?;
            Some(evaluator.evaluate(event))
        }
        None => None,
    };

    let instances = MatrixExpander::new(&workflow.job.matrix)?.expand(&workflow.job.name);

    Ok(Prepared {
        workflow,
        project_root,
        event,
        decision,
        instances,
    })
}

/// Builds the event from `--event-file` or from `--event` and its companions.
/// `--since` asks git for the changed paths and adds them to `--changed`.
pub async fn build_event(args: &EventArgs, project_root: &std::path::Path) -> Result<Option<Event>> {
    if let Some(path) = &args.event_file {
        let content = fs::read_to_string(path)
            .with_context(|| t!("cli.event_file_read_failed", path = path.display()).to_string())?;
        return Event::from_json(&content).map(Some);
    }

    let Some(kind) = args.kind else {
        return Ok(None);
    };

    let mut changed_paths = args.changed.clone();
    if let Some(rev) = &args.since {
        for path in git::changed_paths_since(project_root, rev).await? {
            if !changed_paths.contains(&path) {
                changed_paths.push(path);
            }
        }
    }

    let git_ref = match (&args.branch, &args.tag) {
        (_, Some(tag)) => Some(GitRef::Tag(tag.clone())),
        (Some(branch), None) => Some(GitRef::Branch(branch.clone())),
        (None, None) => None,
    };

    Ok(Some(Event::new(kind, changed_paths, git_ref)))
}

/// Localized description of a trigger decision.
pub fn describe_decision(decision: TriggerDecision) -> String {
    match decision {
        TriggerDecision::Accept => t!("trigger.accepted").to_string(),
        TriggerDecision::Reject(reason) => {
            let reason = match reason {
                RejectReason::NotSubscribed => t!("trigger.reason_not_subscribed"),
                RejectReason::RefFiltered => t!("trigger.reason_ref_filtered"),
                RejectReason::NoMatchingPaths => t!("trigger.reason_no_matching_paths"),
                RejectReason::AllPathsIgnored => t!("trigger.reason_all_paths_ignored"),
            };
            t!("trigger.rejected", reason = reason).to_string()
        }
    }
}

/// Prints how the event was judged, or that the run is manual.
pub fn print_decision(prepared: &Prepared) {
    match (&prepared.event, prepared.decision) {
        (Some(event), Some(decision)) => {
            println!(
                "{}",
                t!(
                    "trigger.event",
                    kind = event.kind,
                    count = event.changed_paths.len()
                )
            );
            let line = describe_decision(decision);
            if decision.is_accepted() {
                println!("{}", line.green());
            } else {
                println!("{}", line.yellow());
            }
        }
        _ => println!("{}", t!("trigger.manual_run").dimmed()),
    }
}
