//! # Execution Planner Module / 执行计划模块
//!
//! This module decides which expanded instances run on this host:
//! filtering by the job's `runs_on` label and, in CI, distributing the
//! eligible instances across multiple runners.
//!
//! 此模块决定哪些展开后的实例在本主机上运行：
//! 按作业的 `runs_on` 标签过滤，并在 CI 中将符合条件的实例分配到多个运行器。

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::env;

use crate::core::config::JobSpec;
use crate::core::interpolation::Scope;
use crate::core::matrix::JobInstance;
use crate::infra::t;

/// The `runs_on` labels this machine satisfies.
/// 本机能够满足的 `runs_on` 标签。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostLabels {
    /// Every label is accepted.
    Any,
    Labels(Vec<String>),
}

impl HostLabels {
    /// Labels derived from an operating system name as in `std::env::consts::OS`.
    pub fn for_os(os: &str) -> Self {
        let labels: &[&str] = match os {
            "linux" => &["ubuntu-latest", "linux"],
            "windows" => &["windows-latest", "windows"],
            "macos" => &["macos-latest", "macos"],
            _ => &[],
        };
        let mut labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        if !labels.iter().any(|l| l == os) {
            labels.push(os.to_string());
        }
        HostLabels::Labels(labels)
    }

    /// Labels of the current host.
    pub fn current() -> Self {
        Self::for_os(env::consts::OS)
    }

    pub fn accepts(&self, runs_on: &str) -> bool {
        match self {
            HostLabels::Any => true,
            HostLabels::Labels(labels) => labels.iter().any(|l| l == runs_on),
        }
    }
}

/// Represents a complete execution plan for an expanded matrix.
/// 表示展开后矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// The instances to run on this host, possibly distributed.
    /// 要在本主机上运行的实例，可能经过分布式分配。
    pub instances: Vec<JobInstance>,
    /// Instances whose `runs_on` label this host does not satisfy, with that label.
    /// `runs_on` 标签不被本主机满足的实例及其标签。
    pub not_scheduled: Vec<(JobInstance, String)>,
    /// The number of instances the matrix expanded to.
    /// 矩阵展开后的实例总数。
    pub total: usize,
    /// Whether the instances are distributed across multiple runners (CI environment).
    /// 实例是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
}

/// Creates an execution plan for the expanded instances.
///
/// # Arguments
/// * `instances` - The full matrix expansion, in matrix order
/// * `job` - The job definition, for its `runs_on` expression
/// * `host` - Labels this host satisfies
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    instances: Vec<JobInstance>,
    job: &JobSpec,
    host: &HostLabels,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let total = instances.len();
    let empty_env = BTreeMap::new();

    let mut eligible = Vec::new();
    let mut not_scheduled = Vec::new();
    for instance in instances {
        match &job.runs_on {
            Some(expr) => {
                let label = Scope::new(&instance.values, &empty_env).interpolate(expr)?;
                if host.accepts(&label) {
                    eligible.push(instance);
                } else {
                    not_scheduled.push((instance, label));
                }
            }
            None => eligible.push(instance),
        }
    }

    let (instances, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!(t!("planner.invalid_runner_index").to_string());
            }
            let distributed = eligible
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, instance)| instance)
                .collect();
            (distributed, true)
        }
        (None, None) => (eligible, false),
        _ => bail!(t!("planner.runner_args_incomplete").to_string()),
    };

    Ok(ExecutionPlan {
        instances,
        not_scheduled,
        total,
        is_distributed,
    })
}
