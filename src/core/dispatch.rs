//! # Dispatch Module / 调度模块
//!
//! Runs job instances in parallel with a concurrency bound. Instances share
//! nothing; each result is independent unless `fail_fast` cancels the rest.
//!
//! 在并发上限内并行运行作业实例。实例之间不共享任何状态；
//! 除非 `fail_fast` 取消其余实例，否则每个结果彼此独立。

use futures::{StreamExt, stream};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::execution::JobRunner;
use crate::core::matrix::JobInstance;
use crate::core::models::{FailureReason, JobResult};

#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Maximum number of instances running at once.
    /// 同时运行的实例数上限。
    pub jobs: usize,
    /// Cancel the remaining instances after the first failure.
    /// 第一次失败后取消其余实例。
    pub fail_fast: bool,
}

impl DispatchOptions {
    /// Combines the CLI job count with the matrix `max_parallel` bound.
    pub fn new(jobs: usize, max_parallel: Option<usize>, fail_fast: bool) -> Self {
        let jobs = max_parallel.map_or(jobs, |max| jobs.min(max)).max(1);
        Self { jobs, fail_fast }
    }
}

/// Runs every instance and returns the results ordered by matrix index.
///
/// # Arguments
/// * `runner` - Shared job definition and action registry
/// * `instances` - The instances planned for this host
/// * `options` - Parallelism and fail-fast settings
/// * `stop` - Cancelled on Ctrl-C; cancels every running instance
///
/// 运行所有实例并按矩阵索引顺序返回结果。
pub async fn run_all(
    runner: Arc<JobRunner>,
    instances: Vec<JobInstance>,
    options: DispatchOptions,
    stop: CancellationToken,
) -> Vec<JobResult> {
    let run_token = stop.child_token();

    let mut results: Vec<JobResult> = stream::iter(instances.into_iter().map(|instance| {
        let runner = Arc::clone(&runner);
        let run_token = run_token.clone();
        let fallback = instance.clone();

        async move {
            let job_token = run_token.clone();
            let handle = tokio::spawn(async move { runner.run_job(instance, job_token).await });

            let result = match handle.await {
                Ok(result) => result,
                Err(e) => JobResult::internal_failure(
                    fallback,
                    format!("Critical error during job execution: {}", e),
                ),
            };

            if options.fail_fast
                && result.is_failure()
                && result.reason != Some(FailureReason::Cancelled)
            {
                run_token.cancel();
            }
            result
        }
    }))
    .buffer_unordered(options.jobs)
    .collect()
    .await;

    results.sort_by_key(|r| r.instance.index);
    results
}
