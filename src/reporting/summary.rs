use chrono::{DateTime, Local};

use crate::core::models::{JobResult, JobStatus, RunStatus};

/// Everything a report needs about a finished run.
/// 报告所需的、关于一次已完成运行的全部信息。
#[derive(Debug, Clone, Copy)]
pub struct RunSummary<'a> {
    pub workflow: &'a str,
    pub results: &'a [JobResult],
    /// Instances this host could not run.
    /// 本主机无法运行的实例数。
    pub not_scheduled: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl<'a> RunSummary<'a> {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == JobStatus::Passed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::aggregate(self.results)
    }

    pub fn failures(&self) -> Vec<&'a JobResult> {
        self.results.iter().filter(|r| r.is_failure()).collect()
    }
}
