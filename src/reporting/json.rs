//! Machine-readable run report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::{FailureReason, JobStatus, RunStatus, StepStatus};
use crate::core::matrix::MatrixValues;
use crate::reporting::summary::RunSummary;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub workflow: &'a str,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: String,
    pub not_scheduled: usize,
    pub jobs: Vec<JsonJob<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonJob<'a> {
    pub name: &'a str,
    pub index: usize,
    pub matrix: &'a MatrixValues,
    pub status: JobStatus,
    pub reason: Option<FailureReason>,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub steps: Vec<JsonStep<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonStep<'a> {
    pub name: &'a str,
    pub status: StepStatus,
    pub exit_code: Option<i32>,
    pub duration_secs: f64,
    pub output: &'a str,
}

impl<'a> JsonReport<'a> {
    pub fn new(summary: &RunSummary<'a>) -> Self {
        let jobs = summary
            .results
            .iter()
            .map(|r| JsonJob {
                name: r.name(),
                index: r.instance.index,
                matrix: &r.instance.values,
                status: r.status,
                reason: r.reason,
                duration_secs: r.duration.as_secs_f64(),
                error: r.error.as_deref(),
                steps: r
                    .steps
                    .iter()
                    .map(|s| JsonStep {
                        name: &s.name,
                        status: s.status,
                        exit_code: s.exit_code,
                        duration_secs: s.duration.as_secs_f64(),
                        output: &s.output,
                    })
                    .collect(),
            })
            .collect();

        Self {
            workflow: summary.workflow,
            status: summary.status(),
            started_at: summary.started_at.to_rfc3339(),
            finished_at: summary.finished_at.to_rfc3339(),
            not_scheduled: summary.not_scheduled,
            jobs,
        }
    }
}

/// Writes the run as pretty-printed JSON.
pub fn write_json_report(summary: &RunSummary<'_>, output_path: &Path) -> Result<()> {
    let report = JsonReport::new(summary);
    let content = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))
}
