//! # HTML Reporting Module / HTML 报告模块
//!
//! This module handles the generation of HTML run reports.
//! It creates a self-contained, styled HTML file with run statistics, a
//! results table, and collapsible step logs for every instance.
//!
//! 此模块处理 HTML 运行报告的生成。
//! 它创建一个独立的样式化 HTML 文件，包含运行统计、结果表格以及每个实例可折叠的步骤日志。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::Path;

use crate::core::models::{JobResult, StepStatus};
use crate::infra::t;
use crate::reporting::summary::RunSummary;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.2rem; }
.meta { color: #666; margin-bottom: 1.5rem; }
.summary-container { display: flex; gap: 1rem; margin-bottom: 1.5rem; }
.summary-item { border: 1px solid #ddd; border-radius: 6px; padding: 0.8rem 1.2rem; text-align: center; }
.summary-item .count { display: block; font-size: 1.6rem; font-weight: bold; }
.passed-text { color: #1a7f37; }
.failed-text { color: #cf222e; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #eee; padding: 0.5rem; text-align: left; vertical-align: top; }
.status-cell { display: inline-block; padding: 0.1rem 0.5rem; border-radius: 4px; color: #fff; }
.status-passed { background: #1a7f37; }
.status-failed { background: #cf222e; }
.status-timeout { background: #bc4c00; }
.status-cancelled { background: #6e7781; }
.step-passed { color: #1a7f37; }
.step-failed { color: #cf222e; }
.step-not_run { color: #8c959f; }
pre.output-content { background: #f6f8fa; padding: 0.8rem; overflow-x: auto; max-height: 30rem; }
"#;

/// Generates an HTML report from a finished run.
///
/// # Arguments / 参数
/// * `summary` - The run to report on / 要报告的运行
/// * `output_path` - The file path where the HTML report will be saved
///                   保存 HTML 报告的文件路径
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 如果无法写入文件，则返回错误。
pub fn generate_html_report(summary: &RunSummary<'_>, output_path: &Path) -> Result<()> {
    let markup = render(summary);
    fs::write(output_path, markup.into_string())
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))
}

/// Renders the report document.
pub fn render(summary: &RunSummary<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title")) " - " (summary.workflow) }
                style { (maud::PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (summary.workflow) }
                div class="meta" {
                    (t!(
                        "html_report.meta",
                        started = summary.started_at.format("%Y-%m-%d %H:%M:%S"),
                        finished = summary.finished_at.format("%Y-%m-%d %H:%M:%S")
                    ))
                }
                div class="summary-container" {
                    (summary_item(summary.total(), &t!("html_report.summary.total"), ""))
                    (summary_item(summary.passed(), &t!("html_report.summary.passed"), "passed-text"))
                    (summary_item(summary.failed(), &t!("html_report.summary.failed"), "failed-text"))
                    (summary_item(summary.not_scheduled, &t!("html_report.summary.not_scheduled"), ""))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.header.name")) }
                            th { (t!("html_report.table.header.status")) }
                            th { (t!("html_report.table.header.duration")) }
                            th { (t!("html_report.table.header.steps")) }
                        }
                    }
                    tbody {
                        @for result in summary.results {
                            (result_row(result))
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(count: usize, label: &str, class: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (count) }
            span class="label" { (label) }
        }
    }
}

fn result_row(result: &JobResult) -> Markup {
    html! {
        tr {
            td { (result.name()) }
            td {
                div class={ "status-cell " (result.status_class()) } { (result.status_str()) }
            }
            td { (format!("{:.2}s", result.duration.as_secs_f64())) }
            td {
                @if let Some(error) = &result.error {
                    pre class="output-content" { (error) }
                }
                @for step in &result.steps {
                    details open[step.status == StepStatus::Failed] {
                        summary class={ "step-" (step_class(step.status)) } {
                            (step.name) " (" (format!("{:.2}s", step.duration.as_secs_f64())) ")"
                        }
                        @if !step.output.is_empty() {
                            pre class="output-content" { (step.output) }
                        }
                    }
                }
            }
        }
    }
}

fn step_class(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => "passed",
        StepStatus::Failed => "failed",
        StepStatus::NotRun => "not_run",
    }
}
