//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of run reports in the console.
//! It provides functionality for printing colorful, formatted summaries with
//! internationalization support.
//!
//! 此模块处理控制台中运行报告的显示。
//! 它提供打印彩色格式化摘要的功能，支持国际化。

use colored::*;

use crate::core::models::{JobResult, JobStatus, StepStatus};
use crate::infra::t;
use crate::reporting::summary::RunSummary;

/// Prints a formatted summary of job results to the console.
/// Displays a table with job status, name, duration and the number of steps
/// run, using color coding to highlight different statuses.
///
/// 在控制台打印格式化的作业结果摘要。
/// 显示一个包含作业状态、名称、持续时间和已运行步骤数的表格，
/// 使用颜色编码突出显示不同的状态。
///
/// # Output Format / 输出格式
/// ```text
/// --- Run Summary ---
///   - Passed     | build (ubuntu-latest, rust-tls)          |     12.31s | 4/4
///   - Failed     | build (ubuntu-latest, native-tls)        |      3.02s | 3/4
/// ```
pub fn print_summary(summary: &RunSummary<'_>) {
    println!("\n{}", t!("report.summary_banner").bold());

    for result in summary.results {
        let status_str = result.status_str();
        let status_colored = match result.status {
            JobStatus::Passed => status_str.as_str().green(),
            _ => status_str.as_str().red(),
        };
        let duration_str = format!("{:.2}s", result.duration.as_secs_f64());

        println!(
            "  - {:<10} | {:<40} | {:>10} | {}/{}",
            status_colored,
            result.name(),
            duration_str,
            result.steps_run(),
            result.steps.len()
        );
    }

    if summary.not_scheduled > 0 {
        println!(
            "{}",
            t!("report.not_scheduled", count = summary.not_scheduled).dimmed()
        );
    }

    println!(
        "{}",
        t!(
            "report.totals",
            total = summary.total(),
            passed = summary.passed(),
            failed = summary.failed()
        )
    );
}

/// Prints detailed information about failed instances.
/// Shows the failing step of each failed instance with its captured output,
/// helping developers debug issues.
///
/// 打印失败实例的详细信息。
/// 显示每个失败实例中失败的步骤及其捕获的输出，帮助开发者调试问题。
pub fn print_failure_details(failures: &[&JobResult]) {
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("report.failure_banner").red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}' ({})",
            i + 1,
            failures.len(),
            t!("report.failure_header").red(),
            result.name().cyan(),
            result.status_str()
        );

        if let Some(error) = &result.error {
            println!("\n{}", error);
        }

        if let Some(step) = result.failed_step() {
            println!(
                "\n--- {} ---\n",
                t!("report.step_log", name = &step.name).yellow()
            );
            println!("{}", step.output.trim_end());
        }

        let skipped: Vec<&str> = result
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::NotRun)
            .map(|s| s.name.as_str())
            .collect();
        if !skipped.is_empty() {
            println!(
                "\n{}",
                t!("report.steps_not_run", steps = skipped.join(", ")).dimmed()
            );
        }
        println!("\n{}", "-".repeat(80));
    }
}
