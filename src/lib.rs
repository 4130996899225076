//! # Workflow Runner Library / Workflow Runner 库
//!
//! This library provides the core functionality for the Workflow Runner tool,
//! a configuration-driven CI workflow executor that runs locally.
//!
//! 此库为 Workflow Runner 工具提供核心功能，
//! 这是一个在本地运行的、配置驱动的 CI 工作流执行器。
//!
//! ## Modules / 模块
//!
//! - `core` - Workflow model, trigger evaluation, matrix expansion and step execution
//! - `infra` - Infrastructure services like command execution, workspaces and git
//! - `reporting` - Run result reporting (console, HTML, JSON)
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 工作流模型、触发器评估、矩阵展开和步骤执行
//! - `infra` - 基础设施服务，如命令执行、工作区和 git
//! - `reporting` - 运行结果报告（控制台、HTML、JSON）
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

/// Selects the UI language.
///
/// An explicit language wins; otherwise the system locale is used. The full
/// locale (e.g. "zh-CN") is tried first, then just the language code, and
/// finally the default language ("en").
pub fn init_locale(explicit: Option<&str>) -> String {
    let locale = explicit
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale.as_str()
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
    lang.to_string()
}
