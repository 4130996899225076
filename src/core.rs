//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Workflow Runner:
//! the workflow configuration, trigger evaluation, matrix expansion,
//! execution planning and the step runner.
//!
//! 此模块包含 Workflow Runner 的核心功能：
//! 工作流配置、触发器评估、矩阵展开、执行计划和步骤运行器。

pub mod actions;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod glob;
pub mod interpolation;
pub mod matrix;
pub mod models;
pub mod planner;
pub mod trigger;

// Re-exports
pub use config::Workflow;
pub use error::ConfigError;
pub use models::{JobResult, RunStatus};
