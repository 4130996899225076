//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Workflow Runner,
//! including command execution, workspace management, git queries and
//! i18n support.
//!
//! 此模块为 Workflow Runner 提供基础设施服务，
//! 包括命令执行、工作区管理、git 查询和国际化支持。

pub mod command;
pub mod fs;
pub mod git;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
