//! # Trigger Evaluation Module / 触发器评估模块
//!
//! Decides whether a repository event starts a run. Rules are applied in
//! order: subscription, ref filter, `paths`, `paths_ignore`.
//!
//! 决定一个仓库事件是否启动运行。规则按顺序应用：
//! 订阅、引用过滤、`paths`、`paths_ignore`。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::config::Triggers;
use crate::core::error::ConfigError;
use crate::core::glob::PatternSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    PullRequest,
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(EventKind::Push),
            "pull_request" | "pull-request" => Ok(EventKind::PullRequest),
            other => Err(format!("unknown event kind '{}'", other)),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Push => write!(f, "push"),
            EventKind::PullRequest => write!(f, "pull_request"),
        }
    }
}

/// The ref an event carries: the pushed ref, or a pull request's base branch.
/// 事件携带的引用：被推送的引用，或拉取请求的目标分支。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitRef {
    Branch(String),
    Tag(String),
}

impl GitRef {
    /// Parses `refs/tags/<t>` and `refs/heads/<b>`; a bare name is a branch.
    pub fn parse(raw: &str) -> Self {
        if let Some(tag) = raw.strip_prefix("refs/tags/") {
            GitRef::Tag(tag.to_string())
        } else if let Some(branch) = raw.strip_prefix("refs/heads/") {
            GitRef::Branch(branch.to_string())
        } else {
            GitRef::Branch(raw.to_string())
        }
    }
}

/// A repository event.
/// 一个仓库事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub changed_paths: Vec<String>,
    pub git_ref: Option<GitRef>,
}

/// The JSON shape accepted by `--event-file`.
#[derive(Debug, Deserialize)]
struct EventFile {
    kind: EventKind,
    #[serde(default)]
    changed_paths: Vec<String>,
    #[serde(default, rename = "ref")]
    git_ref: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind, changed_paths: Vec<String>, git_ref: Option<GitRef>) -> Self {
        Self {
            kind,
            changed_paths,
            git_ref,
        }
    }

    /// Parses an event description such as
    /// `{"kind": "push", "changed_paths": ["src/main.rs"], "ref": "refs/tags/v1.0"}`.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: EventFile =
            serde_json::from_str(content).context("Failed to parse event description")?;
        Ok(Self {
            kind: file.kind,
            changed_paths: file.changed_paths,
            git_ref: file.git_ref.as_deref().map(GitRef::parse),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The workflow has no subscription for this event kind.
    NotSubscribed,
    /// The branch or tag did not match the configured patterns.
    RefFiltered,
    /// `paths` is configured and no changed path matched it.
    NoMatchingPaths,
    /// Every changed path matched `paths_ignore`.
    AllPathsIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum TriggerDecision {
    Accept,
    Reject(RejectReason),
}

impl TriggerDecision {
    pub fn is_accepted(self) -> bool {
        self == TriggerDecision::Accept
    }
}

#[derive(Debug, Clone, Default)]
struct CompiledFilter {
    branches: PatternSet,
    tags: PatternSet,
    paths: PatternSet,
    paths_ignore: PatternSet,
}

/// Trigger rules with their patterns compiled.
/// 已编译模式的触发器规则。
#[derive(Debug, Clone, Default)]
pub struct TriggerEvaluator {
    push: Option<CompiledFilter>,
    pull_request: Option<CompiledFilter>,
}

impl TriggerEvaluator {
    pub fn new(triggers: &Triggers) -> Result<Self, ConfigError> {
        let push = triggers
            .push
            .as_ref()
            .map(|p| -> Result<_, ConfigError> {
                Ok(CompiledFilter {
                    branches: PatternSet::new(&p.branches)?,
                    tags: PatternSet::new(&p.tags)?,
                    paths: PatternSet::new(&p.paths)?,
                    paths_ignore: PatternSet::new(&p.paths_ignore)?,
                })
            })
            .transpose()?;

        let pull_request = triggers
            .pull_request
            .as_ref()
            .map(|p| -> Result<_, ConfigError> {
                Ok(CompiledFilter {
                    branches: PatternSet::new(&p.branches)?,
                    tags: PatternSet::default(),
                    paths: PatternSet::new(&p.paths)?,
                    paths_ignore: PatternSet::new(&p.paths_ignore)?,
                })
            })
            .transpose()?;

        Ok(Self { push, pull_request })
    }

    /// Evaluates an event. Pure; no side effects.
    /// 评估一个事件。纯函数，无副作用。
    pub fn evaluate(&self, event: &Event) -> TriggerDecision {
        let filter = match event.kind {
            EventKind::Push => self.push.as_ref(),
            EventKind::PullRequest => self.pull_request.as_ref(),
        };
        let Some(filter) = filter else {
            return TriggerDecision::Reject(RejectReason::NotSubscribed);
        };

        if !ref_matches(filter, event) {
            return TriggerDecision::Reject(RejectReason::RefFiltered);
        }

        let changed = &event.changed_paths;
        if changed.is_empty() {
            return TriggerDecision::Accept;
        }

        if !filter.paths.is_empty() && !changed.iter().any(|p| filter.paths.matches_path(p)) {
            return TriggerDecision::Reject(RejectReason::NoMatchingPaths);
        }

        if !filter.paths_ignore.is_empty()
            && changed.iter().all(|p| filter.paths_ignore.matches_path(p))
        {
            return TriggerDecision::Reject(RejectReason::AllPathsIgnored);
        }

        TriggerDecision::Accept
    }
}

/// With neither `branches` nor `tags` configured every ref passes, including
/// none. Otherwise the event must carry a ref of a configured kind that
/// matches, so with only `tags` configured a branch push is filtered out.
fn ref_matches(filter: &CompiledFilter, event: &Event) -> bool {
    if filter.branches.is_empty() && filter.tags.is_empty() {
        return true;
    }
    match &event.git_ref {
        None => false,
        Some(GitRef::Branch(branch)) => filter.branches.matches(branch),
        Some(GitRef::Tag(tag)) => filter.tags.matches(tag),
    }
}
