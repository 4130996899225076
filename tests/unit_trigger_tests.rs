//! # Trigger Module Unit Tests / 触发器模块单元测试
//!
//! Tests for event evaluation: subscriptions, ref filters and path filters,
//! including the documentation-only and tagged-release scenarios.
//!
//! 事件评估的测试：订阅、引用过滤和路径过滤，
//! 包括仅文档修改和带标签发布的场景。

mod common;

use workflow_runner::core::config::{PullRequestTrigger, PushTrigger, Triggers};
use workflow_runner::core::trigger::{
    Event, EventKind, GitRef, RejectReason, TriggerDecision, TriggerEvaluator,
};

fn paths(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    paths(values)
}

fn tag(name: &str) -> Option<GitRef> {
    Some(GitRef::Tag(name.to_string()))
}

fn branch(name: &str) -> Option<GitRef> {
    Some(GitRef::Branch(name.to_string()))
}

fn ci_evaluator() -> TriggerEvaluator {
    TriggerEvaluator::new(&common::ci_workflow().on).unwrap()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_documentation_only_push_is_rejected() {
        let event = Event::new(EventKind::Push, paths(&["README.md"]), tag("v1.0"));
        assert_eq!(
            ci_evaluator().evaluate(&event),
            TriggerDecision::Reject(RejectReason::AllPathsIgnored)
        );
    }

    #[test]
    fn test_tagged_source_push_is_accepted() {
        let event = Event::new(
            EventKind::Push,
            paths(&["src/main.rs"]),
            Some(GitRef::Tag("v1.0".to_string())),
        );
        assert_eq!(ci_evaluator().evaluate(&event), TriggerDecision::Accept);
    }

    #[test]
    fn test_any_tag_is_accepted_when_paths_pass() {
        let evaluator = ci_evaluator();
        for tag in ["v1.0", "nightly", "release/2024-01", ""] {
            let event = Event::new(
                EventKind::Push,
                paths(&["Cargo.toml"]),
                Some(GitRef::Tag(tag.to_string())),
            );
            assert!(evaluator.evaluate(&event).is_accepted(), "tag {:?}", tag);
        }
    }

    #[test]
    fn test_mixed_changes_are_accepted() {
        let event = Event::new(
            EventKind::PullRequest,
            paths(&["README.md", "docs/guide.md", "src/lib.rs"]),
            Some(GitRef::Branch("main".to_string())),
        );
        assert_eq!(ci_evaluator().evaluate(&event), TriggerDecision::Accept);
    }

    #[test]
    fn test_documentation_only_pull_request_is_rejected() {
        let event = Event::new(
            EventKind::PullRequest,
            paths(&["docs/a.md", "CHANGELOG.md"]),
            None,
        );
        assert_eq!(
            ci_evaluator().evaluate(&event),
            TriggerDecision::Reject(RejectReason::AllPathsIgnored)
        );
    }

    #[test]
    fn test_empty_change_set_is_accepted() {
        let event = Event::new(EventKind::Push, Vec::new(), tag("v1.0"));
        assert_eq!(ci_evaluator().evaluate(&event), TriggerDecision::Accept);
    }

    #[test]
    fn test_branch_push_is_rejected_by_tag_filter() {
        let event = Event::new(EventKind::Push, paths(&["src/main.rs"]), branch("main"));
        assert_eq!(
            ci_evaluator().evaluate(&event),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
    }

    #[test]
    fn test_push_without_ref_is_rejected_by_tag_filter() {
        let event = Event::new(EventKind::Push, paths(&["src/main.rs"]), None);
        assert_eq!(
            ci_evaluator().evaluate(&event),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
    }

    #[test]
    fn test_pull_request_without_branch_filter_accepts_any_base() {
        let evaluator = ci_evaluator();
        for base in [branch("main"), branch("feature/x"), None] {
            let event = Event::new(EventKind::PullRequest, paths(&["src/lib.rs"]), base.clone());
            assert!(evaluator.evaluate(&event).is_accepted(), "base {:?}", base);
        }
    }
}

#[cfg(test)]
mod rule_tests {
    use super::*;

    #[test]
    fn test_unsubscribed_event_is_rejected() {
        let triggers = Triggers {
            push: Some(PushTrigger::default()),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();
        let event = Event::new(EventKind::PullRequest, paths(&["src/lib.rs"]), None);
        assert_eq!(
            evaluator.evaluate(&event),
            TriggerDecision::Reject(RejectReason::NotSubscribed)
        );
    }

    #[test]
    fn test_no_subscriptions_reject_everything() {
        let evaluator = TriggerEvaluator::new(&Triggers::default()).unwrap();
        for kind in [EventKind::Push, EventKind::PullRequest] {
            let event = Event::new(kind, Vec::new(), None);
            assert_eq!(
                evaluator.evaluate(&event),
                TriggerDecision::Reject(RejectReason::NotSubscribed)
            );
        }
    }

    #[test]
    fn test_branch_filter() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                branches: strings(&["main", "release/**"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();

        let on = |branch: &str| {
            evaluator.evaluate(&Event::new(
                EventKind::Push,
                Vec::new(),
                Some(GitRef::Branch(branch.to_string())),
            ))
        };
        assert_eq!(on("main"), TriggerDecision::Accept);
        assert_eq!(on("release/1.x"), TriggerDecision::Accept);
        assert_eq!(
            on("feature/x"),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );

        // Only branches are configured, so tag pushes and refless pushes are filtered.
        for git_ref in [tag("v1.0"), None] {
            assert_eq!(
                evaluator.evaluate(&Event::new(EventKind::Push, Vec::new(), git_ref)),
                TriggerDecision::Reject(RejectReason::RefFiltered)
            );
        }
    }

    #[test]
    fn test_branches_and_tags_each_filter_their_own_ref_kind() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                branches: strings(&["main"]),
                tags: strings(&["v*"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();
        let push = |git_ref| evaluator.evaluate(&Event::new(EventKind::Push, Vec::new(), git_ref));

        assert!(push(branch("main")).is_accepted());
        assert!(push(tag("v2.0")).is_accepted());
        assert_eq!(push(branch("v2.0")), TriggerDecision::Reject(RejectReason::RefFiltered));
        assert_eq!(push(tag("main")), TriggerDecision::Reject(RejectReason::RefFiltered));
    }

    #[test]
    fn test_unfiltered_push_accepts_any_ref() {
        let triggers = Triggers {
            push: Some(PushTrigger::default()),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();
        for git_ref in [branch("dev"), tag("nightly"), None] {
            let event = Event::new(EventKind::Push, paths(&["src/lib.rs"]), git_ref);
            assert_eq!(evaluator.evaluate(&event), TriggerDecision::Accept);
        }
    }

    #[test]
    fn test_tag_filter_rejects_non_matching_tag() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                tags: strings(&["v*"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();

        let tagged = |tag: &str| {
            Event::new(
                EventKind::Push,
                paths(&["src/lib.rs"]),
                Some(GitRef::Tag(tag.to_string())),
            )
        };
        assert!(evaluator.evaluate(&tagged("v2.1")).is_accepted());
        assert_eq!(
            evaluator.evaluate(&tagged("nightly")),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
    }

    #[test]
    fn test_pull_request_base_branch_filter() {
        let triggers = Triggers {
            push: None,
            pull_request: Some(PullRequestTrigger {
                branches: strings(&["main"]),
                ..PullRequestTrigger::default()
            }),
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();
        let to = |base: &str| {
            Event::new(
                EventKind::PullRequest,
                Vec::new(),
                Some(GitRef::Branch(base.to_string())),
            )
        };
        assert!(evaluator.evaluate(&to("main")).is_accepted());
        assert_eq!(
            evaluator.evaluate(&to("develop")),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
        assert_eq!(
            evaluator.evaluate(&Event::new(EventKind::PullRequest, Vec::new(), None)),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
    }

    #[test]
    fn test_paths_filter_requires_one_match() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                paths: strings(&["src/**", "Cargo.toml"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();

        let accepted = Event::new(EventKind::Push, paths(&["docs/a.md", "Cargo.toml"]), None);
        assert!(evaluator.evaluate(&accepted).is_accepted());

        let rejected = Event::new(EventKind::Push, paths(&["docs/a.md"]), None);
        assert_eq!(
            evaluator.evaluate(&rejected),
            TriggerDecision::Reject(RejectReason::NoMatchingPaths)
        );
    }

    #[test]
    fn test_ref_filter_is_checked_before_paths() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                branches: strings(&["main"]),
                paths_ignore: strings(&["*.md"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        let evaluator = TriggerEvaluator::new(&triggers).unwrap();
        let event = Event::new(
            EventKind::Push,
            paths(&["README.md"]),
            Some(GitRef::Branch("dev".to_string())),
        );
        assert_eq!(
            evaluator.evaluate(&event),
            TriggerDecision::Reject(RejectReason::RefFiltered)
        );
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let triggers = Triggers {
            push: Some(PushTrigger {
                paths_ignore: strings(&["[oops"]),
                ..PushTrigger::default()
            }),
            pull_request: None,
        };
        assert!(TriggerEvaluator::new(&triggers).is_err());
    }
}

#[cfg(test)]
mod event_tests {
    use super::*;

    #[test]
    fn test_event_kind_parsing() {
        assert_eq!("push".parse::<EventKind>().unwrap(), EventKind::Push);
        assert_eq!(
            "pull_request".parse::<EventKind>().unwrap(),
            EventKind::PullRequest
        );
        assert_eq!(
            "pull-request".parse::<EventKind>().unwrap(),
            EventKind::PullRequest
        );
        assert!("release".parse::<EventKind>().is_err());
        assert_eq!(EventKind::PullRequest.to_string(), "pull_request");
    }

    #[test]
    fn test_git_ref_parsing() {
        assert_eq!(GitRef::parse("refs/tags/v1.0"), GitRef::Tag("v1.0".into()));
        assert_eq!(
            GitRef::parse("refs/heads/main"),
            GitRef::Branch("main".into())
        );
        assert_eq!(GitRef::parse("main"), GitRef::Branch("main".into()));
    }

    #[test]
    fn test_event_from_json() {
        let event = Event::from_json(
            r#"{"kind": "push", "changed_paths": ["src/main.rs"], "ref": "refs/tags/v1.0"}"#,
        )
        .unwrap();
        assert_eq!(event.kind, EventKind::Push);
        assert_eq!(event.changed_paths, vec!["src/main.rs"]);
        assert_eq!(event.git_ref, Some(GitRef::Tag("v1.0".into())));

        let minimal = Event::from_json(r#"{"kind": "pull_request"}"#).unwrap();
        assert!(minimal.changed_paths.is_empty());
        assert_eq!(minimal.git_ref, None);

        assert!(Event::from_json(r#"{"kind": "deploy"}"#).is_err());
    }
}
