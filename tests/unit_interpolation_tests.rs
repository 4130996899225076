//! # Interpolation Unit Tests / 表达式插值单元测试
//!
//! Tests for `${{ ... }}` placeholder resolution and validation.
//!
//! `${{ ... }}` 占位符解析与校验的测试。

mod common;

use std::collections::BTreeMap;
use workflow_runner::core::error::ConfigError;
use workflow_runner::core::interpolation::{Scope, check};

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_matrix_values_are_substituted() {
    let instance = common::instance(0, &[("os", "ubuntu-latest"), ("features", "rust-tls")]);
    let job_env = BTreeMap::new();
    let scope = Scope::new(&instance.values, &job_env);

    assert_eq!(
        scope
            .interpolate("cargo test --features ${{ matrix.features }}")
            .unwrap(),
        "cargo test --features rust-tls"
    );
    assert_eq!(
        scope.interpolate("${{matrix.os}}/${{ matrix.features }}").unwrap(),
        "ubuntu-latest/rust-tls"
    );
}

#[test]
fn test_text_without_placeholders_is_unchanged() {
    let instance = common::instance(0, &[]);
    let job_env = BTreeMap::new();
    let scope = Scope::new(&instance.values, &job_env);
    assert_eq!(
        scope.interpolate("echo ${HOME} $PATH").unwrap(),
        "echo ${HOME} $PATH"
    );
}

#[test]
fn test_unset_axis_resolves_to_empty_string() {
    let instance = common::instance(0, &[("os", "macos-latest")]);
    let job_env = BTreeMap::new();
    let scope = Scope::new(&instance.values, &job_env);
    assert_eq!(
        scope.interpolate("--features=${{ matrix.features }}").unwrap(),
        "--features="
    );
}

#[test]
fn test_env_prefers_job_env() {
    let instance = common::instance(0, &[]);
    let job_env = env(&[("PATH", "/custom/bin")]);
    let scope = Scope::new(&instance.values, &job_env);
    assert_eq!(scope.interpolate("${{ env.PATH }}").unwrap(), "/custom/bin");
    assert_eq!(
        scope
            .interpolate("${{ env.WORKFLOW_RUNNER_SURELY_UNSET_VARIABLE }}")
            .unwrap(),
        ""
    );
}

#[test]
fn test_runner_os() {
    let instance = common::instance(0, &[]);
    let job_env = BTreeMap::new();
    let scope = Scope::new(&instance.values, &job_env);
    assert_eq!(
        scope.interpolate("${{ runner.os }}").unwrap(),
        std::env::consts::OS
    );
}

#[test]
fn test_unknown_namespace_is_an_error() {
    let instance = common::instance(0, &[]);
    let job_env = BTreeMap::new();
    let scope = Scope::new(&instance.values, &job_env);
    assert!(matches!(
        scope.interpolate("${{ github.sha }}"),
        Err(ConfigError::UnresolvedExpression { .. })
    ));
}

#[test]
fn test_check_against_declared_axes() {
    let axes = ["os", "features"];
    assert!(check("cargo build --features ${{ matrix.features }}", &axes).is_ok());
    assert!(check("${{ env.HOME }} ${{ runner.os }}", &axes).is_ok());
    assert!(check("plain text", &axes).is_ok());

    assert_eq!(
        check("${{ matrix.arch }}", &axes),
        Err(ConfigError::UnresolvedExpression {
            expr: "matrix.arch".to_string(),
            message: "undeclared matrix axis".to_string(),
        })
    );
    assert!(check("${{ matrix. }}", &axes).is_err());
    assert!(check("${{ env. }}", &axes).is_err());
}
