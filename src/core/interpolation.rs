//! Expression interpolation for `${{ ... }}` placeholders.
//!
//! Supported expressions:
//! - `${{ matrix.<axis> }}` - the instance's value for a declared axis
//! - `${{ env.<VAR> }}` - job environment first, then the process environment
//! - `${{ runner.os }}` - the host operating system

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

use crate::core::error::ConfigError;
use crate::core::matrix::MatrixValues;

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\{\s*([^}]*?)\s*\}\}").expect("expression pattern is valid"));

#[derive(Debug, PartialEq, Eq)]
enum Expr<'a> {
    Matrix(&'a str),
    Env(&'a str),
    RunnerOs,
}

fn parse(expr: &str) -> Result<Expr<'_>, ConfigError> {
    let unresolved = |message: &str| ConfigError::UnresolvedExpression {
        expr: expr.to_string(),
        message: message.to_string(),
    };

    if let Some(key) = expr.strip_prefix("matrix.") {
        if key.is_empty() {
            return Err(unresolved("missing matrix axis name"));
        }
        Ok(Expr::Matrix(key))
    } else if let Some(var) = expr.strip_prefix("env.") {
        if var.is_empty() {
            return Err(unresolved("missing variable name"));
        }
        Ok(Expr::Env(var))
    } else if expr == "runner.os" {
        Ok(Expr::RunnerOs)
    } else {
        Err(unresolved("unknown namespace"))
    }
}

/// Verifies every expression in `input` against the declared axes.
pub fn check(input: &str, axes: &[&str]) -> Result<(), ConfigError> {
    for caps in EXPRESSION.captures_iter(input) {
        let expr = caps.get(1).map_or("", |m| m.as_str());
        if let Expr::Matrix(key) = parse(expr)? {
            if !axes.contains(&key) {
                return Err(ConfigError::UnresolvedExpression {
                    expr: expr.to_string(),
                    message: "undeclared matrix axis".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Values visible to expressions of one job instance.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub matrix: &'a MatrixValues,
    pub env: &'a BTreeMap<String, String>,
}

impl<'a> Scope<'a> {
    pub fn new(matrix: &'a MatrixValues, env: &'a BTreeMap<String, String>) -> Self {
        Self { matrix, env }
    }

    /// Replaces every placeholder. A matrix axis an `include` entry left
    /// unset resolves to the empty string.
    pub fn interpolate(&self, input: &str) -> Result<String, ConfigError> {
        let mut error = None;
        let output = EXPRESSION.replace_all(input, |caps: &Captures| {
            let expr = caps.get(1).map_or("", |m| m.as_str());
            match parse(expr) {
                Ok(parsed) => self.resolve(parsed),
                Err(e) => {
                    error.get_or_insert(e);
                    String::new()
                }
            }
        });

        match error {
            Some(e) => Err(e),
            None => Ok(output.into_owned()),
        }
    }

    fn resolve(&self, expr: Expr<'_>) -> String {
        match expr {
            Expr::Matrix(key) => self.matrix.get(key).unwrap_or_default().to_string(),
            Expr::Env(var) => self
                .env
                .get(var)
                .cloned()
                .or_else(|| std::env::var(var).ok())
                .unwrap_or_default(),
            Expr::RunnerOs => std::env::consts::OS.to_string(),
        }
    }
}
