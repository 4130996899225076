//! # Command Line Unit Tests / 命令行单元测试
//!
//! Tests for how a `run` line becomes a program and its arguments.
//!
//! 测试 `run` 命令行如何被解析为程序及其参数。

use std::collections::BTreeMap;

use workflow_runner::core::actions::RunAction;
use workflow_runner::core::interpolation::Scope;
use workflow_runner::core::matrix::MatrixValues;
use workflow_runner::infra::command::display_command;

fn values(pairs: &[(&str, &str)]) -> MatrixValues {
    MatrixValues::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_placeholders_and_variables_are_resolved() {
        let matrix = values(&[("features", "rust-tls")]);
        let env = env(&[("PROFILE", "release")]);
        let scope = Scope::new(&matrix, &env);

        let (program, args) = RunAction::parse_command_line(
            "cargo build --features ${{ matrix.features }} --profile $PROFILE",
            &scope,
        )
        .unwrap();
        assert_eq!(program, "cargo");
        assert_eq!(args, vec!["build", "--features", "rust-tls", "--profile", "release"]);
    }

    #[test]
    fn test_inserted_values_are_not_expanded_again() {
        let matrix = values(&[("arg", "$PROFILE"), ("tool", "~/bin/tool")]);
        let env = env(&[("PROFILE", "release"), ("LITERAL", "${PROFILE}")]);
        let scope = Scope::new(&matrix, &env);

        let (program, args) = RunAction::parse_command_line(
            "${{ matrix.tool }} ${{ matrix.arg }} ${{ env.LITERAL }} ${PROFILE}",
            &scope,
        )
        .unwrap();
        assert_eq!(program, "~/bin/tool");
        assert_eq!(args, vec!["$PROFILE", "${PROFILE}", "release"]);
    }

    #[test]
    fn test_quoting_and_escaped_dollar() {
        let matrix = values(&[]);
        let env = env(&[]);
        let scope = Scope::new(&matrix, &env);

        let (program, args) =
            RunAction::parse_command_line(r#"echo "two words" 'single' $$HOME"#, &scope).unwrap();
        assert_eq!(program, "echo");
        assert_eq!(args, vec!["two words", "single", "$HOME"]);
    }

    #[test]
    fn test_empty_and_unbalanced_lines_are_errors() {
        let matrix = values(&[]);
        let env = env(&[]);
        let scope = Scope::new(&matrix, &env);

        assert!(RunAction::parse_command_line("   ", &scope).is_err());
        assert!(RunAction::parse_command_line("echo \"open", &scope).is_err());
    }
}

#[cfg(test)]
mod display_tests {
    use super::*;

    #[test]
    fn test_display_command_quotes_blank_and_spaced_args() {
        let args = vec!["build".to_string(), "two words".to_string(), String::new()];
        assert_eq!(display_command("cargo", &args), r#"cargo build "two words" """#);
    }
}
