//! # CLI Module / 命令行模块
//!
//! Builds the localized command line and dispatches to the commands.
//!
//! 构建本地化的命令行并分派到各个命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::config::DEFAULT_WORKFLOW_FILE;
use crate::core::trigger::EventKind;
use crate::infra::t;

pub mod commands;

use commands::{EventArgs, HostArgs, WorkflowArgs};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn workflow_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .short('c')
            .long("config")
            .help(t!("cli.arg_config").to_string())
            .value_name("CONFIG")
            .default_value(DEFAULT_WORKFLOW_FILE)
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("project-dir")
            .long("project-dir")
            .help(t!("cli.arg_project_dir").to_string())
            .value_name("PROJECT_DIR")
            .default_value(".")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
    ]
}

fn event_args() -> Vec<Arg> {
    vec![
        Arg::new("event")
            .long("event")
            .help(t!("cli.arg_event").to_string())
            .value_name("EVENT")
            .value_parser(["push", "pull_request"])
            .conflicts_with("event-file")
            .action(ArgAction::Set),
        Arg::new("changed")
            .long("changed")
            .help(t!("cli.arg_changed").to_string())
            .value_name("PATH")
            .requires("event")
            .action(ArgAction::Append),
        Arg::new("since")
            .long("since")
            .help(t!("cli.arg_since").to_string())
            .value_name("REV")
            .requires("event")
            .action(ArgAction::Set),
        Arg::new("branch")
            .long("branch")
            .help(t!("cli.arg_branch").to_string())
            .value_name("BRANCH")
            .requires("event")
            .conflicts_with("tag")
            .action(ArgAction::Set),
        Arg::new("tag")
            .long("tag")
            .help(t!("cli.arg_tag").to_string())
            .value_name("TAG")
            .requires("event")
            .action(ArgAction::Set),
        Arg::new("event-file")
            .long("event-file")
            .help(t!("cli.arg_event_file").to_string())
            .value_name("EVENT_FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .action(ArgAction::Set),
    ]
}

fn host_args() -> Vec<Arg> {
    vec![
        Arg::new("label")
            .long("label")
            .help(t!("cli.arg_label").to_string())
            .value_name("LABEL")
            .conflicts_with("any-host")
            .action(ArgAction::Append),
        Arg::new("any-host")
            .long("any-host")
            .help(t!("cli.arg_any_host").to_string())
            .action(ArgAction::SetTrue),
        Arg::new("total-runners")
            .long("total-runners")
            .help(t!("cli.arg_total_runners").to_string())
            .value_name("TOTAL_RUNNERS")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("runner-index"),
        Arg::new("runner-index")
            .long("runner-index")
            .help(t!("cli.arg_runner_index").to_string())
            .value_name("RUNNER_INDEX")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("total-runners"),
    ]
}

/// Builds the command line with help texts in the active locale.
pub fn build_cli() -> Command {
    Command::new("workflow-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about").to_string())
                .args(workflow_args())
                .args(event_args())
                .args(host_args())
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.arg_jobs").to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html").to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json").to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about(t!("cli.cmd_plan_about").to_string())
                .args(workflow_args())
                .args(event_args())
                .args(host_args()),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about").to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.arg_output").to_string())
                        .value_name("OUTPUT")
                        .default_value(DEFAULT_WORKFLOW_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn parse_workflow_args(matches: &ArgMatches, explicit_lang: bool) -> WorkflowArgs {
    WorkflowArgs {
        config: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFLOW_FILE)),
        project_dir: matches
            .get_one::<PathBuf>("project-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        explicit_lang,
    }
}

fn parse_event_args(matches: &ArgMatches) -> Result<EventArgs> {
    let kind = matches
        .get_one::<String>("event")
        .map(|s| s.parse::<EventKind>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    Ok(EventArgs {
        kind,
        changed: matches
            .get_many::<String>("changed")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        since: matches.get_one::<String>("since").cloned(),
        branch: matches.get_one::<String>("branch").cloned(),
        tag: matches.get_one::<String>("tag").cloned(),
        event_file: matches.get_one::<PathBuf>("event-file").cloned(),
    })
}

fn parse_host_args(matches: &ArgMatches) -> HostArgs {
    HostArgs {
        labels: matches
            .get_many::<String>("label")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        any_host: matches.get_flag("any-host"),
        total_runners: matches.get_one::<usize>("total-runners").copied(),
        runner_index: matches.get_one::<usize>("runner-index").copied(),
    }
}

/// Parses the process arguments and runs the selected command.
pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_lang = pre_parse_language();
    let language = crate::init_locale(explicit_lang.as_deref());
    let explicit_lang = explicit_lang.is_some();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            commands::run::execute(
                parse_workflow_args(run_matches, explicit_lang),
                parse_event_args(run_matches)?,
                parse_host_args(run_matches),
                commands::run::ReportArgs {
                    jobs: run_matches.get_one::<usize>("jobs").copied(),
                    html: run_matches.get_one::<PathBuf>("html").cloned(),
                    json: run_matches.get_one::<PathBuf>("json").cloned(),
                },
            )
            .await?;
        }
        Some(("plan", plan_matches)) => {
            commands::plan::execute(
                parse_workflow_args(plan_matches, explicit_lang),
                parse_event_args(plan_matches)?,
                parse_host_args(plan_matches),
            )
            .await?;
        }
        Some(("init", init_matches)) => {
            if !explicit_lang {
                println!("🌐 {}", t!("init.language_detected", lang = &language));
            }
            commands::init::execute(
                init_matches
                    .get_one::<PathBuf>("output")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFLOW_FILE)),
                init_matches.get_flag("force"),
                init_matches.get_flag("non-interactive"),
                &language,
            )?;
        }
        _ => {
            // `subcommand_required` makes clap print help before we get here.
        }
    }
    Ok(())
}
