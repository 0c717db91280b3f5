//! Taskdeck CLI - a personal task manager with subtasks, reports, and an AI
//! assistant.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use taskdeck::cli::{
    AssistantCommands, AuthCommands, Cli, Commands, ReportCommands, SubtaskCommands, TaskCommands,
};
use taskdeck::commands::{self, MonthlyOptions, MoveDirection, Output};
use taskdeck::config::{Config, OutputFormat};
use taskdeck::report::ReviewAnswers;
use taskdeck::{action_log, storage};

fn main() {
    let cli = Cli::parse();

    // Data dir: --data-dir flag > TD_DATA_DIR env (via clap) > platform default
    let data_dir = resolve_data_dir(cli.data_dir, cli.human_readable);

    // -H wins; otherwise the config's output-format default applies
    let human = cli.human_readable
        || matches!(
            Config::load_from(&data_dir).map(|c| c.output_format),
            Ok(Some(OutputFormat::Human))
        );

    let (cmd_name, args_json) = serialize_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli.command, &data_dir, human);
    let duration = start.elapsed().as_millis() as u64;

    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(
                "{}",
                serde_json::json!({ "error": e.to_string() })
            );
        }
        process::exit(1);
    }
}

fn resolve_data_dir(explicit: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit {
        Some(path) => path,
        None => match storage::resolve_data_dir() {
            Ok(path) => path,
            Err(e) => {
                if human {
                    eprintln!("Error: {}", e);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
                }
                process::exit(1);
            }
        },
    }
}

fn run_command(command: Commands, data_dir: &Path, human: bool) -> Result<(), taskdeck::Error> {
    match command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { email, password } => {
                let result = commands::auth_login(data_dir, &email, &password)?;
                output(&result, human);
            }
            AuthCommands::Logout { purge } => {
                let result = commands::auth_logout(data_dir, purge)?;
                output(&result, human);
            }
            AuthCommands::Status => {
                let result = commands::auth_status(data_dir)?;
                output(&result, human);
            }
        },

        Commands::Task { command } => match command {
            TaskCommands::Add {
                title,
                status,
                subtasks,
            } => {
                let result = commands::task_add(data_dir, &title, status.as_deref(), &subtasks)?;
                output(&result, human);
            }
            TaskCommands::List { status } => {
                let result = commands::task_list(data_dir, status.as_deref())?;
                output(&result, human);
            }
            TaskCommands::Show { id } => {
                let result = commands::task_show(data_dir, &id)?;
                output(&result, human);
            }
            TaskCommands::Status { id, status } => {
                let result = commands::task_status(data_dir, &id, &status)?;
                output(&result, human);
            }
            TaskCommands::Delete { id } => {
                let result = commands::task_delete(data_dir, &id)?;
                output(&result, human);
            }
            TaskCommands::MoveUp { id } => {
                let result = commands::task_move(data_dir, &id, MoveDirection::Up)?;
                output(&result, human);
            }
            TaskCommands::MoveDown { id } => {
                let result = commands::task_move(data_dir, &id, MoveDirection::Down)?;
                output(&result, human);
            }
        },

        Commands::Subtask { command } => match command {
            SubtaskCommands::Add { task_id, title } => {
                let result = commands::subtask_add(data_dir, &task_id, &title)?;
                output(&result, human);
            }
            SubtaskCommands::Toggle {
                task_id,
                subtask_id,
            } => {
                let result = commands::subtask_toggle(data_dir, &task_id, &subtask_id)?;
                output(&result, human);
            }
            SubtaskCommands::Delete {
                task_id,
                subtask_id,
            } => {
                let result = commands::subtask_delete(data_dir, &task_id, &subtask_id)?;
                output(&result, human);
            }
        },

        Commands::Assistant { command } => match command {
            AssistantCommands::Ask { text, apply } => {
                let result = commands::assistant_ask(data_dir, &text, apply)?;
                output(&result, human);
            }
        },

        Commands::Report { command } => match command {
            ReportCommands::Todo {
                subtasks,
                all,
                out,
            } => {
                let result = commands::report_todo(data_dir, &subtasks, all, out.as_deref())?;
                output(&result, human);
            }
            ReportCommands::Monthly {
                tasks_completed,
                reason,
                learnings,
                target_percent,
                suggestions,
                skip_tasks,
                skip_subtasks,
                cycle_subtasks,
                out,
            } => {
                let answers = ReviewAnswers {
                    tasks_completed,
                    reason_if_no: reason,
                    new_learnings: learnings,
                    last_month_target: target_percent,
                    suggestions,
                };
                let options = MonthlyOptions {
                    skip_tasks,
                    skip_subtasks,
                    cycle_subtasks,
                };
                let result =
                    commands::report_monthly(data_dir, &answers, &options, out.as_deref())?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.human());
    } else {
        println!("{}", result.json());
    }
}

fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { email, .. } => (
                "auth login".to_string(),
                serde_json::json!({ "email": email, "password": "[REDACTED]" }),
            ),
            AuthCommands::Logout { purge } => (
                "auth logout".to_string(),
                serde_json::json!({ "purge": purge }),
            ),
            AuthCommands::Status => ("auth status".to_string(), serde_json::json!({})),
        },

        Commands::Task { command } => match command {
            TaskCommands::Add {
                title,
                status,
                subtasks,
            } => (
                "task add".to_string(),
                serde_json::json!({ "title": title, "status": status, "subtasks": subtasks }),
            ),
            TaskCommands::List { status } => (
                "task list".to_string(),
                serde_json::json!({ "status": status }),
            ),
            TaskCommands::Show { id } => {
                ("task show".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::Status { id, status } => (
                "task status".to_string(),
                serde_json::json!({ "id": id, "status": status }),
            ),
            TaskCommands::Delete { id } => {
                ("task delete".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::MoveUp { id } => {
                ("task move-up".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::MoveDown { id } => (
                "task move-down".to_string(),
                serde_json::json!({ "id": id }),
            ),
        },

        Commands::Subtask { command } => match command {
            SubtaskCommands::Add { task_id, title } => (
                "subtask add".to_string(),
                serde_json::json!({ "task_id": task_id, "title": title }),
            ),
            SubtaskCommands::Toggle {
                task_id,
                subtask_id,
            } => (
                "subtask toggle".to_string(),
                serde_json::json!({ "task_id": task_id, "subtask_id": subtask_id }),
            ),
            SubtaskCommands::Delete {
                task_id,
                subtask_id,
            } => (
                "subtask delete".to_string(),
                serde_json::json!({ "task_id": task_id, "subtask_id": subtask_id }),
            ),
        },

        Commands::Assistant { command } => match command {
            AssistantCommands::Ask { text, apply } => (
                "assistant ask".to_string(),
                serde_json::json!({ "text": text, "apply": apply }),
            ),
        },

        Commands::Report { command } => match command {
            ReportCommands::Todo {
                subtasks,
                all,
                out,
            } => (
                "report todo".to_string(),
                serde_json::json!({ "subtasks": subtasks, "all": all, "out": out }),
            ),
            ReportCommands::Monthly {
                tasks_completed,
                skip_tasks,
                skip_subtasks,
                cycle_subtasks,
                out,
                ..
            } => (
                "report monthly".to_string(),
                serde_json::json!({
                    "tasks_completed": tasks_completed,
                    "skip_tasks": skip_tasks,
                    "skip_subtasks": skip_subtasks,
                    "cycle_subtasks": cycle_subtasks,
                    "out": out,
                }),
            ),
        },
    }
}
