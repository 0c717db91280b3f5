//! Command implementations for the taskdeck CLI.
//!
//! Each command is one read-modify-write cycle against the per-user document:
//! load the record, mutate the in-memory task list, replace the whole record.
//! Results are plain structs that render as JSON (default) or human text.

use crate::assistant::{self, AssistantAction};
use crate::auth::{self, UserIdentity};
use crate::config::{Config, Session, State};
use crate::models::{SubTask, Task, TaskDocument, TaskStatus};
use crate::report::{self, ReviewAnswers};
use crate::storage::Storage;
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Command results render as JSON (default) or human-readable text.
pub trait Output: Serialize {
    /// Format for human-readable output.
    fn human(&self) -> String;

    /// Serialize to a JSON string.
    fn json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    raw.parse().map_err(Error::InvalidInput)
}

/// Resolve the acting user and open the store.
fn user_and_store(data_dir: &Path) -> Result<(UserIdentity, Storage)> {
    let state = State::load_from(data_dir)?;
    let user = auth::current_user(&state)?;
    let storage = Storage::open_with_data_dir(data_dir)?;
    Ok((user, storage))
}

/// Display name for reports: config override > session/env name.
fn report_name(data_dir: &Path, user: &UserIdentity) -> Result<String> {
    let config = Config::load_from(data_dir)?;
    Ok(config.user_name.unwrap_or_else(|| user.name.clone()))
}

/// One read-modify-write cycle against the user's document.
fn modify<T>(
    storage: &Storage,
    uid: &str,
    f: impl FnOnce(&mut TaskDocument) -> Result<T>,
) -> Result<T> {
    let versioned = storage.read(uid)?;
    let mut doc = versioned.doc;
    let out = f(&mut doc)?;
    storage.replace(uid, &doc, versioned.version)?;
    Ok(out)
}

/// Find a task by exact id or unique id prefix.
fn find_task_index(doc: &TaskDocument, id: &str) -> Result<usize> {
    if let Some(idx) = doc.task_list.iter().position(|t| t.id == id) {
        return Ok(idx);
    }
    let matches: Vec<usize> = doc
        .task_list
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id.starts_with(id))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(Error::NotFound(format!("task {}", id))),
        _ => Err(Error::InvalidInput(format!(
            "task id prefix '{}' is ambiguous",
            id
        ))),
    }
}

/// Find a subtask within a task by exact id or unique id prefix.
fn find_subtask_index(task: &Task, id: &str) -> Result<usize> {
    if let Some(idx) = task.subtasks.iter().position(|s| s.id == id) {
        return Ok(idx);
    }
    let matches: Vec<usize> = task
        .subtasks
        .iter()
        .enumerate()
        .filter(|(_, s)| s.id.starts_with(id))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(Error::NotFound(format!("subtask {}", id))),
        _ => Err(Error::InvalidInput(format!(
            "subtask id prefix '{}' is ambiguous",
            id
        ))),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Resolve a subtask id (exact or unique prefix) across unfinished tasks.
fn resolve_report_subtask(unfinished: &[&Task], id: &str) -> Result<String> {
    let candidates: Vec<&SubTask> = unfinished
        .iter()
        .flat_map(|t| t.subtasks.iter())
        .collect();
    if let Some(sub) = candidates.iter().find(|s| s.id == id) {
        return Ok(sub.id.clone());
    }
    let matches: Vec<&SubTask> = candidates
        .into_iter()
        .filter(|s| s.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(Error::NotFound(format!(
            "subtask {} (among unfinished tasks)",
            id
        ))),
        _ => Err(Error::InvalidInput(format!(
            "subtask id prefix '{}' is ambiguous",
            id
        ))),
    }
}

// === Auth ===

#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub uid: String,
    pub name: String,
    pub email: String,
}

impl Output for LoginResult {
    fn human(&self) -> String {
        format!("Logged in as {} <{}>", self.name, self.email)
    }
}

pub fn auth_login(data_dir: &Path, email: &str, password: &str) -> Result<LoginResult> {
    let config = Config::load_from(data_dir)?;
    let resp = auth::sign_in(&config.auth, email, password)?;

    let session = Session {
        uid: resp.local_id.clone(),
        name: resp.display_name.clone(),
        email: resp.email.clone(),
        id_token: resp.id_token,
        logged_in_at: Utc::now(),
    };
    State {
        session: Some(session),
    }
    .save_to(data_dir)?;

    Ok(LoginResult {
        uid: resp.local_id,
        name: resp.display_name,
        email: resp.email,
    })
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
    pub purged: bool,
}

impl Output for LogoutResult {
    fn human(&self) -> String {
        let mut out = if self.logged_out {
            "Logged out".to_string()
        } else {
            "No active session".to_string()
        };
        if self.purged {
            out.push_str(" (task document deleted)");
        }
        out
    }
}

pub fn auth_logout(data_dir: &Path, purge: bool) -> Result<LogoutResult> {
    let state = State::load_from(data_dir)?;
    let logged_out = state.session.is_some();

    let purged = if purge {
        let user = auth::current_user(&state)?;
        let storage = Storage::open_with_data_dir(data_dir)?;
        storage.delete(&user.uid)?
    } else {
        false
    };

    State::default().save_to(data_dir)?;
    Ok(LogoutResult { logged_out, purged })
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResult {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Output for AuthStatusResult {
    fn human(&self) -> String {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => format!("Logged in as {} <{}>", name, email),
            (Some(name), None) => format!("Acting as {} (from environment)", name),
            _ => "Not logged in".to_string(),
        }
    }
}

pub fn auth_status(data_dir: &Path) -> Result<AuthStatusResult> {
    let state = State::load_from(data_dir)?;
    match auth::current_user(&state) {
        Ok(user) => {
            let email = state.session.as_ref().and_then(|s| {
                if s.uid == user.uid {
                    Some(s.email.clone())
                } else {
                    None
                }
            });
            Ok(AuthStatusResult {
                logged_in: true,
                uid: Some(user.uid),
                name: Some(user.name),
                email,
            })
        }
        Err(Error::NotLoggedIn) => Ok(AuthStatusResult {
            logged_in: false,
            uid: None,
            name: None,
            email: None,
        }),
        Err(e) => Err(e),
    }
}

// === Tasks ===

#[derive(Debug, Serialize)]
pub struct TaskAddResult {
    pub task: Task,
}

impl Output for TaskAddResult {
    fn human(&self) -> String {
        format!(
            "Created task {} \"{}\" with {} subtask(s)",
            short_id(&self.task.id),
            self.task.title,
            self.task.subtasks.len()
        )
    }
}

pub fn task_add(
    data_dir: &Path,
    title: &str,
    status: Option<&str>,
    subtask_titles: &[String],
) -> Result<TaskAddResult> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("task title must not be empty".to_string()));
    }
    let titles: Vec<&str> = subtask_titles
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if titles.is_empty() {
        return Err(Error::InvalidInput(
            "a task needs at least one subtask (use --subtask)".to_string(),
        ));
    }

    let mut task = Task::new(title.trim());
    if let Some(raw) = status {
        task.status = parse_status(raw)?;
    }
    for sub_title in titles {
        task.subtasks.push(SubTask::new(sub_title));
    }

    let (user, storage) = user_and_store(data_dir)?;
    let task = modify(&storage, &user.uid, |doc| {
        doc.task_list.push(task.clone());
        Ok(task.clone())
    })?;

    Ok(TaskAddResult { task })
}

#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub completed_subtasks: usize,
    pub total_subtasks: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskGroup {
    pub status: TaskStatus,
    pub count: usize,
    pub tasks: Vec<TaskSummary>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResult {
    pub groups: Vec<TaskGroup>,
    pub total: usize,
}

impl Output for TaskListResult {
    fn human(&self) -> String {
        if self.total == 0 {
            return "No tasks yet. Add your first task with `td task add`.".to_string();
        }
        let mut out = String::new();
        for group in &self.groups {
            if group.count == 0 {
                continue;
            }
            out.push_str(&format!("{} ({})\n", capitalize(group.status.as_str()), group.count));
            for task in &group.tasks {
                out.push_str(&format!(
                    "  {}  {}  [{}/{}]\n",
                    short_id(&task.id),
                    task.title,
                    task.completed_subtasks,
                    task.total_subtasks
                ));
            }
        }
        out.trim_end().to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn task_list(data_dir: &Path, status: Option<&str>) -> Result<TaskListResult> {
    let filter = status.map(parse_status).transpose()?;
    let (user, storage) = user_and_store(data_dir)?;
    let doc = storage.read(&user.uid)?.doc;

    let statuses: Vec<TaskStatus> = TaskStatus::all()
        .iter()
        .copied()
        .filter(|s| filter.map(|f| f == *s).unwrap_or(true))
        .collect();

    let groups: Vec<TaskGroup> = statuses
        .into_iter()
        .map(|status| {
            let tasks: Vec<TaskSummary> = doc
                .with_status(status)
                .into_iter()
                .map(|t| TaskSummary {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    status: t.status,
                    completed_subtasks: t.completed_count(),
                    total_subtasks: t.subtasks.len(),
                })
                .collect();
            TaskGroup {
                status,
                count: tasks.len(),
                tasks,
            }
        })
        .collect();

    let total = groups.iter().map(|g| g.count).sum();
    Ok(TaskListResult { groups, total })
}

#[derive(Debug, Serialize)]
pub struct TaskShowResult {
    pub task: Task,
}

impl Output for TaskShowResult {
    fn human(&self) -> String {
        let mut out = format!(
            "{}  {}  ({})\n",
            short_id(&self.task.id),
            self.task.title,
            self.task.status
        );
        for subtask in &self.task.subtasks {
            out.push_str(&format!(
                "  [{}] {}  {}\n",
                if subtask.completed { "x" } else { " " },
                short_id(&subtask.id),
                subtask.title
            ));
        }
        out.trim_end().to_string()
    }
}

pub fn task_show(data_dir: &Path, id: &str) -> Result<TaskShowResult> {
    let (user, storage) = user_and_store(data_dir)?;
    let doc = storage.read(&user.uid)?.doc;
    let idx = find_task_index(&doc, id)?;
    Ok(TaskShowResult {
        task: doc.task_list[idx].clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResult {
    pub id: String,
    pub status: TaskStatus,
}

impl Output for TaskStatusResult {
    fn human(&self) -> String {
        format!("Task {} is now {}", short_id(&self.id), self.status)
    }
}

/// Set a task's status. Subtasks are never touched by this path.
pub fn task_status(data_dir: &Path, id: &str, status: &str) -> Result<TaskStatusResult> {
    let new_status = parse_status(status)?;
    let (user, storage) = user_and_store(data_dir)?;
    modify(&storage, &user.uid, |doc| {
        let idx = find_task_index(doc, id)?;
        let task = &mut doc.task_list[idx];
        task.status = new_status;
        Ok(TaskStatusResult {
            id: task.id.clone(),
            status: new_status,
        })
    })
}

#[derive(Debug, Serialize)]
pub struct TaskDeleteResult {
    pub id: String,
    pub title: String,
    pub deleted_subtasks: usize,
}

impl Output for TaskDeleteResult {
    fn human(&self) -> String {
        format!(
            "Deleted task {} \"{}\" and {} subtask(s)",
            short_id(&self.id),
            self.title,
            self.deleted_subtasks
        )
    }
}

/// Delete a task; its subtasks go with it (containment).
pub fn task_delete(data_dir: &Path, id: &str) -> Result<TaskDeleteResult> {
    let (user, storage) = user_and_store(data_dir)?;
    modify(&storage, &user.uid, |doc| {
        let idx = find_task_index(doc, id)?;
        let task = doc.task_list.remove(idx);
        Ok(TaskDeleteResult {
            id: task.id,
            title: task.title,
            deleted_subtasks: task.subtasks.len(),
        })
    })
}

/// Direction for a same-status move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct TaskMoveResult {
    pub id: String,
    pub moved: bool,
}

impl Output for TaskMoveResult {
    fn human(&self) -> String {
        if self.moved {
            "Task moved".to_string()
        } else {
            "Task is already at the edge of its status group".to_string()
        }
    }
}

/// Swap the task with its nearest same-status neighbor. No-op when the task
/// is first/last in the list or has no same-status neighbor in that
/// direction.
pub fn task_move(data_dir: &Path, id: &str, direction: MoveDirection) -> Result<TaskMoveResult> {
    let (user, storage) = user_and_store(data_dir)?;
    let versioned = storage.read(&user.uid)?;
    let mut doc = versioned.doc;

    let idx = find_task_index(&doc, id)?;
    let task_id = doc.task_list[idx].id.clone();
    let status = doc.task_list[idx].status;

    let neighbor = match direction {
        MoveDirection::Up => doc.task_list[..idx]
            .iter()
            .rposition(|t| t.status == status),
        MoveDirection::Down => doc.task_list[idx + 1..]
            .iter()
            .position(|t| t.status == status)
            .map(|offset| idx + 1 + offset),
    };

    match neighbor {
        Some(other) => {
            doc.task_list.swap(idx, other);
            storage.replace(&user.uid, &doc, versioned.version)?;
            Ok(TaskMoveResult {
                id: task_id,
                moved: true,
            })
        }
        None => Ok(TaskMoveResult {
            id: task_id,
            moved: false,
        }),
    }
}

// === Subtasks ===

#[derive(Debug, Serialize)]
pub struct SubtaskAddResult {
    pub task_id: String,
    pub subtask: SubTask,
}

impl Output for SubtaskAddResult {
    fn human(&self) -> String {
        format!(
            "Added subtask {} \"{}\" to task {}",
            short_id(&self.subtask.id),
            self.subtask.title,
            short_id(&self.task_id)
        )
    }
}

pub fn subtask_add(data_dir: &Path, task_id: &str, title: &str) -> Result<SubtaskAddResult> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput(
            "subtask title must not be empty".to_string(),
        ));
    }
    let (user, storage) = user_and_store(data_dir)?;
    modify(&storage, &user.uid, |doc| {
        let idx = find_task_index(doc, task_id)?;
        let task = &mut doc.task_list[idx];
        let subtask = SubTask::new(title.trim());
        task.subtasks.push(subtask.clone());
        Ok(SubtaskAddResult {
            task_id: task.id.clone(),
            subtask,
        })
    })
}

#[derive(Debug, Serialize)]
pub struct SubtaskToggleResult {
    pub task_id: String,
    pub subtask_id: String,
    pub completed: bool,
    pub task_status: TaskStatus,
}

impl Output for SubtaskToggleResult {
    fn human(&self) -> String {
        let mut out = format!(
            "Subtask {} is now {}",
            short_id(&self.subtask_id),
            if self.completed {
                "completed"
            } else {
                "unchecked"
            }
        );
        if self.task_status == TaskStatus::Completed && self.completed {
            out.push_str(&format!(
                " (task {} completed)",
                short_id(&self.task_id)
            ));
        }
        out
    }
}

/// Toggle a subtask. When every subtask ends up completed the parent task
/// flips to completed; un-toggling later never flips it back.
pub fn subtask_toggle(
    data_dir: &Path,
    task_id: &str,
    subtask_id: &str,
) -> Result<SubtaskToggleResult> {
    let (user, storage) = user_and_store(data_dir)?;
    modify(&storage, &user.uid, |doc| {
        let idx = find_task_index(doc, task_id)?;
        let task = &mut doc.task_list[idx];
        let sub_idx = find_subtask_index(task, subtask_id)?;

        task.subtasks[sub_idx].completed = !task.subtasks[sub_idx].completed;
        if task.all_subtasks_completed() {
            task.status = TaskStatus::Completed;
        }

        Ok(SubtaskToggleResult {
            task_id: task.id.clone(),
            subtask_id: task.subtasks[sub_idx].id.clone(),
            completed: task.subtasks[sub_idx].completed,
            task_status: task.status,
        })
    })
}

#[derive(Debug, Serialize)]
pub struct SubtaskDeleteResult {
    pub task_id: String,
    pub subtask_id: String,
    pub title: String,
}

impl Output for SubtaskDeleteResult {
    fn human(&self) -> String {
        format!(
            "Deleted subtask {} \"{}\"",
            short_id(&self.subtask_id),
            self.title
        )
    }
}

pub fn subtask_delete(
    data_dir: &Path,
    task_id: &str,
    subtask_id: &str,
) -> Result<SubtaskDeleteResult> {
    let (user, storage) = user_and_store(data_dir)?;
    modify(&storage, &user.uid, |doc| {
        let idx = find_task_index(doc, task_id)?;
        let task = &mut doc.task_list[idx];
        let sub_idx = find_subtask_index(task, subtask_id)?;
        let subtask = task.subtasks.remove(sub_idx);
        Ok(SubtaskDeleteResult {
            task_id: task.id.clone(),
            subtask_id: subtask.id,
            title: subtask.title,
        })
    })
}

// === Assistant ===

#[derive(Debug, Serialize)]
pub struct AssistantAskResult {
    pub message: String,
    pub is_task: bool,
    pub tasks: Vec<Task>,
    pub mentioned_tasks: Vec<String>,
    pub applied_tasks: usize,
    pub applied_actions: usize,
}

impl Output for AssistantAskResult {
    fn human(&self) -> String {
        let mut out = self.message.clone();
        if self.is_task && !self.tasks.is_empty() {
            out.push_str("\n\nDetected tasks:");
            for task in &self.tasks {
                out.push_str(&format!(
                    "\n  {} ({}, {} subtask(s))",
                    task.title,
                    task.status,
                    task.subtasks.len()
                ));
            }
        }
        if self.applied_tasks > 0 || self.applied_actions > 0 {
            out.push_str(&format!(
                "\n\nAdded {} task(s) and applied {} action(s) to your list.",
                self.applied_tasks, self.applied_actions
            ));
        }
        out
    }
}

/// Send free text to the assistant; with `apply`, merge the reply into the
/// user's document.
pub fn assistant_ask(data_dir: &Path, text: &str, apply: bool) -> Result<AssistantAskResult> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("nothing to ask".to_string()));
    }

    let config = Config::load_from(data_dir)?;
    let (user, storage) = user_and_store(data_dir)?;
    let versioned = storage.read(&user.uid)?;

    let mentioned: Vec<String> = assistant::mentioned_tasks(text, &versioned.doc.task_list)
        .into_iter()
        .map(|t| t.title.clone())
        .collect();

    let mut reply = assistant::ask(&config.assistant, text)?;

    let (applied_tasks, applied_actions) = if apply && reply.is_task {
        assistant::reassign_ids(&mut reply.tasks);
        let mut doc = versioned.doc.clone();
        let added = reply.tasks.len();
        doc.task_list.extend(reply.tasks.iter().cloned());

        let mut actions = 0;
        for action in &reply.actions {
            if let AssistantAction::AddSubtask { task_id, subtask } = action {
                if let Some(task) = doc.find_mut(task_id) {
                    let mut new_subtask = SubTask::new(subtask.title.clone());
                    new_subtask.completed = subtask.completed;
                    task.subtasks.push(new_subtask);
                    actions += 1;
                }
            }
        }

        storage.replace(&user.uid, &doc, versioned.version)?;
        (added, actions)
    } else {
        (0, 0)
    };

    Ok(AssistantAskResult {
        message: reply.message,
        is_task: reply.is_task,
        tasks: reply.tasks,
        mentioned_tasks: mentioned,
        applied_tasks,
        applied_actions,
    })
}

// === Reports ===

#[derive(Debug, Serialize)]
pub struct ReportResult {
    pub file: String,
    pub tasks: usize,
    pub subtasks: usize,
}

impl Output for ReportResult {
    fn human(&self) -> String {
        format!(
            "Report written to \"{}\" ({} task(s), {} subtask(s))",
            self.file, self.tasks, self.subtasks
        )
    }
}

fn out_path(out: Option<&Path>, filename: &str) -> PathBuf {
    match out {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Export the todo-list document from selected subtasks of unfinished tasks.
pub fn report_todo(
    data_dir: &Path,
    subtask_ids: &[String],
    all: bool,
    out: Option<&Path>,
) -> Result<ReportResult> {
    let (user, storage) = user_and_store(data_dir)?;
    let doc = storage.read(&user.uid)?.doc;

    let unfinished: Vec<&Task> = doc
        .task_list
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .collect();

    let selected: HashSet<String> = if all {
        unfinished
            .iter()
            .flat_map(|t| t.subtasks.iter().map(|s| s.id.clone()))
            .collect()
    } else {
        let mut set = HashSet::new();
        for id in subtask_ids {
            set.insert(resolve_report_subtask(&unfinished, id)?);
        }
        set
    };

    if selected.is_empty() {
        return Err(Error::InvalidInput(if all {
            "no subtasks to export: the unfinished tasks have none".to_string()
        } else {
            "no subtasks selected: pass --subtask <id> or --all".to_string()
        }));
    }

    let selection = report::todo_selection(&doc.task_list, &selected);
    let name = report_name(data_dir, &user)?;
    let pars = report::todo_paragraphs(&name, &selection);

    let filename = report::todo_filename(&name, Utc::now());
    let path = out_path(out, &filename);
    report::write_docx(&pars, false, &path)?;

    Ok(ReportResult {
        file: path.to_string_lossy().to_string(),
        tasks: selection.len(),
        subtasks: selection.iter().map(|(_, subs)| subs.len()).sum(),
    })
}

/// Options shaping the monthly report clone before export.
#[derive(Debug, Default)]
pub struct MonthlyOptions {
    pub skip_tasks: Vec<String>,
    pub skip_subtasks: Vec<String>,
    pub cycle_subtasks: Vec<String>,
}

/// Export the monthly-report document.
pub fn report_monthly(
    data_dir: &Path,
    answers: &ReviewAnswers,
    options: &MonthlyOptions,
    out: Option<&Path>,
) -> Result<ReportResult> {
    answers.validate()?;

    let (user, storage) = user_and_store(data_dir)?;
    let doc = storage.read(&user.uid)?.doc;

    let mut tasks = report::transform_tasks(&doc.task_list);

    // Report-only edits: the stored document is never touched here.
    tasks.retain(|t| {
        !options
            .skip_tasks
            .iter()
            .any(|id| t.id == *id || t.id.starts_with(id))
    });
    for task in &mut tasks {
        task.subtasks.retain(|s| {
            !options
                .skip_subtasks
                .iter()
                .any(|id| s.id == *id || s.id.starts_with(id))
        });
        for id in &options.cycle_subtasks {
            if let Some(subtask) = task
                .subtasks
                .iter_mut()
                .find(|s| s.id == *id || s.id.starts_with(id))
            {
                subtask.status = subtask.status.next();
            }
        }
    }

    if tasks.is_empty() {
        return Err(Error::InvalidInput(
            "no tasks to report this month".to_string(),
        ));
    }

    let name = report_name(data_dir, &user)?;
    let now = Utc::now();
    let pars = report::monthly_paragraphs(&name, &report::month_year(now), &tasks, answers);

    let filename = report::monthly_filename(&name, now);
    let path = out_path(out, &filename);
    report::write_docx(&pars, true, &path)?;

    Ok(ReportResult {
        file: path.to_string_lossy().to_string(),
        tasks: tasks.len(),
        subtasks: tasks.iter().map(|t| t.subtasks.len()).sum(),
    })
}
