//! Word-document report exporters.
//!
//! Two document types: the todo list (selected subtasks of non-completed
//! tasks) and the monthly report (all tasks with review answers). Both build
//! a deterministic paragraph list first and hand it to `docx-rs` for packing,
//! so the mapping from records to document content is testable without
//! parsing `.docx` output.

use crate::models::{SubTask, Task, TaskStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use docx_rs::{
    AlignmentType, Docx, PageMargin, Paragraph, Run, RunFonts, SpecialIndentType,
};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

const COLOR_GRAY: &str = "515151";
const COLOR_HEADING: &str = "2B579A";
const COLOR_DARK: &str = "2F2F2F";
const COLOR_BODY: &str = "404040";
const COLOR_DONE: &str = "217346";

/// Paragraph alignment for the intermediate representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParAlign {
    Left,
    Center,
}

/// One styled paragraph of report output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Par {
    pub text: String,
    pub bold: bool,
    /// Font size in half-points (docx convention)
    pub size: usize,
    pub color: &'static str,
    pub align: ParAlign,
    /// Left indent in twips, with a hanging indent for bullet lines
    pub indent: Option<(i32, i32)>,
    pub font: Option<&'static str>,
}

impl Par {
    fn new(text: impl Into<String>, size: usize, color: &'static str) -> Self {
        Self {
            text: text.into(),
            bold: false,
            size,
            color,
            align: ParAlign::Left,
            indent: None,
            font: None,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn center(mut self) -> Self {
        self.align = ParAlign::Center;
        self
    }

    fn indented(mut self, left: i32, hanging: i32) -> Self {
        self.indent = Some((left, hanging));
        self
    }

    fn calibri(mut self) -> Self {
        self.font = Some("Calibri");
        self
    }
}

// === Todo list ===

/// Per-task selection: each non-completed task paired with exactly the
/// selected subtasks, tasks with no selected subtask omitted.
pub fn todo_selection<'a>(
    tasks: &'a [Task],
    selected: &HashSet<String>,
) -> Vec<(&'a Task, Vec<&'a SubTask>)> {
    tasks
        .iter()
        .filter(|task| task.status != TaskStatus::Completed)
        .filter_map(|task| {
            let picked: Vec<&SubTask> = task
                .subtasks
                .iter()
                .filter(|s| selected.contains(&s.id))
                .collect();
            if picked.is_empty() {
                None
            } else {
                Some((task, picked))
            }
        })
        .collect()
}

/// Paragraphs for the todo-list document.
pub fn todo_paragraphs(user_name: &str, selection: &[(&Task, Vec<&SubTask>)]) -> Vec<Par> {
    let mut pars = vec![
        Par::new(format!("{} To Do List", user_name), 32, COLOR_GRAY)
            .bold()
            .center(),
        Par::new("Today's Tasks", 26, COLOR_GRAY).bold().center(),
    ];

    for (task, subtasks) in selection {
        pars.push(Par::new(format!("\u{2022} {}", task.title), 24, COLOR_GRAY).bold());
        for subtask in subtasks {
            pars.push(Par::new(
                format!("    \u{25cb} {}", subtask.title),
                20,
                COLOR_GRAY,
            ));
        }
    }

    pars
}

/// Todo-list filename: `"{name} - {dd-MM-yy} - To Do List.docx"`.
pub fn todo_filename(user_name: &str, date: DateTime<Utc>) -> String {
    format!(
        "{} - {} - To Do List.docx",
        user_name,
        date.format("%d-%m-%y")
    )
}

// === Monthly report ===

/// A subtask cloned for report display, with a derived three-state status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSubTask {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
}

/// A task cloned for report display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTask {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub subtasks: Vec<ReportSubTask>,
}

/// Display-only status for a cloned subtask: completed when checked,
/// otherwise the parent's pending/running; a completed parent completes
/// everything. This is the one place a task status flows down to subtasks.
pub fn derived_status(task_status: TaskStatus, completed: bool) -> TaskStatus {
    match task_status {
        TaskStatus::Completed => TaskStatus::Completed,
        _ if completed => TaskStatus::Completed,
        other => other,
    }
}

/// Clone the task list into report form.
pub fn transform_tasks(tasks: &[Task]) -> Vec<ReportTask> {
    tasks
        .iter()
        .map(|task| ReportTask {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            subtasks: task
                .subtasks
                .iter()
                .map(|s| ReportSubTask {
                    id: s.id.clone(),
                    title: s.title.clone(),
                    status: derived_status(task.status, s.completed),
                })
                .collect(),
        })
        .collect()
}

/// Monthly-review answers attached below the task sections.
#[derive(Debug, Clone, Default)]
pub struct ReviewAnswers {
    /// "Yes" or "No"
    pub tasks_completed: String,
    /// Required when `tasks_completed` is "No"
    pub reason_if_no: Option<String>,
    pub new_learnings: String,
    /// Percentage of last month's target achieved
    pub last_month_target: String,
    pub suggestions: String,
}

impl ReviewAnswers {
    pub fn validate(&self) -> Result<()> {
        let yn = self.tasks_completed.to_lowercase();
        if yn != "yes" && yn != "no" {
            return Err(Error::InvalidInput(
                "--tasks-completed must be Yes or No".to_string(),
            ));
        }
        if yn == "no" && self.reason_if_no.as_deref().unwrap_or("").trim().is_empty() {
            return Err(Error::InvalidInput(
                "--reason is required when --tasks-completed is No".to_string(),
            ));
        }
        for (flag, value) in [
            ("--learnings", &self.new_learnings),
            ("--target-percent", &self.last_month_target),
            ("--suggestions", &self.suggestions),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} must not be empty", flag)));
            }
        }
        Ok(())
    }
}

fn subtask_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => COLOR_DONE,
        TaskStatus::Running => COLOR_HEADING,
        TaskStatus::Pending => COLOR_BODY,
    }
}

fn question(pars: &mut Vec<Par>, prompt: &str, answer: &str) {
    pars.push(Par::new(prompt, 24, COLOR_DARK).bold().calibri());
    pars.push(Par::new(answer, 24, COLOR_BODY).calibri());
}

/// Paragraphs for the monthly-report document.
pub fn monthly_paragraphs(
    user_name: &str,
    month_year: &str,
    tasks: &[ReportTask],
    answers: &ReviewAnswers,
) -> Vec<Par> {
    let mut pars = vec![
        Par::new(user_name, 36, COLOR_HEADING).bold().center().calibri(),
        Par::new(format!("Monthly Report - {}", month_year), 32, COLOR_HEADING)
            .bold()
            .center()
            .calibri(),
    ];

    for task in tasks {
        pars.push(Par::new(&task.title, 28, COLOR_DARK).bold().calibri());
        for subtask in &task.subtasks {
            pars.push(
                Par::new(
                    format!("\u{2022} {}", subtask.title),
                    24,
                    subtask_color(subtask.status),
                )
                .indented(720, 180)
                .calibri(),
            );
        }
    }

    pars.push(Par::new("Monthly Review", 32, COLOR_HEADING).bold().calibri());

    question(
        &mut pars,
        "Have you completed all the tasks you got in this month?",
        &answers.tasks_completed,
    );
    if answers.tasks_completed.to_lowercase() == "no" {
        question(
            &mut pars,
            "Reason for incomplete tasks:",
            answers.reason_if_no.as_deref().unwrap_or(""),
        );
    }
    question(&mut pars, "New learnings this month:", &answers.new_learnings);
    question(
        &mut pars,
        "Last month's target achievement:",
        &format!("{}%", answers.last_month_target),
    );
    question(
        &mut pars,
        "Suggestions for improvement:",
        &answers.suggestions,
    );

    pars
}

/// Month header, e.g. "March 2026".
pub fn month_year(date: DateTime<Utc>) -> String {
    date.format("%B %Y").to_string()
}

/// Monthly-report filename: `"{name} - Monthly Report - {Month YYYY}.docx"`.
pub fn monthly_filename(user_name: &str, date: DateTime<Utc>) -> String {
    format!(
        "{} - Monthly Report - {}.docx",
        user_name,
        month_year(date)
    )
}

// === Packing ===

/// Render paragraphs to a `.docx` file. `wide_margins` applies the monthly
/// report's 1in/1.25in page margins.
pub fn write_docx(pars: &[Par], wide_margins: bool, path: &Path) -> Result<()> {
    let mut docx = Docx::new();

    if wide_margins {
        docx = docx.page_margin(
            PageMargin::new().top(1440).bottom(1440).left(1800).right(1800),
        );
    }

    for par in pars {
        let mut run = Run::new().add_text(par.text.as_str()).size(par.size);
        if par.bold {
            run = run.bold();
        }
        run = run.color(par.color);
        if let Some(font) = par.font {
            run = run.fonts(RunFonts::new().ascii(font));
        }

        let mut paragraph = Paragraph::new().add_run(run);
        if par.align == ParAlign::Center {
            paragraph = paragraph.align(AlignmentType::Center);
        }
        if let Some((left, hanging)) = par.indent {
            paragraph = paragraph.indent(
                Some(left),
                Some(SpecialIndentType::Hanging(hanging)),
                None,
                None,
            );
        }
        docx = docx.add_paragraph(paragraph);
    }

    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(docx_rs::DocxError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, status: TaskStatus, subtasks: &[(&str, bool)]) -> Task {
        let mut t = Task::new(title);
        t.status = status;
        for (sub_title, completed) in subtasks {
            let mut s = SubTask::new(*sub_title);
            s.completed = *completed;
            t.subtasks.push(s);
        }
        t
    }

    #[test]
    fn test_todo_selection_contains_exactly_checked_subtasks() {
        let tasks = vec![
            task("Website", TaskStatus::Running, &[("deploy", false), ("test", false)]),
            task("Docs", TaskStatus::Pending, &[("outline", false)]),
        ];
        let selected: HashSet<String> = [
            tasks[0].subtasks[0].id.clone(),
            tasks[1].subtasks[0].id.clone(),
        ]
        .into();

        let selection = todo_selection(&tasks, &selected);
        let included: Vec<&str> = selection
            .iter()
            .flat_map(|(_, subs)| subs.iter().map(|s| s.title.as_str()))
            .collect();
        assert_eq!(included, vec!["deploy", "outline"]);
    }

    #[test]
    fn test_todo_selection_skips_completed_tasks() {
        let tasks = vec![task("Done", TaskStatus::Completed, &[("a", true)])];
        let selected: HashSet<String> = [tasks[0].subtasks[0].id.clone()].into();
        assert!(todo_selection(&tasks, &selected).is_empty());
    }

    #[test]
    fn test_todo_selection_omits_tasks_with_nothing_selected() {
        let tasks = vec![
            task("Picked", TaskStatus::Pending, &[("x", false)]),
            task("Unpicked", TaskStatus::Pending, &[("y", false)]),
        ];
        let selected: HashSet<String> = [tasks[0].subtasks[0].id.clone()].into();

        let selection = todo_selection(&tasks, &selected);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].0.title, "Picked");
    }

    #[test]
    fn test_todo_paragraph_shape() {
        let tasks = vec![task("Website", TaskStatus::Pending, &[("deploy", false)])];
        let selected: HashSet<String> = [tasks[0].subtasks[0].id.clone()].into();
        let selection = todo_selection(&tasks, &selected);

        let pars = todo_paragraphs("Alice", &selection);
        assert_eq!(pars[0].text, "Alice To Do List");
        assert_eq!(pars[0].align, ParAlign::Center);
        assert!(pars.iter().any(|p| p.text == "\u{2022} Website" && p.bold));
        assert!(pars.iter().any(|p| p.text.contains("\u{25cb} deploy")));
    }

    #[test]
    fn test_derived_status_matrix() {
        use TaskStatus::*;
        assert_eq!(derived_status(Pending, false), Pending);
        assert_eq!(derived_status(Pending, true), Completed);
        assert_eq!(derived_status(Running, false), Running);
        assert_eq!(derived_status(Running, true), Completed);
        assert_eq!(derived_status(Completed, false), Completed);
        assert_eq!(derived_status(Completed, true), Completed);
    }

    #[test]
    fn test_transform_keeps_order_and_ids() {
        let tasks = vec![task(
            "Website",
            TaskStatus::Running,
            &[("deploy", true), ("test", false)],
        )];
        let report = transform_tasks(&tasks);
        assert_eq!(report[0].id, tasks[0].id);
        assert_eq!(report[0].subtasks[0].status, TaskStatus::Completed);
        assert_eq!(report[0].subtasks[1].status, TaskStatus::Running);
    }

    #[test]
    fn test_answers_require_reason_on_no() {
        let mut answers = ReviewAnswers {
            tasks_completed: "No".to_string(),
            reason_if_no: None,
            new_learnings: "rust".to_string(),
            last_month_target: "80".to_string(),
            suggestions: "none".to_string(),
        };
        assert!(answers.validate().is_err());

        answers.reason_if_no = Some("blocked on review".to_string());
        assert!(answers.validate().is_ok());

        answers.tasks_completed = "maybe".to_string();
        assert!(answers.validate().is_err());
    }

    #[test]
    fn test_monthly_paragraphs_include_review_block() {
        let tasks = transform_tasks(&[task("T", TaskStatus::Pending, &[("s", true)])]);
        let answers = ReviewAnswers {
            tasks_completed: "Yes".to_string(),
            reason_if_no: None,
            new_learnings: "learned".to_string(),
            last_month_target: "90".to_string(),
            suggestions: "more pairing".to_string(),
        };
        let pars = monthly_paragraphs("Alice", "March 2026", &tasks, &answers);

        assert_eq!(pars[0].text, "Alice");
        assert!(pars.iter().any(|p| p.text == "Monthly Report - March 2026"));
        assert!(pars.iter().any(|p| p.text == "Monthly Review"));
        assert!(pars.iter().any(|p| p.text == "90%"));
        // No reason paragraph when the answer is Yes.
        assert!(!pars.iter().any(|p| p.text.contains("Reason for incomplete")));
    }

    #[test]
    fn test_filenames() {
        let date = DateTime::parse_from_rfc3339("2026-03-09T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            todo_filename("Alice", date),
            "Alice - 09-03-26 - To Do List.docx"
        );
        assert_eq!(
            monthly_filename("Alice", date),
            "Alice - Monthly Report - March 2026.docx"
        );
    }

    #[test]
    fn test_write_docx_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.docx");
        let pars = vec![Par::new("hello", 24, COLOR_BODY)];
        write_docx(&pars, true, &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_write_docx_packs_every_style() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("styled.docx");
        let pars = vec![
            Par::new("Heading", 32, COLOR_HEADING).bold().center().calibri(),
            Par::new("\u{2022} bullet", 24, COLOR_DONE).indented(720, 180),
            Par::new("body", 20, COLOR_GRAY),
        ];
        write_docx(&pars, false, &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
