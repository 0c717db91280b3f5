//! Text-in/JSON-out adapter to the hosted generative-text endpoint.
//!
//! The adapter is deliberately thin: it sends a fixed instruction template
//! plus the user's text to the `generateContent` endpoint, strips markdown
//! code fences from the reply, and attempts a JSON parse. Malformed model
//! output never becomes an error; it degrades to a fixed apology message.
//! There is no retry, no rate limiting, and no schema validation beyond the
//! parse attempt.

use crate::config::AssistantConfig;
use crate::models::Task;
use serde::{Deserialize, Serialize};

/// Fallback when the model's reply is not valid JSON.
const PARSE_FALLBACK: &str =
    "I encountered an error processing your request. Please try rephrasing your input.";

/// Fallback when the request itself fails.
const REQUEST_FALLBACK: &str =
    "I'm sorry, I encountered an error processing your request. Please try again.";

/// Instruction template sent ahead of the user input.
const INSTRUCTIONS: &str = r#"INSTRUCTIONS:
You are an AI task analyzer for a task management application. Your role is to accurately identify and structure task-related input into JSON format.

TASK DETECTION RULES:
1. Multiple Main Tasks:
   - Each distinct project or category should be a separate main task
   - Look for clear separators between main tasks (new lines, numbers, project names)
   - Each main task should have its own subtasks

2. Task Hierarchy:
   - Main tasks are independent projects or categories
   - Each main task must maintain its own set of subtasks
   - Never merge different main tasks into one

3. Task Context Understanding:
   - Understand when the user is referring to existing tasks (mentioned with @ symbol)
   - Recognize when the user wants to modify existing tasks vs. create new ones

4. Natural Language Processing:
   - Extract tasks from conversational language
   - Convert vague descriptions into actionable tasks

OUTPUT FORMAT:
{
  "isTask": true,
  "tasks": [
    {
      "id": "unique-id-1",
      "title": "Task Title",
      "status": "pending",
      "subtasks": [
        {
          "id": "subtask-id-1",
          "title": "Subtask Description",
          "completed": false
        }
      ]
    }
  ],
  "message": "Confirmation message",
  "actions": [
    {
      "type": "ADD_SUBTASK",
      "taskId": "existing-task-id",
      "subtask": {
        "title": "New Subtask",
        "completed": false
      }
    }
  ]
}

IMPORTANT:
- Always create separate main tasks for distinct projects
- Generate unique IDs for each task and subtask
- Always format tasks and subtasks in professional English, with correct grammar and spelling
- When tasks are mentioned with the @ symbol, reference them by their existing id in actions
- Break down complex tasks into manageable subtasks
- Suggest an appropriate task status based on context (pending, running, completed)

For normal conversation, return only this JSON:
{
  "isTask": false,
  "message": "Your helpful conversational response here"
}
"#;

/// A subtask proposed inside an action (no id yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedSubtask {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A structured follow-up the model may suggest alongside new tasks.
///
/// Only `ADD_SUBTASK` is acted on; anything else parses into `Unknown` and is
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssistantAction {
    #[serde(rename = "ADD_SUBTASK")]
    AddSubtask {
        #[serde(rename = "taskId")]
        task_id: String,
        subtask: ProposedSubtask,
    },
    #[serde(other)]
    Unknown,
}

/// Parsed model reply: `{isTask, tasks[], message, actions?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(rename = "isTask", default)]
    pub is_task: bool,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub actions: Vec<AssistantAction>,
}

impl AssistantReply {
    /// The fixed reply used when the model's output could not be parsed.
    pub fn parse_fallback() -> Self {
        Self {
            is_task: false,
            tasks: Vec::new(),
            message: PARSE_FALLBACK.to_string(),
            actions: Vec::new(),
        }
    }

    /// The fixed reply used when the request itself failed.
    pub fn request_fallback() -> Self {
        Self {
            is_task: false,
            tasks: Vec::new(),
            message: REQUEST_FALLBACK.to_string(),
            actions: Vec::new(),
        }
    }
}

/// Build the full prompt for one user input.
pub fn build_prompt(user_input: &str) -> String {
    format!(
        "{}\nUSER INPUT:\n{}\n\nRESPONSE (VALID JSON ONLY):\n",
        INSTRUCTIONS, user_input
    )
}

/// Remove markdown code-fence markers (```json / ```) from a model reply.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a (fence-stripped) model reply, degrading to the fallback message.
pub fn parse_reply(text: &str) -> AssistantReply {
    match serde_json::from_str::<AssistantReply>(text) {
        Ok(reply) => reply,
        Err(_) => AssistantReply::parse_fallback(),
    }
}

/// Tasks whose titles are `@`-mentioned in the input, by linear title search.
pub fn mentioned_tasks<'a>(input: &str, tasks: &'a [Task]) -> Vec<&'a Task> {
    let haystack = input.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            let needle = format!("@{}", task.title.to_lowercase());
            haystack.contains(&needle)
        })
        .collect()
}

// Minimal view of the generateContent response: candidates[0].content.parts[*].text

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Send one user input to the generative endpoint and parse the reply.
///
/// Transport and API failures degrade to the request-fallback reply. Only a
/// missing API key is a hard error.
pub fn ask(config: &AssistantConfig, user_input: &str) -> crate::Result<AssistantReply> {
    let api_key = config.resolved_api_key().ok_or_else(|| {
        crate::Error::InvalidInput(format!(
            "No assistant API key configured: set {} or [assistant] api-key in config.toml",
            crate::config::ASSISTANT_KEY_ENV
        ))
    })?;

    let url = format!(
        "{}/models/{}:generateContent?key={}",
        config.api_base, config.model, api_key
    );
    let prompt = build_prompt(user_input);

    let response = ureq::post(&url).send_json(serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    }));

    let raw = match response {
        Ok(resp) => match resp.into_json::<GenerateContentResponse>() {
            Ok(body) => body
                .candidates
                .into_iter()
                .next()
                .map(|c| {
                    c.content
                        .parts
                        .into_iter()
                        .map(|p| p.text)
                        .collect::<String>()
                })
                .unwrap_or_default(),
            Err(_) => return Ok(AssistantReply::request_fallback()),
        },
        Err(_) => return Ok(AssistantReply::request_fallback()),
    };

    Ok(parse_reply(&strip_code_fences(&raw)))
}

/// Give model-proposed tasks and subtasks fresh client-side UUIDs.
///
/// Model-generated ids ("unique-id-1") are placeholders; document identity
/// requires unique tokens.
pub fn reassign_ids(tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        task.id = uuid::Uuid::new_v4().to_string();
        if task.created_at.is_none() {
            task.created_at = Some(chrono::Utc::now());
        }
        for subtask in &mut task.subtasks {
            subtask.id = uuid::Uuid::new_v4().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubTask, TaskStatus};

    #[test]
    fn test_strip_fenced_json() {
        let raw = "```json\n{\"isTask\": false, \"message\": \"hi\"}\n```";
        let cleaned = strip_code_fences(raw);
        assert_eq!(cleaned, "{\"isTask\": false, \"message\": \"hi\"}");
    }

    #[test]
    fn test_strip_without_fences_is_identity() {
        let raw = "{\"isTask\": false}";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn test_parse_task_reply() {
        let raw = r#"{
            "isTask": true,
            "tasks": [{
                "id": "unique-id-1",
                "title": "Project A",
                "status": "pending",
                "subtasks": [
                    {"id": "s1", "title": "x", "completed": false},
                    {"id": "s2", "title": "y", "completed": false}
                ]
            }],
            "message": "Created one task with two subtasks."
        }"#;
        let reply = parse_reply(raw);
        assert!(reply.is_task);
        assert_eq!(reply.tasks.len(), 1);
        assert_eq!(reply.tasks[0].subtasks.len(), 2);
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_non_json_reply_falls_back() {
        // The model answering "Project A\n1. x\n2. y" in prose must not error.
        let reply = parse_reply("Sure! Here are your tasks:\nProject A\n1. x\n2. y");
        assert!(!reply.is_task);
        assert!(reply.tasks.is_empty());
        assert_eq!(
            reply.message,
            "I encountered an error processing your request. Please try rephrasing your input."
        );
    }

    #[test]
    fn test_conversational_reply() {
        let reply = parse_reply(r#"{"isTask": false, "message": "Hello! How can I help?"}"#);
        assert!(!reply.is_task);
        assert_eq!(reply.message, "Hello! How can I help?");
    }

    #[test]
    fn test_add_subtask_action_parses() {
        let raw = r#"{
            "isTask": true,
            "tasks": [],
            "message": "Added a subtask.",
            "actions": [
                {"type": "ADD_SUBTASK", "taskId": "t1", "subtask": {"title": "New step", "completed": false}},
                {"type": "SOMETHING_ELSE", "payload": 42}
            ]
        }"#;
        let reply = parse_reply(raw);
        assert_eq!(reply.actions.len(), 2);
        assert!(matches!(
            &reply.actions[0],
            AssistantAction::AddSubtask { task_id, subtask }
                if task_id == "t1" && subtask.title == "New step"
        ));
        assert!(matches!(&reply.actions[1], AssistantAction::Unknown));
    }

    #[test]
    fn test_mentioned_tasks_linear_search() {
        let mut website = Task::new("Website");
        website.subtasks.push(SubTask::new("deploy"));
        let backlog = Task::new("Backlog grooming");
        let tasks = vec![website, backlog];

        let found = mentioned_tasks("add a deploy step to @website please", &tasks);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Website");

        assert!(mentioned_tasks("no mentions here", &tasks).is_empty());
    }

    #[test]
    fn test_reassign_ids() {
        let mut tasks = vec![Task {
            id: "unique-id-1".to_string(),
            title: "T".to_string(),
            status: TaskStatus::Pending,
            subtasks: vec![SubTask {
                id: "subtask-id-1".to_string(),
                title: "S".to_string(),
                completed: false,
            }],
            created_at: None,
        }];
        reassign_ids(&mut tasks);
        assert_ne!(tasks[0].id, "unique-id-1");
        assert_ne!(tasks[0].subtasks[0].id, "subtask-id-1");
        assert!(tasks[0].created_at.is_some());
    }

    #[test]
    fn test_prompt_embeds_user_input() {
        let prompt = build_prompt("plan my week");
        assert!(prompt.contains("USER INPUT:\nplan my week"));
        assert!(prompt.ends_with("RESPONSE (VALID JSON ONLY):\n"));
    }
}
