//! Integration tests for subtask operations and the auto-complete rule.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_subtask_add() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first"]);

    let result = env.td_json(&["subtask", "add", &id, "second"]);
    assert_eq!(result["subtask"]["title"], "second");
    assert_eq!(result["subtask"]["completed"], false);

    assert_eq!(env.subtask_ids(&id).len(), 2);
}

#[test]
fn test_subtask_add_rejects_blank_title() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first"]);

    env.td()
        .args(["subtask", "add", &id, "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
}

#[test]
fn test_subtask_toggle() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first", "second"]);
    let subs = env.subtask_ids(&id);

    let result = env.td_json(&["subtask", "toggle", &id, &subs[0]]);
    assert_eq!(result["completed"], true);
    // One of two completed: the task does not flip
    assert_eq!(result["task_status"], "pending");

    let back = env.td_json(&["subtask", "toggle", &id, &subs[0]]);
    assert_eq!(back["completed"], false);
}

#[test]
fn test_completing_all_subtasks_completes_task() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first", "second"]);
    let subs = env.subtask_ids(&id);

    env.td_json(&["subtask", "toggle", &id, &subs[0]]);
    let result = env.td_json(&["subtask", "toggle", &id, &subs[1]]);
    assert_eq!(result["task_status"], "completed");
}

#[test]
fn test_unchecking_does_not_revert_task_status() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["only"]);
    let subs = env.subtask_ids(&id);

    let done = env.td_json(&["subtask", "toggle", &id, &subs[0]]);
    assert_eq!(done["task_status"], "completed");

    // The flip is one-way: unchecking leaves the task completed
    let undone = env.td_json(&["subtask", "toggle", &id, &subs[0]]);
    assert_eq!(undone["completed"], false);
    assert_eq!(undone["task_status"], "completed");
}

#[test]
fn test_subtask_delete() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first", "second"]);
    let subs = env.subtask_ids(&id);

    let result = env.td_json(&["subtask", "delete", &id, &subs[0]]);
    assert_eq!(result["title"], "first");

    let remaining = env.subtask_ids(&id);
    assert_eq!(remaining, vec![subs[1].clone()]);
}

#[test]
fn test_subtask_unknown_id() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["first"]);

    env.td()
        .args(["subtask", "toggle", &id, "ffffffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: subtask"));
}

#[test]
fn test_deleting_last_subtask_leaves_task_in_place() {
    let env = TestEnv::new();
    let id = env.add_task("Parent", &["only"]);
    let subs = env.subtask_ids(&id);

    env.td_json(&["subtask", "delete", &id, &subs[0]]);

    let shown = env.td_json(&["task", "show", &id]);
    assert_eq!(shown["task"]["subtasks"].as_array().unwrap().len(), 0);
    assert_eq!(shown["task"]["status"], "pending");
}
