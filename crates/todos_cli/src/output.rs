//! Human-readable and JSON renderings of command results.

use todos_core::config::Palette;
use todos_core::model::{Collection, Task};
use todos_core::task_api::Completion;

const RULE_WIDTH: usize = 60;
const DONE_MARKER: &str = "✓";
const PENDING_MARKER: &str = "○";

pub fn added(task: &Task) -> String {
    format!("{DONE_MARKER} Added task #{}: \"{}\"", task.id, task.text)
}

pub fn completed(completion: &Completion) -> String {
    let task = completion.task();
    if completion.was_already_completed() {
        format!("Task #{} is already completed", task.id)
    } else {
        format!("{DONE_MARKER} Completed task #{}: \"{}\"", task.id, task.text)
    }
}

pub fn deleted(task: &Task) -> String {
    format!("{DONE_MARKER} Deleted task #{}: \"{}\"", task.id, task.text)
}

pub fn cleared(removed: &[Task]) -> String {
    match removed.len() {
        0 => "No completed tasks to clear".to_string(),
        1 => format!("{DONE_MARKER} Cleared 1 completed task"),
        count => format!("{DONE_MARKER} Cleared {count} completed tasks"),
    }
}

pub fn task_list(collection: &Collection, palette: &Palette) -> String {
    if collection.is_empty() {
        return "No tasks found. Add one with: todo add <task>".to_string();
    }

    let rule = "─".repeat(RULE_WIDTH);
    let mut lines = Vec::with_capacity(collection.len() + 4);
    lines.push("Your Tasks:".to_string());
    lines.push(rule.clone());
    for task in &collection.todos {
        let marker = if task.completed {
            DONE_MARKER
        } else {
            PENDING_MARKER
        };
        lines.push(format!(
            "{} [{}] {}",
            palette.marker(task.completed, marker),
            task.id,
            palette.text(task.completed, &task.text)
        ));
    }
    lines.push(rule);
    lines.push(format!(
        "Completed: {}/{} tasks",
        collection.completed_count(),
        collection.len()
    ));
    lines.join("\n")
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "createdAt": task.created_at,
        "completedAt": task.completed_at,
    })
}

pub fn completion_json(completion: &Completion) -> serde_json::Value {
    let mut json = task_json(completion.task());
    json["alreadyCompleted"] = serde_json::Value::Bool(completion.was_already_completed());
    json
}

pub fn list_json(collection: &Collection) -> serde_json::Value {
    serde_json::json!({
        "todos": collection.todos.iter().map(task_json).collect::<Vec<_>>(),
        "completed": collection.completed_count(),
        "total": collection.len(),
    })
}

pub fn cleared_json(removed: &[Task]) -> serde_json::Value {
    serde_json::json!({
        "removed": removed.iter().map(task_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::{added, cleared, completed, completion_json, list_json, task_list};
    use todos_core::config::{Palette, palette_for_theme};
    use todos_core::model::{Collection, Task};
    use todos_core::task_api::Completion;

    fn task(id: u64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
            created_at: "2025-12-20T00:00:00Z".to_string(),
            completed_at: completed.then(|| "2025-12-21T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn task_list_shows_markers_and_summary() {
        let collection = Collection {
            todos: vec![task(1, "Buy milk", true), task(2, "Walk dog", false)],
            next_id: 3,
        };

        let rendered = task_list(&collection, &Palette::PLAIN);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Your Tasks:");
        assert_eq!(lines[1].chars().count(), 60);
        assert_eq!(lines[2], "✓ [1] Buy milk");
        assert_eq!(lines[3], "○ [2] Walk dog");
        assert_eq!(lines[5], "Completed: 1/2 tasks");
    }

    #[test]
    fn task_list_empty_message() {
        let rendered = task_list(&Collection::default(), &Palette::PLAIN);
        assert_eq!(rendered, "No tasks found. Add one with: todo add <task>");
    }

    #[test]
    fn task_list_strikes_completed_text() {
        let collection = Collection {
            todos: vec![task(1, "Buy milk", true)],
            next_id: 2,
        };

        let noir = task_list(&collection, &palette_for_theme(Some("noir")));
        let default = task_list(&collection, &palette_for_theme(None));

        assert!(noir.contains("\x1b[9mBuy milk\x1b[0m"));
        assert!(default.contains("✓ [1] \x1b[9mBuy milk\x1b[0m"));
    }

    #[test]
    fn confirmations_quote_task_text() {
        assert_eq!(added(&task(1, "Buy milk", false)), "✓ Added task #1: \"Buy milk\"");
        assert_eq!(
            completed(&Completion::Completed(task(1, "Buy milk", true))),
            "✓ Completed task #1: \"Buy milk\""
        );
        assert_eq!(
            completed(&Completion::AlreadyCompleted(task(1, "Buy milk", true))),
            "Task #1 is already completed"
        );
    }

    #[test]
    fn cleared_pluralizes() {
        assert_eq!(cleared(&[]), "No completed tasks to clear");
        assert_eq!(cleared(&[task(1, "a", true)]), "✓ Cleared 1 completed task");
        assert_eq!(
            cleared(&[task(1, "a", true), task(2, "b", true)]),
            "✓ Cleared 2 completed tasks"
        );
    }

    #[test]
    fn json_shapes() {
        let collection = Collection {
            todos: vec![task(1, "Buy milk", true), task(2, "Walk dog", false)],
            next_id: 3,
        };

        let list = list_json(&collection);
        assert_eq!(list["completed"], 1);
        assert_eq!(list["total"], 2);
        assert_eq!(list["todos"][1]["text"], "Walk dog");
        assert!(list["todos"][1]["completedAt"].is_null());

        let completion = completion_json(&Completion::AlreadyCompleted(task(1, "Buy milk", true)));
        assert_eq!(completion["alreadyCompleted"], true);
        assert_eq!(completion["completedAt"], "2025-12-21T00:00:00Z");
    }
}
