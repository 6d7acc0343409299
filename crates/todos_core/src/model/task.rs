use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// The aliases accept the field names written by older store layouts
/// (`task` for the text, `created` for the creation stamp); saving always
/// uses the canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    #[serde(alias = "task")]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(alias = "created")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl Task {
    pub fn new(id: u64, text: String, created_at: String) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Marks the task completed. Returns `false` without touching the task
    /// when it was already completed.
    pub fn mark_completed(&mut self, completed_at: String) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(completed_at);
        true
    }
}
