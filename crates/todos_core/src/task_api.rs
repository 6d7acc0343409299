use crate::error::AppError;
use crate::model::{Collection, Task};
use crate::storage::json_store;
use crate::storage::lock::StoreLock;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

/// Outcome of `complete_task`. Completing a task twice is not an error; the
/// second call reports the existing state and leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Completed(Task),
    AlreadyCompleted(Task),
}

impl Completion {
    pub fn task(&self) -> &Task {
        match self {
            Self::Completed(task) | Self::AlreadyCompleted(task) => task,
        }
    }

    pub fn was_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted(_))
    }
}

struct Update {
    collection: Collection,
    unreadable: bool,
}

fn begin_update(path: &Path) -> Update {
    let loaded = json_store::load_with_fallback(path);
    Update {
        collection: loaded.collection,
        unreadable: loaded.error.is_some() && path.exists(),
    }
}

fn commit(path: &Path, update: &Update) -> Result<(), AppError> {
    if update.unreadable {
        json_store::preserve_unreadable(path)?;
    }
    json_store::save_collection(path, &update.collection)
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn parse_id(raw: &str) -> Result<u64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("task id is required"));
    }

    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    match digits.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::invalid_input(format!(
            "task id must be a positive number: '{trimmed}'"
        ))),
    }
}

fn not_found(id: u64) -> AppError {
    AppError::not_found(format!("task #{id} not found"))
}

pub fn add_task(path: &Path, text: &str) -> Result<Task, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("task text is required"));
    }

    let _lock = StoreLock::acquire(path)?;
    let mut update = begin_update(path);
    let id = update.collection.allocate_id()?;
    let task = Task::new(id, trimmed.to_string(), now_rfc3339()?);
    update.collection.todos.push(task.clone());
    commit(path, &update)?;

    info!(id, "added task");
    Ok(task)
}

pub fn list_tasks(path: &Path) -> Collection {
    json_store::load_with_fallback(path).collection
}

pub fn complete_task(path: &Path, id: &str) -> Result<Completion, AppError> {
    let id = parse_id(id)?;

    let _lock = StoreLock::acquire(path)?;
    let mut update = begin_update(path);
    let task = update.collection.get_mut(id).ok_or_else(|| not_found(id))?;

    if !task.mark_completed(now_rfc3339()?) {
        debug!(id, "task was already completed");
        return Ok(Completion::AlreadyCompleted(task.clone()));
    }

    let completed = task.clone();
    commit(path, &update)?;

    info!(id, "completed task");
    Ok(Completion::Completed(completed))
}

pub fn delete_task(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = parse_id(id)?;

    let _lock = StoreLock::acquire(path)?;
    let mut update = begin_update(path);
    let index = update.collection.position(id).ok_or_else(|| not_found(id))?;
    let removed = update.collection.todos.remove(index);
    commit(path, &update)?;

    info!(id, "deleted task");
    Ok(removed)
}

pub fn clear_completed(path: &Path) -> Result<Vec<Task>, AppError> {
    let _lock = StoreLock::acquire(path)?;
    let mut update = begin_update(path);
    let removed = update.collection.drain_completed();
    if removed.is_empty() {
        return Ok(removed);
    }

    commit(path, &update)?;

    info!(count = removed.len(), "cleared completed tasks");
    Ok(removed)
}
