use crate::config::Config;
use crate::error::AppError;
use crate::model::{Collection, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_ENV_VAR: &str = "TODOS_STORE_PATH";
const STORE_FILE_NAME: &str = ".todos.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTodos {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    /// Zero means "not recorded"; the counter is then derived from the ids.
    #[serde(default)]
    next_id: u64,
    todos: Vec<Task>,
}

fn default_schema_version() -> u32 {
    1
}

/// Result of the degraded read path: the collection to work with, plus the
/// error that forced a fallback to an empty one.
#[derive(Debug, Clone)]
pub struct StoreLoad {
    pub collection: Collection,
    pub error: Option<AppError>,
}

pub fn store_path(config: &Config) -> Result<PathBuf, AppError> {
    let from_env = std::env::var(STORE_ENV_VAR).ok();
    resolve_store_path(from_env.as_deref(), config)
}

fn resolve_store_path(from_env: Option<&str>, config: &Config) -> Result<PathBuf, AppError> {
    if let Some(path) = from_env
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(configured) = config.store_path.as_deref()
        && !configured.trim().is_empty()
    {
        return expand_home(configured.trim());
    }

    Ok(home_dir()?.join(STORE_FILE_NAME))
}

fn home_dir() -> Result<PathBuf, AppError> {
    dirs::home_dir().ok_or_else(|| AppError::invalid_data("home directory could not be determined"))
}

fn expand_home(raw: &str) -> Result<PathBuf, AppError> {
    match raw.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

/// `<dir>/<file name><suffix>`, used for the lock, temp and backup files.
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    name.push(suffix);
    path.with_file_name(name)
}

pub fn load_collection(path: &Path) -> Result<Collection, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no task store yet");
            return Ok(Collection::default());
        }
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };

    let value: serde_json::Value = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    let stored = match value {
        serde_json::Value::Array(_) => {
            debug!(path = %path.display(), "reading legacy task array");
            let todos: Vec<Task> = serde_json::from_value(value)
                .map_err(|err| AppError::invalid_data(err.to_string()))?;
            StoredTodos {
                schema_version: SCHEMA_VERSION,
                next_id: 0,
                todos,
            }
        }
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|err| AppError::invalid_data(err.to_string()))?,
        _ => {
            return Err(AppError::invalid_data(
                "task store must be a JSON object or array",
            ));
        }
    };

    let collection = into_collection(stored)?;
    debug!(path = %path.display(), tasks = collection.len(), "loaded task store");
    Ok(collection)
}

fn into_collection(stored: StoredTodos) -> Result<Collection, AppError> {
    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data(format!(
            "unsupported schemaVersion {}",
            stored.schema_version
        )));
    }

    let mut seen = HashSet::with_capacity(stored.todos.len());
    let mut todos = stored.todos;
    for task in &mut todos {
        if task.id == 0 {
            return Err(AppError::invalid_data("task ids must be positive"));
        }
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        if !task.completed && task.completed_at.is_some() {
            warn!(id = task.id, "dropping completedAt from incomplete task");
            task.completed_at = None;
        }
    }

    let mut collection = Collection {
        todos,
        next_id: stored.next_id,
    };
    // Saturates when a task already holds u64::MAX; allocation then fails
    // instead of wrapping.
    let floor = collection.max_id().saturating_add(1);
    if collection.next_id < floor {
        if stored.next_id != 0 {
            warn!(
                recorded = stored.next_id,
                repaired = floor,
                "nextId was behind existing ids"
            );
        }
        collection.next_id = floor;
    }

    Ok(collection)
}

/// Loads the store, falling back to an empty collection when the file cannot
/// be read or parsed. The failure is logged and handed back to the caller.
pub fn load_with_fallback(path: &Path) -> StoreLoad {
    match load_collection(path) {
        Ok(collection) => StoreLoad {
            collection,
            error: None,
        },
        Err(err) => {
            warn!("could not load tasks, continuing with an empty list: {}", err);
            StoreLoad {
                collection: Collection::default(),
                error: Some(err),
            }
        }
    }
}

pub fn save_collection(path: &Path, collection: &Collection) -> Result<(), AppError> {
    let io_error = |err: std::io::Error| AppError::io(format!("{}: {}", path.display(), err));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let stored = StoredTodos {
        schema_version: SCHEMA_VERSION,
        next_id: collection.next_id,
        todos: collection.todos.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let temp_path = sibling_path(path, ".tmp");
    std::fs::write(&temp_path, content).map_err(io_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&temp_path, permissions).map_err(io_error)?;
    }

    if let Err(err) = std::fs::rename(&temp_path, path) {
        std::fs::remove_file(&temp_path).ok();
        return Err(io_error(err));
    }

    debug!(path = %path.display(), tasks = collection.len(), "saved task store");
    Ok(())
}

/// Copies a store that failed to load to `<file>.bak` so that the next save
/// does not destroy it.
pub fn preserve_unreadable(path: &Path) -> Result<PathBuf, AppError> {
    let backup = sibling_path(path, ".bak");
    std::fs::copy(path, &backup)
        .map_err(|err| AppError::io(format!("{}: {}", backup.display(), err)))?;
    warn!(backup = %backup.display(), "kept a copy of the unreadable task store");
    Ok(backup)
}
