use super::Task;
use crate::error::AppError;

/// Every task in the store, in insertion order, plus the id counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub todos: Vec<Task>,
    pub next_id: u64,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }
}

impl Collection {
    /// Hands out `next_id` and advances the counter. A counter that cannot
    /// advance past `u64::MAX` means the id space is used up.
    pub fn allocate_id(&mut self) -> Result<u64, AppError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task id space exhausted"))?;
        Ok(id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.todos.iter().position(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.todos.iter_mut().find(|task| task.id == id)
    }

    pub fn max_id(&self) -> u64 {
        self.todos.iter().map(|task| task.id).max().unwrap_or(0)
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|task| task.completed).count()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Removes every completed task and returns them in their original order.
    pub fn drain_completed(&mut self) -> Vec<Task> {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.todos)
            .into_iter()
            .partition(|task| task.completed);
        self.todos = kept;
        removed
    }
}
