pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::Task;

    #[test]
    fn task_has_required_fields() {
        let task = Task::new(1, "demo".to_string(), "2025-12-20T00:00:00Z".to_string());

        assert_eq!(task.id, 1);
        assert_eq!(task.text, "demo");
        assert!(!task.completed);
        assert_eq!(task.created_at, "2025-12-20T00:00:00Z");
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn mark_completed_is_one_way() {
        let mut task = Task::new(1, "demo".to_string(), "2025-12-20T00:00:00Z".to_string());

        assert!(task.mark_completed("2025-12-21T00:00:00Z".to_string()));
        assert!(!task.mark_completed("2025-12-22T00:00:00Z".to_string()));
        assert!(task.completed);
        assert_eq!(task.completed_at.as_deref(), Some("2025-12-21T00:00:00Z"));
    }

    #[test]
    fn app_error_exposes_code_and_display() {
        let err = AppError::not_found("task #4 not found");
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.message(), "task #4 not found");
        assert_eq!(err.to_string(), "not_found - task #4 not found");
        assert_eq!(AppError::invalid_input("x").code(), "invalid_input");
        assert_eq!(AppError::io("x").code(), "io_error");
    }
}
