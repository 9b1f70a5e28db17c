//! Task data structure and its display line.
//!
//! A `Task` is one unit of trackable work. Its identifier is fixed when the
//! task is created; every other field can be replaced through the setters,
//! which the [`TaskManager`](crate::manager::TaskManager) drives by id.

use std::fmt;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// A single tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: u64,
    description: String,
    category: String,
    priority: u8,
    due_date: i64,
    completed: bool,
}

impl Task {
    /// Create an incomplete task.
    pub fn new(id: u64, description: String, category: String, priority: u8, due_date: i64) -> Self {
        Task {
            id,
            description,
            category,
            priority,
            due_date,
            completed: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Due instant in seconds since the Unix epoch.
    pub fn due_date(&self) -> i64 {
        self.due_date
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub fn set_category(&mut self, category: String) {
        self.category = category;
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority;
    }

    pub fn set_due_date(&mut self, due_date: i64) {
        self.due_date = due_date;
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Format the due date as local `YYYY-MM-DD HH:MM:SS`.
    ///
    /// Falls back to the raw epoch value when chrono cannot represent it.
    pub fn format_due(&self) -> String {
        match Local.timestamp_opt(self.due_date, 0).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.due_date.to_string(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Description: {}, Category: {}, Priority: {}, Due: {}, Completed: {}",
            self.id,
            self.description,
            self.category,
            self.priority,
            self.format_due(),
            if self.completed { "Yes" } else { "No" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_incomplete() {
        let task = Task::new(7, "buy milk".into(), "errand".into(), 2, 0);
        assert_eq!(task.id(), 7);
        assert_eq!(task.description(), "buy milk");
        assert_eq!(task.category(), "errand");
        assert_eq!(task.priority(), 2);
        assert!(!task.is_completed());
    }

    #[test]
    fn test_setters_replace_fields() {
        let mut task = Task::new(1, "a".into(), "b".into(), 1, 10);
        task.set_description("write report".into());
        task.set_category("work".into());
        task.set_priority(5);
        task.set_due_date(3600);
        task.set_completed(true);
        assert_eq!(task.description(), "write report");
        assert_eq!(task.category(), "work");
        assert_eq!(task.priority(), 5);
        assert_eq!(task.due_date(), 3600);
        assert!(task.is_completed());
        assert_eq!(task.id(), 1);
    }

    #[test]
    fn test_display_line() {
        let due = 1_700_000_000;
        let mut task = Task::new(2, "write report".into(), "work".into(), 5, due);
        let expected_due = Local
            .timestamp_opt(due, 0)
            .single()
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(
            task.to_string(),
            format!("ID: 2, Description: write report, Category: work, Priority: 5, Due: {expected_due}, Completed: No")
        );
        task.set_completed(true);
        assert!(task.to_string().ends_with("Completed: Yes"));
    }

    #[test]
    fn test_unrepresentable_due_falls_back_to_epoch() {
        let task = Task::new(1, "x".into(), "y".into(), 0, i64::MAX);
        assert_eq!(task.format_due(), i64::MAX.to_string());
    }
}
