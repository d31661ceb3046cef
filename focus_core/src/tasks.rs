//! Ordered to-do list kept next to the timer.
//!
//! Ids are millisecond timestamps, bumped when needed so they stay unique
//! and increasing even when two tasks are added within the same millisecond.

use crate::Task;
use chrono::Utc;

#[derive(Clone, Debug, Default)]
pub struct TaskAccountant {
    tasks: Vec<Task>,
    last_id: u64,
}

impl TaskAccountant {
    pub fn new(tasks: Vec<Task>) -> Self {
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self { tasks, last_id }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Append a task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let id = self.next_id();
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
        });
        tracing::debug!("Added task {}", id);
        self.tasks.last()
    }

    /// Flip the completed flag. Returns false if no task has `id`.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Remove a task. Returns false if no task has `id`.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}
