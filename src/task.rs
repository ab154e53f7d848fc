use std::collections::HashMap;

/// Lifecycle of one async unit of work surfaced in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Done,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub start_text: String,
    pub finished_text: String,
    pub state: TaskState,
}

/// Registry of started/finished tasks keyed by deterministic id, so a
/// resubmission for the same subject replaces its predecessor's status
/// line instead of stacking.
#[derive(Debug, Default)]
pub struct Tasks {
    tasks: HashMap<String, Task>,
    last: Option<String>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: &str, start_text: &str, finished_text: &str) {
        self.tasks.insert(
            id.to_string(),
            Task {
                id: id.to_string(),
                start_text: start_text.to_string(),
                finished_text: finished_text.to_string(),
                state: TaskState::Running,
            },
        );
        self.last = Some(id.to_string());
    }

    pub fn finish(&mut self, id: &str, error: Option<String>) {
        if let Some(task) = self.tasks.get_mut(id) {
            task.state = match error {
                Some(e) => TaskState::Failed(e),
                None => TaskState::Done,
            };
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn any_running(&self) -> bool {
        self.tasks.values().any(|t| t.state == TaskState::Running)
    }

    /// Status line for the most recently started task, if any.
    pub fn status_line(&self) -> Option<String> {
        let task = self.tasks.get(self.last.as_deref()?)?;
        Some(match &task.state {
            TaskState::Running => format!("{}...", task.start_text),
            TaskState::Done => task.finished_text.clone(),
            TaskState::Failed(err) => format!("{} failed: {}", task.start_text, err),
        })
    }
}
