use crate::editor::EditorContext;
use crate::error::PerchError;
use crate::types::{Comment, Subject};

/// Messages consumed by the single-threaded update loop. Key handling is
/// synchronous; everything here is either a lifecycle trigger or the
/// result of async work re-entering the loop.
#[derive(Debug)]
pub enum Action {
    LoadSubject,
    SubjectLoaded(Box<Subject>),
    UserLoaded(String),

    LabelsFetched { repo_key: String, labels: Vec<String> },
    LabelsFetchFailed { repo_key: String, error: String },

    /// Hand the terminal to the external editor; handled by the main loop
    /// because it must block the whole event loop.
    SuspendForEditor(EditorContext),
    EditorFinished { body: String, context: EditorContext },

    TaskFinished {
        task_id: String,
        error: Option<String>,
        new_comment: Option<Comment>,
    },

    Error(String),
}

impl From<PerchError> for Action {
    fn from(err: PerchError) -> Self {
        Action::Error(err.to_string())
    }
}
