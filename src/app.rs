use std::sync::Arc;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::detail::{Command, DetailAction, DetailView, Mode};
use crate::editor::EditorContext;
use crate::event::Event;
use crate::gh;
use crate::github::Backend;
use crate::task::Tasks;
use crate::types::Comment;

/// Which subject the app shows; the detail view's snapshot is fetched
/// from this.
#[derive(Debug, Clone)]
pub struct Target {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub is_pr: bool,
}

impl Target {
    fn repo_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct App {
    pub detail: DetailView,
    pub tasks: Tasks,
    pub loading: bool,
    pub error: Option<String>,
    pub should_quit: bool,
    pub user: String,
    target: Target,
    section_id: usize,
    spinner_frame: usize,
    backend: Arc<dyn Backend>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        target: Target,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            detail: DetailView::new(),
            tasks: Tasks::new(),
            loading: false,
            error: None,
            should_quit: false,
            user: String::new(),
            target,
            section_id: 0,
            spinner_frame: 0,
            backend,
            action_tx,
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Synchronous half of the loop: lifecycle events and key routing.
    /// Returns at most one follow-up message for the channel.
    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Init => {
                self.spawn_load_user();
                Some(Action::LoadSubject)
            }
            Event::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                None
            }
            Event::Key(key) => self.handle_key(key),
            Event::Render => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.error.is_some() {
            self.error = None;
        }

        // Ctrl+C quits everywhere except the text-editing modes, where it
        // is the cancel key.
        if !self.detail.is_editing()
            && key.code == KeyCode::Char('c')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.should_quit = true;
            return None;
        }

        if self.detail.mode() == Mode::Browsing {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return None;
                }
                KeyCode::Char('r') => return Some(Action::LoadSubject),
                KeyCode::Char('o') => {
                    self.open_in_browser();
                    return None;
                }
                KeyCode::Char('y') => {
                    self.yank_url();
                    return None;
                }
                _ => {}
            }
        }

        let outcome = self.detail.handle_key(key);
        if let Some(command) = outcome.command {
            self.dispatch(command);
        }
        match outcome.action {
            Some(DetailAction::Close) => {
                self.spawn_state_change(false);
                None
            }
            Some(DetailAction::Reopen) => {
                self.spawn_state_change(true);
                None
            }
            Some(DetailAction::EditorComment) => Some(Action::SuspendForEditor(EditorContext {
                number: self.target.number,
                repo: self.target.repo_key(),
                is_pr: self.target.is_pr,
                section_id: self.section_id,
            })),
            Some(DetailAction::QuoteReply(comment)) => {
                self.detail.begin_quote_reply(&comment);
                None
            }
            None => None,
        }
    }

    /// Async results re-entering the loop, strictly in arrival order.
    pub fn update(&mut self, action: Action) {
        match action {
            Action::LoadSubject => {
                self.loading = true;
                self.spawn_load_subject();
            }
            Action::SubjectLoaded(subject) => {
                self.loading = false;
                self.detail.set_subject(Some(*subject));
            }
            Action::UserLoaded(login) => {
                self.user = login.clone();
                self.detail.set_user(login);
            }
            Action::LabelsFetched { repo_key, labels } => {
                self.detail.on_labels_fetched(&repo_key, labels);
            }
            Action::LabelsFetchFailed { error, .. } => {
                self.detail.on_labels_fetch_failed(error);
            }
            Action::SuspendForEditor(_) => {
                // Handled by the main loop; reaching here means the loop
                // forwarded it by mistake.
                tracing::warn!("editor suspension reached App::update");
            }
            Action::EditorFinished { body, context } => {
                self.submit_editor_comment(body, context);
            }
            Action::TaskFinished {
                task_id,
                error,
                new_comment,
            } => {
                let failed = error.is_some();
                self.tasks.finish(&task_id, error);
                if !failed {
                    if let Some(comment) = new_comment {
                        self.detail.push_comment(comment);
                    }
                }
            }
            Action::Error(msg) => {
                self.loading = false;
                self.error = Some(msg);
            }
        }
    }

    fn kind(&self) -> &'static str {
        if self.target.is_pr {
            "pr"
        } else {
            "issue"
        }
    }

    fn echo_comment(&self, body: &str) -> Comment {
        Comment {
            author: self.user.clone(),
            body: body.to_string(),
            updated_at: Utc::now(),
        }
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::FetchLabels { owner, repo } => self.spawn_fetch_labels(owner, repo),
            Command::Comment {
                repo,
                number,
                is_pr,
                body,
            } => {
                let task_id = format!("{}_comment_{}", self.kind(), number);
                self.tasks.start(
                    &task_id,
                    &format!("Commenting on {} #{}", self.kind(), number),
                    &format!("Commented on {} #{}", self.kind(), number),
                );
                let echo = self.echo_comment(&body);
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let error = gh::comment(&repo, number, is_pr, &body)
                        .await
                        .err()
                        .map(|e| e.to_string());
                    tx.send(Action::TaskFinished {
                        task_id,
                        error,
                        new_comment: Some(echo),
                    })
                    .ok();
                });
            }
            Command::AddLabels {
                repo,
                number,
                is_pr,
                labels,
            } => {
                let task_id = format!("{}_label_{}", self.kind(), number);
                self.tasks.start(
                    &task_id,
                    &format!("Labeling {} #{}", self.kind(), number),
                    &format!("Labeled {} #{}", self.kind(), number),
                );
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let error = gh::add_labels(&repo, number, is_pr, &labels)
                        .await
                        .err()
                        .map(|e| e.to_string());
                    tx.send(Action::TaskFinished {
                        task_id,
                        error,
                        new_comment: None,
                    })
                    .ok();
                });
            }
            Command::Assign {
                repo,
                number,
                is_pr,
                users,
            } => {
                let task_id = format!("{}_assign_{}", self.kind(), number);
                self.tasks.start(
                    &task_id,
                    &format!("Assigning {} #{}", self.kind(), number),
                    &format!("Assigned {} #{}", self.kind(), number),
                );
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let error = gh::assign(&repo, number, is_pr, &users)
                        .await
                        .err()
                        .map(|e| e.to_string());
                    tx.send(Action::TaskFinished {
                        task_id,
                        error,
                        new_comment: None,
                    })
                    .ok();
                });
            }
            Command::Unassign {
                repo,
                number,
                is_pr,
                users,
            } => {
                let task_id = format!("{}_unassign_{}", self.kind(), number);
                self.tasks.start(
                    &task_id,
                    &format!("Unassigning {} #{}", self.kind(), number),
                    &format!("Unassigned {} #{}", self.kind(), number),
                );
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let error = gh::unassign(&repo, number, is_pr, &users)
                        .await
                        .err()
                        .map(|e| e.to_string());
                    tx.send(Action::TaskFinished {
                        task_id,
                        error,
                        new_comment: None,
                    })
                    .ok();
                });
            }
        }
    }

    /// Submit the body captured from the external editor. An empty body is
    /// a silent cancellation.
    fn submit_editor_comment(&mut self, body: String, context: EditorContext) {
        if body.is_empty() {
            return;
        }

        let kind = if context.is_pr { "pr" } else { "issue" };
        let task_id = format!("editor_{}_comment_{}", kind, context.number);
        tracing::debug!(
            section = context.section_id,
            number = context.number,
            "submitting editor comment"
        );
        self.tasks.start(
            &task_id,
            &format!("Commenting on {} #{}", kind, context.number),
            &format!("Commented on {} #{}", kind, context.number),
        );

        let echo = self.echo_comment(&body);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let error = gh::comment(&context.repo, context.number, context.is_pr, &body)
                .await
                .err()
                .map(|e| e.to_string());
            tx.send(Action::TaskFinished {
                task_id,
                error,
                new_comment: Some(echo),
            })
            .ok();
        });
    }

    fn spawn_state_change(&mut self, reopen: bool) {
        let target = self.target.clone();
        let verb = if reopen { "reopen" } else { "close" };
        let done = if reopen { "Reopened" } else { "Closed" };
        let start = if reopen { "Reopening" } else { "Closing" };
        let task_id = format!("{}_{}_{}", self.kind(), verb, target.number);
        self.tasks.start(
            &task_id,
            &format!("{} {} #{}", start, self.kind(), target.number),
            &format!("{} {} #{}", done, self.kind(), target.number),
        );
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let repo = target.repo_key();
            let result = if reopen {
                gh::reopen(&repo, target.number, target.is_pr).await
            } else {
                gh::close(&repo, target.number, target.is_pr).await
            };
            tx.send(Action::TaskFinished {
                task_id,
                error: result.err().map(|e| e.to_string()),
                new_comment: None,
            })
            .ok();
        });
    }

    fn spawn_load_subject(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        let target = self.target.clone();
        tokio::spawn(async move {
            let result = if target.is_pr {
                backend.get_pr(&target.owner, &target.repo, target.number).await
            } else {
                backend
                    .get_issue(&target.owner, &target.repo, target.number)
                    .await
            };
            match result {
                Ok(subject) => {
                    tx.send(Action::SubjectLoaded(Box::new(subject))).ok();
                }
                Err(e) => {
                    tx.send(e.into()).ok();
                }
            }
        });
    }

    fn spawn_load_user(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.get_current_user().await {
                Ok(login) => {
                    tx.send(Action::UserLoaded(login)).ok();
                }
                Err(e) => {
                    tx.send(e.into()).ok();
                }
            }
        });
    }

    fn spawn_fetch_labels(&self, owner: String, repo: String) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let repo_key = format!("{}/{}", owner, repo);
            match backend.list_labels(&owner, &repo).await {
                Ok(labels) => {
                    tx.send(Action::LabelsFetched { repo_key, labels }).ok();
                }
                Err(e) => {
                    tx.send(Action::LabelsFetchFailed {
                        repo_key,
                        error: e.to_string(),
                    })
                    .ok();
                }
            }
        });
    }

    fn open_in_browser(&mut self) {
        if let Some(subject) = self.detail.subject() {
            if let Err(e) = open::that(subject.url()) {
                self.error = Some(format!("failed to open browser: {}", e));
            }
        }
    }

    fn yank_url(&mut self) {
        let Some(subject) = self.detail.subject() else {
            return;
        };
        let url = subject.url();
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(url)) {
            Ok(()) => self.error = None,
            Err(e) => self.error = Some(format!("clipboard error: {}", e)),
        }
    }
}
