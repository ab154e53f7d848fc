use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cache::LabelCache;
use crate::feed::{self, FeedComment};
use crate::input::{
    InputBox, ASSIGN_PROMPT, COMMENT_PROMPT, DISCARD_PROMPT, LABEL_PROMPT, REPLY_PROMPT,
    UNASSIGN_PROMPT,
};
use crate::suggest::{all_labels, token_at_cursor, SuggestPanel};
use crate::types::{Comment, Subject};

/// The exclusive interaction mode. Key interpretation depends entirely on
/// which one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browsing,
    CommentNav,
    Commenting,
    Labeling,
    Assigning,
    Unassigning,
}

/// Async work the controller wants dispatched. The orchestrator spawns it
/// and feeds the result back into the loop as an `Action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchLabels { owner: String, repo: String },
    Comment { repo: String, number: u64, is_pr: bool, body: String },
    AddLabels { repo: String, number: u64, is_pr: bool, labels: Vec<String> },
    Assign { repo: String, number: u64, is_pr: bool, users: Vec<String> },
    Unassign { repo: String, number: u64, is_pr: bool, users: Vec<String> },
}

/// Out-of-band request to the owning orchestrator; at most one is emitted
/// per input event.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    Close,
    Reopen,
    EditorComment,
    QuoteReply(FeedComment),
}

/// What one key event produced.
#[derive(Debug, Default)]
pub struct Outcome {
    pub command: Option<Command>,
    pub action: Option<DetailAction>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            action: None,
        }
    }

    fn action(action: DetailAction) -> Self {
        Self {
            command: None,
            action: Some(action),
        }
    }
}

/// Quote-reply seed text: attribution header, the body quoted line by
/// line, then two blank lines for the reply.
pub fn quote_reply_text(author: &str, body: &str) -> String {
    let mut lines = vec![format!("> @{} wrote:", author), ">".to_string()];
    for line in body.split('\n') {
        lines.push(format!("> {}", line));
    }
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\n")
}

/// The detail-view controller: holds the subject snapshot, the exclusive
/// mode, the navigation selection, and the embedded input/autocomplete
/// sub-widgets it forwards events to.
pub struct DetailView {
    mode: Mode,
    subject: Option<Subject>,
    selected: Option<usize>,
    show_confirm_cancel: bool,
    user: String,
    content_height: u16,
    pub scroll_offset: usize,
    pub input: InputBox,
    pub panel: SuggestPanel,
    cache: LabelCache,
}

impl DetailView {
    pub fn new() -> Self {
        Self {
            mode: Mode::default(),
            subject: None,
            selected: None,
            show_confirm_cancel: false,
            user: String::new(),
            content_height: 40,
            scroll_offset: 0,
            input: InputBox::new(),
            panel: SuggestPanel::new(),
            cache: LabelCache::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn confirming_discard(&self) -> bool {
        self.show_confirm_cancel
    }

    pub fn is_editing(&self) -> bool {
        matches!(
            self.mode,
            Mode::Commenting | Mode::Labeling | Mode::Assigning | Mode::Unassigning
        )
    }

    pub fn set_user(&mut self, login: String) {
        self.user = login;
    }

    pub fn set_content_height(&mut self, height: u16) {
        self.content_height = height;
    }

    /// Replace the subject snapshot. The same identity keeps mode and
    /// selection; a different identity (or no subject) resets both.
    pub fn set_subject(&mut self, subject: Option<Subject>) {
        let same = match (&self.subject, &subject) {
            (Some(old), Some(new)) => old.same_identity(new),
            _ => false,
        };

        self.subject = subject;

        if !same {
            self.mode = Mode::Browsing;
            self.selected = None;
            self.scroll_offset = 0;
            self.show_confirm_cancel = false;
            self.input.blur();
            self.input.restore_height();
            self.panel.reset();
        }
    }

    /// Optimistic local echo of a comment the user just submitted.
    pub fn push_comment(&mut self, comment: Comment) {
        if let Some(subject) = self.subject.as_mut() {
            subject.comments.push(comment);
        }
    }

    fn nav_len(&self) -> usize {
        self.subject.as_ref().map(feed::nav_len).unwrap_or(0)
    }

    /// The index-bearing comment currently selected, in feed order.
    pub fn selected_comment(&self) -> Option<FeedComment> {
        let subject = self.subject.as_ref()?;
        let index = self.selected?;
        feed::comments(subject).into_iter().nth(index)
    }

    /// Approximate scroll position that brings the selected comment into
    /// view: the header and body take roughly the top third, the feed the
    /// rest.
    pub fn scroll_percent(&self) -> Option<f64> {
        let index = self.selected?;
        let n = self.nav_len();
        if n == 0 {
            return None;
        }
        Some(0.30 + 0.70 * (index as f64 / n as f64))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        match self.mode {
            Mode::Browsing => self.browsing_key(key),
            Mode::CommentNav => self.comment_nav_key(key),
            Mode::Commenting => self.commenting_key(key),
            Mode::Labeling => self.labeling_key(key),
            Mode::Assigning | Mode::Unassigning => self.assigning_key(key),
        }
    }

    fn browsing_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Char('c') if key.modifiers.is_empty() => {
                self.enter_commenting();
                Outcome::none()
            }
            KeyCode::Char('l') => match self.enter_labeling() {
                Some(cmd) => Outcome::command(cmd),
                None => Outcome::none(),
            },
            KeyCode::Char('a') => {
                self.enter_assigning();
                Outcome::none()
            }
            KeyCode::Char('A') => {
                self.enter_unassigning();
                Outcome::none()
            }
            KeyCode::Tab => {
                self.enter_comment_nav();
                Outcome::none()
            }
            KeyCode::Char('x') => Outcome::action(DetailAction::Close),
            KeyCode::Char('X') => Outcome::action(DetailAction::Reopen),
            KeyCode::Char('e') => Outcome::action(DetailAction::EditorComment),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset += 1;
                Outcome::none()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                Outcome::none()
            }
            _ => Outcome::none(),
        }
    }

    fn comment_nav_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                Outcome::none()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                Outcome::none()
            }
            KeyCode::Char('q') => match self.selected_comment() {
                Some(comment) => Outcome::action(DetailAction::QuoteReply(comment)),
                None => Outcome::none(),
            },
            KeyCode::Esc | KeyCode::Tab => {
                self.exit_comment_nav();
                Outcome::none()
            }
            _ => Outcome::none(),
        }
    }

    fn commenting_key(&mut self, key: KeyEvent) -> Outcome {
        if is_submit(&key) {
            let body = self.input.value();
            let command = if body.trim().is_empty() {
                None
            } else {
                self.subject_command(|repo, number, is_pr| Command::Comment {
                    repo,
                    number,
                    is_pr,
                    body,
                })
            };
            self.leave_commenting();
            return Outcome {
                command,
                action: None,
            };
        }

        if is_cancel(&key) {
            if self.show_confirm_cancel {
                self.leave_commenting();
            } else {
                self.show_confirm_cancel = true;
                self.input.set_prompt(DISCARD_PROMPT);
            }
            return Outcome::none();
        }

        if self.show_confirm_cancel {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.leave_commenting();
                    return Outcome::none();
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.show_confirm_cancel = false;
                    self.input.set_prompt(COMMENT_PROMPT);
                    return Outcome::none();
                }
                _ => {
                    self.show_confirm_cancel = false;
                    self.input.set_prompt(COMMENT_PROMPT);
                }
            }
        }

        self.input.forward_key(key);
        Outcome::none()
    }

    fn labeling_key(&mut self, key: KeyEvent) -> Outcome {
        if is_submit(&key) {
            let labels = all_labels(&self.input.value());
            let command = if labels.is_empty() {
                None
            } else {
                self.subject_command(|repo, number, is_pr| Command::AddLabels {
                    repo,
                    number,
                    is_pr,
                    labels,
                })
            };
            self.leave_labeling();
            return Outcome {
                command,
                action: None,
            };
        }

        if is_cancel(&key) {
            self.leave_labeling();
            return Outcome::none();
        }

        // Forced refresh: evict, then fetch fresh.
        if key.code == KeyCode::Char('f') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(subject) = self.subject.as_ref() {
                let repo_key = subject.repo_key();
                self.cache.evict(&repo_key);
                self.panel.set_loading();
                return Outcome::command(Command::FetchLabels {
                    owner: subject.owner.clone(),
                    repo: subject.repo.clone(),
                });
            }
            return Outcome::none();
        }

        let previous = token_at_cursor(&self.input.value(), self.input.cursor_offset());
        self.input.forward_key(key);
        let value = self.input.value();
        let current = token_at_cursor(&value, self.input.cursor_offset());

        if current != previous {
            self.panel.show(current, all_labels(&value));
        }
        Outcome::none()
    }

    fn assigning_key(&mut self, key: KeyEvent) -> Outcome {
        if is_submit(&key) {
            let users: Vec<String> = self
                .input
                .value()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            let unassigning = self.mode == Mode::Unassigning;
            let command = if users.is_empty() {
                None
            } else {
                self.subject_command(|repo, number, is_pr| {
                    if unassigning {
                        Command::Unassign { repo, number, is_pr, users }
                    } else {
                        Command::Assign { repo, number, is_pr, users }
                    }
                })
            };
            self.leave_editing();
            return Outcome {
                command,
                action: None,
            };
        }

        if is_cancel(&key) {
            self.leave_editing();
            return Outcome::none();
        }

        self.input.forward_key(key);
        Outcome::none()
    }

    fn enter_commenting(&mut self) {
        if self.subject.is_none() {
            return;
        }
        self.input.reset();
        self.panel.reset();
        self.expand_input();
        self.mode = Mode::Commenting;
        self.show_confirm_cancel = false;
        self.input.set_prompt(COMMENT_PROMPT);
        self.input.focus();
    }

    fn enter_labeling(&mut self) -> Option<Command> {
        let subject = self.subject.as_ref()?;
        let repo_key = subject.repo_key();
        let owner = subject.owner.clone();
        let repo = subject.repo.clone();

        // Current labels plus a trailing empty slot to type into.
        let value = subject
            .labels
            .iter()
            .map(String::as_str)
            .chain([""])
            .collect::<Vec<_>>()
            .join(", ");

        self.input.reset();
        self.mode = Mode::Labeling;
        self.input.set_prompt(LABEL_PROMPT);
        self.input.set_value(&value);
        self.input.focus();

        self.panel.hide();
        self.panel.set_suggestions(vec![]);

        if let Some(entry) = self.cache.get(&repo_key) {
            self.panel.set_suggestions(entry.labels.clone());
            let token = token_at_cursor(&value, self.input.cursor_offset());
            self.panel.show(token, all_labels(&value));
            None
        } else {
            self.panel.set_loading();
            Some(Command::FetchLabels { owner, repo })
        }
    }

    fn enter_assigning(&mut self) {
        let Some(subject) = self.subject.as_ref() else {
            return;
        };
        let prefill = if subject.assignees.iter().any(|a| *a == self.user) {
            String::new()
        } else {
            self.user.clone()
        };
        self.input.reset();
        self.panel.reset();
        self.mode = Mode::Assigning;
        self.input.set_prompt(ASSIGN_PROMPT);
        self.input.set_value(&prefill);
        self.input.focus();
    }

    fn enter_unassigning(&mut self) {
        let Some(subject) = self.subject.as_ref() else {
            return;
        };
        let prefill = subject.assignees.join("\n");
        self.input.reset();
        self.panel.reset();
        self.mode = Mode::Unassigning;
        self.input.set_prompt(UNASSIGN_PROMPT);
        self.input.set_value(&prefill);
        self.input.focus();
    }

    fn enter_comment_nav(&mut self) {
        if self.nav_len() == 0 {
            return;
        }
        self.mode = Mode::CommentNav;
        if self.selected.is_none() {
            self.selected = Some(0);
        }
    }

    fn exit_comment_nav(&mut self) {
        self.mode = Mode::Browsing;
        self.selected = None;
    }

    fn select_next(&mut self) {
        let n = self.nav_len();
        if n == 0 {
            return;
        }
        match self.selected {
            Some(i) if i + 1 < n => self.selected = Some(i + 1),
            Some(_) => {}
            None => self.selected = Some(0),
        }
    }

    fn select_prev(&mut self) {
        match self.selected {
            Some(i) if i > 0 => self.selected = Some(i - 1),
            Some(_) => {}
            None if self.nav_len() > 0 => self.selected = Some(0),
            None => {}
        }
    }

    /// Switch into Commenting seeded with a quoted copy of `comment`.
    pub fn begin_quote_reply(&mut self, comment: &FeedComment) {
        if self.subject.is_none() {
            return;
        }
        self.input.reset();
        self.mode = Mode::Commenting;
        self.show_confirm_cancel = false;
        self.expand_input();
        self.input
            .set_value(&quote_reply_text(&comment.author, &comment.body));
        self.input.set_prompt(REPLY_PROMPT);
        self.input.focus();
    }

    /// Fetch-success handler; the only writer of the cache.
    pub fn on_labels_fetched(&mut self, repo_key: &str, labels: Vec<String>) {
        self.cache.put(repo_key.to_string(), labels.clone());

        let still_relevant = self.mode == Mode::Labeling
            && self
                .subject
                .as_ref()
                .is_some_and(|s| s.repo_key() == repo_key);
        if still_relevant {
            self.panel.set_success();
            self.panel.set_suggestions(labels);
            let value = self.input.value();
            let token = token_at_cursor(&value, self.input.cursor_offset());
            self.panel.show(token, all_labels(&value));
        }
    }

    pub fn on_labels_fetch_failed(&mut self, error: String) {
        if self.mode == Mode::Labeling {
            self.panel.set_error(error);
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_labels(&self, repo_key: &str) -> Option<Vec<String>> {
        self.cache.get(repo_key).map(|e| e.labels.clone())
    }

    fn subject_command<F>(&self, build: F) -> Option<Command>
    where
        F: FnOnce(String, u64, bool) -> Command,
    {
        let subject = self.subject.as_ref()?;
        Some(build(subject.repo_key(), subject.number, subject.is_pr))
    }

    fn expand_input(&mut self) {
        let expanded = (f64::from(self.content_height) * 0.75) as u16;
        self.input.set_height(expanded);
    }

    fn leave_commenting(&mut self) {
        self.mode = Mode::Browsing;
        self.show_confirm_cancel = false;
        self.input.blur();
        self.input.restore_height();
    }

    fn leave_labeling(&mut self) {
        self.mode = Mode::Browsing;
        self.input.blur();
        self.panel.hide();
    }

    fn leave_editing(&mut self) {
        self.mode = Mode::Browsing;
        self.input.blur();
    }
}

impl Default for DetailView {
    fn default() -> Self {
        Self::new()
    }
}

fn is_submit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{comment, issue, pr};
    use crate::types::ReviewThread;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn special(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view_with(subject: Subject) -> DetailView {
        let mut view = DetailView::new();
        view.set_user("me".to_string());
        view.set_subject(Some(subject));
        view
    }

    fn three_comment_view() -> DetailView {
        view_with(issue(
            1,
            vec![
                comment("u1", "first", 1),
                comment("u2", "second", 2),
                comment("u3", "third", 3),
            ],
        ))
    }

    #[test]
    fn nav_toggle_is_noop_without_comments() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(special(KeyCode::Tab));
        assert_eq!(view.mode(), Mode::Browsing);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn nav_toggle_selects_first_comment() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        assert_eq!(view.mode(), Mode::CommentNav);
        assert_eq!(view.selected(), Some(0));
    }

    #[test]
    fn nav_reenter_keeps_last_selection() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.handle_key(key('j'));
        assert_eq!(view.selected(), Some(1));

        // Leaving via Esc resets; but entering while a selection exists
        // keeps it.
        view.mode = Mode::Browsing;
        view.handle_key(special(KeyCode::Tab));
        assert_eq!(view.selected(), Some(1));
    }

    #[test]
    fn navigation_clamps_at_both_bounds() {
        // Scenario: 3 comments at t1<t2<t3; two Next calls reach the last,
        // a third is a no-op; Prev at 0 is a no-op.
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        assert_eq!(view.selected_comment().unwrap().author, "u1");

        view.handle_key(key('j'));
        view.handle_key(key('j'));
        assert_eq!(view.selected_comment().unwrap().author, "u3");

        view.handle_key(key('j'));
        assert_eq!(view.selected_comment().unwrap().author, "u3");

        view.handle_key(key('k'));
        view.handle_key(key('k'));
        view.handle_key(key('k'));
        assert_eq!(view.selected_comment().unwrap().author, "u1");
    }

    #[test]
    fn esc_exits_nav_and_clears_selection() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.handle_key(special(KeyCode::Esc));
        assert_eq!(view.mode(), Mode::Browsing);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn same_identity_subject_swap_preserves_nav_state() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.handle_key(key('j'));

        let refreshed = issue(
            1,
            vec![
                comment("u1", "first", 1),
                comment("u2", "second", 2),
                comment("u3", "third", 3),
                comment("u4", "new", 4),
            ],
        );
        view.set_subject(Some(refreshed));

        assert_eq!(view.mode(), Mode::CommentNav);
        assert_eq!(view.selected(), Some(1));
    }

    #[test]
    fn different_identity_subject_swap_resets_state() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.handle_key(key('j'));

        view.set_subject(Some(issue(2, vec![comment("x", "other", 1)])));

        assert_eq!(view.mode(), Mode::Browsing);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn quote_key_emits_action_with_selected_comment() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.handle_key(key('j'));

        let outcome = view.handle_key(key('q'));
        match outcome.action {
            Some(DetailAction::QuoteReply(c)) => assert_eq!(c.author, "u2"),
            other => panic!("expected quote action, got {:?}", other),
        }
    }

    #[test]
    fn quote_reply_text_format() {
        let text = quote_reply_text("alice", "line one\nline two");
        assert_eq!(
            text,
            "> @alice wrote:\n>\n> line one\n> line two\n\n"
        );
    }

    #[test]
    fn begin_quote_reply_seeds_input_and_mode() {
        let mut view = three_comment_view();
        let target = FeedComment {
            author: "bob".to_string(),
            body: "hello".to_string(),
            updated_at: crate::types::fixtures::ts(1),
            location: None,
        };
        view.begin_quote_reply(&target);
        assert_eq!(view.mode(), Mode::Commenting);
        assert_eq!(view.input.value(), "> @bob wrote:\n>\n> hello\n\n");
        assert_eq!(view.input.prompt(), REPLY_PROMPT);
    }

    #[test]
    fn comment_key_enters_commenting_with_expanded_input() {
        let mut view = three_comment_view();
        view.set_content_height(40);
        view.handle_key(key('c'));
        assert_eq!(view.mode(), Mode::Commenting);
        assert!(view.input.is_focused());
        assert_eq!(view.input.height(), 30);
        assert_eq!(view.input.value(), "");
    }

    #[test]
    fn commenting_submit_emits_comment_command() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.input.set_value("my reply");

        let outcome = view.handle_key(ctrl('d'));
        assert_eq!(
            outcome.command,
            Some(Command::Comment {
                repo: "o/r".to_string(),
                number: 1,
                is_pr: false,
                body: "my reply".to_string(),
            })
        );
        assert_eq!(view.mode(), Mode::Browsing);
        assert!(!view.input.is_focused());
    }

    #[test]
    fn commenting_submit_of_blank_body_is_dropped() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.input.set_value("   \n ");
        let outcome = view.handle_key(ctrl('d'));
        assert!(outcome.command.is_none());
        assert_eq!(view.mode(), Mode::Browsing);
    }

    #[test]
    fn commenting_esc_asks_before_discarding() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.input.set_value("half-written");

        view.handle_key(special(KeyCode::Esc));
        assert_eq!(view.mode(), Mode::Commenting);
        assert!(view.confirming_discard());
        assert_eq!(view.input.prompt(), DISCARD_PROMPT);

        // second Esc discards
        view.handle_key(special(KeyCode::Esc));
        assert_eq!(view.mode(), Mode::Browsing);
        assert!(!view.confirming_discard());
    }

    #[test]
    fn commenting_discard_confirm_y() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.handle_key(special(KeyCode::Esc));
        view.handle_key(key('y'));
        assert_eq!(view.mode(), Mode::Browsing);
    }

    #[test]
    fn commenting_discard_dismissed_by_n() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.input.set_value("keep me");
        view.handle_key(special(KeyCode::Esc));
        view.handle_key(key('n'));
        assert_eq!(view.mode(), Mode::Commenting);
        assert!(!view.confirming_discard());
        assert_eq!(view.input.prompt(), COMMENT_PROMPT);
        assert_eq!(view.input.value(), "keep me");
    }

    #[test]
    fn commenting_other_key_dismisses_confirmation_and_types() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.handle_key(special(KeyCode::Esc));
        view.handle_key(key('z'));
        assert!(!view.confirming_discard());
        assert_eq!(view.input.value(), "z");
    }

    #[test]
    fn typed_y_without_confirmation_is_just_text() {
        let mut view = three_comment_view();
        view.handle_key(key('c'));
        view.handle_key(key('y'));
        assert_eq!(view.mode(), Mode::Commenting);
        assert_eq!(view.input.value(), "y");
    }

    #[test]
    fn labeling_prefills_labels_and_fetches_once_when_uncached() {
        // Scenario: labels ["bug","ui"], uncached repo.
        let mut subject = issue(1, vec![]);
        subject.labels = vec!["bug".to_string(), "ui".to_string()];
        let mut view = view_with(subject);

        let outcome = view.handle_key(key('l'));
        assert_eq!(view.mode(), Mode::Labeling);
        assert_eq!(view.input.value(), "bug, ui, ");
        assert_eq!(
            outcome.command,
            Some(Command::FetchLabels {
                owner: "o".to_string(),
                repo: "r".to_string(),
            })
        );
        assert_eq!(view.panel.status, crate::suggest::FetchStatus::Loading);
    }

    #[test]
    fn labeling_with_no_labels_prefills_empty() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        assert_eq!(view.input.value(), "");
    }

    #[test]
    fn fetch_success_offers_only_new_labels() {
        let mut subject = issue(1, vec![]);
        subject.labels = vec!["bug".to_string(), "ui".to_string()];
        let mut view = view_with(subject);
        view.handle_key(key('l'));

        view.on_labels_fetched(
            "o/r",
            vec!["bug".to_string(), "ui".to_string(), "wip".to_string()],
        );
        assert_eq!(view.panel.matches(), vec!["wip"]);
    }

    #[test]
    fn cached_repo_second_entry_fetches_nothing() {
        let mut view = view_with(issue(1, vec![]));
        let first = view.handle_key(key('l'));
        assert!(first.command.is_some());
        view.on_labels_fetched("o/r", vec!["wip".to_string()]);

        view.handle_key(special(KeyCode::Esc));
        let second = view.handle_key(key('l'));
        assert!(second.command.is_none());
        assert!(view.panel.is_visible());
        assert_eq!(view.panel.matches(), vec!["wip"]);
    }

    #[test]
    fn forced_refresh_evicts_and_fetches_exactly_once() {
        // Scenario: Ctrl+F during Labeling with a warm cache.
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        view.on_labels_fetched("o/r", vec!["old".to_string()]);
        assert!(view.cached_labels("o/r").is_some());

        let outcome = view.handle_key(ctrl('f'));
        assert_eq!(
            outcome.command,
            Some(Command::FetchLabels {
                owner: "o".to_string(),
                repo: "r".to_string(),
            })
        );
        assert!(view.cached_labels("o/r").is_none());
        assert_eq!(view.panel.status, crate::suggest::FetchStatus::Loading);
    }

    #[test]
    fn stale_fetch_result_is_ignored_by_inactive_mode_but_still_cached() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        view.handle_key(special(KeyCode::Esc));
        assert_eq!(view.mode(), Mode::Browsing);

        view.on_labels_fetched("o/r", vec!["wip".to_string()]);
        assert_eq!(view.cached_labels("o/r").unwrap(), vec!["wip".to_string()]);
        assert!(!view.panel.is_visible());
    }

    #[test]
    fn fetch_failure_surfaces_inline_and_leaves_cache_alone() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        view.on_labels_fetch_failed("boom".to_string());
        assert_eq!(
            view.panel.status,
            crate::suggest::FetchStatus::Failed("boom".to_string())
        );
        assert!(view.cached_labels("o/r").is_none());
    }

    #[test]
    fn labeling_submit_sends_parsed_labels() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        view.input.set_value("bug, wip, ");
        let outcome = view.handle_key(ctrl('d'));
        assert_eq!(
            outcome.command,
            Some(Command::AddLabels {
                repo: "o/r".to_string(),
                number: 1,
                is_pr: false,
                labels: vec!["bug".to_string(), "wip".to_string()],
            })
        );
        assert_eq!(view.mode(), Mode::Browsing);
        assert!(!view.panel.is_visible());
    }

    #[test]
    fn labeling_esc_discards_without_confirmation() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('l'));
        view.input.set_value("half");
        view.handle_key(special(KeyCode::Esc));
        assert_eq!(view.mode(), Mode::Browsing);
        assert!(!view.confirming_discard());
    }

    #[test]
    fn assigning_prefills_current_user_when_not_assigned() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('a'));
        assert_eq!(view.mode(), Mode::Assigning);
        assert_eq!(view.input.value(), "me");
    }

    #[test]
    fn assigning_prefill_empty_when_already_assigned() {
        let mut subject = issue(1, vec![]);
        subject.assignees = vec!["me".to_string()];
        let mut view = view_with(subject);
        view.handle_key(key('a'));
        assert_eq!(view.input.value(), "");
    }

    #[test]
    fn assign_submit_sends_users() {
        let mut view = view_with(issue(1, vec![]));
        view.handle_key(key('a'));
        let outcome = view.handle_key(ctrl('d'));
        assert_eq!(
            outcome.command,
            Some(Command::Assign {
                repo: "o/r".to_string(),
                number: 1,
                is_pr: false,
                users: vec!["me".to_string()],
            })
        );
    }

    #[test]
    fn unassigning_prefills_newline_joined_assignees() {
        let mut subject = issue(1, vec![]);
        subject.assignees = vec!["u1".to_string(), "u2".to_string()];
        let mut view = view_with(subject);
        view.handle_key(key('A'));
        assert_eq!(view.mode(), Mode::Unassigning);
        assert_eq!(view.input.value(), "u1\nu2");

        let outcome = view.handle_key(ctrl('d'));
        assert_eq!(
            outcome.command,
            Some(Command::Unassign {
                repo: "o/r".to_string(),
                number: 1,
                is_pr: false,
                users: vec!["u1".to_string(), "u2".to_string()],
            })
        );
    }

    #[test]
    fn close_reopen_editor_emit_actions_without_state_change() {
        let mut view = three_comment_view();
        assert_eq!(
            view.handle_key(key('x')).action,
            Some(DetailAction::Close)
        );
        assert_eq!(
            view.handle_key(key('X')).action,
            Some(DetailAction::Reopen)
        );
        assert_eq!(
            view.handle_key(key('e')).action,
            Some(DetailAction::EditorComment)
        );
        assert_eq!(view.mode(), Mode::Browsing);
    }

    #[test]
    fn pr_nav_covers_inline_comments_but_not_reviews() {
        let mut subject = pr(9);
        subject.comments = vec![comment("u1", "top", 2)];
        subject.review_threads = vec![ReviewThread {
            path: "src/lib.rs".to_string(),
            line: 3,
            comments: vec![comment("u2", "inline", 1)],
        }];
        subject.reviews = vec![crate::types::Review {
            author: "rev".to_string(),
            body: "lgtm".to_string(),
            decision: crate::types::ReviewDecision::Approved,
            updated_at: crate::types::fixtures::ts(5),
        }];
        let mut view = view_with(subject);

        view.handle_key(special(KeyCode::Tab));
        assert_eq!(view.selected_comment().unwrap().author, "u2");
        view.handle_key(key('j'));
        assert_eq!(view.selected_comment().unwrap().author, "u1");
        // reviews are not selectable
        view.handle_key(key('j'));
        assert_eq!(view.selected_comment().unwrap().author, "u1");
    }

    #[test]
    fn optimistic_echo_extends_navigation() {
        let mut view = three_comment_view();
        view.handle_key(special(KeyCode::Tab));
        view.push_comment(comment("me", "echoed", 9));
        view.handle_key(key('j'));
        view.handle_key(key('j'));
        view.handle_key(key('j'));
        assert_eq!(view.selected_comment().unwrap().author, "me");
    }
}
