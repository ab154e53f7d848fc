use crossterm::event::KeyEvent;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use tui_textarea::{CursorMove, TextArea};

/// Default height (rows, including borders) of the input box in its
/// compact form.
pub const INPUT_BOX_HEIGHT: u16 = 6;

pub const COMMENT_PROMPT: &str = "Leave a comment... (Ctrl+D to submit)";
pub const REPLY_PROMPT: &str = "Reply to comment... (Ctrl+D to submit)";
pub const LABEL_PROMPT: &str = "Labels, comma separated (Ctrl+D to submit, Ctrl+F to refresh)";
pub const ASSIGN_PROMPT: &str = "Assign users (Ctrl+D to submit)";
pub const UNASSIGN_PROMPT: &str = "Unassign users (Ctrl+D to submit)";
pub const DISCARD_PROMPT: &str = "Discard comment? (y/N)";

/// The embedded multi-line text input the detail view forwards keys to
/// while a text-editing mode is active.
pub struct InputBox {
    textarea: TextArea<'static>,
    prompt: String,
    height: u16,
    focused: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            textarea: TextArea::default(),
            prompt: String::new(),
            height: INPUT_BOX_HEIGHT,
            focused: false,
        }
    }

    pub fn reset(&mut self) {
        self.textarea = TextArea::default();
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Replace the contents, leaving the cursor at the very end.
    pub fn set_value(&mut self, value: &str) {
        let lines: Vec<String> = value.split('\n').map(str::to_string).collect();
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
    }

    /// Char offset of the cursor within `value()`, counting newlines.
    pub fn cursor_offset(&self) -> usize {
        let (row, col) = self.textarea.cursor();
        let lines = self.textarea.lines();
        let before: usize = lines
            .iter()
            .take(row)
            .map(|l| l.chars().count() + 1)
            .sum();
        before + col
    }

    pub fn forward_key(&mut self, key: KeyEvent) {
        self.textarea.input(key);
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height.max(INPUT_BOX_HEIGHT);
    }

    pub fn restore_height(&mut self) {
        self.height = INPUT_BOX_HEIGHT;
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The widget to render; styling reflects prompt and focus.
    pub fn widget(&mut self, error_prompt: bool) -> &TextArea<'static> {
        let title_style = if error_prompt {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let border_style = if self.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(ratatui::text::Span::styled(
                    format!(" {} ", self.prompt),
                    title_style,
                )),
        );
        self.textarea
            .set_cursor_line_style(Style::default());
        &self.textarea
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn set_value_places_cursor_at_end() {
        let mut input = InputBox::new();
        input.set_value("bug, ui, ");
        assert_eq!(input.value(), "bug, ui, ");
        assert_eq!(input.cursor_offset(), 9);
    }

    #[test]
    fn cursor_offset_counts_newlines() {
        let mut input = InputBox::new();
        input.set_value("ab\ncd");
        // cursor at end: 2 chars + newline + 2 chars
        assert_eq!(input.cursor_offset(), 5);
    }

    #[test]
    fn forwarded_keys_edit_the_value() {
        let mut input = InputBox::new();
        input.forward_key(key('h'));
        input.forward_key(key('i'));
        assert_eq!(input.value(), "hi");
    }

    #[test]
    fn reset_clears_value() {
        let mut input = InputBox::new();
        input.set_value("something");
        input.reset();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn height_is_floored_at_default() {
        let mut input = InputBox::new();
        input.set_height(2);
        assert_eq!(input.height(), INPUT_BOX_HEIGHT);
        input.set_height(30);
        assert_eq!(input.height(), 30);
        input.restore_height();
        assert_eq!(input.height(), INPUT_BOX_HEIGHT);
    }
}
