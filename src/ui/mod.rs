mod detail;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::detail::Mode;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    detail::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.detail.subject() {
        Some(subject) => {
            let kind = if subject.is_pr { "PR" } else { "Issue" };
            format!(
                "perch - {} #{}: {}",
                kind, subject.number, subject.title
            )
        }
        None => "perch".to_string(),
    };

    let header = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if app.loading {
        Line::from(Span::styled(
            format!("{} Loading...", app.spinner()),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(task_line) = app.tasks.status_line() {
        let line = if app.tasks.any_running() {
            format!("{} {}", app.spinner(), task_line)
        } else {
            task_line
        };
        Line::from(Span::styled(line, Style::default().fg(Color::Yellow)))
    } else {
        let help = match app.detail.mode() {
            Mode::Browsing => {
                "j/k: scroll | Tab: comments | c: comment | e: editor | l: label | a/A: assign | x/X: close/reopen | o: open | y: yank | r: refresh | q: quit"
            }
            Mode::CommentNav => "j/k: select comment | q: quote reply | Esc/Tab: back",
            Mode::Commenting => "Ctrl+D: submit | Esc: discard",
            Mode::Labeling => "Ctrl+D: submit | Ctrl+F: refresh suggestions | Esc: cancel",
            Mode::Assigning | Mode::Unassigning => "Ctrl+D: submit | Esc: cancel",
        };
        Line::from(Span::styled(help, Style::default().fg(Color::Gray)))
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
