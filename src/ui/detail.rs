use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::detail::Mode;
use crate::feed::{self, FeedItem, FeedKind};
use crate::markdown::{MarkdownRenderer, Renderer};
use crate::suggest::FetchStatus;
use crate::types::{ReviewDecision, Subject, SubjectState};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.detail.subject().is_none() {
        let block = Block::default().borders(Borders::ALL).title("Detail");
        let empty = Paragraph::new("Loading...")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let editing = app.detail.is_editing();
    let input_height = if editing {
        app.detail.input.height().min(area.height.saturating_sub(3))
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(input_height)])
        .split(area);

    app.detail.set_content_height(chunks[0].height);
    render_content(frame, app, chunks[0]);

    if editing {
        let confirming = app.detail.confirming_discard();
        frame.render_widget(app.detail.input.widget(confirming), chunks[1]);
        if app.detail.panel.is_visible() {
            render_dropdown(frame, app, chunks[1]);
        }
    }
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let Some(subject) = app.detail.subject() else {
        return;
    };
    let width = area.width.saturating_sub(2);
    let renderer = MarkdownRenderer;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(
            format!("#{} ", subject.number),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}/{}", subject.owner, subject.repo),
            Style::default().fg(Color::Gray),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        subject.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(state_and_author_line(subject));
    if !subject.labels.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Labels: ", Style::default().fg(Color::Gray)),
            Span::styled(
                subject.labels.join(", "),
                Style::default().fg(Color::Magenta),
            ),
        ]));
    }
    if !subject.assignees.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Assignees: ", Style::default().fg(Color::Gray)),
            Span::raw(subject.assignees.join(", ")),
        ]));
    }
    lines.push(Line::from(""));

    match subject.body.as_deref().map(str::trim) {
        Some(body) if !body.is_empty() => match renderer.render(body, width) {
            Ok(text) => lines.extend(text.lines),
            Err(_) => lines.extend(body.lines().map(|l| Line::from(l.to_string()))),
        },
        _ => lines.push(Line::from(Span::styled(
            "No description provided.",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Comments",
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED),
    )));
    lines.push(Line::from(""));

    let items = feed::assemble(subject);
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "No comments...",
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    } else {
        for item in &items {
            render_item(&mut lines, item, app.detail.selected(), &renderer, width);
        }
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll_offset = match app.detail.scroll_percent() {
        // Comment navigation: jump so the selected comment is in view.
        Some(percent) if app.detail.mode() == Mode::CommentNav => {
            ((lines.len() as f64 * percent) as usize).min(max_scroll)
        }
        _ => app.detail.scroll_offset.min(max_scroll),
    };

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner_height)
        .collect();

    frame.render_widget(Clear, area);
    let body = Paragraph::new(Text::from(visible))
        .block(Block::default().borders(Borders::ALL).title("Detail"));
    frame.render_widget(body, area);
}

fn state_and_author_line(subject: &Subject) -> Line<'static> {
    let state_color = match subject.state {
        SubjectState::Open => Color::Green,
        SubjectState::Closed => Color::Red,
        SubjectState::Merged => Color::Magenta,
    };
    Line::from(vec![
        Span::styled(
            format!(" {} ", subject.state),
            Style::default()
                .fg(Color::Black)
                .bg(state_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" by "),
        Span::styled(
            format!("@{}", subject.author),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!(" · {}", subject.created_at.format("%Y-%m-%d %H:%M")),
            Style::default().fg(Color::Gray),
        ),
    ])
}

/// One feed entry. A render failure skips the entry; the rest of the feed
/// still shows.
fn render_item<R: Renderer>(
    lines: &mut Vec<Line<'static>>,
    item: &FeedItem,
    selected: Option<usize>,
    renderer: &R,
    width: u16,
) {
    match &item.kind {
        FeedKind::Comment(comment) => {
            let body = match renderer.render(&comment.body, width) {
                Ok(text) => text,
                Err(_) => return,
            };

            let is_selected = item.nav_index.is_some() && item.nav_index == selected;
            let (marker, author_style) = if is_selected {
                (
                    Span::styled("┃ ", Style::default().fg(Color::Yellow)),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Span::styled("│ ", Style::default().fg(Color::DarkGray)),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            };

            let mut header = vec![
                marker.clone(),
                Span::styled(comment.author.clone(), author_style),
                Span::styled(
                    format!("  {}", comment.updated_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if let Some((path, line)) = &comment.location {
                header.push(Span::styled(
                    format!("  {}#L{}", path, line),
                    Style::default().fg(Color::Cyan),
                ));
            }
            lines.push(Line::from(header));

            for body_line in body.lines {
                let mut spans = vec![marker.clone()];
                spans.extend(body_line.spans);
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(""));
        }
        FeedKind::Review {
            author,
            body,
            decision,
        } => {
            let rendered = match renderer.render(body, width) {
                Ok(text) => text,
                Err(_) => return,
            };

            let (glyph, color) = match decision {
                ReviewDecision::Approved => ("✓", Color::Green),
                ReviewDecision::ChangesRequested => ("✗", Color::Red),
                ReviewDecision::Commented => ("💬", Color::Gray),
                ReviewDecision::Pending => ("⏳", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", glyph), Style::default().fg(color)),
                Span::styled(
                    author.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" reviewed ({})", decision),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  {}", item.updated_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            for body_line in rendered.lines {
                lines.push(body_line);
            }
            lines.push(Line::from(""));
        }
    }
}

/// Suggestion dropdown anchored over the top of the input box.
fn render_dropdown(frame: &mut Frame, app: &App, input_area: Rect) {
    let panel = &app.detail.panel;

    let content: Vec<Line> = match &panel.status {
        FetchStatus::Loading => vec![Line::from(Span::styled(
            format!("{} Loading labels...", app.spinner()),
            Style::default().fg(Color::Yellow),
        ))],
        FetchStatus::Failed(err) => vec![Line::from(Span::styled(
            format!("Failed to fetch labels: {}", err),
            Style::default().fg(Color::Red),
        ))],
        FetchStatus::Idle => {
            let matches = panel.matches();
            if matches.is_empty() {
                vec![Line::from(Span::styled(
                    "No matching labels",
                    Style::default().fg(Color::Gray),
                ))]
            } else {
                matches
                    .into_iter()
                    .take(8)
                    .map(|label| Line::from(format!("  {}", label)))
                    .collect()
            }
        }
    };

    let height = (content.len() as u16 + 2).min(10);
    let width = input_area.width.saturating_sub(4).min(48).max(20);
    let area = Rect {
        x: input_area.x + 2,
        y: input_area.y.saturating_sub(height),
        width,
        height,
    };

    frame.render_widget(Clear, area);
    let dropdown = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Labels "),
    );
    frame.render_widget(dropdown, area);
}
