use ratatui::text::{Line, Span, Text};

use crate::error::{PerchError, Result};

/// Seam to the markdown collaborator. An implementation may reject an
/// individual input; callers skip that item and keep rendering the rest.
pub trait Renderer {
    fn render(&self, text: &str, width: u16) -> Result<Text<'static>>;
}

/// tui-markdown backed renderer. The library can panic on some inputs
/// (e.g. deeply nested lists), so the call is fenced with `catch_unwind`
/// and a panic surfaces as a render error for that one item.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str, _width: u16) -> Result<Text<'static>> {
        let source = text.to_string();
        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        let result = std::panic::catch_unwind(|| to_owned_text(tui_markdown::from_str(&source)));
        std::panic::set_hook(prev_hook);

        result.map_err(|_| PerchError::Render("markdown renderer rejected input".to_string()))
    }
}

fn to_owned_text(text: Text<'_>) -> Text<'static> {
    Text::from(
        text.lines
            .into_iter()
            .map(|line| {
                Line::from(
                    line.spans
                        .into_iter()
                        .map(|span| Span::styled(span.content.into_owned(), span.style))
                        .collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Renderer that fails on bodies containing a sentinel, for exercising
    /// the skip-on-failure path without a panicking markdown input.
    pub struct FailOn(pub &'static str);

    impl Renderer for FailOn {
        fn render(&self, text: &str, _width: u16) -> Result<Text<'static>> {
            if text.contains(self.0) {
                Err(PerchError::Render("rejected".to_string()))
            } else {
                Ok(Text::raw(text.to_string()))
            }
        }
    }
}
