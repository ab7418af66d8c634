use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Bordered single-line editor. The cursor cell is drawn reversed when
/// focused.
pub struct InputField<'a> {
    title: String,
    input: &'a LineInput,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> InputField<'a> {
    pub fn new(title: impl Into<String>, input: &'a LineInput, focused: bool, theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            input,
            focused,
            theme,
        }
    }
}

impl Widget for InputField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let text_style = Style::default().fg(colors.fg());
        let line = if self.focused {
            let (before, cursor, after) = self.input.render_parts();
            let cursor_text = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
            Line::from(vec![
                Span::styled(before.to_string(), text_style),
                Span::styled(cursor_text, text_style.add_modifier(Modifier::REVERSED)),
                Span::styled(after.to_string(), text_style),
            ])
        } else {
            Line::from(Span::styled(self.input.value().to_string(), text_style))
        };

        // Keep the cursor visible on long input.
        let inner_width = area.width.saturating_sub(2);
        let scroll = (self.input.cursor_columns() + 1).saturating_sub(inner_width);
        Paragraph::new(line)
            .block(block)
            .scroll((0, scroll))
            .render(area, buf);
    }
}
