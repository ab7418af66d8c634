use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::provider::DictionaryEntry;
use crate::ui::theme::Theme;

pub struct DictionaryPanel<'a> {
    entries: &'a [DictionaryEntry],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> DictionaryPanel<'a> {
    pub fn new(entries: &'a [DictionaryEntry], selected: usize, theme: &'a Theme) -> Self {
        Self {
            entries,
            selected,
            theme,
        }
    }
}

impl Widget for DictionaryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", t!("dictionary.title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("dictionary.empty").to_string(),
                Style::default().fg(colors.muted()),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        let mut lines = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let is_selected = i == self.selected;
            let head_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selection_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            };
            let mut head = vec![Span::styled(format!(" {} ", entry.headword), head_style)];
            if !entry.translated_word.is_empty() {
                head.push(Span::styled(
                    format!(" ({})", entry.translated_word),
                    Style::default().fg(colors.muted()),
                ));
            }
            lines.push(Line::from(head));
            lines.push(Line::from(Span::styled(
                format!("   {}", entry.definition),
                Style::default().fg(colors.fg()),
            )));
            if !entry.translated_definition.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("   {}", entry.translated_definition),
                    Style::default().fg(colors.muted()),
                )));
            }
        }
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
