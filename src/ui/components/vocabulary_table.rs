use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use rust_i18n::t;

use crate::session::ledger::VocabularyBook;
use crate::ui::theme::Theme;

pub struct VocabularyTable<'a> {
    book: &'a VocabularyBook,
    selected: usize,
    confirm_clear: bool,
    theme: &'a Theme,
}

impl<'a> VocabularyTable<'a> {
    pub fn new(book: &'a VocabularyBook, selected: usize, confirm_clear: bool, theme: &'a Theme) -> Self {
        Self {
            book,
            selected,
            confirm_clear,
            theme,
        }
    }
}

impl Widget for VocabularyTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ({}) ", t!("vocabulary.title"), self.book.len()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.book.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("vocabulary.empty").to_string(),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
        } else {
            let visible = (inner.height / 3).max(1) as usize;
            let first = self.selected.saturating_sub(visible - 1);
            let mut lines = Vec::new();
            for (i, entry) in self.book.entries().iter().enumerate().skip(first).take(visible) {
                let head_style = if i == self.selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.selection_bg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", entry.word), head_style),
                    Span::styled(
                        format!("  {}  {}", entry.date_label(), entry.context),
                        Style::default().fg(colors.muted()),
                    ),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("   {}", entry.definition),
                    Style::default().fg(colors.fg()),
                )));
                lines.push(Line::from(Span::styled(
                    format!("   {}", entry.translation),
                    Style::default().fg(colors.muted()),
                )));
            }
            Paragraph::new(lines).render(inner, buf);
        }

        if self.confirm_clear {
            let dialog_width = 40u16.min(area.width);
            let dialog_height = 5u16.min(area.height);
            let dialog_x = area.x + area.width.saturating_sub(dialog_width) / 2;
            let dialog_y = area.y + area.height.saturating_sub(dialog_height) / 2;
            let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, dialog_height);

            Clear.render(dialog_area, buf);
            let dialog = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}  ", t!("vocabulary.confirm_clear")),
                    Style::default().fg(colors.fg()),
                )),
            ])
            .style(Style::default().bg(colors.bg()))
            .block(
                Block::bordered()
                    .title(format!(" {} ", t!("vocabulary.confirm_title")))
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            );
            dialog.render(dialog_area, buf);
        }
    }
}
