use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::ledger::AttemptLedger;
use crate::ui::components::diff_view::diff_line;
use crate::ui::theme::Theme;

/// Attempts of this run, newest first, with the selected row's diff below.
pub struct HistoryTable<'a> {
    ledger: &'a AttemptLedger,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> HistoryTable<'a> {
    pub fn new(ledger: &'a AttemptLedger, selected: usize, theme: &'a Theme) -> Self {
        Self {
            ledger,
            selected,
            theme,
        }
    }
}

impl Widget for HistoryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let summary = t!(
            "history.summary",
            total = self.ledger.len(),
            correct = self.ledger.correct_count(),
            accuracy = format!("{:.1}", self.ledger.accuracy())
        );
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} · {summary} ", t!("history.title")),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.ledger.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("history.empty").to_string(),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(5)])
            .split(inner);

        let mut lines = vec![Line::from(Span::styled(
            format!("    {}", t!("history.columns")),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];

        let records = self.ledger.records();
        let visible = layout[0].height.saturating_sub(1).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);
        for (i, record) in records.iter().rev().enumerate().skip(first).take(visible) {
            let color = if record.correct {
                colors.success()
            } else {
                colors.error()
            };
            let style = if i == self.selected {
                Style::default().fg(color).bg(colors.selection_bg())
            } else {
                Style::default().fg(color)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    " {} {}  {:>6}  {:<5}  {}  →  {}",
                    record.mark(),
                    record.date_label(),
                    record.timestamp,
                    record.mode.as_str(),
                    record.original_text,
                    record.user_input
                ),
                style,
            )));
        }
        Paragraph::new(lines).render(layout[0], buf);

        if let Some(record) = records.iter().rev().nth(self.selected) {
            let mut detail = vec![Line::from(Span::styled(
                record.video_title.clone(),
                Style::default().fg(colors.muted()),
            ))];
            if !record.diff_markup.is_empty() {
                detail.push(diff_line(&record.diff_markup, colors));
            }
            detail.push(Line::from(Span::styled(
                format!(
                    "{} {}   {} {}",
                    t!("history.blank_words"),
                    record.blank_words_cell(),
                    t!("history.wrong_words"),
                    record.wrong_words_cell()
                ),
                Style::default().fg(colors.muted()),
            )));
            Paragraph::new(detail)
                .block(Block::bordered().border_style(Style::default().fg(colors.border())))
                .wrap(Wrap { trim: false })
                .render(layout[1], buf);
        }
    }
}
