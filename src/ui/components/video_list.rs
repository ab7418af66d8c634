use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::provider::VideoSummary;
use crate::ui::theme::Theme;

/// Search results, two rows per video.
pub struct VideoList<'a> {
    videos: &'a [VideoSummary],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> VideoList<'a> {
    pub fn new(videos: &'a [VideoSummary], selected: usize, theme: &'a Theme) -> Self {
        Self {
            videos,
            selected,
            theme,
        }
    }
}

impl Widget for VideoList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", t!("search.results_title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.videos.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("search.empty").to_string(),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        // Scroll so the selection stays on screen.
        let visible = (inner.height / 2).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);

        let mut lines = Vec::new();
        for (i, video) in self.videos.iter().enumerate().skip(first).take(visible) {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let title_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selection_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(" {indicator} {:>2}. {}", i + 1, video.title),
                title_style,
            )));
            lines.push(Line::from(Span::styled(
                format!("       {} · {} · {}", video.channel, video.duration, video.published),
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}
