use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::engine::blanks::PLACEHOLDER;
use crate::engine::evaluate::ExerciseMode;
use crate::session::ledger::{CORRECT_MARK, WRONG_MARK};
use crate::session::navigator::PlaybackRequest;
use crate::session::study::StudySession;
use crate::ui::components::diff_view::diff_line;
use crate::ui::theme::Theme;

/// Prompt and feedback for the active segment.
pub struct StudyPanel<'a> {
    session: &'a StudySession,
    mode: ExerciseMode,
    playback: Option<&'a PlaybackRequest>,
    theme: &'a Theme,
}

impl<'a> StudyPanel<'a> {
    pub fn new(
        session: &'a StudySession,
        mode: ExerciseMode,
        playback: Option<&'a PlaybackRequest>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            mode,
            playback,
            theme,
        }
    }

    fn prompt_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        match (self.mode, self.session.peek_blanks()) {
            (ExerciseMode::Blank, Some(blanks)) => {
                let mut spans = Vec::new();
                for (i, word) in blanks.masked_text.split(' ').enumerate() {
                    if i > 0 {
                        spans.push(Span::raw(" "));
                    }
                    let style = if word == PLACEHOLDER {
                        Style::default().fg(colors.blank()).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    spans.push(Span::styled(word.to_string(), style));
                }
                Line::from(spans)
            }
            _ => Line::from(Span::styled(
                t!("study.full_prompt").to_string(),
                Style::default().fg(colors.muted()),
            )),
        }
    }
}

impl Widget for StudyPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(index) = self.session.current_index() else {
            return;
        };
        let Some(segment) = self.session.current_segment() else {
            return;
        };

        let title = t!(
            "study.segment_title",
            index = index + 1,
            total = self.session.segments().len(),
            time = segment.timestamp_label()
        );
        let block = Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));

        let playback = match self.playback {
            Some(request) => format!("▶ {}", request.url),
            None => "▶ -".to_string(),
        };
        let mut lines = vec![
            Line::from(Span::styled(playback, Style::default().fg(colors.muted()))),
            Line::from(""),
            self.prompt_line(),
            Line::from(""),
        ];

        if let Some(check) = self.session.feedback(index) {
            let evaluation = &check.evaluation;
            let (mark, verdict, color) = if evaluation.correct {
                (CORRECT_MARK, t!("study.correct"), colors.success())
            } else {
                (WRONG_MARK, t!("study.incorrect"), colors.error())
            };
            lines.push(Line::from(Span::styled(
                format!("{mark} {verdict}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            if !evaluation.correct {
                lines.push(diff_line(&evaluation.diff_markup, colors));
            }
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", t!("study.answer_label")),
                    Style::default().fg(colors.muted()),
                ),
                Span::styled(segment.text.clone(), Style::default().fg(colors.fg())),
            ]));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
