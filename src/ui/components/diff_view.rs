use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::engine::diff::{SpanKind, parse_markup};
use crate::ui::theme::ThemeColors;

/// Styled line for diff markup. Deleted text is struck through, inserted
/// text bold and underlined, so the diff reads without color too.
pub fn diff_line(markup: &str, colors: &ThemeColors) -> Line<'static> {
    let spans: Vec<Span<'static>> = parse_markup(markup)
        .into_iter()
        .map(|span| {
            let (fg, bg) = colors.diff(span.kind);
            let mut style = Style::default().fg(fg);
            if let Some(bg) = bg {
                style = style.bg(bg);
            }
            style = match span.kind {
                SpanKind::Delete => style.add_modifier(Modifier::CROSSED_OUT),
                SpanKind::Insert => style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                SpanKind::Equal | SpanKind::Unchanged => style,
            };
            Span::styled(span.text, style)
        })
        .collect();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_follow_markup() {
        let colors = ThemeColors::default();
        let line = diff_line("맛<del>없</del><ins>있</ins>다", &colors);
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["맛", "없", "있", "다"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert!(line.spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn plain_text_is_one_span() {
        let line = diff_line("안녕하세요", &ThemeColors::default());
        assert_eq!(line.spans.len(), 1);
    }
}
