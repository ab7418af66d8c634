use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥110 cols: study panel + dictionary side by side
    Narrow, // dictionary below the study panel
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 110 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }
}

/// Header, body, status line and key hints.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub status: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            status: vertical[2],
            footer: vertical[3],
            tier,
        }
    }
}

/// Study screen regions inside `AppLayout::main`.
pub struct StudyLayout {
    pub progress: Rect,
    pub panel: Rect,
    pub answer: Rect,
    pub lookup: Rect,
    pub dictionary: Rect,
}

impl StudyLayout {
    pub fn new(area: Rect, tier: LayoutTier) -> Self {
        let (left, right) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(area);
            (horizontal[0], Some(horizontal[1]))
        } else {
            (area, None)
        };

        let mut constraints = vec![
            Constraint::Length(1),
            Constraint::Min(7),
            Constraint::Length(3),
        ];
        if right.is_none() {
            constraints.push(Constraint::Length(3));
            constraints.push(Constraint::Length(7));
        }
        let column = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(left);

        match right {
            Some(side) => {
                let side_split = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(3)])
                    .split(side);
                Self {
                    progress: column[0],
                    panel: column[1],
                    answer: column[2],
                    lookup: side_split[0],
                    dictionary: side_split[1],
                }
            }
            None => Self {
                progress: column[0],
                panel: column[1],
                answer: column[2],
                lookup: column[3],
                dictionary: column[4],
            },
        }
    }
}

/// Rows needed to show `text` wrapped at `width` columns.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.width().max(1).div_ceil(width)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.width() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 60;
    const MIN_POPUP_HEIGHT: u16 = 16;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
