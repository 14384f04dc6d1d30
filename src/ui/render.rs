//! Pure drawing and hit-testing for the search screen.
//!
//! Nothing here holds state: every function takes the already-resolved view
//! (`PanelView`, `LeaderboardView`) and draws it, so the same code renders the
//! live terminal and the headless `TestBackend` frame.

use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::leaderboard::{LeaderboardView, bar_percent};
use crate::search::PanelView;
use crate::ui::components::theme::ThemePalette;
use crate::ui::shortcuts;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
const BAR_GLYPH: char = '█';

/// Screen regions, computed once per frame and reused for mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub input: Rect,
    pub panel: Rect,
    pub leaderboard: Rect,
    pub banner: Rect,
    pub footer: Rect,
}

pub fn app_layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    AppLayout {
        header: rows[0],
        input: rows[1],
        panel: body[0],
        leaderboard: body[1],
        banner: rows[3],
        footer: rows[4],
    }
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Suggestion index under the pointer, if the panel is showing suggestions.
///
/// Items start on the first row inside the panel border.
pub fn panel_item_at(panel: Rect, view: &PanelView<'_>, column: u16, row: u16) -> Option<usize> {
    let PanelView::Suggestions { items, .. } = view else {
        return None;
    };
    let inner = Block::default().borders(Borders::ALL).inner(panel);
    if !contains(inner, column, row) {
        return None;
    }
    let index = usize::from(row - inner.y);
    (index < items.len()).then_some(index)
}

/// `1500` -> `1,500`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Bar of `width` cells filled to `pct` percent.
pub fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    std::iter::repeat_n(BAR_GLYPH, filled.min(width)).collect()
}

pub fn render_header(frame: &mut Frame, area: Rect, palette: ThemePalette) {
    let line = Line::from(vec![
        Span::styled("typeahead", palette.title()),
        Span::styled("  ranked term search", palette.hint_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    loading: bool,
    focused: bool,
    tick: usize,
    palette: ThemePalette,
) {
    let border = if focused {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let mut title = vec![Span::styled(" Search ", palette.title())];
    if loading {
        title.push(Span::styled(
            format!("{} ", SPINNER[tick % SPINNER.len()]),
            palette.hint_style(),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(title));

    let body = if query.is_empty() {
        Line::from(Span::styled(
            "Type to search... (e.g. java, react, python)",
            palette.hint_style(),
        ))
    } else {
        Line::from(Span::styled(query.to_string(), Style::default().fg(palette.fg)))
    };
    frame.render_widget(Paragraph::new(body).block(block), area);

    if focused {
        let typed = u16::try_from(query.chars().count()).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(1).saturating_add(typed);
        if cursor_x < area.right().saturating_sub(1) {
            frame.set_cursor_position((cursor_x, area.y + 1));
        }
    }
}

pub fn render_panel(frame: &mut Frame, area: Rect, view: &PanelView<'_>, palette: ThemePalette) {
    match *view {
        PanelView::Hidden => {}
        PanelView::Suggestions {
            items,
            selected,
            execution_time_ms,
        } => {
            let plural = if items.len() == 1 { "" } else { "s" };
            let mut header = format!(" {} suggestion{plural}", items.len());
            if let Some(ms) = execution_time_ms {
                header.push_str(&format!(" • {ms}ms"));
            }
            header.push(' ');
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border_focus_style())
                .title(Span::styled(header, palette.title()));

            let width = usize::from(area.width.saturating_sub(2));
            let rows: Vec<ListItem> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let count = format!("{} searches", format_count(item.frequency));
                    let gap = width
                        .saturating_sub(item.term.chars().count() + count.chars().count())
                        .max(1);
                    let style = if selected == Some(i) {
                        palette.selected_style()
                    } else {
                        Style::default().fg(palette.fg)
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(item.term.clone(), style),
                        Span::styled(" ".repeat(gap), style),
                        Span::styled(count, style.patch(palette.hint_style())),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(rows).block(block), area);
        }
        PanelView::NoResults { query } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border_style());
            let text = Line::from(Span::styled(
                format!("No results for \"{query}\""),
                palette.hint_style(),
            ));
            frame.render_widget(
                Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
                area,
            );
        }
    }
}

pub fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    view: &LeaderboardView<'_>,
    focused: bool,
    palette: ThemePalette,
) {
    let border = if focused {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(" Most popular ", palette.title()));

    let lines: Vec<Line> = match *view {
        LeaderboardView::Loading => vec![Line::from(Span::styled(
            "Loading...",
            palette.hint_style(),
        ))],
        LeaderboardView::Failed { message } => vec![
            Line::from(Span::styled(message.to_string(), palette.error_style())),
            Line::from(""),
            Line::from(Span::styled(
                format!("[ Retry ]  press {} or r", shortcuts::RETRY_LEADERBOARD),
                palette.title(),
            )),
        ],
        LeaderboardView::Empty => vec![Line::from(Span::styled(
            "No terms ranked yet",
            palette.hint_style(),
        ))],
        LeaderboardView::Ranked { entries } => {
            let inner_width = usize::from(area.width.saturating_sub(2));
            let term_width = entries
                .iter()
                .map(|e| e.term.chars().count())
                .max()
                .unwrap_or(0);
            let count_width = entries
                .iter()
                .map(|e| format_count(e.frequency).len())
                .max()
                .unwrap_or(0);
            let rank_width = entries.len().to_string().len() + 1;
            let bar_width = inner_width.saturating_sub(rank_width + term_width + count_width + 4);
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let pct = bar_percent(entries, i).unwrap_or(0.0);
                    Line::from(vec![
                        Span::styled(
                            format!("{:>rank_width$} ", format!("#{}", i + 1)),
                            palette.hint_style(),
                        ),
                        Span::styled(
                            format!("{:<term_width$} ", entry.term),
                            Style::default().fg(palette.fg),
                        ),
                        Span::styled(
                            format!("{:>count_width$} ", format_count(entry.frequency)),
                            palette.hint_style(),
                        ),
                        Span::styled(bar(pct, bar_width), palette.bar_style()),
                    ])
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_banner(frame: &mut Frame, area: Rect, chosen: Option<&str>, palette: ThemePalette) {
    if let Some(term) = chosen {
        let line = Line::from(vec![
            Span::styled("✓ Selected: ", palette.success_style()),
            Span::styled(
                term.to_string(),
                palette.success_style().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

pub fn render_footer(frame: &mut Frame, area: Rect, legend: &str, palette: ThemePalette) {
    frame.render_widget(
        Paragraph::new(Span::styled(legend.to_string(), palette.hint_style())),
        area,
    );
}
