use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use zcomx_core::config::KeymapConfig;

use crate::theme::Theme;

pub struct PopupWidget;

impl PopupWidget {
    /// Key reference; any key closes it
    pub fn render_help(frame: &mut Frame, keys: &KeymapConfig, theme: &Theme) {
        let rows: [(String, &str); 10] = [
            (format!("{} → PgDn Space", keys.next_page), "next page"),
            (format!("{} ← PgUp", keys.prev_page), "previous page"),
            (format!("{} Home", keys.first_page), "first page"),
            (format!("{} End", keys.last_page), "last page"),
            (keys.goto_page.clone(), "go to page number"),
            (format!("{} ↓ / {} ↑", keys.scroll_down, keys.scroll_up), "scroll (scroller)"),
            (keys.toggle_mode.clone(), "slider / scroller"),
            ("click".to_string(), "left / right half turns the page"),
            (keys.help.clone(), "this help"),
            (format!("{} Esc Ctrl-c", keys.close), "close the reader"),
        ];

        let area = frame.area();
        let popup_area = centered_rect(52u16.min(area.width.saturating_sub(2)), 14u16.min(area.height), area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.key))
            .style(Style::default().bg(theme.panel));

        let lines: Vec<Line> = rows
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<18}", key),
                        Style::default().fg(theme.key).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*what, Style::default().fg(theme.text)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    /// Focused page-number box
    pub fn render_goto(frame: &mut Frame, typed: &str, total: usize, theme: &Theme) {
        let area = frame.area();
        let popup_area = centered_rect(30u16.min(area.width.saturating_sub(2)), 3u16.min(area.height), area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" Page (1-{}) ", total))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.page_number_bg))
            .style(Style::default().bg(theme.panel));

        let line = Line::from(vec![
            Span::styled(typed.to_string(), Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
            Span::styled("_", Style::default().fg(theme.muted).add_modifier(Modifier::SLOW_BLINK)),
        ]);
        frame.render_widget(
            Paragraph::new(line).alignment(Alignment::Center).block(block),
            popup_area,
        );
    }
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(30, 3, area), Rect::new(35, 18, 30, 3));
        assert_eq!(centered_rect(120, 50, area), Rect::new(0, 0, 120, 50));
    }
}
