use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use zcomx_core::config::ReaderMode;
use zcomx_core::reader::{Cursor, Layout, View};
use zcomx_core::remote::MessageLevel;

use crate::app::{App, CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// Bottom bar: page-number box, presentation, load progress and key hints
pub struct ControlsWidget;

impl ControlsWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App, view: &View) {
        let theme = &app.theme;
        let bar = Style::default().bg(theme.panel);

        if let Some(message) = app.panel.latest() {
            let color = match message.level {
                MessageLevel::Error => theme.error,
                MessageLevel::Info => theme.info,
            };
            let line = Line::from(Span::styled(format!(" {} ", message.text), Style::default().fg(color)));
            frame.render_widget(Paragraph::new(line).style(bar), area);
            return;
        }

        if !view.controls_visible {
            frame.render_widget(Paragraph::new("").style(Style::default().bg(theme.backdrop)), area);
            return;
        }

        let mode = match view.mode {
            ReaderMode::Slider => "slider",
            ReaderMode::Scroller => "scroller",
        };
        let keys = &app.config.keymap;

        let mut spans = vec![
            Span::styled(
                format!(" {} / {} ", view.page_number, view.total),
                Style::default()
                    .fg(theme.page_number_fg)
                    .bg(theme.page_number_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {} ", mode), Style::default().fg(theme.text)),
            Span::styled(
                format!("{}/{} loaded ", view.loaded, view.total),
                Style::default().fg(theme.muted),
            ),
        ];
        for (key, label) in [
            (keys.prev_page.as_str(), "prev"),
            (keys.next_page.as_str(), "next"),
            (keys.goto_page.as_str(), "page"),
            (keys.help.as_str(), "help"),
            (keys.close.as_str(), "close"),
        ] {
            spans.push(Span::styled(format!(" {}", key), Style::default().fg(theme.key)));
            spans.push(Span::styled(format!(":{}", label), Style::default().fg(theme.muted)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
    }

    /// Prev/next arrows on the edges of the slider's page image
    pub fn render_zone_hints(frame: &mut Frame, page_area: Rect, app: &App, view: &View) {
        let Layout::Slider(layout) = &view.layout else {
            return;
        };
        if !view.controls_visible || page_area.width == 0 || page_area.height == 0 {
            return;
        }

        let middle = (layout.image_height / CELL_HEIGHT_PX / 2) as u16;
        let row = page_area.y + middle.min(page_area.height - 1);
        let left_edge = layout.image_left.max(0);
        let right_edge = left_edge + i64::from(layout.image_width) - 1;

        for (zone, arrow, edge) in [
            (&layout.overlay.left, "‹", left_edge),
            (&layout.overlay.right, "›", right_edge),
        ] {
            let color = match zone.cursor {
                Cursor::Default => app.theme.zone_disabled,
                Cursor::ResizeLeft | Cursor::ResizeRight => app.theme.zone,
            };
            let column = ((edge.max(0) as u32 / CELL_WIDTH_PX) as u16).min(page_area.width - 1);
            frame.render_widget(
                Paragraph::new(Span::styled(arrow, Style::default().fg(color).add_modifier(Modifier::BOLD))),
                Rect::new(page_area.x + column, row, 1, 1),
            );
        }
    }
}
