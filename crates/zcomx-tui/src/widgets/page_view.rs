use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zcomx_core::reader::{Layout, ScrollerLayout, SliderLayout};

use crate::app::{App, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::theme::Theme;

pub struct PageViewWidget;

impl PageViewWidget {
    /// Render the visible page(s) of the current layout into `area`
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = app.theme.clone();
        frame.render_widget(Block::default().style(Style::default().bg(theme.backdrop)), area);

        let view = app.reader.view();
        app.images.retain_rendered(&view.visible);

        match view.layout {
            Layout::Slider(layout) => Self::render_slider(frame, area, app, &layout, &theme),
            Layout::Scroller(layout) => Self::render_scroller(frame, area, app, &layout, &theme),
        }
    }

    fn render_slider(frame: &mut Frame, area: Rect, app: &mut App, layout: &SliderLayout, theme: &Theme) {
        let left = (layout.image_left.max(0) as u32 / CELL_WIDTH_PX) as u16;
        let width = (layout.image_width.div_ceil(CELL_WIDTH_PX) as u16).min(area.width.saturating_sub(left));
        let height = ((layout.image_height / CELL_HEIGHT_PX) as u16).clamp(1, area.height.max(1));
        let rect = Rect {
            x: area.x + left,
            y: area.y,
            width,
            height: height.min(area.height),
        };
        Self::render_page(frame, rect, app, layout.index, 0, height, theme);
    }

    fn render_scroller(frame: &mut Frame, area: Rect, app: &mut App, layout: &ScrollerLayout, theme: &Theme) {
        let cell_height = i64::from(CELL_HEIGHT_PX);
        for placement in &layout.placements {
            let offset = i64::from(placement.top) - i64::from(layout.scroll_top);
            let top = offset.div_euclid(cell_height);
            let rows = (i64::from(placement.height) / cell_height).max(1);

            let start = top.max(0);
            let end = (top + rows).min(i64::from(area.height));
            if start >= end {
                continue;
            }

            let rect = Rect {
                x: area.x,
                y: area.y + start as u16,
                width: area.width,
                height: (end - start) as u16,
            };
            Self::render_page(frame, rect, app, placement.index, (start - top) as u16, rows as u16, theme);
        }
    }

    /// Draw page `index` scaled to `full_rows` rows, skipping the first `skip` rows
    fn render_page(
        frame: &mut Frame,
        rect: Rect,
        app: &mut App,
        index: usize,
        skip: u16,
        full_rows: u16,
        theme: &Theme,
    ) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }

        let broken = app.images.is_broken(index);
        if let Some(lines) = app.images.lines(index, rect.width, full_rows) {
            let paragraph = Paragraph::new(lines.to_vec()).scroll((skip, 0));
            frame.render_widget(paragraph, rect);
            return;
        }

        let (message, color) = if broken {
            ("Image unavailable", theme.error)
        } else {
            ("Loading page...", theme.muted)
        };
        let block = Block::default()
            .title(format!(" {} ", index + 1))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.panel_alt))
            .style(Style::default().bg(theme.backdrop));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if inner.height > 0 {
            let line = Line::from(Span::styled(
                message,
                Style::default().fg(color).add_modifier(Modifier::ITALIC),
            ));
            let centered = Rect {
                y: inner.y + inner.height / 2,
                height: 1,
                ..inner
            };
            frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), centered);
        }
    }
}
