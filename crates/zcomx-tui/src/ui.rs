use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, Mode, CONTROLS_ROWS};
use crate::widgets::{ControlsWidget, PageViewWidget, PopupWidget};

/// Draw one frame of the reader
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(CONTROLS_ROWS)])
        .split(frame.area());

    PageViewWidget::render(frame, chunks[0], app);

    let view = app.reader.view();
    ControlsWidget::render_zone_hints(frame, chunks[0], app, &view);
    ControlsWidget::render(frame, chunks[1], app, &view);

    match &app.mode {
        Mode::Help => PopupWidget::render_help(frame, &app.config.keymap, &app.theme),
        Mode::GotoPage(typed) => PopupWidget::render_goto(frame, typed, view.total, &app.theme),
        Mode::Normal => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};
    use zcomx_core::book::PageRecord;
    use zcomx_core::{AppConfig, PageList, Reader, ReaderCommand};

    use crate::app::page_viewport;
    use crate::input::Action;
    use crate::theme::Theme;

    fn app(cols: u16, rows: u16) -> App {
        let pages = PageList::from_records(
            (0..12)
                .map(|i| PageRecord {
                    id: i,
                    image: format!("p{}", i),
                    width: Some(800),
                    height: Some(1200),
                })
                .collect(),
        )
        .unwrap();
        let config = Arc::new(AppConfig::default());
        let reader = Reader::new(pages, page_viewport(cols, rows), &config);
        App::new(config, reader, Theme::default())
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_draws_page_number_box() {
        let mut app = app(80, 24);
        app.reader.goto(4);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains(" 5 / 12 "));
        assert!(text.contains("Loading page..."));
    }

    #[tokio::test]
    async fn test_page_number_box_returns_after_flash_message() {
        let mut app = app(80, 24);
        app.mode = Mode::GotoPage("-".to_string());
        app.apply(Action::Confirm);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Not a page number: -"));

        for _ in 0..5 {
            app.apply(Action::Reader(ReaderCommand::Next));
        }
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains(" 6 / 12 "));
        assert!(!text.contains("Not a page number"));
    }

    #[tokio::test]
    async fn test_draws_goto_box() {
        let mut app = app(80, 24);
        app.mode = Mode::GotoPage("7".to_string());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        assert!(screen(&terminal).contains("Page (1-12)"));
    }
}
