use std::sync::Arc;

use tracing::warn;
use zcomx_core::reader::Viewport;
use zcomx_core::remote::MessagePanel;
use zcomx_core::{AppConfig, FrameMessage, LoadEvent, Reader, ReaderCommand, ReaderOutcome};

use crate::page_image::{self, PageImages};
use crate::input::Action;
use crate::theme::Theme;

/// Pixels per terminal cell in the reader's layout space
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;

/// Rows reserved below the page area for the controls bar
pub const CONTROLS_ROWS: u16 = 1;

/// Page area of a `cols` x `rows` terminal, in layout pixels
pub fn page_viewport(cols: u16, rows: u16) -> Viewport {
    Viewport::new(
        u32::from(cols) * CELL_WIDTH_PX,
        u32::from(rows.saturating_sub(CONTROLS_ROWS)) * CELL_HEIGHT_PX,
    )
}

/// Application mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Page-number box focused, holding what has been typed so far
    GotoPage(String),
    Help,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub reader: Reader,
    pub images: PageImages,
    /// Flash messages (bad page numbers, failed remote actions)
    pub panel: MessagePanel,
    pub theme: Theme,
    pub mode: Mode,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    pub should_quit: bool,
    /// Why the reader stopped, once it has
    pub outcome: Option<ReaderOutcome>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, reader: Reader, theme: Theme) -> Self {
        Self {
            config,
            reader,
            images: PageImages::new(),
            panel: MessagePanel::new(),
            theme,
            mode: Mode::Normal,
            pending_key: None,
            should_quit: false,
            outcome: None,
        }
    }

    /// Keys go to the page-number box instead of the reader
    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::GotoPage(_))
    }

    pub fn apply(&mut self, action: Action) {
        if action != Action::PendingG {
            self.pending_key = None;
        }
        // A flash message lasts until the reader is used again
        if matches!(action, Action::Reader(_) | Action::Click(_) | Action::OpenGoto) {
            self.panel.clear();
        }

        match action {
            Action::Reader(command) => {
                let outcome = self.reader.handle(command);
                self.finish(outcome);
            }
            Action::PendingG => self.pending_key = Some('g'),
            Action::OpenGoto => {
                self.mode = Mode::GotoPage(String::new());
                self.reader.handle(ReaderCommand::ShowControls);
            }
            Action::ToggleHelp => {
                self.mode = if self.mode == Mode::Help { Mode::Normal } else { Mode::Help };
            }
            Action::ExitMode | Action::Cancel => self.mode = Mode::Normal,
            Action::Click(column) => {
                let x = i64::from(column) * i64::from(CELL_WIDTH_PX);
                self.reader.click(x);
            }
            Action::InputChar(c) => {
                if let Mode::GotoPage(buffer) = &mut self.mode {
                    // Longer input cannot be a page number anyway
                    if buffer.len() < 9 {
                        buffer.push(c);
                    }
                }
            }
            Action::Backspace => {
                if let Mode::GotoPage(buffer) = &mut self.mode {
                    buffer.pop();
                }
            }
            Action::Confirm => self.confirm_goto(),
            Action::None => {}
        }
    }

    /// Jump to the 1-based page typed into the box
    fn confirm_goto(&mut self) {
        let Mode::GotoPage(buffer) = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return;
        };
        let typed = buffer.trim();
        if typed.is_empty() {
            return;
        }
        self.panel.clear();
        match typed.parse::<i64>() {
            Ok(number) => {
                let total = self.reader.pages().len();
                let shown = self.reader.goto(number.saturating_sub(1));
                if usize::try_from(number).map_or(true, |n| n == 0 || n > total) {
                    self.panel.info(format!("No page {}, showing page {} of {}", number, shown + 1, total));
                }
            }
            Err(_) => self.panel.error(format!("Not a page number: {}", typed)),
        }
    }

    fn finish(&mut self, outcome: ReaderOutcome) {
        if outcome != ReaderOutcome::Continue {
            self.should_quit = true;
            self.outcome = Some(outcome);
        }
    }

    pub fn handle_frame_message(&mut self, message: FrameMessage) {
        let outcome = self.reader.handle_message(message);
        self.finish(outcome);
    }

    /// Decode an arrived page and feed its size back into the layout
    pub fn on_load_event(&mut self, event: LoadEvent) {
        self.reader.on_load_event(&event);
        match event {
            LoadEvent::Loaded { index, bytes } => match page_image::decode(&bytes) {
                Ok(decoded) => {
                    self.images.insert(index, decoded.image);
                    self.reader.report_dimensions(index, decoded.width, decoded.height);
                }
                Err(e) => {
                    warn!(index, error = %e, "Page image could not be decoded");
                    self.images.mark_broken(index);
                }
            },
            LoadEvent::Abandoned { index, .. } => self.images.mark_broken(index),
        }
    }

    /// Terminal resized to `cols` x `rows` (already debounced)
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.reader.resize(page_viewport(cols, rows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::handle_key_event;
    use crate::keymap::Keymap;
    use bytes::Bytes;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use zcomx_core::book::PageRecord;
    use zcomx_core::remote::MessageLevel;
    use zcomx_core::PageList;

    fn app(n: usize) -> App {
        let pages = PageList::from_records(
            (0..n)
                .map(|i| PageRecord {
                    id: i as u64,
                    image: format!("p{}", i),
                    width: None,
                    height: None,
                })
                .collect(),
        )
        .unwrap();
        let config = Arc::new(AppConfig::default());
        // 160 x 46 cells: 1280 x 720 px page area
        let reader = Reader::new(pages, page_viewport(160, 46), &config);
        App::new(config, reader, Theme::default())
    }

    fn press(app: &mut App, keymap: &Keymap, code: KeyCode) {
        let modifiers = match code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => KeyModifiers::SHIFT,
            _ => KeyModifiers::NONE,
        };
        let action = handle_key_event(KeyEvent::new(code, modifiers), app, keymap);
        app.apply(action);
    }

    fn png(width: u32, height: u32) -> Bytes {
        let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(buffer)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn test_reader_keys() {
        let mut app = app(10);
        let keymap = Keymap::default();

        press(&mut app, &keymap, KeyCode::Char('l'));
        press(&mut app, &keymap, KeyCode::Right);
        assert_eq!(app.reader.current(), 2);

        press(&mut app, &keymap, KeyCode::Char('G'));
        assert_eq!(app.reader.current(), 9);

        press(&mut app, &keymap, KeyCode::Char('g'));
        assert_eq!(app.pending_key, Some('g'));
        press(&mut app, &keymap, KeyCode::Char('g'));
        assert_eq!(app.reader.current(), 0);
        assert_eq!(app.pending_key, None);
    }

    #[tokio::test]
    async fn test_goto_box_captures_keys() {
        let mut app = app(30);
        let keymap = Keymap::default();

        press(&mut app, &keymap, KeyCode::Char(':'));
        assert!(app.is_input_mode());

        // 'l' would be "next page" outside the box
        press(&mut app, &keymap, KeyCode::Char('l'));
        press(&mut app, &keymap, KeyCode::Char('1'));
        press(&mut app, &keymap, KeyCode::Char('2'));
        assert_eq!(app.mode, Mode::GotoPage("12".to_string()));
        assert_eq!(app.reader.current(), 0);

        press(&mut app, &keymap, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.reader.current(), 11);
    }

    #[tokio::test]
    async fn test_goto_box_clamps_and_reports_garbage() {
        let mut app = app(5);
        app.mode = Mode::GotoPage("99".to_string());
        app.apply(Action::Confirm);
        assert_eq!(app.reader.current(), 4);

        let clamped = app.panel.latest().unwrap();
        assert_eq!(clamped.level, MessageLevel::Info);
        assert_eq!(clamped.text, "No page 99, showing page 5 of 5");

        app.mode = Mode::GotoPage("-".to_string());
        app.apply(Action::Confirm);
        assert_eq!(app.reader.current(), 4);
        assert_eq!(app.panel.messages().len(), 1);
        assert_eq!(app.panel.latest().unwrap().level, MessageLevel::Error);
    }

    #[tokio::test]
    async fn test_navigation_clears_flash_message() {
        let mut app = app(10);
        app.mode = Mode::GotoPage("-".to_string());
        app.apply(Action::Confirm);
        assert!(app.panel.latest().is_some());

        app.apply(Action::Reader(ReaderCommand::Next));
        assert!(app.panel.latest().is_none());
        assert_eq!(app.reader.current(), 1);
    }

    #[tokio::test]
    async fn test_escape_closes_reader_in_normal_mode() {
        let mut app = app(3);
        let keymap = Keymap::default();

        app.mode = Mode::Help;
        press(&mut app, &keymap, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.should_quit);

        press(&mut app, &keymap, KeyCode::Char(':'));
        press(&mut app, &keymap, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.should_quit);

        press(&mut app, &keymap, KeyCode::Esc);
        assert!(app.should_quit);
        assert_eq!(app.outcome, Some(ReaderOutcome::Close(FrameMessage::Close)));
    }

    #[tokio::test]
    async fn test_close_key_quits_with_close_message() {
        let mut app = app(3);
        press(&mut app, &Keymap::default(), KeyCode::Char('q'));
        assert!(app.should_quit);
        assert_eq!(app.outcome, Some(ReaderOutcome::Close(FrameMessage::Close)));
    }

    #[tokio::test]
    async fn test_click_columns_turn_pages() {
        let mut app = app(5);
        // Full-width page: left zone ends at x=620, right zone starts at x=660
        app.apply(Action::Click(100));
        assert_eq!(app.reader.current(), 1);
        app.apply(Action::Click(10));
        assert_eq!(app.reader.current(), 0);
    }

    #[tokio::test]
    async fn test_load_events_decode_pages() {
        let mut app = app(3);
        app.on_load_event(LoadEvent::Loaded { index: 0, bytes: png(960, 1440) });
        app.on_load_event(LoadEvent::Loaded { index: 1, bytes: Bytes::from_static(b"oops") });
        app.on_load_event(LoadEvent::Abandoned { index: 2, attempts: 5 });

        assert!(app.images.get(0).is_some());
        assert_eq!(
            app.reader.pages().get(0).and_then(|p| p.dimensions).map(|d| (d.width, d.height)),
            Some((960, 1440))
        );
        assert!(app.images.is_broken(1));
        assert!(app.images.is_broken(2));
    }

    #[tokio::test]
    async fn test_switch_message_stops_reader() {
        let mut app = app(3);
        app.handle_frame_message(FrameMessage::Switch { url: "next.json".to_string() });
        assert!(app.should_quit);
        assert_eq!(app.outcome, Some(ReaderOutcome::Switch("next.json".to_string())));
    }
}
