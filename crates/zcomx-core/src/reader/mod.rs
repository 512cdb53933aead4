//! The reader: one owned component tying navigation, presentation, image
//! loading and the controls overlay together.
//!
//! Every navigation runs the same pipeline: the navigation state picks the
//! target page, the active presentation strategy shows it, the controls
//! overlay is re-armed and the loader is asked for the target and its
//! neighbours.

pub mod geometry;
pub mod navigation;
pub mod overlay;
pub mod scroll;
pub mod strategy;

pub use geometry::{ClickSide, ClickZone, ContainerHeight, Cursor, OverlayGeometry, Viewport};
pub use navigation::NavigationState;
pub use overlay::ControlsOverlay;
pub use scroll::ScrollAnimator;
pub use strategy::{Layout, PagePlacement, PresentationStrategy, ScrollerLayout, SliderLayout};

use std::time::Duration;

use tracing::{debug, info};

use crate::book::{Dimensions, PageList};
use crate::config::{AppConfig, ReaderMode};
use crate::frame::FrameMessage;
use crate::loader::{LoadEvent, PageImageLoader};

/// Something the user (or a key binding) asked the reader to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    Next,
    Prev,
    First,
    Last,
    /// 0-based, clamped into range
    Goto(i64),
    ScrollDown,
    ScrollUp,
    ToggleMode,
    ShowControls,
    Close,
}

/// What the embedder has to do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderOutcome {
    Continue,
    /// Forward the message to the parent and tear the reader down
    Close(FrameMessage),
    /// Reload the page list from this source
    Switch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Navigation phase; `Navigating` never outlives the call that entered it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReaderState {
    #[default]
    Idle,
    Navigating,
}

/// Everything a front end needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub mode: ReaderMode,
    /// 1-based, for the page-number box
    pub page_number: usize,
    pub total: usize,
    pub layout: Layout,
    pub visible: Vec<usize>,
    pub controls_visible: bool,
    pub loaded: usize,
}

pub struct Reader {
    pages: PageList,
    nav: NavigationState,
    strategy: Box<dyn PresentationStrategy>,
    loader: Option<PageImageLoader>,
    overlay: ControlsOverlay,
    config: AppConfig,
    viewport: Viewport,
    rotate: bool,
    hide_delay: Duration,
    scroll_step: i64,
    state: ReaderState,
    /// Visible pages last handed to the loader
    requested: Vec<usize>,
}

impl Reader {
    /// Mount a reader on `pages` at the configured start page
    ///
    /// Must be called from within a tokio runtime (the overlay hide timer is a task).
    pub fn new(pages: PageList, viewport: Viewport, config: &AppConfig) -> Self {
        let mode = config.reader.mode;
        let mut nav = NavigationState::new(pages.len());
        let start = nav.goto(i64::try_from(config.reader.start_page).unwrap_or(i64::MAX));

        let mut strategy = strategy::build(mode, viewport, config);
        strategy.show(start, &pages);

        let mut reader = Self {
            pages,
            nav,
            strategy,
            loader: None,
            overlay: ControlsOverlay::new(),
            config: config.clone(),
            viewport,
            rotate: config.reader.rotate,
            hide_delay: Duration::from_millis(config.reader.controls_hide_delay_ms),
            scroll_step: i64::from(config.scroll.scroll_step_px),
            state: ReaderState::Idle,
            requested: Vec::new(),
        };
        reader.overlay.touch(reader.hide_delay);

        info!(pages = reader.pages.len(), ?mode, start, "Mounted reader");
        reader
    }

    /// Hand image loading to `loader` and queue every page, nearest first
    pub fn attach_loader(&mut self, loader: PageImageLoader) {
        loader.warm_up(self.nav.current());
        self.loader = Some(loader);
        self.requested.clear();
    }

    pub fn pages(&self) -> &PageList {
        &self.pages
    }

    pub fn current(&self) -> usize {
        self.strategy.current_index(&self.pages)
    }

    pub fn mode(&self) -> ReaderMode {
        self.strategy.mode()
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn rotate(&self) -> bool {
        self.rotate
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = rotate;
    }

    pub fn controls_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn next(&mut self) -> usize {
        self.navigate(|nav, rotate| nav.next(rotate))
    }

    pub fn prev(&mut self) -> usize {
        self.navigate(|nav, rotate| nav.prev(rotate))
    }

    pub fn first(&mut self) -> usize {
        self.navigate(|nav, _| nav.first())
    }

    pub fn last(&mut self) -> usize {
        self.navigate(|nav, _| nav.last())
    }

    pub fn goto(&mut self, index: i64) -> usize {
        self.navigate(|nav, _| nav.goto(index))
    }

    fn navigate(&mut self, step: impl FnOnce(&mut NavigationState, bool) -> usize) -> usize {
        self.state = ReaderState::Navigating;

        // The scroller may have moved since the last navigation
        self.nav.goto(self.strategy.current_index(&self.pages) as i64);
        let from = self.nav.current();
        let target = step(&mut self.nav, self.rotate);

        self.strategy.show(target, &self.pages);
        self.overlay.touch(self.hide_delay);
        self.request_neighbourhood(target);

        debug!(from, target, "Navigated");
        self.state = ReaderState::Idle;
        target
    }

    pub fn handle(&mut self, command: ReaderCommand) -> ReaderOutcome {
        match command {
            ReaderCommand::Next => {
                self.next();
            }
            ReaderCommand::Prev => {
                self.prev();
            }
            ReaderCommand::First => {
                self.first();
            }
            ReaderCommand::Last => {
                self.last();
            }
            ReaderCommand::Goto(index) => {
                self.goto(index);
            }
            ReaderCommand::ScrollDown => self.scroll_by(self.scroll_step),
            ReaderCommand::ScrollUp => self.scroll_by(-self.scroll_step),
            ReaderCommand::ToggleMode => {
                let mode = match self.mode() {
                    ReaderMode::Slider => ReaderMode::Scroller,
                    ReaderMode::Scroller => ReaderMode::Slider,
                };
                self.set_mode(mode);
            }
            ReaderCommand::ShowControls => self.overlay.touch(self.hide_delay),
            ReaderCommand::Close => return ReaderOutcome::Close(self.close()),
        }
        ReaderOutcome::Continue
    }

    /// Click at viewport x-coordinate `x`; outside both zones it only shows the controls
    pub fn click(&mut self, x: i64) -> Option<ClickSide> {
        let side = self.strategy.hit(x);
        match side {
            Some(ClickSide::Left) => {
                self.prev();
            }
            Some(ClickSide::Right) => {
                self.next();
            }
            None => self.overlay.touch(self.hide_delay),
        }
        side
    }

    /// A swipe to the left turns the page forward
    pub fn swipe(&mut self, direction: SwipeDirection) -> usize {
        match direction {
            SwipeDirection::Left => self.next(),
            SwipeDirection::Right => self.prev(),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "Viewport resized");
        self.viewport = viewport;
        self.strategy.on_resize(viewport, &self.pages);
        self.nav.goto(self.strategy.current_index(&self.pages) as i64);
        self.request_visible();
    }

    pub fn scroll_by(&mut self, delta: i64) {
        self.strategy.scroll_by(delta, &self.pages);
        self.nav.goto(self.strategy.current_index(&self.pages) as i64);
        self.overlay.touch(self.hide_delay);
        self.request_visible();
    }

    /// Advance animations; true while the view is still moving
    pub fn tick(&mut self) -> bool {
        let moving = self.strategy.tick(&self.pages);
        self.request_visible();
        moving
    }

    /// Swap the presentation, staying on the current page
    pub fn set_mode(&mut self, mode: ReaderMode) {
        if mode == self.mode() {
            return;
        }
        let current = self.current();
        self.strategy = strategy::build(mode, self.viewport, &self.config);
        self.strategy.show(current, &self.pages);
        self.nav.goto(current as i64);
        self.overlay.touch(self.hide_delay);
        self.requested.clear();
        self.request_visible();
        info!(?mode, current, "Switched presentation");
    }

    pub fn on_load_event(&mut self, event: &LoadEvent) {
        match event {
            LoadEvent::Loaded { index, bytes } => {
                self.pages.mark_loaded(*index);
                debug!(index, bytes = bytes.len(), "Page image loaded");
            }
            LoadEvent::Abandoned { index, attempts } => {
                debug!(index, attempts, "Page image left blank");
            }
        }
    }

    /// Record the decoded size of page `index`. Returns true when the layout changed.
    pub fn report_dimensions(&mut self, index: usize, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let dimensions = Dimensions::new(width, height);
        match self.pages.get(index) {
            Some(page) if page.dimensions != Some(dimensions) => {
                self.pages.set_dimensions(index, dimensions);
                self.strategy.relayout(&self.pages);
                self.request_visible();
                true
            }
            _ => false,
        }
    }

    pub fn handle_message(&mut self, message: FrameMessage) -> ReaderOutcome {
        match message {
            FrameMessage::Close => ReaderOutcome::Close(self.close()),
            FrameMessage::Switch { url } => {
                info!(%url, "Switching book");
                ReaderOutcome::Switch(url)
            }
        }
    }

    /// Message for the parent frame asking it to remove the reader
    pub fn close(&mut self) -> FrameMessage {
        info!(page = self.current(), "Closing reader");
        self.overlay.hide(Duration::ZERO);
        FrameMessage::Close
    }

    pub fn view(&self) -> View {
        View {
            mode: self.mode(),
            page_number: self.current() + 1,
            total: self.pages.len(),
            layout: self.strategy.layout(),
            visible: self.strategy.visible_pages(&self.pages),
            controls_visible: self.overlay.is_visible(),
            loaded: self.pages.loaded_count(),
        }
    }

    fn request_neighbourhood(&mut self, target: usize) {
        if let Some(loader) = &self.loader {
            loader.ensure_loaded(target);
            if target < self.pages.last_index() {
                loader.ensure_loaded(target + 1);
            }
            if target > 0 {
                loader.ensure_loaded(target - 1);
            }
        }
        self.request_visible();
    }

    fn request_visible(&mut self) {
        let visible = self.strategy.visible_pages(&self.pages);
        if visible == self.requested {
            return;
        }
        if let Some(loader) = &self.loader {
            for &index in &visible {
                loader.ensure_loaded(index);
            }
        }
        self.requested = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use tokio::sync::mpsc;
    use url::Url;

    use crate::book::PageRecord;
    use crate::config::ScrollConfig;
    use crate::loader::{ImageFetcher, RetryPolicy};

    fn pages(n: usize, dims: Option<(u32, u32)>) -> PageList {
        PageList::from_records(
            (0..n)
                .map(|i| PageRecord {
                    id: i as u64,
                    image: format!("p{}", i),
                    width: dims.map(|d| d.0),
                    height: dims.map(|d| d.1),
                })
                .collect(),
        )
        .unwrap()
    }

    fn config(mode: ReaderMode, rotate: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.reader.mode = mode;
        config.reader.rotate = rotate;
        config.reader.page_spacing_px = 0;
        config.scroll = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        config
    }

    fn slider(n: usize, rotate: bool) -> Reader {
        Reader::new(pages(n, None), Viewport::new(1280, 800), &config(ReaderMode::Slider, rotate))
    }

    #[derive(Default)]
    struct RecordingFetcher {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ImageFetcher for RecordingFetcher {
        async fn fetch(&self, url: &Url) -> crate::Result<Bytes> {
            let page = url.path_segments().and_then(|s| s.last()).unwrap_or("").to_string();
            self.requested.lock().unwrap().push(page.clone());
            Ok(Bytes::from(page))
        }
    }

    #[tokio::test]
    async fn test_prev_at_first_page() {
        let mut reader = slider(10, false);
        assert_eq!(reader.prev(), 0);
        assert_eq!(reader.view().page_number, 1);

        reader.set_rotate(true);
        assert_eq!(reader.prev(), 9);
        assert_eq!(reader.view().page_number, 10);
    }

    #[tokio::test]
    async fn test_next_at_last_page() {
        let mut reader = slider(3, false);
        reader.last();
        assert_eq!(reader.next(), 2);

        reader.set_rotate(true);
        assert_eq!(reader.next(), 0);
    }

    #[tokio::test]
    async fn test_goto_clamps_and_is_idempotent() {
        let mut reader = slider(10, false);
        assert_eq!(reader.goto(-4), 0);
        assert_eq!(reader.goto(i64::MAX), 9);
        assert_eq!(reader.goto(4), 4);
        let current = reader.current() as i64;
        assert_eq!(reader.goto(current), 4);
        assert_eq!(reader.state(), ReaderState::Idle);
    }

    #[tokio::test]
    async fn test_start_page_clamped() {
        let mut config = config(ReaderMode::Slider, false);
        config.reader.start_page = 50;
        let reader = Reader::new(pages(5, None), Viewport::new(800, 600), &config);
        assert_eq!(reader.current(), 4);
    }

    #[tokio::test]
    async fn test_commands() {
        let mut reader = slider(5, false);
        assert_eq!(reader.handle(ReaderCommand::Last), ReaderOutcome::Continue);
        assert_eq!(reader.current(), 4);
        reader.handle(ReaderCommand::Goto(1));
        reader.handle(ReaderCommand::Next);
        assert_eq!(reader.current(), 2);
        assert_eq!(
            reader.handle(ReaderCommand::Close),
            ReaderOutcome::Close(FrameMessage::Close)
        );
        assert!(!reader.controls_visible());
    }

    #[tokio::test]
    async fn test_click_zones_turn_pages() {
        let mut reader = Reader::new(
            pages(5, Some((1200, 1800))),
            Viewport::new(1280, 730),
            &config(ReaderMode::Slider, false),
        );
        reader.goto(2);

        assert_eq!(reader.click(420), Some(ClickSide::Left));
        assert_eq!(reader.current(), 1);
        assert_eq!(reader.click(900), Some(ClickSide::Right));
        assert_eq!(reader.current(), 2);
        assert_eq!(reader.click(640), None);
        assert_eq!(reader.current(), 2);
    }

    #[tokio::test]
    async fn test_swipe() {
        let mut reader = slider(5, false);
        assert_eq!(reader.swipe(SwipeDirection::Left), 1);
        assert_eq!(reader.swipe(SwipeDirection::Right), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_shows_controls() {
        let mut reader = slider(5, false);
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(!reader.controls_visible());

        reader.next();
        assert!(reader.controls_visible());
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(!reader.view().controls_visible);
    }

    #[tokio::test]
    async fn test_scroller_steps_chain_while_animating() {
        let mut config = config(ReaderMode::Scroller, false);
        config.scroll.smooth_enabled = true;
        let mut reader = Reader::new(pages(10, Some((800, 1200))), Viewport::new(400, 700), &config);

        reader.next();
        reader.next();
        reader.next();
        assert_eq!(reader.current(), 3);
        assert_eq!(reader.view().page_number, 4);
    }

    #[tokio::test]
    async fn test_scroll_moves_current_page() {
        let mut reader = Reader::new(
            pages(10, Some((800, 1200))),
            Viewport::new(400, 700),
            &config(ReaderMode::Scroller, false),
        );
        // 600px pages, reference line 60px below the top
        reader.scroll_by(1200);
        assert_eq!(reader.current(), 2);
        assert_eq!(reader.next(), 3);
    }

    #[tokio::test]
    async fn test_scroller_next_visits_every_short_page() {
        let mut reader = Reader::new(
            pages(6, Some((800, 1200))),
            Viewport::new(30, 700),
            &config(ReaderMode::Scroller, false),
        );
        for expected in 1..6 {
            assert_eq!(reader.next(), expected);
            assert_eq!(reader.current(), expected);
        }
    }

    #[tokio::test]
    async fn test_toggle_mode_keeps_page() {
        let mut reader = slider(8, false);
        reader.goto(5);
        reader.handle(ReaderCommand::ToggleMode);
        assert_eq!(reader.mode(), ReaderMode::Scroller);
        assert_eq!(reader.current(), 5);

        reader.handle(ReaderCommand::ToggleMode);
        assert_eq!(reader.mode(), ReaderMode::Slider);
        assert_eq!(reader.current(), 5);
    }

    #[tokio::test]
    async fn test_report_dimensions_relayouts() {
        let mut reader = Reader::new(pages(3, None), Viewport::new(1280, 730), &config(ReaderMode::Slider, false));
        assert!(reader.report_dimensions(0, 1200, 1800));
        assert!(!reader.report_dimensions(0, 1200, 1800));
        assert!(!reader.report_dimensions(7, 1200, 1800));

        match reader.view().layout {
            Layout::Slider(layout) => assert_eq!(layout.image_width, 480),
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_frame_messages() {
        let mut reader = slider(3, false);
        assert_eq!(
            reader.handle_message(FrameMessage::Switch { url: "b.json".to_string() }),
            ReaderOutcome::Switch("b.json".to_string())
        );
        assert_eq!(
            reader.handle_message(FrameMessage::Close),
            ReaderOutcome::Close(FrameMessage::Close)
        );
    }

    #[tokio::test]
    async fn test_load_events_mark_pages() {
        let mut reader = slider(3, false);
        reader.on_load_event(&LoadEvent::Loaded { index: 1, bytes: Bytes::from_static(b"img") });
        reader.on_load_event(&LoadEvent::Abandoned { index: 2, attempts: 5 });
        assert!(reader.pages().is_loaded(1));
        assert!(!reader.pages().is_loaded(2));
        assert_eq!(reader.view().loaded, 1);
    }

    #[tokio::test]
    async fn test_attach_loader_warms_up_from_current_page() {
        let mut config = config(ReaderMode::Slider, false);
        config.reader.start_page = 2;
        let mut reader = Reader::new(pages(5, None), Viewport::new(800, 600), &config);

        let fetcher = Arc::new(RecordingFetcher::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = PageImageLoader::spawn(
            (0..5)
                .map(|i| Url::parse(&format!("https://zco.mx/images/download/p{}", i)).unwrap())
                .collect(),
            fetcher.clone(),
            RetryPolicy::default(),
            tx,
        );
        reader.attach_loader(loader);

        for _ in 0..5 {
            let event = rx.recv().await.unwrap();
            reader.on_load_event(&event);
        }
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["p2", "p3", "p1", "p0", "p4"]);
        assert_eq!(reader.view().loaded, 5);
    }
}
