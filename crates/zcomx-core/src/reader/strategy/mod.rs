//! Presentation strategies
//!
//! A strategy maps the reader's page index onto what is visible. `Slider`
//! shows one page sized to the viewport; `Scroller` lays every page out in one
//! column and derives the current page from the scroll position.

mod scroller;
mod slider;

pub use scroller::{PagePlacement, Scroller, ScrollerLayout};
pub use slider::{Slider, SliderLayout};

use super::geometry::{ClickSide, Viewport};
use crate::book::PageList;
use crate::config::{AppConfig, ReaderMode};

/// Snapshot of what a strategy currently presents
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Slider(SliderLayout),
    Scroller(ScrollerLayout),
}

pub trait PresentationStrategy: Send {
    fn mode(&self) -> ReaderMode;

    /// Present page `index` (already clamped by the caller)
    fn show(&mut self, index: usize, pages: &PageList);

    /// Page the reader is on, as seen by this strategy
    fn current_index(&self, pages: &PageList) -> usize;

    /// Viewport changed size
    fn on_resize(&mut self, viewport: Viewport, pages: &PageList);

    /// Page dimensions changed; recompute geometry without moving
    fn relayout(&mut self, pages: &PageList);

    /// Free scrolling by `delta` pixels. Ignored by strategies without a scroll position.
    fn scroll_by(&mut self, _delta: i64, _pages: &PageList) {}

    /// Advance animations. Returns true while something is still moving.
    fn tick(&mut self, _pages: &PageList) -> bool {
        false
    }

    /// Resolve a click at viewport x-coordinate `x`
    fn hit(&self, _x: i64) -> Option<ClickSide> {
        None
    }

    /// Pages at least partly on screen
    fn visible_pages(&self, pages: &PageList) -> Vec<usize>;

    fn layout(&self) -> Layout;
}

/// Build the strategy for `mode`
pub fn build(mode: ReaderMode, viewport: Viewport, config: &AppConfig) -> Box<dyn PresentationStrategy> {
    match mode {
        ReaderMode::Slider => Box::new(Slider::new(viewport, &config.reader)),
        ReaderMode::Scroller => Box::new(Scroller::new(viewport, &config.reader, config.scroll.clone())),
    }
}
