use super::{Layout, PresentationStrategy};
use crate::book::PageList;
use crate::config::{ReaderConfig, ReaderMode, ScrollConfig};
use crate::reader::geometry::Viewport;
use crate::reader::scroll::ScrollAnimator;

/// Portrait fallback for pages whose dimensions are not known yet (height / width)
const DEFAULT_ASPECT: (u32, u32) = (3, 2);

/// Where one page sits in the scroll column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlacement {
    pub index: usize,
    pub top: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerLayout {
    pub scroll_top: u32,
    /// Where the running scroll animation will settle
    pub target_top: u32,
    /// Pages at or above this line count as read
    pub reference_line: u32,
    /// Visible pages only
    pub placements: Vec<PagePlacement>,
    pub page_number: usize,
}

/// Continuous vertical column of pages
pub struct Scroller {
    viewport: Viewport,
    spacing: u32,
    reference: u32,
    animator: ScrollAnimator,
    /// Top offset and height of every page, in page order
    placements: Vec<PagePlacement>,
}

impl Scroller {
    pub fn new(viewport: Viewport, config: &ReaderConfig, scroll: ScrollConfig) -> Self {
        Self {
            viewport,
            spacing: config.page_spacing_px,
            reference: config.overlay_reference_px,
            animator: ScrollAnimator::new(scroll),
            placements: Vec::new(),
        }
    }

    fn page_height(&self, pages: &PageList, index: usize) -> u32 {
        let width = self.viewport.width;
        pages
            .get(index)
            .and_then(|page| page.dimensions)
            .map(|dims| dims.height_at_width(width))
            .unwrap_or(width * DEFAULT_ASPECT.0 / DEFAULT_ASPECT.1)
    }

    fn compute_placements(&mut self, pages: &PageList) {
        let mut top = 0u32;
        self.placements = (0..pages.len())
            .map(|index| {
                let height = self.page_height(pages, index);
                let placement = PagePlacement { index, top, height };
                top = top.saturating_add(height).saturating_add(self.spacing);
                placement
            })
            .collect();
    }

    fn ensure_placements(&mut self, pages: &PageList) {
        if self.placements.len() != pages.len() {
            self.compute_placements(pages);
        }
    }

    /// Scrolling stops once the last page's top reaches the top of the viewport
    fn max_scroll(&self) -> u32 {
        self.placements.last().map(|p| p.top).unwrap_or(0)
    }

    /// Last page whose top is at or above the reference line
    ///
    /// Linear scan over the page offsets; derived from the scroll target so
    /// consecutive steps chain while an animation is still running. The line
    /// never reaches past the page at the scroll top, so pages shorter than
    /// the reference distance still become current when scrolled to.
    fn derive_current(&self) -> usize {
        let target = self.animator.target();
        let reach = self
            .placements
            .iter()
            .rev()
            .find(|p| p.top <= target)
            .map(|p| self.reference.min(p.height.saturating_sub(1)))
            .unwrap_or(self.reference);
        let line = target.saturating_add(reach);
        let mut current = 0;
        for placement in &self.placements {
            if placement.top > line {
                break;
            }
            current = placement.index;
        }
        current
    }

    /// Keep the current page (and the offset into it) in place across a relayout
    fn reanchor(&mut self, pages: &PageList) {
        let anchor = self.derive_current();
        let into_page = self
            .placements
            .get(anchor)
            .map(|p| self.animator.target().saturating_sub(p.top))
            .unwrap_or(0);

        self.compute_placements(pages);

        if let Some(placement) = self.placements.get(anchor) {
            let position = placement.top + into_page.min(placement.height);
            self.animator.set(position.min(self.max_scroll()));
        }
    }
}

impl PresentationStrategy for Scroller {
    fn mode(&self) -> ReaderMode {
        ReaderMode::Scroller
    }

    fn show(&mut self, index: usize, pages: &PageList) {
        self.ensure_placements(pages);
        if let Some(placement) = self.placements.get(index) {
            let (top, max) = (placement.top, self.max_scroll());
            self.animator.scroll_to(top, max);
        }
    }

    fn current_index(&self, _pages: &PageList) -> usize {
        self.derive_current()
    }

    fn on_resize(&mut self, viewport: Viewport, pages: &PageList) {
        self.viewport = viewport;
        self.reanchor(pages);
    }

    fn relayout(&mut self, pages: &PageList) {
        self.reanchor(pages);
    }

    fn scroll_by(&mut self, delta: i64, pages: &PageList) {
        self.ensure_placements(pages);
        let max = self.max_scroll();
        self.animator.scroll_by(delta, max);
    }

    fn tick(&mut self, pages: &PageList) -> bool {
        self.ensure_placements(pages);
        let max = self.max_scroll();
        self.animator.update(max);
        self.animator.is_animating()
    }

    fn visible_pages(&self, _pages: &PageList) -> Vec<usize> {
        let top = self.animator.current();
        let bottom = top.saturating_add(self.viewport.height);
        self.placements
            .iter()
            .filter(|p| p.top < bottom && p.top.saturating_add(p.height) > top)
            .map(|p| p.index)
            .collect()
    }

    fn layout(&self) -> Layout {
        let scroll_top = self.animator.current();
        let bottom = scroll_top.saturating_add(self.viewport.height);
        Layout::Scroller(ScrollerLayout {
            scroll_top,
            target_top: self.animator.target(),
            reference_line: self.animator.target().saturating_add(self.reference),
            placements: self
                .placements
                .iter()
                .filter(|p| p.top < bottom && p.top.saturating_add(p.height) > scroll_top)
                .copied()
                .collect(),
            page_number: self.derive_current() + 1,
        })
    }
}
