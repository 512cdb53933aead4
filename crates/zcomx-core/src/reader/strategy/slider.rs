use super::{Layout, PresentationStrategy};
use crate::book::PageList;
use crate::config::{ReaderConfig, ReaderMode};
use crate::reader::geometry::{ClickSide, ContainerHeight, OverlayGeometry, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct SliderLayout {
    /// The only visible page
    pub index: usize,
    pub container: ContainerHeight,
    /// Rendered image size and position inside the viewport
    pub image_left: i64,
    pub image_width: u32,
    pub image_height: u32,
    pub overlay: OverlayGeometry,
    /// Value of the page-number box (1-based)
    pub page_number: usize,
}

/// One page at a time
pub struct Slider {
    viewport: Viewport,
    buffer: u32,
    indicia_min_height: u32,
    layout: SliderLayout,
}

impl Slider {
    pub fn new(viewport: Viewport, config: &ReaderConfig) -> Self {
        let container = ContainerHeight::Fixed(viewport.height.saturating_sub(config.container_buffer_px));
        Self {
            viewport,
            buffer: config.container_buffer_px,
            indicia_min_height: config.indicia_min_height_px,
            layout: SliderLayout {
                index: 0,
                container,
                image_left: 0,
                image_width: viewport.width,
                image_height: container.resolve(viewport),
                overlay: OverlayGeometry::compute(0, viewport.width, true, false),
                page_number: 1,
            },
        }
    }

    fn container_for(&self, index: usize, pages: &PageList) -> ContainerHeight {
        if pages.is_indicia(index) {
            ContainerHeight::Auto {
                min: self.indicia_min_height,
            }
        } else {
            ContainerHeight::Fixed(self.viewport.height.saturating_sub(self.buffer))
        }
    }

    fn compute(&self, index: usize, pages: &PageList) -> SliderLayout {
        let container = self.container_for(index, pages);
        let height = container.resolve(self.viewport);

        let image_width = pages
            .get(index)
            .and_then(|page| page.dimensions)
            .map(|dims| dims.width_at_height(height).min(self.viewport.width))
            .unwrap_or(self.viewport.width);
        let image_height = pages
            .get(index)
            .and_then(|page| page.dimensions)
            .map(|dims| dims.height_at_width(image_width).min(height))
            .unwrap_or(height);
        let image_left = ((self.viewport.width - image_width) / 2) as i64;

        SliderLayout {
            index,
            container,
            image_left,
            image_width,
            image_height,
            overlay: OverlayGeometry::compute(
                image_left,
                image_width,
                index == 0,
                index == pages.last_index(),
            ),
            page_number: index + 1,
        }
    }
}

impl PresentationStrategy for Slider {
    fn mode(&self) -> ReaderMode {
        ReaderMode::Slider
    }

    fn show(&mut self, index: usize, pages: &PageList) {
        self.layout = self.compute(index.min(pages.last_index()), pages);
    }

    fn current_index(&self, _pages: &PageList) -> usize {
        self.layout.index
    }

    fn on_resize(&mut self, viewport: Viewport, pages: &PageList) {
        self.viewport = viewport;
        self.relayout(pages);
    }

    fn relayout(&mut self, pages: &PageList) {
        self.layout = self.compute(self.layout.index, pages);
    }

    fn hit(&self, x: i64) -> Option<ClickSide> {
        self.layout.overlay.hit(x)
    }

    fn visible_pages(&self, _pages: &PageList) -> Vec<usize> {
        vec![self.layout.index]
    }

    fn layout(&self) -> Layout {
        Layout::Slider(self.layout.clone())
    }
}
