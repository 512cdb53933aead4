//! Pixel geometry shared by the presentation strategies

/// Space available to the reader, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Height rule of the slider's page container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerHeight {
    /// Content pages: viewport height minus the buffer
    Fixed(u32),
    /// Indicia page: grows with its content, never below `min`
    Auto { min: u32 },
}

impl ContainerHeight {
    /// Height used to lay out the page image
    pub fn resolve(&self, viewport: Viewport) -> u32 {
        match *self {
            ContainerHeight::Fixed(height) => height,
            ContainerHeight::Auto { min } => viewport.height.max(min),
        }
    }
}

/// Cursor hint of a click zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    ResizeLeft,
    ResizeRight,
    Default,
}

/// Horizontal click-to-advance zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickZone {
    /// Left edge, may sit left of the viewport origin
    pub x: i64,
    pub width: u32,
    pub cursor: Cursor,
}

impl ClickZone {
    pub fn contains(&self, x: i64) -> bool {
        x >= self.x && x < self.x + self.width as i64
    }
}

/// Which side of the page a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickSide {
    Left,
    Right,
}

const MAX_GUTTER: u32 = 20;
const MIN_EXTEND: u32 = 30;

/// Left/right click overlays laid over the visible page image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    /// Dead band on each side of the image's vertical centre line
    pub gutter: u32,
    /// How far each zone reaches past the image edge
    pub extend: u32,
    /// Part of each zone lying over the image
    pub overlay_width: u32,
    pub left: ClickZone,
    pub right: ClickZone,
}

impl OverlayGeometry {
    /// Zones for an image `image_width` px wide starting at `image_left`
    pub fn compute(image_left: i64, image_width: u32, at_first: bool, at_last: bool) -> Self {
        let gutter = MAX_GUTTER.min(image_width);
        let eighth = image_width / 8;
        let extend = if eighth >= MIN_EXTEND { eighth } else { 0 };
        let half = image_width / 2;
        let overlay_width = half.saturating_sub(gutter);

        let left = ClickZone {
            x: image_left - extend as i64,
            width: overlay_width + extend,
            cursor: if at_first { Cursor::Default } else { Cursor::ResizeLeft },
        };
        let right = ClickZone {
            x: image_left + (half + gutter) as i64,
            width: overlay_width + extend,
            cursor: if at_last { Cursor::Default } else { Cursor::ResizeRight },
        };

        Self {
            gutter,
            extend,
            overlay_width,
            left,
            right,
        }
    }

    /// Resolve a click x-coordinate to a zone
    pub fn hit(&self, x: i64) -> Option<ClickSide> {
        if self.left.contains(x) {
            Some(ClickSide::Left)
        } else if self.right.contains(x) {
            Some(ClickSide::Right)
        } else {
            None
        }
    }
}
