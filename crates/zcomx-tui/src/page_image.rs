//! Decoded page images and their halfblock rendering

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Largest page kept in memory. Halfblocks use one pixel per column and two
/// per row, so this covers terminals up to 480 x 360 cells.
pub const MAX_DECODED_WIDTH: u32 = 480;
pub const MAX_DECODED_HEIGHT: u32 = 720;

/// A page image reduced to what the terminal can show
pub struct DecodedPage {
    pub image: DynamicImage,
    /// Natural size before downscaling
    pub width: u32,
    pub height: u32,
}

/// Decode fetched page bytes (JPEG, PNG, ...) and downscale to the keepable size
pub fn decode(bytes: &[u8]) -> Result<DecodedPage> {
    let image = image::load_from_memory(bytes).context("Failed to decode page image")?;
    let (width, height) = image.dimensions();
    let image = if width > MAX_DECODED_WIDTH || height > MAX_DECODED_HEIGHT {
        image.resize(
            MAX_DECODED_WIDTH,
            MAX_DECODED_HEIGHT,
            image::imageops::FilterType::Triangle,
        )
    } else {
        image
    };
    Ok(DecodedPage {
        image: DynamicImage::ImageRgb8(image.into_rgb8()),
        width,
        height,
    })
}

/// Render `img` with upper-half-block cells, fitted inside `cols` x `rows`
///
/// Each cell carries two vertical pixels (foreground = top, background =
/// bottom). The image keeps its aspect ratio and is centred horizontally;
/// the returned lines are padded to exactly `rows`.
pub fn halfblock_lines(img: &DynamicImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let target_width = cols as u32;
    let target_height = rows as u32 * 2;

    let (img_width, img_height) = img.dimensions();
    if img_width == 0 || img_height == 0 {
        return vec![Line::default(); rows as usize];
    }
    let scale = (target_width as f32 / img_width as f32).min(target_height as f32 / img_height as f32);
    let new_width = ((img_width as f32 * scale) as u32).clamp(1, target_width);
    let new_height = ((img_height as f32 * scale) as u32).clamp(1, target_height);

    let rgba = img
        .resize_exact(new_width, new_height, image::imageops::FilterType::Triangle)
        .to_rgba8();
    let x_offset = (target_width - new_width) / 2;

    let mut lines = Vec::with_capacity(rows as usize);
    for row in 0..new_height.div_ceil(2) {
        let y = row * 2;
        let mut spans: Vec<Span<'static>> = Vec::with_capacity(new_width as usize + 1);
        if x_offset > 0 {
            spans.push(Span::raw(" ".repeat(x_offset as usize)));
        }
        for x in 0..new_width {
            let top = rgba.get_pixel(x, y);
            let bottom = if y + 1 < new_height { rgba.get_pixel(x, y + 1) } else { top };
            spans.push(Span::styled(
                "▀",
                Style::default()
                    .fg(Color::Rgb(top[0], top[1], top[2]))
                    .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.resize(rows as usize, Line::default());
    lines
}

/// Decoded images by page index, plus rendered lines of the pages on screen
#[derive(Default)]
pub struct PageImages {
    decoded: HashMap<usize, DynamicImage>,
    broken: HashSet<usize>,
    rendered: HashMap<usize, ((u16, u16), Vec<Line<'static>>)>,
}

impl PageImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, image: DynamicImage) {
        self.broken.remove(&index);
        self.rendered.remove(&index);
        self.decoded.insert(index, image);
    }

    /// The page stays blank for the rest of the session
    pub fn mark_broken(&mut self, index: usize) {
        self.broken.insert(index);
    }

    pub fn is_broken(&self, index: usize) -> bool {
        self.broken.contains(&index)
    }

    pub fn get(&self, index: usize) -> Option<&DynamicImage> {
        self.decoded.get(&index)
    }

    /// Halfblock lines of page `index` at `cols` x `rows`, cached per size
    pub fn lines(&mut self, index: usize, cols: u16, rows: u16) -> Option<&[Line<'static>]> {
        let image = self.decoded.get(&index)?;
        let stale = self
            .rendered
            .get(&index)
            .map_or(true, |(size, _)| *size != (cols, rows));
        if stale {
            self.rendered
                .insert(index, ((cols, rows), halfblock_lines(image, cols, rows)));
        }
        self.rendered.get(&index).map(|(_, lines)| lines.as_slice())
    }

    /// Drop rendered lines of every page not in `visible`
    pub fn retain_rendered(&mut self, visible: &[usize]) {
        self.rendered.retain(|index, _| visible.contains(index));
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }
}
