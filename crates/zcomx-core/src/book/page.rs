use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Rendition requested from the image endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    #[default]
    Web,
    Print,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Web => "web",
            ImageSize::Print => "print",
        }
    }
}

/// Natural pixel size of a page image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width when scaled to `height`, keeping the aspect ratio
    pub fn width_at_height(&self, height: u32) -> u32 {
        if self.height == 0 {
            return self.width;
        }
        (self.width as u64 * height as u64 / self.height as u64) as u32
    }

    /// Height when scaled to `width`, keeping the aspect ratio
    pub fn height_at_width(&self, width: u32) -> u32 {
        if self.width == 0 {
            return self.height;
        }
        (self.height as u64 * width as u64 / self.width as u64) as u32
    }
}

/// One entry of the page list as served by the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: u64,
    /// Opaque image identifier passed to `/images/download/`
    pub image: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A page of the book being read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub id: u64,
    pub image: String,
    pub dimensions: Option<Dimensions>,
    pub loaded: bool,
}

/// The fixed, ordered set of pages of one book
///
/// The page count never changes after construction.
#[derive(Debug, Clone)]
pub struct PageList {
    pages: Vec<Page>,
}

impl PageList {
    /// Build from records in reading order
    pub fn from_records(records: Vec<PageRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyBook);
        }

        let pages = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Page {
                index,
                id: record.id,
                image: record.image,
                dimensions: match (record.width, record.height) {
                    (Some(w), Some(h)) if w > 0 && h > 0 => Some(Dimensions::new(w, h)),
                    _ => None,
                },
                loaded: false,
            })
            .collect();

        Ok(Self { pages })
    }

    /// Parse a JSON array of page records
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<PageRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; an empty book is rejected at construction
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn as_slice(&self) -> &[Page] {
        &self.pages
    }

    /// The trailing indicia (colophon) page
    pub fn is_indicia(&self, index: usize) -> bool {
        index == self.last_index()
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.pages.get(index).is_some_and(|p| p.loaded)
    }

    pub fn mark_loaded(&mut self, index: usize) {
        if let Some(page) = self.pages.get_mut(index) {
            page.loaded = true;
        }
    }

    pub fn set_dimensions(&mut self, index: usize, dimensions: Dimensions) {
        if let Some(page) = self.pages.get_mut(index) {
            page.dimensions = Some(dimensions);
        }
    }

    /// Number of pages whose image has arrived
    pub fn loaded_count(&self) -> usize {
        self.pages.iter().filter(|p| p.loaded).count()
    }
}
