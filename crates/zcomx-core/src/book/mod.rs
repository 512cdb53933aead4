mod page;
mod source;

pub use page::{Dimensions, ImageSize, Page, PageList, PageRecord};
pub use source::PageSource;
