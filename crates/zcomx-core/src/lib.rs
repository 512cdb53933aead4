pub mod book;
pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod reader;
pub mod remote;

pub use book::{Page, PageList};
pub use config::{AppConfig, EasingType, ReaderMode, ScrollConfig};
pub use error::{Error, Result};
pub use frame::FrameMessage;
pub use loader::{LoadEvent, PageImageLoader};
pub use reader::{Reader, ReaderCommand, ReaderOutcome};
