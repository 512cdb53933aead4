pub mod app;
pub mod event;
pub mod input;
pub mod keymap;
pub mod page_image;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
