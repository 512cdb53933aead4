mod controls;
mod page_view;
mod popup;

pub use controls::ControlsWidget;
pub use page_view::PageViewWidget;
pub use popup::PopupWidget;
