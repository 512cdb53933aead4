pub mod action;
pub mod pages;
pub mod preload;
pub mod read;
