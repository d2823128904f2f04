//! Commands shared by several pages.

mod clipboard;

pub use clipboard::copy_to_clipboard;
