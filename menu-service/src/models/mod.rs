pub mod menu_item;

pub use menu_item::{render_document, render_id, BodyError, MenuItem};
