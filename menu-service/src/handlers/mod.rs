pub mod health;
pub mod menu;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use menu::{create_menu_item, hello_world, list_menu_items};
