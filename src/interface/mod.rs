pub mod render;

pub use render::{display_classification, display_report};
