mod circle;
mod engine;
mod frontier;
pub mod text;
pub(crate) mod types;

pub use circle::smallest_radius;
pub use engine::LayoutEngine;
pub use frontier::{calc_rects, calc_width};
pub use text::{operation_label, split_words, wrap_words};
pub use types::*;
