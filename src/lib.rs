//! Layout of circular deep-dependency-graph nodes.
//!
//! A node shows a service name and, optionally, an operation name beneath
//! it. Each label is word-wrapped into a frontier of candidate boxes and the
//! pair of boxes needing the smallest enclosing circle decides the node's
//! size. See [`LayoutEngine`] for the memoized entry point.

#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod measure;
pub mod render;
pub mod text_metrics;
pub mod theme;

pub use config::{Config, FontSpec, LayoutConfig, RenderConfig, load_config};
pub use error::{Error, Result};
pub use layout::{CircleFit, LabelStyle, LayoutEngine, NodeLabelLayout, NodeSize, Rect};
pub use measure::{CharTableMeasurer, FontMeasurer, WordMeasurer};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
