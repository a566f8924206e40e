//! Word measurement for node labels.
//!
//! The layout core only sees [`WordMeasurer`]; which text backend produces
//! the widths is decided by whoever builds the engine.

use crate::config::{FontSpec, LayoutConfig};
use crate::layout::LabelStyle;
use crate::layout::text::{char_width_factor, split_words};
use crate::text_metrics::FontMetrics;
use std::sync::Arc;

// Medium and bold faces run slightly wider than the regular-weight table.
const BOLD_WIDTH_SCALE: f64 = 1.04;
const MEDIUM_WIDTH_SCALE: f64 = 1.02;

/// Rendered pixel width of one word chunk.
pub trait WordMeasurer: Send + Sync {
    fn measure_word(&self, word: &str) -> f64;
}

impl<F> WordMeasurer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn measure_word(&self, word: &str) -> f64 {
        self(word)
    }
}

/// Widths of a label's word chunks, in reading order.
pub fn measure_label(measurer: &dyn WordMeasurer, label: &str) -> Vec<f64> {
    split_words(label)
        .into_iter()
        .map(|word| measurer.measure_word(word))
        .collect()
}

/// Deterministic measurer over a per-character width table.
#[derive(Debug, Clone)]
pub struct CharTableMeasurer {
    font_size: f64,
    weight_scale: f64,
    width_correction: f64,
}

impl CharTableMeasurer {
    pub fn new(font_size: f64, font: &FontSpec) -> Self {
        let weight_scale = match font.weight {
            600.. => BOLD_WIDTH_SCALE,
            500..=599 => MEDIUM_WIDTH_SCALE,
            _ => 1.0,
        };
        Self {
            font_size,
            weight_scale,
            width_correction: font.width_correction,
        }
    }

    pub fn for_style(config: &LayoutConfig, style: LabelStyle) -> Self {
        Self::new(config.font_size, config.font(style))
    }

    fn raw_width(&self, text: &str) -> f64 {
        fallback_text_width(text, self.font_size) * self.weight_scale
    }
}

impl WordMeasurer for CharTableMeasurer {
    fn measure_word(&self, word: &str) -> f64 {
        self.raw_width(word) + self.width_correction
    }
}

/// Measures with real glyph advances, falling back to the char table when
/// no face can be resolved for the configured family.
pub struct FontMeasurer {
    metrics: Arc<FontMetrics>,
    font: FontSpec,
    font_size: f64,
    fallback: CharTableMeasurer,
}

impl FontMeasurer {
    pub fn new(metrics: Arc<FontMetrics>, font_size: f64, font: FontSpec) -> Self {
        let fallback = CharTableMeasurer::new(font_size, &font);
        Self {
            metrics,
            font,
            font_size,
            fallback,
        }
    }

    pub fn for_style(metrics: Arc<FontMetrics>, config: &LayoutConfig, style: LabelStyle) -> Self {
        Self::new(metrics, config.font_size, config.font(style).clone())
    }
}

impl WordMeasurer for FontMeasurer {
    fn measure_word(&self, word: &str) -> f64 {
        let width = self
            .metrics
            .measure(word, self.font_size, &self.font.family, self.font.weight)
            .unwrap_or_else(|| self.fallback.raw_width(word));
        width + self.font.width_correction
    }
}

fn fallback_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f64>()
        * font_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontdb::Database;

    #[test]
    fn closures_are_measurers() {
        let measurer = |word: &str| word.len() as f64;
        assert_eq!(measure_label(&measurer, "foo-bar baz"), vec![4.0, 4.0, 3.0]);
    }

    #[test]
    fn chunk_widths_never_exceed_whole_label() {
        let config = LayoutConfig::default();
        let measurer = CharTableMeasurer::for_style(&config, LabelStyle::Operation);
        let label = "foo-bar baz";
        let chunks = measure_label(&measurer, label);
        assert_eq!(chunks.len(), 3);
        let whole = measurer.measure_word(label);
        assert!(chunks.iter().sum::<f64>() <= whole + 1e-9);
    }

    #[test]
    fn service_style_adds_half_pixel_per_word() {
        let config = LayoutConfig::default();
        let svc = CharTableMeasurer::for_style(&config, LabelStyle::Service);
        let mut plain_font = config.service_font.clone();
        plain_font.width_correction = 0.0;
        let plain = CharTableMeasurer::new(config.font_size, &plain_font);
        assert!((svc.measure_word("api") - plain.measure_word("api") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn heavier_weights_measure_wider() {
        let config = LayoutConfig::default();
        let svc = CharTableMeasurer::for_style(&config, LabelStyle::Service);
        let op = CharTableMeasurer::for_style(&config, LabelStyle::Operation);
        assert!(svc.measure_word("checkout") > op.measure_word("checkout"));
    }

    #[test]
    fn width_scales_with_font_size() {
        let font = FontSpec::operation();
        let small = CharTableMeasurer::new(14.0, &font);
        let large = CharTableMeasurer::new(28.0, &font);
        let ratio = large.measure_word("Hello") / small.measure_word("Hello");
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn font_measurer_falls_back_without_faces() {
        let metrics = Arc::new(FontMetrics::with_database(Database::new(), true));
        let config = LayoutConfig::default();
        let font = FontMeasurer::for_style(metrics, &config, LabelStyle::Service);
        let table = CharTableMeasurer::for_style(&config, LabelStyle::Service);
        assert_eq!(font.measure_word("frontend"), table.measure_word("frontend"));
    }
}
