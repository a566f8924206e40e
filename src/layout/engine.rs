use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::LayoutConfig;
use crate::measure::{CharTableMeasurer, FontMeasurer, WordMeasurer, measure_label};
use crate::text_metrics::FontMetrics;

use super::circle::smallest_radius;
use super::frontier::calc_rects;
use super::text::{operation_label, split_words, wrap_words};
use super::types::{CacheStats, CircleFit, LabelStyle, NodeLabelLayout, NodeSize, Rect};

const KEY_SEPARATOR: &str = "-----";

/// Lays out circular DDG nodes and remembers every answer.
///
/// Label frontiers are cached per label and style, fits per
/// service/operation pair. Results are pure functions of their key, so a
/// racing miss only repeats work.
pub struct LayoutEngine {
    config: LayoutConfig,
    service_measurer: Box<dyn WordMeasurer>,
    operation_measurer: Box<dyn WordMeasurer>,
    service_rects: Mutex<HashMap<String, Arc<[Rect]>>>,
    operation_rects: Mutex<HashMap<String, Arc<[Rect]>>>,
    positions: Mutex<HashMap<String, CircleFit>>,
}

impl LayoutEngine {
    pub fn new(
        config: LayoutConfig,
        service_measurer: Box<dyn WordMeasurer>,
        operation_measurer: Box<dyn WordMeasurer>,
    ) -> Self {
        Self {
            config,
            service_measurer,
            operation_measurer,
            service_rects: Mutex::new(HashMap::new()),
            operation_rects: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
        }
    }

    /// Engine measuring with system fonts, or with the char table when
    /// `fast_text_metrics` is set.
    pub fn from_config(config: LayoutConfig) -> Self {
        if config.fast_text_metrics {
            return Self::with_char_table(config);
        }
        let metrics = Arc::new(FontMetrics::new());
        let service = FontMeasurer::for_style(Arc::clone(&metrics), &config, LabelStyle::Service);
        let operation = FontMeasurer::for_style(metrics, &config, LabelStyle::Operation);
        Self::new(config, Box::new(service), Box::new(operation))
    }

    pub fn with_char_table(config: LayoutConfig) -> Self {
        let service = CharTableMeasurer::for_style(&config, LabelStyle::Service);
        let operation = CharTableMeasurer::for_style(&config, LabelStyle::Operation);
        Self::new(config, Box::new(service), Box::new(operation))
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Circle fit for a node showing `service` and, when present and
    /// non-empty, `operation` beneath it.
    pub fn calc_positioning(&self, service: &str, operation: Option<&str>) -> CircleFit {
        let operation = operation.filter(|op| !op.is_empty());
        let key = position_key(service, operation);
        if let Some(fit) = lock(&self.positions).get(&key) {
            return *fit;
        }

        let svc_rects = self.rects(LabelStyle::Service, service);
        let op_rects = operation.map(|op| self.rects(LabelStyle::Operation, op));
        let fit = smallest_radius(&svc_rects, op_rects.as_deref(), self.config.op_padding_top);
        tracing::debug!(
            service,
            operation,
            radius = fit.radius,
            svc_width = fit.svc_width,
            "computed node positioning"
        );
        lock(&self.positions).insert(key, fit);
        fit
    }

    /// Like [`calc_positioning`](Self::calc_positioning) for a vertex that
    /// may stand for several operations.
    pub fn calc_positioning_for<S: AsRef<str>>(&self, service: &str, operations: &[S]) -> CircleFit {
        let label = operation_label(operations);
        self.calc_positioning(service, label.as_deref())
    }

    /// Frontier of candidate wrappings for one label.
    pub fn rects(&self, style: LabelStyle, label: &str) -> Arc<[Rect]> {
        let cache = match style {
            LabelStyle::Service => &self.service_rects,
            LabelStyle::Operation => &self.operation_rects,
        };
        if let Some(rects) = lock(cache).get(label) {
            return Arc::clone(rects);
        }

        let lengths = measure_label(self.measurer(style), label);
        let rects: Arc<[Rect]> = calc_rects(&lengths, self.config.row_height()).into();
        tracing::debug!(label, ?style, candidates = rects.len(), "measured label");
        lock(cache).insert(label.to_string(), Arc::clone(&rects));
        rects
    }

    /// Square box the rendered node needs, border included.
    pub fn measure_node(&self, service: &str, operation: Option<&str>) -> NodeSize {
        let fit = self.calc_positioning(service, operation);
        let diameter = 2.0 * (fit.radius + self.config.border_thickness);
        NodeSize {
            width: diameter,
            height: diameter,
        }
    }

    /// Fit plus the rows each label wraps into at its chosen width.
    pub fn label_layout(&self, service: &str, operation: Option<&str>) -> NodeLabelLayout {
        let operation = operation.filter(|op| !op.is_empty());
        let fit = self.calc_positioning(service, operation);
        let service_lines = self.wrap(LabelStyle::Service, service, fit.svc_width);
        let operation_lines = match (operation, fit.op_width) {
            (Some(op), Some(width)) => self.wrap(LabelStyle::Operation, op, width),
            _ => Vec::new(),
        };
        NodeLabelLayout {
            service: service.to_string(),
            operation: operation.map(str::to_string),
            fit,
            service_lines,
            operation_lines,
        }
    }

    pub fn clear_cache(&self) {
        lock(&self.positions).clear();
        lock(&self.service_rects).clear();
        lock(&self.operation_rects).clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            positions: lock(&self.positions).len(),
            service_labels: lock(&self.service_rects).len(),
            operation_labels: lock(&self.operation_rects).len(),
        }
    }

    fn measurer(&self, style: LabelStyle) -> &dyn WordMeasurer {
        match style {
            LabelStyle::Service => self.service_measurer.as_ref(),
            LabelStyle::Operation => self.operation_measurer.as_ref(),
        }
    }

    fn wrap(&self, style: LabelStyle, label: &str, width: f64) -> Vec<String> {
        let words = split_words(label);
        let widths = measure_label(self.measurer(style), label);
        wrap_words(&words, &widths, width)
    }
}

fn position_key(service: &str, operation: Option<&str>) -> String {
    format!("{service}{KEY_SEPARATOR}{}", operation.unwrap_or_default())
}

// Cached values are immutable once inserted, so a poisoned map is still sound.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
