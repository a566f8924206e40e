use serde::{Deserialize, Serialize};

/// Bounding box of a label wrapped into a whole number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }
}

/// Result of fitting one or two stacked label rects into a circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleFit {
    pub radius: f64,
    pub svc_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_width: Option<f64>,
    pub svc_margin_top: f64,
}

/// Square layout box a node occupies once its border is included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    Service,
    Operation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub positions: usize,
    pub service_labels: usize,
    pub operation_labels: usize,
}

/// A vertex's fit together with the rows each label wraps into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLabelLayout {
    pub service: String,
    pub operation: Option<String>,
    pub fit: CircleFit,
    pub service_lines: Vec<String>,
    pub operation_lines: Vec<String>,
}
