use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub node_fill: String,
    pub node_border: String,
    pub service_text_color: String,
    pub operation_text_color: String,
}

impl Theme {
    pub fn jaeger() -> Self {
        Self {
            node_fill: "#FFFFFF".to_string(),
            node_border: "#199".to_string(),
            service_text_color: "#000000".to_string(),
            operation_text_color: "#555555".to_string(),
        }
    }

    /// Colours of the node the graph is focused on.
    pub fn focal() -> Self {
        Self {
            node_fill: "#E6F7F7".to_string(),
            node_border: "#199".to_string(),
            service_text_color: "#000000".to_string(),
            operation_text_color: "#333333".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::jaeger()
    }
}
