use ddg_node_layout::{LayoutConfig, LayoutEngine, layout::operation_label};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeLayoutOptions {
    font_size: Option<f64>,
    line_height: Option<f64>,
    op_padding_top: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OperationInput {
    Single(String),
    Many(Vec<String>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodePositioning {
    radius: f64,
    diameter: f64,
    svc_width: f64,
    op_width: Option<f64>,
    svc_margin_top: f64,
    service_lines: Vec<String>,
    operation_lines: Vec<String>,
}

/// Layout values the options can override, as bit patterns so they hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EngineKey {
    font_size: u64,
    line_height: u64,
    op_padding_top: u64,
}

impl EngineKey {
    fn new(config: &LayoutConfig) -> Self {
        // `+ 0.0` folds -0.0 into 0.0; validated configs hold no NaN.
        Self {
            font_size: (config.font_size + 0.0).to_bits(),
            line_height: (config.line_height + 0.0).to_bits(),
            op_padding_top: (config.op_padding_top + 0.0).to_bits(),
        }
    }
}

thread_local! {
    // One engine per effective layout config, so repeated nodes hit the cache.
    static ENGINES: RefCell<HashMap<EngineKey, Rc<LayoutEngine>>> = RefCell::new(HashMap::new());
}

fn build_layout_config(options: NodeLayoutOptions) -> Result<LayoutConfig, String> {
    let mut config = LayoutConfig {
        fast_text_metrics: true,
        ..LayoutConfig::default()
    };
    if let Some(font_size) = options.font_size {
        config.font_size = font_size;
    }
    if let Some(line_height) = options.line_height {
        config.line_height = line_height;
    }
    if let Some(op_padding_top) = options.op_padding_top {
        config.op_padding_top = op_padding_top;
    }
    config.validate().map_err(|error| error.to_string())?;
    Ok(config)
}

fn engine_for(options_json: Option<String>) -> Result<Rc<LayoutEngine>, String> {
    let options = match options_json.as_deref().map(str::trim) {
        None | Some("") | Some("null") => NodeLayoutOptions::default(),
        Some(raw) => serde_json::from_str::<NodeLayoutOptions>(raw).map_err(|error| error.to_string())?,
    };
    let config = build_layout_config(options)?;
    let key = EngineKey::new(&config);
    let engine = ENGINES.with(|engines| {
        Rc::clone(
            engines
                .borrow_mut()
                .entry(key)
                .or_insert_with(|| Rc::new(LayoutEngine::with_char_table(config))),
        )
    });
    Ok(engine)
}

fn positioning_json(
    service: &str,
    operation_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, String> {
    let engine = engine_for(options_json)?;
    let operation = match operation_json.as_deref() {
        None | Some("") | Some("null") => None,
        Some(raw) => match serde_json::from_str::<OperationInput>(raw).map_err(|error| error.to_string())? {
            OperationInput::Single(op) => Some(op),
            OperationInput::Many(ops) => operation_label(&ops),
        },
    };

    let layout = engine.label_layout(service, operation.as_deref());
    let size = engine.measure_node(service, operation.as_deref());
    let positioning = NodePositioning {
        radius: layout.fit.radius,
        diameter: size.width,
        svc_width: layout.fit.svc_width,
        op_width: layout.fit.op_width,
        svc_margin_top: layout.fit.svc_margin_top,
        service_lines: layout.service_lines,
        operation_lines: layout.operation_lines,
    };
    serde_json::to_string(&positioning).map_err(|error| error.to_string())
}

/// Positioning of one DDG node as JSON. `operation_json` is a JSON string
/// or array of strings; `options_json` may override `fontSize`,
/// `lineHeight` and `opPaddingTop`.
#[wasm_bindgen]
pub fn ddg_node_positioning(
    service: &str,
    operation_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    positioning_json(service, operation_json, options_json).map_err(|error| JsValue::from_str(&error))
}
