use crate::error::{Error, Result};
use crate::layout::LabelStyle;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_FONT_FAMILY: &str = "\"Helvetica Neue\", Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    /// Added to every measured word. Calibrated per measurement backend.
    pub width_correction: f64,
}

impl FontSpec {
    pub fn service() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            weight: 500,
            width_correction: 0.5,
        }
    }

    pub fn operation() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            weight: 400,
            width_correction: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub font_size: f64,
    pub line_height: f64,
    /// Gap between the service label and the operation label below it.
    pub op_padding_top: f64,
    /// Thickness added around the circle on each side when sizing a node.
    pub border_thickness: f64,
    pub service_font: FontSpec,
    pub operation_font: FontSpec,
    pub fast_text_metrics: bool,
}

impl LayoutConfig {
    pub fn row_height(&self) -> f64 {
        self.font_size * self.line_height
    }

    pub fn font(&self, style: LabelStyle) -> &FontSpec {
        match style {
            LabelStyle::Service => &self.service_font,
            LabelStyle::Operation => &self.operation_font,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.font_size.is_nan() || self.font_size <= 0.0 {
            return Err(invalid(format!("fontSize must be positive, got {}", self.font_size)));
        }
        if self.line_height.is_nan() || self.line_height <= 0.0 {
            return Err(invalid(format!(
                "lineHeight must be positive, got {}",
                self.line_height
            )));
        }
        if self.op_padding_top.is_nan() || self.op_padding_top < 0.0 {
            return Err(invalid(format!(
                "opPaddingTop must not be negative, got {}",
                self.op_padding_top
            )));
        }
        if self.border_thickness.is_nan() || self.border_thickness < 0.0 {
            return Err(invalid(format!(
                "borderThickness must not be negative, got {}",
                self.border_thickness
            )));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 1.5,
            op_padding_top: 5.0,
            // A 1px curved border is at most sqrt(2) thick; counted on both sides.
            border_thickness: 2.0 * std::f64::consts::SQRT_2,
            service_font: FontSpec::service(),
            operation_font: FontSpec::operation(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Blank space around the node in the preview canvas.
    pub padding: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 8.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontSpecFile {
    family: Option<String>,
    weight: Option<u16>,
    width_correction: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    node_fill: Option<String>,
    node_border: Option<String>,
    service_text_color: Option<String>,
    operation_text_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    font_size: Option<f64>,
    line_height: Option<f64>,
    op_padding_top: Option<f64>,
    border_thickness: Option<f64>,
    service_font: Option<FontSpecFile>,
    operation_font: Option<FontSpecFile>,
    fast_text: Option<bool>,
    theme: Option<ThemeFile>,
    padding: Option<f64>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json5"));
    let parsed: ConfigFile = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    apply_config_file(&mut config, parsed);
    config.layout.validate()?;
    tracing::debug!(path = %path.display(), "loaded layout config");
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    let layout = &mut config.layout;
    if let Some(v) = parsed.font_size {
        layout.font_size = v;
    }
    if let Some(v) = parsed.line_height {
        layout.line_height = v;
    }
    if let Some(v) = parsed.op_padding_top {
        layout.op_padding_top = v;
    }
    if let Some(v) = parsed.border_thickness {
        layout.border_thickness = v;
    }
    if let Some(font) = parsed.service_font {
        apply_font(&mut layout.service_font, font);
    }
    if let Some(font) = parsed.operation_font {
        apply_font(&mut layout.operation_font, font);
    }
    if let Some(v) = parsed.fast_text {
        layout.fast_text_metrics = v;
    }

    if let Some(theme) = parsed.theme {
        if let Some(v) = theme.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = theme.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = theme.service_text_color {
            config.theme.service_text_color = v;
        }
        if let Some(v) = theme.operation_text_color {
            config.theme.operation_text_color = v;
        }
    }

    if let Some(v) = parsed.padding {
        config.render.padding = v;
    }
    if let Some(v) = parsed.background {
        config.render.background = v;
    }
}

fn apply_font(font: &mut FontSpec, file: FontSpecFile) {
    if let Some(v) = file.family {
        font.family = v;
    }
    if let Some(v) = file.weight {
        font.weight = v;
    }
    if let Some(v) = file.width_correction {
        font.width_correction = v;
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}
