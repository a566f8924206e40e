use crate::config::{FontSpec, LayoutConfig, RenderConfig};
use crate::layout::NodeLabelLayout;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const BORDER_STROKE_WIDTH: f64 = 1.0;

/// Standalone SVG preview of one node: the circle and both stacked labels.
pub fn render_node_svg(
    node: &NodeLabelLayout,
    theme: &Theme,
    config: &LayoutConfig,
    render: &RenderConfig,
) -> String {
    let radius = node.fit.radius;
    let size = 2.0 * (radius + config.border_thickness + render.padding);
    let center = size / 2.0;
    let row_height = config.row_height();

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size:.2}\" height=\"{size:.2}\" viewBox=\"0 0 {size:.2} {size:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str(&format!(
        "<circle cx=\"{center:.2}\" cy=\"{center:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{BORDER_STROKE_WIDTH}\"/>",
        radius + config.border_thickness / 2.0,
        theme.node_fill,
        theme.node_border
    ));

    let circle_top = center - radius;
    let service_top = circle_top + node.fit.svc_margin_top;
    svg.push_str(&text_block_svg(
        center,
        service_top,
        &node.service_lines,
        &config.service_font,
        &theme.service_text_color,
        config,
    ));

    if !node.operation_lines.is_empty() {
        let operation_top =
            service_top + node.service_lines.len() as f64 * row_height + config.op_padding_top;
        svg.push_str(&text_block_svg(
            center,
            operation_top,
            &node.operation_lines,
            &config.operation_font,
            &theme.operation_text_color,
            config,
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn text_block_svg(
    x: f64,
    top: f64,
    lines: &[String],
    font: &FontSpec,
    fill: &str,
    config: &LayoutConfig,
) -> String {
    let row_height = config.row_height();
    let first_row_center = top + row_height / 2.0;
    let mut text = String::new();

    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{first_row_center:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{fill}\">",
        escape_xml(&font.family),
        config.font_size,
        font.weight,
    ));

    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { row_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }

    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Helvetica".to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
