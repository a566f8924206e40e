use crate::config::{Config, load_config};
use crate::layout::{LayoutEngine, NodeLabelLayout};
use crate::layout_dump::{Vertex, VertexOperation, dump_vertices, read_vertices, write_layout_dump};
use crate::render::{render_node_svg, write_output_svg};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ddg-node", version, about = "Circular node layout for deep dependency graphs")]
pub struct Args {
    /// Service name shown in the node
    #[arg(short = 's', long = "service", conflicts_with = "input")]
    pub service: Option<String>,

    /// Operation name(s); more than one is shown as a count
    #[arg(short = 'p', long = "operation")]
    pub operations: Vec<String>,

    /// JSON file of vertices ({service, operation}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file or directory. Defaults to stdout for JSON and SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Measure with the built-in width table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Render previews with the focal-node colours
    #[arg(long = "focal")]
    pub focal: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositioningOutput<'a> {
    #[serde(flatten)]
    layout: &'a NodeLabelLayout,
    diameter: f64,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if args.fast_text {
        config.layout.fast_text_metrics = true;
    }
    if args.focal {
        config.theme = Theme::focal();
    }
    let engine = LayoutEngine::from_config(config.layout.clone());

    if let Some(service) = args.service.as_deref() {
        let vertex = Vertex {
            key: None,
            service: service.to_string(),
            operation: Some(VertexOperation::Many(args.operations.clone())),
        };
        return write_single(&engine, &config, &vertex, args.output_format, args.output.as_deref());
    }

    let Some(input) = args.input.as_deref() else {
        return Err(anyhow::anyhow!("Either --service or --input is required"));
    };
    let vertices = read_input(input)?;
    if vertices.is_empty() {
        return Err(anyhow::anyhow!("No vertices found in input"));
    }

    match args.output_format {
        OutputFormat::Json => {
            let dumps = dump_vertices(&engine, &vertices);
            write_layout_dump(args.output.as_deref(), &dumps)?;
        }
        OutputFormat::Svg | OutputFormat::Png => {
            let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, vertices.len())?;
            for (vertex, output) in vertices.iter().zip(&outputs) {
                write_single(&engine, &config, vertex, args.output_format, Some(output.as_path()))?;
            }
        }
    }

    Ok(())
}

fn write_single(
    engine: &LayoutEngine,
    config: &Config,
    vertex: &Vertex,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let operation = vertex.operation_label();
    let layout = engine.label_layout(&vertex.service, operation.as_deref());
    match format {
        OutputFormat::Json => {
            let size = engine.measure_node(&vertex.service, operation.as_deref());
            let positioning = PositioningOutput {
                layout: &layout,
                diameter: size.width,
            };
            let json = serde_json::to_string_pretty(&positioning)?;
            match output {
                Some(path) => std::fs::write(path, format!("{json}\n"))?,
                None => writeln!(io::stdout().lock(), "{json}")?,
            }
        }
        OutputFormat::Svg => {
            let svg = render_node_svg(&layout, &config.theme, &config.layout, &config.render);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            let svg = render_node_svg(&layout, &config.theme, &config.layout, &config.render);
            write_png(&svg, output)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path) -> Result<()> {
    crate::render::write_output_png(svg, output)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> Result<Vec<Vertex>> {
    if path == Path::new("-") {
        return Ok(read_vertices(io::stdin().lock())?);
    }
    let file = std::fs::File::open(path)?;
    Ok(read_vertices(io::BufReader::new(file))?)
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    if let Some(path) = output {
        return Ok(path);
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = match format {
        OutputFormat::Json => "json",
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
    };
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for batch {ext} output"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("node-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("node");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.{}", stem, idx + 1, ext)));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_operations() {
        let args = Args::try_parse_from(["ddg-node", "-s", "svc", "-p", "a", "-p", "b", "--fastText"])
            .expect("args parse");
        assert_eq!(args.service.as_deref(), Some("svc"));
        assert_eq!(args.operations, vec!["a", "b"]);
        assert!(args.fast_text);
        assert_eq!(args.output_format, OutputFormat::Json);
    }

    #[test]
    fn service_and_input_conflict() {
        let err = Args::try_parse_from(["ddg-node", "-s", "svc", "-i", "nodes.json"]);
        assert!(err.is_err());
    }

    #[test]
    fn batch_outputs_are_numbered_after_the_stem() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/graph.svg")), OutputFormat::Svg, 2).expect("outputs");
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/graph-1.svg"), PathBuf::from("out/graph-2.svg")]
        );
    }

    #[test]
    fn batch_outputs_need_a_path() {
        assert!(resolve_multi_outputs(None, OutputFormat::Png, 1).is_err());
    }
}
