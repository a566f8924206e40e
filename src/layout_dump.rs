use crate::error::Result;
use crate::layout::{LayoutEngine, operation_label};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// One graph vertex as it arrives in a batch file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub key: Option<String>,
    pub service: String,
    #[serde(default)]
    pub operation: Option<VertexOperation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VertexOperation {
    Single(String),
    Many(Vec<String>),
}

impl Vertex {
    /// The operation text the node displays, if any.
    pub fn operation_label(&self) -> Option<String> {
        match &self.operation {
            None => None,
            Some(VertexOperation::Single(op)) if op.is_empty() => None,
            Some(VertexOperation::Single(op)) => Some(op.clone()),
            Some(VertexOperation::Many(ops)) => operation_label(ops),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub service: String,
    pub operation: Option<String>,
    pub radius: f64,
    pub diameter: f64,
    pub svc_width: f64,
    pub op_width: Option<f64>,
    pub svc_margin_top: f64,
    pub service_lines: Vec<String>,
    pub operation_lines: Vec<String>,
}

impl NodeDump {
    pub fn from_vertex(engine: &LayoutEngine, vertex: &Vertex) -> Self {
        let operation = vertex.operation_label();
        let layout = engine.label_layout(&vertex.service, operation.as_deref());
        let size = engine.measure_node(&vertex.service, operation.as_deref());
        NodeDump {
            key: vertex.key.clone(),
            service: layout.service,
            operation: layout.operation,
            radius: layout.fit.radius,
            diameter: size.width,
            svc_width: layout.fit.svc_width,
            op_width: layout.fit.op_width,
            svc_margin_top: layout.fit.svc_margin_top,
            service_lines: layout.service_lines,
            operation_lines: layout.operation_lines,
        }
    }
}

pub fn read_vertices<R: Read>(reader: R) -> Result<Vec<Vertex>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn dump_vertices(engine: &LayoutEngine, vertices: &[Vertex]) -> Vec<NodeDump> {
    let dumps: Vec<NodeDump> = vertices
        .iter()
        .map(|vertex| NodeDump::from_vertex(engine, vertex))
        .collect();
    tracing::debug!(nodes = dumps.len(), stats = ?engine.cache_stats(), "dumped node layouts");
    dumps
}

pub fn write_layout_dump(path: Option<&Path>, dumps: &[NodeDump]) -> Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_dump(writer, dumps)
        }
        None => write_dump(io::stdout().lock(), dumps),
    }
}

fn write_dump<W: Write>(mut writer: W, dumps: &[NodeDump]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, dumps)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
