//! Node/edge interchange backend (draw.io `mxfile`).
//!
//! Cell ids `0` and `1` are the root and the default layer. Blocks take ids
//! from `2` in diagram order. Edges follow and reference their endpoints'
//! cell ids. Only bound connections become edges; section-level connections
//! have no node to attach to and are skipped.

use std::{collections::HashMap, io};

use log::debug;
use quick_xml::{
    Writer,
    events::{BytesDecl, Event},
};

use blockdraft_core::model::Diagram;

use super::{Error, ExportFormat, Exporter};
use crate::config::LayoutConfig;

const FIRST_BLOCK_CELL: usize = 2;

const BLOCK_STYLE: &str =
    "rounded=1;whiteSpace=wrap;html=1;fillColor=#e3f2fd;strokeColor=#1976d2;strokeWidth=2";

const EDGE_STYLE: &str =
    "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1";

/// Renders diagrams to draw.io XML.
#[derive(Debug, Clone)]
pub struct DrawioExporter {
    page_width: f32,
    page_height: f32,
}

impl DrawioExporter {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            page_width: layout.canvas_width(),
            page_height: layout.canvas_height(),
        }
    }

    /// Renders `diagram` to an XML document string.
    pub fn render(&self, diagram: &Diagram) -> Result<String, Error> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_document(&mut writer, diagram)
            .map_err(|err| Error::Render(format!("failed to write XML: {err}")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|err| Error::Render(format!("XML output is not UTF-8: {err}")))
    }

    fn write_document(&self, writer: &mut Writer<Vec<u8>>, diagram: &Diagram) -> io::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let diagram_id = format!("diagram_{}", diagram.id());
        let page_width = self.page_width.to_string();
        let page_height = self.page_height.to_string();

        writer
            .create_element("mxfile")
            .with_attribute(("host", "blockdraft"))
            .write_inner_content(|writer| {
                writer
                    .create_element("diagram")
                    .with_attributes([("id", diagram_id.as_str()), ("name", diagram.title())])
                    .write_inner_content(|writer| {
                        writer
                            .create_element("mxGraphModel")
                            .with_attributes([
                                ("grid", "1"),
                                ("gridSize", "10"),
                                ("guides", "1"),
                                ("tooltips", "1"),
                                ("connect", "1"),
                                ("arrows", "1"),
                                ("fold", "1"),
                                ("page", "1"),
                                ("pageScale", "1"),
                                ("pageWidth", page_width.as_str()),
                                ("pageHeight", page_height.as_str()),
                            ])
                            .write_inner_content(|writer| {
                                writer
                                    .create_element("root")
                                    .write_inner_content(|writer| write_cells(writer, diagram))?;
                                Ok(())
                            })?;
                        Ok(())
                    })?;
                Ok(())
            })?;
        Ok(())
    }
}

fn write_cells(writer: &mut Writer<Vec<u8>>, diagram: &Diagram) -> io::Result<()> {
    writer.create_element("mxCell").with_attribute(("id", "0")).write_empty()?;
    writer
        .create_element("mxCell")
        .with_attributes([("id", "1"), ("parent", "0")])
        .write_empty()?;

    let mut cells: HashMap<&str, usize> = HashMap::new();
    let mut next_cell = FIRST_BLOCK_CELL;

    for block in diagram.blocks() {
        let bounds = block.bounds();
        let id = next_cell.to_string();
        let x = bounds.min_x().to_string();
        let y = bounds.min_y().to_string();
        let width = bounds.width().to_string();
        let height = bounds.height().to_string();
        writer
            .create_element("mxCell")
            .with_attributes([
                ("id", id.as_str()),
                ("value", block.name()),
                ("style", BLOCK_STYLE),
                ("vertex", "1"),
                ("parent", "1"),
            ])
            .write_inner_content(|writer| {
                writer
                    .create_element("mxGeometry")
                    .with_attributes([
                        ("x", x.as_str()),
                        ("y", y.as_str()),
                        ("width", width.as_str()),
                        ("height", height.as_str()),
                        ("as", "geometry"),
                    ])
                    .write_empty()?;
                Ok(())
            })?;
        cells.entry(block.id()).or_insert(next_cell);
        next_cell += 1;
    }

    let mut edges = 0;
    for connection in diagram.connections() {
        let Some((from, to)) = connection.block_endpoints() else {
            continue;
        };
        let (Some(source), Some(target)) = (cells.get(from), cells.get(to)) else {
            continue;
        };
        let id = next_cell.to_string();
        let source = source.to_string();
        let target = target.to_string();
        writer
            .create_element("mxCell")
            .with_attributes([
                ("id", id.as_str()),
                ("value", connection.label()),
                ("style", EDGE_STYLE),
                ("edge", "1"),
                ("parent", "1"),
                ("source", source.as_str()),
                ("target", target.as_str()),
            ])
            .write_inner_content(|writer| {
                writer
                    .create_element("mxGeometry")
                    .with_attributes([("relative", "1"), ("as", "geometry")])
                    .write_empty()?;
                Ok(())
            })?;
        next_cell += 1;
        edges += 1;
    }

    debug!(
        diagram_id:% = diagram.id(),
        nodes = cells.len(),
        edges;
        "Interchange document rendered"
    );
    Ok(())
}

impl Exporter for DrawioExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::InterchangeFormat
    }

    fn export(&self, diagram: &Diagram) -> Result<Vec<u8>, Error> {
        Ok(self.render(diagram)?.into_bytes())
    }
}
