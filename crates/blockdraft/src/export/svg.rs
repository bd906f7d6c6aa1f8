//! Vector image backend.
//!
//! Sections are drawn as dashed column backgrounds, blocks as rounded
//! rectangles, bound connections as arrows between block centers, and
//! annotations as filled notes. Geometry comes straight from the model and
//! the [`LayoutConfig`], so an unedited diagram matches its layout exactly.

use log::{debug, trace};
use svg::{
    Document,
    node::element::{Definitions, Line, Marker, Polygon, Rectangle, Text},
};

use blockdraft_core::{
    apply_stroke,
    color::Color,
    draw::{LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::Point,
    model::Diagram,
};

use super::{Error, ExportFormat, Exporter};
use crate::{
    config::{LayoutConfig, StyleConfig},
    layout::NOTE_SIZE,
};

const ARROW_MARKER_ID: &str = "arrowhead";

#[derive(Debug, Clone)]
struct Palette {
    background: Option<Color>,
    section_fill: Color,
    section_stroke: StrokeDefinition,
    block_fill: Color,
    block_stroke: StrokeDefinition,
    connection_stroke: StrokeDefinition,
    annotation_fill: Color,
    annotation_stroke: StrokeDefinition,
}

impl Palette {
    fn from_style(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self {
            background: style.background_color()?,
            section_fill: style.section_fill()?,
            section_stroke: StrokeDefinition::dashed(style.section_stroke()?, 1.0),
            block_fill: style.block_fill()?,
            block_stroke: StrokeDefinition::solid(style.block_stroke()?, 2.0),
            connection_stroke: StrokeDefinition::solid(style.connection_stroke()?, 2.0),
            annotation_fill: style.annotation_fill()?,
            annotation_stroke: StrokeDefinition::solid(style.annotation_stroke()?, 1.0),
        })
    }
}

/// Renders diagrams to SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    layout: LayoutConfig,
    palette: Palette,
}

impl SvgExporter {
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a configured color cannot be parsed.
    pub fn new(layout: &LayoutConfig, style: &StyleConfig) -> Result<Self, Error> {
        let palette = Palette::from_style(style).map_err(Error::Render)?;
        Ok(Self {
            layout: layout.clone(),
            palette,
        })
    }

    /// Renders `diagram` to an SVG document string.
    pub fn render(&self, diagram: &Diagram) -> String {
        let mut output = LayeredOutput::new();
        self.render_sections(diagram, &mut output);
        self.render_blocks(diagram, &mut output);
        self.render_connections(diagram, &mut output);
        self.render_annotations(diagram, &mut output);

        let width = self.layout.canvas_width();
        let height = self.layout.canvas_height();
        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0.0, 0.0, width, height))
            .add(self.arrow_definitions());

        if let Some(background) = self.palette.background {
            document = document.add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", background.to_string()),
            );
        }

        for node in output.render() {
            document = document.add(node);
        }

        debug!(diagram_id:% = diagram.id(); "SVG document rendered");
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{document}")
    }

    fn arrow_definitions(&self) -> Definitions {
        let color = self.palette.connection_stroke.color();
        let marker = Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("markerWidth", 10)
            .set("markerHeight", 10)
            .set("refX", 9)
            .set("refY", 3)
            .set("orient", "auto")
            .add(
                Polygon::new()
                    .set("points", "0 0, 10 3, 0 6")
                    .set("fill", color.to_string()),
            );
        Definitions::new().add(marker)
    }

    fn render_sections(&self, diagram: &Diagram, output: &mut LayeredOutput) {
        let layout = &self.layout;
        let padding = layout.section_padding();
        let top = padding * 2.0;

        for section in diagram.sections() {
            let x = layout.section_x(section.kind());
            let rect = Rectangle::new()
                .set("x", x + padding)
                .set("y", top)
                .set("width", layout.section_width() - padding * 2.0)
                .set("height", layout.canvas_height() - top * 2.0)
                .set("fill", &self.palette.section_fill);
            output.add_to_layer(
                RenderLayer::Section,
                Box::new(apply_stroke!(rect, &self.palette.section_stroke)),
            );

            let label = Text::new(section.name())
                .set("x", x + layout.section_width() / 2.0)
                .set("y", layout.label_offset())
                .set("text-anchor", "middle")
                .set("font-size", 14)
                .set("font-weight", "bold")
                .set("fill", "#333");
            output.add_to_layer(RenderLayer::Label, Box::new(label));
        }
    }

    fn render_blocks(&self, diagram: &Diagram, output: &mut LayeredOutput) {
        for block in diagram.blocks() {
            let bounds = block.bounds();
            let rect = Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("rx", 4)
                .set("fill", &self.palette.block_fill);
            output.add_to_layer(
                RenderLayer::Block,
                Box::new(apply_stroke!(rect, &self.palette.block_stroke)),
            );

            let center = bounds.center();
            let name = if block.name().is_empty() { "Block" } else { block.name() };
            let label = Text::new(name)
                .set("x", center.x())
                .set("y", center.y() + 5.0)
                .set("text-anchor", "middle")
                .set("font-size", 12)
                .set("fill", "#000");
            output.add_to_layer(RenderLayer::Label, Box::new(label));
        }
    }

    fn render_connections(&self, diagram: &Diagram, output: &mut LayeredOutput) {
        for connection in diagram.connections() {
            let Some((from, to)) = connection.block_endpoints() else {
                continue;
            };
            let (Some(from), Some(to)) = (diagram.block(from), diagram.block(to)) else {
                trace!(connection = connection.id(); "Skipping connection to missing block");
                continue;
            };
            let (start, end) = (from.center(), to.center());

            let line = Line::new()
                .set("x1", start.x())
                .set("y1", start.y())
                .set("x2", end.x())
                .set("y2", end.y())
                .set("fill", "none")
                .set("marker-end", format!("url(#{ARROW_MARKER_ID})"));
            output.add_to_layer(
                RenderLayer::Connection,
                Box::new(apply_stroke!(line, &self.palette.connection_stroke)),
            );

            let mid = start.midpoint(end);
            let label = Text::new(connection.label())
                .set("x", mid.x())
                .set("y", mid.y() - 5.0)
                .set("font-size", 10)
                .set("fill", self.palette.connection_stroke.color().to_string());
            output.add_to_layer(RenderLayer::Label, Box::new(label));
        }
    }

    fn render_annotations(&self, diagram: &Diagram, output: &mut LayeredOutput) {
        for annotation in diagram.annotations() {
            let origin = annotation.position();
            let rect = Rectangle::new()
                .set("x", origin.x())
                .set("y", origin.y())
                .set("width", NOTE_SIZE.width())
                .set("height", NOTE_SIZE.height())
                .set("rx", 3)
                .set("fill", &self.palette.annotation_fill);
            output.add_to_layer(
                RenderLayer::Note,
                Box::new(apply_stroke!(rect, &self.palette.annotation_stroke)),
            );

            let text_at = origin.add_point(Point::new(5.0, 20.0));
            let text = if annotation.text().is_empty() { "Note" } else { annotation.text() };
            let label = Text::new(text)
                .set("x", text_at.x())
                .set("y", text_at.y())
                .set("font-size", 10)
                .set("fill", "#333");
            output.add_to_layer(RenderLayer::Label, Box::new(label));
        }
    }
}

impl Exporter for SvgExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::VectorImage
    }

    fn export(&self, diagram: &Diagram) -> Result<Vec<u8>, Error> {
        Ok(self.render(diagram).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use blockdraft_core::{
        geometry::Point,
        model::{Annotation, Connection, SectionKind},
    };

    use super::*;
    use crate::generator::DiagramGenerator;

    fn exporter() -> SvgExporter {
        SvgExporter::new(&LayoutConfig::default(), &StyleConfig::default()).unwrap()
    }

    fn generated() -> Diagram {
        DiagramGenerator::new(LayoutConfig::default()).generate("battery powered lamp with led")
    }

    #[test]
    fn test_sections_and_blocks_drawn() {
        let svg = exporter().render(&generated());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("stroke-dasharray=\"5,5\""));
        for kind in SectionKind::ALL {
            assert!(svg.contains(kind.display_name()), "missing {kind}");
        }
        assert!(svg.contains(">Battery<"));
        assert!(svg.contains("x=\"15\""));
        assert!(svg.contains("y=\"399\""));
    }

    #[test]
    fn test_unbound_connections_not_drawn() {
        let svg = exporter().render(&generated());
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn test_bound_connection_and_annotation_drawn() {
        let mut diagram = generated();
        diagram.rebase_connections();
        diagram.replace_annotations(vec![Annotation::new(
            "ann_1",
            Point::new(50.0, 60.0),
            "Check <polarity>",
        )]);

        let svg = exporter().render(&diagram);
        assert_eq!(svg.matches("<line").count(), 6);
        assert!(svg.contains("marker-end=\"url(#arrowhead)\""));
        assert!(svg.contains("Check &lt;polarity&gt;"));
        assert!(svg.contains("x=\"55\""));
        assert!(svg.contains("y=\"80\""));
    }

    #[test]
    fn test_dangling_connection_is_skipped() {
        let mut diagram = generated();
        diagram.replace_connections(vec![Connection::between_blocks(
            "c",
            "block_power_0",
            "gone",
            "",
        )]);
        let svg = exporter().render(&diagram);
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn test_invalid_style_is_render_error() {
        let style: StyleConfig =
            serde_json::from_value(serde_json::json!({"block_fill": "nope"})).unwrap();
        assert!(matches!(
            SvgExporter::new(&LayoutConfig::default(), &style),
            Err(Error::Render(_))
        ));
    }
}
