//! Layer-based z-ordering for SVG output.
//!
//! Exporters push nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; [`LayeredOutput::render`] emits one `<g>` per non-empty
//! layer from bottom to top. Within a layer, insertion order is preserved.

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Section column backgrounds
    Section,
    /// Block rectangles
    Block,
    /// Connection lines
    Connection,
    /// Annotation note backgrounds
    Note,
    /// All text labels
    Label,
}

impl RenderLayer {
    /// Returns the value written to the `data-layer` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Block => "block",
            Self::Connection => "connection",
            Self::Note => "note",
            Self::Label => "label",
        }
    }
}

/// SVG nodes grouped by rendering layer.
///
/// # Example
///
/// ```
/// # use blockdraft_core::draw::{RenderLayer, LayeredOutput};
/// # use svg::node::element::{Rectangle, Text as SvgText};
/// let mut output = LayeredOutput::new();
/// output.add_to_layer(RenderLayer::Label, Box::new(SvgText::new("MCU")));
/// output.add_to_layer(RenderLayer::Block, Box::new(Rectangle::new()));
///
/// // Block renders before Label, whatever the insertion order.
/// assert_eq!(output.render().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to the specified layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes a `<g data-layer="...">` element.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        // Stable: keeps insertion order within a layer
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }

            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg::node::element::Rectangle;

    #[test]
    fn test_layered_output_empty() {
        let output = LayeredOutput::new();
        assert!(output.is_empty());
        assert!(output.render().is_empty());
    }

    #[test]
    fn test_layered_output_orders_by_layer() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Label, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Section, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Label, Box::new(Rectangle::new()));

        let nodes = output.render();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].to_string().contains("data-layer=\"section\""));
        assert!(nodes[1].to_string().contains("data-layer=\"label\""));
    }
}
