//! Visual definitions shared by the renderers.
//!
//! - [`StrokeDefinition`] and [`StrokeStyle`] describe outlines and lines.
//! - [`LayeredOutput`] collects SVG nodes per [`RenderLayer`] so exporters can
//!   emit them in a fixed z-order regardless of iteration order.

mod layer;
mod stroke;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeDefinition, StrokeStyle};
