//! Chart and component builders.
//!
//! Every builder owns its configuration (viewport size, 3D dimensions,
//! optional caller-supplied scales, colors, debug flag, chart-specific
//! options) and exposes a render entry point that mutates a persistent
//! [`crate::scene::SceneNode`] container through the enter/update/exit
//! discipline. Scales are defaulted lazily from the data summary on first
//! render; a scale the caller supplied is never overwritten. Options a chart
//! does not consume are silently ignored; each chart documents which options
//! it reads.

mod axis;
mod bars;
mod bubbles;
mod ribbon;
mod surface;
mod vector_field;
mod volume;

pub use axis::{Axis, AxisScale, Direction, TickFormatter};
pub use bars::BarChart;
pub use bubbles::BubbleChart;
pub use ribbon::RibbonChart;
pub use surface::SurfacePlot;
pub use vector_field::{VectorField, VectorFn};
pub use volume::VolumeSlice;

/// Logical 3D extent each axis scale maps onto, in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Extent along x.
    pub x: f64,
    /// Extent along y.
    pub y: f64,
    /// Extent along z.
    pub z: f64,
}

impl Dimensions {
    /// Create a dimensions triple.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(40.0, 40.0, 40.0)
    }
}

/// Default viewport width in pixels.
pub(crate) const DEFAULT_WIDTH: u32 = 500;
/// Default viewport height in pixels.
pub(crate) const DEFAULT_HEIGHT: u32 = 500;
