//! Surface plot over a rectangular multi-series grid.
//!
//! Rows are series, columns are entry keys; each grid vertex sits at the
//! point-scaled column position (x), the linear-scaled value (y), and the
//! point-scaled row position (z). The mesh is emitted as one indexed face
//! set with double-sided coordinate indices and a per-vertex color list from
//! a sequential scale over the value extent.
//!
//! Consumed options: `width`, `height`, `dimensions`, `x_scale`, `y_scale`,
//! `z_scale`, `color_scale`, `colors`, `debug`.

use log::debug;

use crate::charts::{Dimensions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::color::{sequential_ramp, Rgba};
use crate::data::Dataset;
use crate::encode::{color_string, grid_face_indices, point_string, validate_grid};
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::reconcile;
use crate::scale::{LinearScale, PointScale, Scale, SequentialScale};
use crate::scene::{NodeKind, SceneNode};
use crate::summary::{summarize, DataSummary};

/// Builder for surface plots.
#[derive(Debug, Clone)]
pub struct SurfacePlot {
    width: u32,
    height: u32,
    dimensions: Dimensions,
    x_scale: Option<PointScale>,
    y_scale: Option<LinearScale>,
    z_scale: Option<PointScale>,
    color_scale: Option<SequentialScale>,
    colors: Vec<Rgba>,
    debug: bool,
    events: EventHandlers,
}

impl Default for SurfacePlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfacePlot {
    /// Outer padding for the row/column point scales.
    const GRID_PADDING: f64 = 0.5;

    /// Create a new surface plot builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            dimensions: Dimensions::default(),
            x_scale: None,
            y_scale: None,
            z_scale: None,
            color_scale: None,
            colors: sequential_ramp(),
            debug: false,
            events: EventHandlers::new(),
        }
    }

    /// Set the viewport width in pixels.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the viewport height in pixels.
    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the logical 3D extent.
    #[must_use]
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Override the derived column (x) scale.
    #[must_use]
    pub fn x_scale(mut self, scale: PointScale) -> Self {
        self.x_scale = Some(scale);
        self
    }

    /// Override the derived value (y) scale.
    #[must_use]
    pub fn y_scale(mut self, scale: LinearScale) -> Self {
        self.y_scale = Some(scale);
        self
    }

    /// Override the derived row (z) scale.
    #[must_use]
    pub fn z_scale(mut self, scale: PointScale) -> Self {
        self.z_scale = Some(scale);
        self
    }

    /// Override the derived sequential color scale.
    #[must_use]
    pub fn color_scale(mut self, scale: SequentialScale) -> Self {
        self.color_scale = Some(scale);
        self
    }

    /// Set the color ramp used when deriving the sequential scale.
    #[must_use]
    pub fn colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = colors;
        self
    }

    /// Toggle per-render diagnostics.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Register an event handler.
    #[must_use]
    pub fn on(mut self, kind: EventKind, handler: EventHandler) -> Self {
        self.events.on(kind, handler);
        self
    }

    /// Dispatch a semantic event to registered handlers.
    pub fn dispatch(&self, event: &NodeEvent) {
        self.events.dispatch(event);
    }

    fn derive_scales(&mut self, summary: &DataSummary) -> Result<()> {
        if self.x_scale.is_none() {
            self.x_scale = Some(PointScale::new(
                summary.column_keys.clone(),
                (0.0, self.dimensions.x),
                Self::GRID_PADDING,
            )?);
        }
        if self.y_scale.is_none() {
            self.y_scale =
                Some(LinearScale::new((0.0, summary.value_max), (0.0, self.dimensions.y)));
        }
        if self.z_scale.is_none() {
            self.z_scale = Some(PointScale::new(
                summary.row_keys.clone(),
                (0.0, self.dimensions.z),
                Self::GRID_PADDING,
            )?);
        }
        if self.color_scale.is_none() {
            self.color_scale = Some(SequentialScale::new(
                self.colors.clone(),
                (summary.value_extent[0], summary.value_extent[1]),
            )?);
        }
        Ok(())
    }

    /// Render into the persistent container node.
    ///
    /// Requires the multi-series shape with rectangular, key-aligned rows;
    /// ragged input is rejected before any scene mutation.
    pub fn render(&mut self, scene: &mut SceneNode, data: &Dataset) -> Result<()> {
        if !data.is_multi() {
            return Err(Error::InvalidDataShape(
                "surface plot requires multi-series data".to_string(),
            ));
        }

        let summary = summarize(data)?;
        self.derive_scales(&summary)?;

        let x_scale = self.x_scale.as_ref().ok_or_else(missing_scale)?;
        let y_scale = self.y_scale.as_ref().ok_or_else(missing_scale)?;
        let z_scale = self.z_scale.as_ref().ok_or_else(missing_scale)?;
        let color_scale = self.color_scale.as_ref().ok_or_else(missing_scale)?;

        // Build the vertex grid row-major before touching the scene, so a
        // ragged matrix aborts with no partial mutation.
        let mut grid: Vec<Vec<[f64; 3]>> = Vec::with_capacity(data.series().len());
        let mut colors: Vec<Rgba> = Vec::new();
        for s in data.series() {
            let z = z_scale.position(&s.key).ok_or_else(|| {
                Error::Rendering(format!("series '{}' not in z scale domain", s.key))
            })?;
            let mut row = Vec::with_capacity(s.values.len());
            for entry in &s.values {
                let x = x_scale.position(&entry.key).ok_or_else(|| {
                    Error::Rendering(format!("entry '{}' not in x scale domain", entry.key))
                })?;
                row.push([x, y_scale.scale(entry.value), z]);
                colors.push(color_scale.scale(entry.value));
            }
            grid.push(row);
        }

        let (rows, cols) = validate_grid(&grid)?;
        let indices = grid_face_indices(rows, cols)?;
        let points: Vec<[f64; 3]> = grid.into_iter().flatten().collect();

        let point_list = point_string(&points);
        let color_list = color_string(&colors);
        let index_list = crate::encode::index_string(&indices);

        let items = ["surface"];
        let stats = reconcile(
            scene,
            &items,
            |k| *k,
            |_| Ok(surface_skeleton()),
            |_, _| Ok(()),
        )?;

        let node = scene
            .child_by_key_mut("surface")
            .ok_or_else(|| Error::Rendering("missing surface node".to_string()))?;
        if let Some(face_set) = node.find_kind_mut(NodeKind::IndexedFaceSet) {
            face_set.set_attr("coordIndex", index_list);
            face_set.set_attr("colorPerVertex", "true");
            face_set.set_attr("solid", "false");
        }
        if let Some(coordinate) = node.find_kind_mut(NodeKind::Coordinate) {
            coordinate.set_attr("point", point_list);
        }
        if let Some(color) = node.find_kind_mut(NodeKind::Color) {
            color.set_attr("color", color_list);
        }

        if self.debug {
            debug!(
                "surface render: {rows}x{cols} grid, {stats:?}, nodes {}",
                scene.node_count()
            );
        }

        Ok(())
    }
}

fn surface_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Shape).with_child(
        SceneNode::new(NodeKind::IndexedFaceSet)
            .with_child(SceneNode::new(NodeKind::Coordinate))
            .with_child(SceneNode::new(NodeKind::Color)),
    )
}

fn missing_scale() -> Error {
    Error::Rendering("scale derivation left a scale unset".to_string())
}
