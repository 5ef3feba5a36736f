//! Ribbon chart: vertical curtains tracing each series.
//!
//! Each series becomes a 2×n vertex grid — a base row at y = 0 and a top row
//! at the scaled values — indexed double-sided so the curtain is visible
//! from both sides. Multi-series input spreads ribbons along z, keyed by
//! series so re-renders update surviving curtains in place.
//!
//! Consumed options: `width`, `height`, `dimensions`, `x_scale`, `y_scale`,
//! `z_scale`, `color_scale`, `colors`, `debug`.

use log::debug;

use crate::charts::{Dimensions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::color::{category_palette, Rgba};
use crate::data::{Dataset, Series};
use crate::encode::{grid_face_indices, index_string, point_string, vec3_string};
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::reconcile;
use crate::scale::{LinearScale, OrdinalScale, PointScale, Scale};
use crate::scene::{NodeKind, SceneNode};
use crate::summary::{summarize, DataSummary};

/// Builder for ribbon charts.
#[derive(Debug, Clone)]
pub struct RibbonChart {
    width: u32,
    height: u32,
    dimensions: Dimensions,
    x_scale: Option<PointScale>,
    y_scale: Option<LinearScale>,
    z_scale: Option<PointScale>,
    color_scale: Option<OrdinalScale>,
    colors: Vec<Rgba>,
    debug: bool,
    events: EventHandlers,
}

impl Default for RibbonChart {
    fn default() -> Self {
        Self::new()
    }
}

impl RibbonChart {
    /// Outer padding for the column/row point scales.
    const GRID_PADDING: f64 = 0.5;

    /// Create a new ribbon chart builder.
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
            colors: category_palette(),
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

    /// Override the derived series (z) scale.
    #[must_use]
    pub fn z_scale(mut self, scale: PointScale) -> Self {
        self.z_scale = Some(scale);
        self
    }

    /// Override the derived color scale.
    #[must_use]
    pub fn color_scale(mut self, scale: OrdinalScale) -> Self {
        self.color_scale = Some(scale);
        self
    }

    /// Set the categorical palette used when deriving the color scale.
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
        if self.z_scale.is_none() && summary.multi_series {
            self.z_scale = Some(PointScale::new(
                summary.row_keys.clone(),
                (0.0, self.dimensions.z),
                Self::GRID_PADDING,
            )?);
        }
        if self.color_scale.is_none() {
            self.color_scale =
                Some(OrdinalScale::new(summary.row_keys.clone(), self.colors.clone())?);
        }
        Ok(())
    }

    /// Render into the persistent container node.
    ///
    /// Each series needs at least two entries to form a curtain.
    pub fn render(&mut self, scene: &mut SceneNode, data: &Dataset) -> Result<()> {
        let summary = summarize(data)?;
        self.derive_scales(&summary)?;

        let series = data.series();
        for s in series {
            if s.values.len() < 2 {
                return Err(Error::InvalidDataShape(format!(
                    "series '{}' has {} entries, a ribbon needs at least 2",
                    s.key,
                    s.values.len()
                )));
            }
        }

        let stats = reconcile(
            scene,
            series,
            |s| s.key.as_str(),
            |_| Ok(ribbon_skeleton()),
            |_, _| Ok(()),
        )?;

        let x_scale = self.x_scale.as_ref().ok_or_else(missing_scale)?;
        let y_scale = self.y_scale.as_ref().ok_or_else(missing_scale)?;
        let color_scale = self.color_scale.as_ref().ok_or_else(missing_scale)?;

        for s in series {
            let z_offset = match &self.z_scale {
                Some(z_scale) => z_scale.position(&s.key).ok_or_else(|| {
                    Error::Rendering(format!("series '{}' not in z scale domain", s.key))
                })?,
                None => 0.0,
            };
            let (points, indices) = curtain_mesh(s, x_scale, y_scale)?;
            let color = color_scale.color(&s.key);

            let node = scene
                .child_by_key_mut(&s.key)
                .ok_or_else(|| Error::Rendering(format!("missing ribbon for '{}'", s.key)))?;
            node.set_attr("translation", vec3_string(0.0, 0.0, z_offset));
            if let Some(face_set) = node.find_kind_mut(NodeKind::IndexedFaceSet) {
                face_set.set_attr("coordIndex", index_string(&indices));
                face_set.set_attr("solid", "false");
            }
            if let Some(coordinate) = node.find_kind_mut(NodeKind::Coordinate) {
                coordinate.set_attr("point", point_string(&points));
            }
            if let Some(material) = node.find_kind_mut(NodeKind::Material) {
                material.set_attr("diffuseColor", color.to_vertex_triplet());
            }
        }

        if self.debug {
            debug!("ribbon render: {stats:?}, nodes {}", scene.node_count());
        }

        Ok(())
    }
}

/// Base row at y = 0 plus a top row at the scaled values, indexed as a 2×n
/// double-sided grid.
fn curtain_mesh(
    series: &Series,
    x_scale: &PointScale,
    y_scale: &LinearScale,
) -> Result<(Vec<[f64; 3]>, Vec<i64>)> {
    let n = series.values.len();
    let mut points = Vec::with_capacity(n * 2);

    for entry in &series.values {
        let x = x_scale.position(&entry.key).ok_or_else(|| {
            Error::Rendering(format!("entry '{}' not in x scale domain", entry.key))
        })?;
        points.push([x, 0.0, 0.0]);
    }
    for entry in &series.values {
        let x = x_scale.position(&entry.key).ok_or_else(|| {
            Error::Rendering(format!("entry '{}' not in x scale domain", entry.key))
        })?;
        points.push([x, y_scale.scale(entry.value), 0.0]);
    }

    let indices = grid_face_indices(2, n)?;
    Ok((points, indices))
}

fn ribbon_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Transform).with_child(
        SceneNode::new(NodeKind::Shape)
            .with_child(
                SceneNode::new(NodeKind::Appearance)
                    .with_child(SceneNode::new(NodeKind::Material)),
            )
            .with_child(
                SceneNode::new(NodeKind::IndexedFaceSet)
                    .with_child(SceneNode::new(NodeKind::Coordinate)),
            ),
    )
}

fn missing_scale() -> Error {
    Error::Rendering("scale derivation left a scale unset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Entry;

    fn wave() -> Dataset {
        Dataset::single(Series::new(
            "Wave",
            vec![
                Entry::new("t0", 1.0),
                Entry::new("t1", 3.0),
                Entry::new("t2", 2.0),
            ],
        ))
    }

    #[test]
    fn test_single_ribbon() {
        let mut chart = RibbonChart::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &wave()).unwrap();

        let ribbon = scene.child_by_key("Wave").unwrap();
        let coordinate = ribbon.find_kind(NodeKind::Coordinate).unwrap();
        // 3 entries -> 6 vertices (base row + top row).
        assert_eq!(coordinate.attr("point").unwrap().split(' ').count(), 18);

        let face_set = ribbon.find_kind(NodeKind::IndexedFaceSet).unwrap();
        // 2 quads, double-sided, 6 entries per face.
        let index = face_set.attr("coordIndex").unwrap();
        assert_eq!(index.split(' ').count(), 24);
    }

    #[test]
    fn test_base_row_at_zero() {
        let mut chart = RibbonChart::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &wave()).unwrap();

        let point = scene
            .child_by_key("Wave")
            .unwrap()
            .find_kind(NodeKind::Coordinate)
            .unwrap()
            .attr("point")
            .unwrap()
            .to_string();
        let components: Vec<&str> = point.split(' ').collect();
        // First three vertices form the base row: y components are 0.
        assert_eq!(components[1], "0");
        assert_eq!(components[4], "0");
        assert_eq!(components[7], "0");
        // Peak entry (value 3 of max 3) reaches the full y extent.
        assert_eq!(components[13], "40");
    }

    #[test]
    fn test_multi_series_ribbons_spread_along_z() {
        let data = Dataset::multi(vec![
            Series::new("A", vec![Entry::new("t0", 1.0), Entry::new("t1", 2.0)]),
            Series::new("B", vec![Entry::new("t0", 2.0), Entry::new("t1", 1.0)]),
        ]);
        let mut chart = RibbonChart::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &data).unwrap();

        let a = scene.child_by_key("A").unwrap().attr("translation").unwrap();
        let b = scene.child_by_key("B").unwrap().attr("translation").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_too_short_series_rejected() {
        let data = Dataset::single(Series::new("S", vec![Entry::new("only", 1.0)]));
        let mut chart = RibbonChart::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        assert!(matches!(
            chart.render(&mut scene, &data),
            Err(Error::InvalidDataShape(_))
        ));
    }

    #[test]
    fn test_re_render_is_idempotent() {
        let mut chart = RibbonChart::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &wave()).unwrap();
        let first = scene.clone();
        chart.render(&mut scene, &wave()).unwrap();
        assert_eq!(scene, first);
    }
}
