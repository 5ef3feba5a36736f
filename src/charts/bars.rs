//! 3D bar chart.
//!
//! Single-series input renders one row of boxes along x; multi-series input
//! renders one row per series, spread along z. Bars are keyed by entry key
//! inside per-series groups keyed by series key, so re-rendering with new
//! data updates surviving bars in place.
//!
//! Consumed options: `width`, `height`, `dimensions`, `x_scale`, `y_scale`,
//! `z_scale`, `color_scale`, `colors`, `debug`.

use log::debug;

use crate::charts::{Dimensions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::color::{category_palette, Rgba};
use crate::data::Dataset;
use crate::encode::vec3_string;
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::{reconcile, ReconcileStats};
use crate::scale::{BandScale, LinearScale, OrdinalScale, Scale};
use crate::scene::{NodeKind, SceneNode};
use crate::summary::{summarize, DataSummary};

/// Builder for 3D bar charts.
#[derive(Debug, Clone)]
pub struct BarChart {
    width: u32,
    height: u32,
    dimensions: Dimensions,
    x_scale: Option<BandScale>,
    y_scale: Option<LinearScale>,
    z_scale: Option<BandScale>,
    color_scale: Option<OrdinalScale>,
    colors: Vec<Rgba>,
    debug: bool,
    events: EventHandlers,
}

impl Default for BarChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BarChart {
    /// Padding for the category (x) band scale.
    const COLUMN_PADDING: f64 = 0.3;
    /// Padding for the series (z) band scale; wider so rows read separately.
    const ROW_PADDING: f64 = 0.7;

    /// Create a new bar chart builder.
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

    /// Override the derived category (x) scale.
    #[must_use]
    pub fn x_scale(mut self, scale: BandScale) -> Self {
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
    pub fn z_scale(mut self, scale: BandScale) -> Self {
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

    /// Fill any unset scales from the summary; caller-supplied scales are
    /// never overwritten, so repeated derivation is idempotent.
    fn derive_scales(&mut self, summary: &DataSummary) -> Result<()> {
        if self.x_scale.is_none() {
            self.x_scale = Some(BandScale::new(
                summary.column_keys.clone(),
                (0.0, self.dimensions.x),
                Self::COLUMN_PADDING,
            )?);
        }
        if self.y_scale.is_none() {
            // Zero-anchored so bar heights read as magnitude from a common
            // baseline.
            self.y_scale =
                Some(LinearScale::new((0.0, summary.value_max), (0.0, self.dimensions.y)));
        }
        if self.z_scale.is_none() && summary.multi_series {
            self.z_scale = Some(BandScale::new(
                summary.row_keys.clone(),
                (0.0, self.dimensions.z),
                Self::ROW_PADDING,
            )?);
        }
        if self.color_scale.is_none() {
            self.color_scale =
                Some(OrdinalScale::new(summary.column_keys.clone(), self.colors.clone())?);
        }
        Ok(())
    }

    /// Render into the persistent container node.
    ///
    /// Re-invoking with new data is the sole update mechanism; identical data
    /// produces an identical tree.
    pub fn render(&mut self, scene: &mut SceneNode, data: &Dataset) -> Result<()> {
        let summary = summarize(data)?;
        self.derive_scales(&summary)?;

        let x_scale = self.x_scale.as_ref().ok_or_else(missing_scale)?;
        let y_scale = self.y_scale.as_ref().ok_or_else(missing_scale)?;
        let color_scale = self.color_scale.as_ref().ok_or_else(missing_scale)?;

        let series = data.series();
        let group_stats = reconcile(
            scene,
            series,
            |s| s.key.as_str(),
            |_| Ok(SceneNode::new(NodeKind::Transform)),
            |_, _| Ok(()),
        )?;

        let mut bar_stats = ReconcileStats::default();
        for s in series {
            let z_offset = match &self.z_scale {
                Some(z_scale) => z_scale.position(&s.key).ok_or_else(|| {
                    Error::Rendering(format!("series '{}' not in z scale domain", s.key))
                })? + z_scale.bandwidth() / 2.0,
                None => 0.0,
            };

            let group = scene
                .child_by_key_mut(&s.key)
                .ok_or_else(|| Error::Rendering(format!("missing group for '{}'", s.key)))?;
            group.set_attr("translation", vec3_string(0.0, 0.0, z_offset));

            let stats = reconcile(
                group,
                &s.values,
                |e| e.key.as_str(),
                |_| Ok(bar_skeleton()),
                |_, _| Ok(()),
            )?;
            bar_stats.entered += stats.entered;
            bar_stats.updated += stats.updated;
            bar_stats.exited += stats.exited;

            for entry in &s.values {
                let x = x_scale.position(&entry.key).ok_or_else(|| {
                    Error::Rendering(format!("entry '{}' not in x scale domain", entry.key))
                })?;
                let bandwidth = x_scale.bandwidth();
                let height = y_scale.scale(entry.value);
                let color = color_scale.color(&entry.key);

                let bar = group.child_by_key_mut(&entry.key).ok_or_else(|| {
                    Error::Rendering(format!("missing bar node for '{}'", entry.key))
                })?;
                bar.set_attr(
                    "translation",
                    vec3_string(x + bandwidth / 2.0, height / 2.0, 0.0),
                );
                if let Some(shape) = bar.find_kind_mut(NodeKind::Box) {
                    shape.set_attr("size", vec3_string(bandwidth, height, bandwidth));
                }
                if let Some(material) = bar.find_kind_mut(NodeKind::Material) {
                    material.set_attr("diffuseColor", color.to_vertex_triplet());
                }
            }
        }

        if self.debug {
            debug!(
                "bars render: groups {group_stats:?}, bars {bar_stats:?}, nodes {}",
                scene.node_count()
            );
        }

        Ok(())
    }
}

fn bar_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Transform).with_child(
        SceneNode::new(NodeKind::Shape)
            .with_child(
                SceneNode::new(NodeKind::Appearance)
                    .with_child(SceneNode::new(NodeKind::Material)),
            )
            .with_child(SceneNode::new(NodeKind::Box)),
    )
}

fn missing_scale() -> Error {
    Error::Rendering("scale derivation left a scale unset".to_string())
}
