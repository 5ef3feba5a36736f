//! 3D bubble chart for coordinate point clouds.
//!
//! Entries carrying x/y/z coordinates become spheres positioned by linear
//! coordinate scales, sized by a linear scale over the value extent, and
//! colored per series. Entries without coordinates are skipped (no spatial
//! data supplied means nothing to place).
//!
//! Consumed options: `width`, `height`, `dimensions`, `x_scale`, `y_scale`,
//! `z_scale`, `size_scale`, `size_domain`, `color_scale`, `colors`, `debug`.

use log::debug;

use crate::charts::{Dimensions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::color::{category_palette, Rgba};
use crate::data::{Dataset, Entry};
use crate::encode::{fmt_num, vec3_string};
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::{reconcile, ReconcileStats};
use crate::scale::{LinearScale, OrdinalScale, Scale};
use crate::scene::{NodeKind, SceneNode};
use crate::summary::{summarize, DataSummary};

/// Builder for 3D bubble charts.
#[derive(Debug, Clone)]
pub struct BubbleChart {
    width: u32,
    height: u32,
    dimensions: Dimensions,
    x_scale: Option<LinearScale>,
    y_scale: Option<LinearScale>,
    z_scale: Option<LinearScale>,
    size_scale: Option<LinearScale>,
    size_domain: (f64, f64),
    color_scale: Option<OrdinalScale>,
    colors: Vec<Rgba>,
    debug: bool,
    events: EventHandlers,
}

impl Default for BubbleChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BubbleChart {
    /// Create a new bubble chart builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            dimensions: Dimensions::default(),
            x_scale: None,
            y_scale: None,
            z_scale: None,
            size_scale: None,
            size_domain: (0.5, 3.0),
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

    /// Override the derived x coordinate scale.
    #[must_use]
    pub fn x_scale(mut self, scale: LinearScale) -> Self {
        self.x_scale = Some(scale);
        self
    }

    /// Override the derived y coordinate scale.
    #[must_use]
    pub fn y_scale(mut self, scale: LinearScale) -> Self {
        self.y_scale = Some(scale);
        self
    }

    /// Override the derived z coordinate scale.
    #[must_use]
    pub fn z_scale(mut self, scale: LinearScale) -> Self {
        self.z_scale = Some(scale);
        self
    }

    /// Override the derived size scale.
    #[must_use]
    pub fn size_scale(mut self, scale: LinearScale) -> Self {
        self.size_scale = Some(scale);
        self
    }

    /// Set the radius range the value extent maps onto.
    #[must_use]
    pub fn size_domain(mut self, min: f64, max: f64) -> Self {
        self.size_domain = (min, max);
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
        let extents = [
            (0, self.dimensions.x),
            (1, self.dimensions.y),
            (2, self.dimensions.z),
        ];
        let slots = [&mut self.x_scale, &mut self.y_scale, &mut self.z_scale];

        for (slot, (axis, extent)) in slots.into_iter().zip(extents) {
            if slot.is_none() {
                let min = summary.coordinate_min(axis);
                // Zero-anchor unless negative coordinates are present.
                let domain_min = if min < 0.0 { min } else { 0.0 };
                *slot = Some(LinearScale::new(
                    (domain_min, summary.coordinate_max(axis)),
                    (0.0, extent),
                ));
            }
        }

        if self.size_scale.is_none() {
            self.size_scale = Some(LinearScale::new(
                (summary.value_extent[0], summary.value_extent[1]),
                self.size_domain,
            ));
        }
        if self.color_scale.is_none() {
            self.color_scale =
                Some(OrdinalScale::new(summary.row_keys.clone(), self.colors.clone())?);
        }
        Ok(())
    }

    /// Render into the persistent container node.
    pub fn render(&mut self, scene: &mut SceneNode, data: &Dataset) -> Result<()> {
        let summary = summarize(data)?;
        self.derive_scales(&summary)?;

        let x_scale = self.x_scale.ok_or_else(missing_scale)?;
        let y_scale = self.y_scale.ok_or_else(missing_scale)?;
        let z_scale = self.z_scale.ok_or_else(missing_scale)?;
        let size_scale = self.size_scale.ok_or_else(missing_scale)?;
        let color_scale = self.color_scale.as_ref().ok_or_else(missing_scale)?;

        let series = data.series();
        let group_stats = reconcile(
            scene,
            series,
            |s| s.key.as_str(),
            |_| Ok(SceneNode::new(NodeKind::Group)),
            |_, _| Ok(()),
        )?;

        let mut bubble_stats = ReconcileStats::default();
        for s in series {
            let color = color_scale.color(&s.key);
            let placeable: Vec<&Entry> =
                s.values.iter().filter(|e| e.has_coordinates()).collect();

            let group = scene
                .child_by_key_mut(&s.key)
                .ok_or_else(|| Error::Rendering(format!("missing group for '{}'", s.key)))?;

            let stats = reconcile(
                group,
                &placeable,
                |e| e.key.as_str(),
                |_| Ok(bubble_skeleton()),
                |_, _| Ok(()),
            )?;
            bubble_stats.entered += stats.entered;
            bubble_stats.updated += stats.updated;
            bubble_stats.exited += stats.exited;

            for entry in &placeable {
                let (Some(x), Some(y), Some(z)) = (entry.x, entry.y, entry.z) else {
                    continue;
                };
                let radius = size_scale.scale(entry.value);

                let bubble = group.child_by_key_mut(&entry.key).ok_or_else(|| {
                    Error::Rendering(format!("missing bubble node for '{}'", entry.key))
                })?;
                bubble.set_attr(
                    "translation",
                    vec3_string(x_scale.scale(x), y_scale.scale(y), z_scale.scale(z)),
                );
                if let Some(sphere) = bubble.find_kind_mut(NodeKind::Sphere) {
                    sphere.set_attr("radius", fmt_num(radius));
                }
                if let Some(material) = bubble.find_kind_mut(NodeKind::Material) {
                    material.set_attr("diffuseColor", color.to_vertex_triplet());
                }
            }
        }

        if self.debug {
            debug!(
                "bubbles render: groups {group_stats:?}, bubbles {bubble_stats:?}, nodes {}",
                scene.node_count()
            );
        }

        Ok(())
    }
}

fn bubble_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Transform).with_child(
        SceneNode::new(NodeKind::Shape)
            .with_child(
                SceneNode::new(NodeKind::Appearance)
                    .with_child(SceneNode::new(NodeKind::Material)),
            )
            .with_child(SceneNode::new(NodeKind::Sphere)),
    )
}

fn missing_scale() -> Error {
    Error::Rendering("scale derivation left a scale unset".to_string())
}
