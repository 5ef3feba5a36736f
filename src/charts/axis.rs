//! Axis component: axis line, tick marks, and labels for one scale.
//!
//! An axis renders along one of the three principal directions, with tick
//! marks extending along a second direction. Ticks are keyed by label, so
//! panning a linear domain updates surviving ticks in place and only the
//! labels that scrolled out of range exit.
//!
//! Consumed options: `tick_size`, `tick_padding`, `tick_count`,
//! `tick_format`, `color`, `debug`.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::color::Rgba;
use crate::encode::{fmt_num, vec3_string};
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::reconcile;
use crate::scale::{BandScale, LinearScale, PointScale, Scale};
use crate::scene::{NodeKind, SceneNode};

/// The scale an axis renders.
#[derive(Debug, Clone)]
pub enum AxisScale {
    /// Continuous axis with generated ticks.
    Linear(LinearScale),
    /// Categorical axis ticking each band's center.
    Band(BandScale),
    /// Categorical axis ticking each point.
    Point(PointScale),
}

/// Principal axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along +x.
    X,
    /// Along +y.
    Y,
    /// Along +z.
    Z,
}

impl Direction {
    fn unit(self) -> [f64; 3] {
        match self {
            Direction::X => [1.0, 0.0, 0.0],
            Direction::Y => [0.0, 1.0, 0.0],
            Direction::Z => [0.0, 0.0, 1.0],
        }
    }

    /// Axis-angle rotation taking a y-aligned cylinder onto this direction.
    fn rotation(self) -> Option<String> {
        let half_pi = std::f64::consts::FRAC_PI_2;
        match self {
            Direction::X => Some(format!("0 0 1 -{}", fmt_num(half_pi))),
            Direction::Y => None,
            Direction::Z => Some(format!("1 0 0 {}", fmt_num(half_pi))),
        }
    }
}

/// Formatter for linear tick labels.
#[derive(Clone, Default)]
pub enum TickFormatter {
    /// Shortest numeric form.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl TickFormatter {
    /// Format a tick value for display.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Default => fmt_num(value),
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl fmt::Debug for TickFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "TickFormatter::Default"),
            Self::Custom(_) => write!(f, "TickFormatter::Custom(..)"),
        }
    }
}

/// Builder for axis components.
#[derive(Debug, Clone)]
pub struct Axis {
    scale: AxisScale,
    direction: Direction,
    tick_direction: Direction,
    tick_size: f64,
    tick_padding: f64,
    tick_count: usize,
    tick_format: TickFormatter,
    color: Rgba,
    debug: bool,
    events: EventHandlers,
}

impl Axis {
    /// Create an axis for a scale, running along `direction` with ticks
    /// extending along `tick_direction`.
    #[must_use]
    pub fn new(scale: AxisScale, direction: Direction, tick_direction: Direction) -> Self {
        Self {
            scale,
            direction,
            tick_direction,
            tick_size: 1.0,
            tick_padding: 1.0,
            tick_count: 10,
            tick_format: TickFormatter::default(),
            color: Rgba::BLACK,
            debug: false,
            events: EventHandlers::new(),
        }
    }

    /// Set the tick mark length.
    #[must_use]
    pub fn tick_size(mut self, size: f64) -> Self {
        self.tick_size = size;
        self
    }

    /// Set the gap between tick mark and label.
    #[must_use]
    pub fn tick_padding(mut self, padding: f64) -> Self {
        self.tick_padding = padding;
        self
    }

    /// Set the requested tick count for linear scales.
    #[must_use]
    pub fn tick_count(mut self, count: usize) -> Self {
        self.tick_count = count;
        self
    }

    /// Set the tick label formatter for linear scales.
    #[must_use]
    pub fn tick_format(mut self, formatter: TickFormatter) -> Self {
        self.tick_format = formatter;
        self
    }

    /// Set the axis color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
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

    /// Tick labels with their positions along the axis.
    fn tick_items(&self) -> Vec<(String, f64)> {
        match &self.scale {
            AxisScale::Linear(scale) => scale
                .ticks(self.tick_count)
                .into_iter()
                .map(|v| (self.tick_format.format(v), scale.scale(v)))
                .collect(),
            AxisScale::Band(scale) => scale
                .domain()
                .iter()
                .map(|k| {
                    let pos = scale.position(k).unwrap_or(0.0) + scale.bandwidth() / 2.0;
                    (k.clone(), pos)
                })
                .collect(),
            AxisScale::Point(scale) => scale
                .domain()
                .iter()
                .map(|k| (k.clone(), scale.position(k).unwrap_or(0.0)))
                .collect(),
        }
    }

    fn axis_span(&self) -> (f64, f64) {
        match &self.scale {
            AxisScale::Linear(scale) => scale.range(),
            AxisScale::Band(scale) => scale.range(),
            AxisScale::Point(scale) => {
                let domain = scale.domain();
                let first = domain.first().and_then(|k| scale.position(k)).unwrap_or(0.0);
                let last = domain.last().and_then(|k| scale.position(k)).unwrap_or(0.0);
                (first.min(last), first.max(last))
            }
        }
    }

    /// Render the axis line, ticks, and labels into the container node.
    pub fn render(&mut self, parent: &mut SceneNode) -> Result<()> {
        self.render_line(parent);

        let dir = self.direction.unit();
        let tick_dir = self.tick_direction.unit();
        let tick_size = self.tick_size;
        let label_offset = self.tick_size + self.tick_padding;
        let color = self.color;

        let items = self.tick_items();
        let stats = reconcile(
            parent,
            &items,
            |(label, _)| label.as_str(),
            |_| Ok(tick_skeleton()),
            |_, _| Ok(()),
        )?;

        for (label, position) in &items {
            let tick = parent
                .child_by_key_mut(label)
                .ok_or_else(|| Error::Rendering(format!("missing tick node for '{label}'")))?;
            tick.set_attr(
                "translation",
                vec3_string(dir[0] * position, dir[1] * position, dir[2] * position),
            );

            if let Some(mark) = tick.find_kind_mut(NodeKind::Cylinder) {
                mark.set_attr("height", fmt_num(tick_size));
                mark.set_attr("radius", "0.05");
            }
            if let Some(material) = tick.find_kind_mut(NodeKind::Material) {
                material.set_attr("diffuseColor", color.to_vertex_triplet());
            }

            // Children: [0] mark shape, [1] label holder.
            if let Some(holder) = tick.children_mut().get_mut(1) {
                holder.set_attr(
                    "translation",
                    vec3_string(
                        tick_dir[0] * label_offset,
                        tick_dir[1] * label_offset,
                        tick_dir[2] * label_offset,
                    ),
                );
                if let Some(text) = holder.find_kind_mut(NodeKind::Text) {
                    text.set_attr("string", label.clone());
                }
            }
        }

        if self.debug {
            debug!("axis render: ticks {stats:?}, nodes {}", parent.node_count());
        }

        Ok(())
    }

    /// Create or update the axis line, kept as an unkeyed static child so
    /// the tick reconciliation pass never touches it.
    fn render_line(&self, parent: &mut SceneNode) {
        let line_index = parent.children().iter().position(|c| c.key().is_none());
        let line_index = match line_index {
            Some(index) => index,
            None => {
                let shape = SceneNode::new(NodeKind::Shape)
                    .with_child(
                        SceneNode::new(NodeKind::Appearance)
                            .with_child(SceneNode::new(NodeKind::Material)),
                    )
                    .with_child(SceneNode::new(NodeKind::Cylinder));
                parent.push(SceneNode::new(NodeKind::Transform).with_child(shape));
                parent.children().len() - 1
            }
        };

        let (start, stop) = self.axis_span();
        let length = stop - start;
        let mid = start + length / 2.0;
        let dir = self.direction.unit();

        if let Some(line) = parent.children_mut().get_mut(line_index) {
            line.set_attr(
                "translation",
                vec3_string(dir[0] * mid, dir[1] * mid, dir[2] * mid),
            );
            if let Some(rotation) = self.direction.rotation() {
                line.set_attr("rotation", rotation);
            }
            if let Some(cylinder) = line.find_kind_mut(NodeKind::Cylinder) {
                cylinder.set_attr("height", fmt_num(length));
                cylinder.set_attr("radius", "0.1");
            }
            if let Some(material) = line.find_kind_mut(NodeKind::Material) {
                material.set_attr("diffuseColor", self.color.to_vertex_triplet());
            }
        }
    }
}

fn tick_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Transform)
        .with_child(
            SceneNode::new(NodeKind::Shape)
                .with_child(
                    SceneNode::new(NodeKind::Appearance)
                        .with_child(SceneNode::new(NodeKind::Material)),
                )
                .with_child(SceneNode::new(NodeKind::Cylinder)),
        )
        .with_child(
            SceneNode::new(NodeKind::Transform)
                .with_child(SceneNode::new(NodeKind::Shape).with_child(SceneNode::new(NodeKind::Text))),
        )
}
