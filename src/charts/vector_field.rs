//! Vector field chart: oriented arrows at coordinate points.
//!
//! Each entry carrying coordinates becomes an arrow (cylinder shaft + cone
//! head) positioned at the scaled point, oriented along a user-suppliable
//! vector function, sized by a linear scale over the magnitude extent, and
//! colored by magnitude through a sequential scale. The default vector
//! function points along +y with the entry value as magnitude.
//!
//! Consumed options: `width`, `height`, `dimensions`, `x_scale`, `y_scale`,
//! `z_scale`, `size_scale`, `size_domain`, `color_scale`, `colors`,
//! `vector_fn`, `debug`.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::charts::{Dimensions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::color::{sequential_ramp, Rgba};
use crate::data::{Dataset, Entry};
use crate::encode::{fmt_num, vec3_string};
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::reconcile;
use crate::scale::{LinearScale, Scale, SequentialScale};
use crate::scene::{NodeKind, SceneNode};
use crate::summary::{summarize, DataSummary};

/// User-suppliable function mapping an entry to its field vector.
pub type VectorFn = Arc<dyn Fn(&Entry) -> [f64; 3] + Send + Sync>;

/// Builder for vector field charts.
#[derive(Clone)]
pub struct VectorField {
    width: u32,
    height: u32,
    dimensions: Dimensions,
    x_scale: Option<LinearScale>,
    y_scale: Option<LinearScale>,
    z_scale: Option<LinearScale>,
    size_scale: Option<LinearScale>,
    size_domain: (f64, f64),
    color_scale: Option<SequentialScale>,
    colors: Vec<Rgba>,
    vector_fn: VectorFn,
    debug: bool,
    events: EventHandlers,
}

impl fmt::Debug for VectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorField")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dimensions", &self.dimensions)
            .field("size_domain", &self.size_domain)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Default for VectorField {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorField {
    /// Create a new vector field builder.
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
            size_domain: (2.0, 5.0),
            color_scale: None,
            colors: sequential_ramp(),
            vector_fn: Arc::new(|entry| [0.0, entry.value, 0.0]),
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

    /// Set the arrow length range the magnitude extent maps onto.
    #[must_use]
    pub fn size_domain(mut self, min: f64, max: f64) -> Self {
        self.size_domain = (min, max);
        self
    }

    /// Override the derived magnitude color scale.
    #[must_use]
    pub fn color_scale(mut self, scale: SequentialScale) -> Self {
        self.color_scale = Some(scale);
        self
    }

    /// Set the color ramp used when deriving the magnitude scale.
    #[must_use]
    pub fn colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = colors;
        self
    }

    /// Supply the field vector function.
    #[must_use]
    pub fn vector_fn(mut self, vector_fn: VectorFn) -> Self {
        self.vector_fn = vector_fn;
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

    fn derive_scales(&mut self, summary: &DataSummary, magnitudes: &[f64]) -> Result<()> {
        let extents = [
            (0, self.dimensions.x),
            (1, self.dimensions.y),
            (2, self.dimensions.z),
        ];
        let slots = [&mut self.x_scale, &mut self.y_scale, &mut self.z_scale];

        for (slot, (axis, extent)) in slots.into_iter().zip(extents) {
            if slot.is_none() {
                let min = summary.coordinate_min(axis);
                let domain_min = if min < 0.0 { min } else { 0.0 };
                *slot = Some(LinearScale::new(
                    (domain_min, summary.coordinate_max(axis)),
                    (0.0, extent),
                ));
            }
        }

        let mag_min = magnitudes.iter().copied().fold(f64::INFINITY, f64::min);
        let mag_max = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if self.size_scale.is_none() {
            self.size_scale = Some(LinearScale::new((mag_min, mag_max), self.size_domain));
        }
        if self.color_scale.is_none() {
            self.color_scale =
                Some(SequentialScale::new(self.colors.clone(), (mag_min, mag_max))?);
        }
        Ok(())
    }

    /// Render into the persistent container node.
    ///
    /// Entries without coordinates, and zero-length vectors, are skipped.
    pub fn render(&mut self, scene: &mut SceneNode, data: &Dataset) -> Result<()> {
        let summary = summarize(data)?;

        let vector_fn = Arc::clone(&self.vector_fn);
        let placeable: Vec<(&Entry, [f64; 3], f64)> = data
            .series()
            .iter()
            .flat_map(|s| s.values.iter())
            .filter(|e| e.has_coordinates())
            .map(|e| {
                let v = vector_fn(e);
                let magnitude = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
                (e, v, magnitude)
            })
            .filter(|(_, _, magnitude)| *magnitude > 0.0)
            .collect();

        let magnitudes: Vec<f64> = placeable.iter().map(|(_, _, m)| *m).collect();
        if magnitudes.is_empty() {
            return Err(Error::EmptyData);
        }
        self.derive_scales(&summary, &magnitudes)?;

        let x_scale = self.x_scale.ok_or_else(missing_scale)?;
        let y_scale = self.y_scale.ok_or_else(missing_scale)?;
        let z_scale = self.z_scale.ok_or_else(missing_scale)?;
        let size_scale = self.size_scale.ok_or_else(missing_scale)?;
        let color_scale = self.color_scale.as_ref().ok_or_else(missing_scale)?;

        let stats = reconcile(
            scene,
            &placeable,
            |(e, _, _)| e.key.as_str(),
            |_| Ok(arrow_skeleton()),
            |_, _| Ok(()),
        )?;

        for (entry, vector, magnitude) in &placeable {
            let (Some(x), Some(y), Some(z)) = (entry.x, entry.y, entry.z) else {
                continue;
            };
            let length = size_scale.scale(*magnitude);
            let color = color_scale.scale(*magnitude);

            let arrow = scene.child_by_key_mut(&entry.key).ok_or_else(|| {
                Error::Rendering(format!("missing arrow node for '{}'", entry.key))
            })?;
            arrow.set_attr(
                "translation",
                vec3_string(x_scale.scale(x), y_scale.scale(y), z_scale.scale(z)),
            );
            if let Some(rotation) = rotation_from_y(*vector, *magnitude) {
                arrow.set_attr("rotation", rotation);
            }

            if let Some(shaft) = arrow.find_kind_mut(NodeKind::Cylinder) {
                shaft.set_attr("height", fmt_num(length));
                shaft.set_attr("radius", "0.1");
            }
            if let Some(head) = arrow.find_kind_mut(NodeKind::Cone) {
                head.set_attr("height", "1");
                head.set_attr("bottomRadius", "0.4");
            }
            if let Some(material) = arrow.find_kind_mut(NodeKind::Material) {
                material.set_attr("diffuseColor", color.to_vertex_triplet());
            }
        }

        if self.debug {
            debug!(
                "vector field render: {} arrows, {stats:?}, nodes {}",
                placeable.len(),
                scene.node_count()
            );
        }

        Ok(())
    }
}

/// Axis-angle rotation taking the +y-aligned arrow onto the vector
/// direction. `None` when the vector already points along +y.
fn rotation_from_y(v: [f64; 3], magnitude: f64) -> Option<String> {
    let d = [v[0] / magnitude, v[1] / magnitude, v[2] / magnitude];
    let dot = d[1]; // ŷ · d̂
    if (dot - 1.0).abs() < 1e-12 {
        return None;
    }
    if (dot + 1.0).abs() < 1e-12 {
        // Antiparallel: any perpendicular axis works.
        return Some(format!("1 0 0 {}", fmt_num(std::f64::consts::PI)));
    }

    // axis = ŷ × d̂
    let axis = [d[2], 0.0, -d[0]];
    let norm = (axis[0] * axis[0] + axis[2] * axis[2]).sqrt();
    let angle = dot.clamp(-1.0, 1.0).acos();
    Some(format!(
        "{} {} {} {}",
        fmt_num(axis[0] / norm),
        fmt_num(axis[1]),
        fmt_num(axis[2] / norm),
        fmt_num(angle)
    ))
}

fn arrow_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::Transform)
        .with_child(
            SceneNode::new(NodeKind::Shape)
                .with_child(
                    SceneNode::new(NodeKind::Appearance)
                        .with_child(SceneNode::new(NodeKind::Material)),
                )
                .with_child(SceneNode::new(NodeKind::Cylinder)),
        )
        .with_child(SceneNode::new(NodeKind::Shape).with_child(SceneNode::new(NodeKind::Cone)))
}

fn missing_scale() -> Error {
    Error::Rendering("scale derivation left a scale unset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Series;

    fn field() -> Dataset {
        Dataset::single(Series::new(
            "Field",
            vec![
                Entry::new("p1", 1.0).at(0.0, 0.0, 0.0),
                Entry::new("p2", 4.0).at(10.0, 10.0, 10.0),
            ],
        ))
    }

    #[test]
    fn test_arrows_placed_and_sized() {
        let mut chart = VectorField::new().size_domain(1.0, 3.0);
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &field()).unwrap();

        assert_eq!(scene.child_keys(), vec!["p1", "p2"]);
        let p1 = scene.child_by_key("p1").unwrap();
        let p2 = scene.child_by_key("p2").unwrap();

        // Default vector function: magnitude = value, so p1 gets the minimum
        // length and p2 the maximum.
        let shaft1 = p1.find_kind(NodeKind::Cylinder).unwrap().attr("height").unwrap();
        let shaft2 = p2.find_kind(NodeKind::Cylinder).unwrap().attr("height").unwrap();
        assert_eq!(shaft1, "1");
        assert_eq!(shaft2, "3");
    }

    #[test]
    fn test_default_vector_points_up() {
        let mut chart = VectorField::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &field()).unwrap();
        // +y vectors need no rotation attribute.
        assert_eq!(scene.child_by_key("p1").unwrap().attr("rotation"), None);
    }

    #[test]
    fn test_custom_vector_fn_rotates() {
        let mut chart = VectorField::new()
            .vector_fn(Arc::new(|_| [1.0, 0.0, 0.0]));
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &field()).unwrap();

        let rotation = scene.child_by_key("p1").unwrap().attr("rotation").unwrap();
        // +x direction: axis ŷ×x̂ = -ẑ, angle π/2.
        let parts: Vec<&str> = rotation.split(' ').collect();
        assert_eq!(parts[0], "0");
        assert_eq!(parts[2], "-1");
        let angle: f64 = parts[3].parse().unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_entries_without_coordinates_skipped() {
        let data = Dataset::single(Series::new(
            "Field",
            vec![Entry::new("placed", 2.0).at(1.0, 1.0, 1.0), Entry::new("bare", 5.0)],
        ));
        let mut chart = VectorField::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &data).unwrap();
        assert_eq!(scene.child_keys(), vec!["placed"]);
    }

    #[test]
    fn test_all_zero_vectors_rejected() {
        let data = Dataset::single(Series::new(
            "Field",
            vec![Entry::new("p", 5.0).at(0.0, 0.0, 0.0)],
        ));
        let mut chart = VectorField::new().vector_fn(Arc::new(|_| [0.0, 0.0, 0.0]));
        let mut scene = SceneNode::new(NodeKind::Group);
        assert!(matches!(chart.render(&mut scene, &data), Err(Error::EmptyData)));
    }

    #[test]
    fn test_re_render_is_idempotent() {
        let mut chart = VectorField::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene, &field()).unwrap();
        let first = scene.clone();
        chart.render(&mut scene, &field()).unwrap();
        assert_eq!(scene, first);
    }
}
