//! Volume slice rendering from a pre-baked slice atlas texture.
//!
//! Unlike the data-driven charts this builder carries no dataset: the
//! volume is described entirely by configuration — a texture atlas URL and
//! the slice layout inside it. Rendering places a single keyed volume node
//! so repeated renders update the existing node in place.
//!
//! Consumed options: `image_url`, `number_of_slices`, `slices_over_x`,
//! `slices_over_y`, `dimensions`, `debug`.

use log::debug;

use crate::charts::Dimensions;
use crate::encode::vec3_string;
use crate::error::{Error, Result};
use crate::event::{EventHandler, EventHandlers, EventKind, NodeEvent};
use crate::reconcile::reconcile;
use crate::scene::{NodeKind, SceneNode};

/// Builder for atlas-backed volume rendering.
#[derive(Debug, Clone)]
pub struct VolumeSlice {
    image_url: Option<String>,
    number_of_slices: u32,
    slices_over_x: u32,
    slices_over_y: u32,
    dimensions: Dimensions,
    debug: bool,
    events: EventHandlers,
}

impl Default for VolumeSlice {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeSlice {
    /// Create a new volume slice builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image_url: None,
            number_of_slices: 96,
            slices_over_x: 8,
            slices_over_y: 12,
            dimensions: Dimensions::default(),
            debug: false,
            events: EventHandlers::new(),
        }
    }

    /// Set the slice atlas texture URL. Required.
    #[must_use]
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the total number of slices baked into the atlas.
    #[must_use]
    pub fn number_of_slices(mut self, count: u32) -> Self {
        self.number_of_slices = count;
        self
    }

    /// Set how many slices the atlas packs per row.
    #[must_use]
    pub fn slices_over_x(mut self, count: u32) -> Self {
        self.slices_over_x = count;
        self
    }

    /// Set how many slice rows the atlas holds.
    #[must_use]
    pub fn slices_over_y(mut self, count: u32) -> Self {
        self.slices_over_y = count;
        self
    }

    /// Set the logical 3D extent of the volume.
    #[must_use]
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
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

    /// Render into the persistent container node.
    ///
    /// Fails if no atlas URL was supplied.
    pub fn render(&mut self, scene: &mut SceneNode) -> Result<()> {
        let url = self
            .image_url
            .clone()
            .ok_or_else(|| Error::Rendering("volume rendering needs an image_url".to_string()))?;

        let items = ["volume"];
        let stats = reconcile(
            scene,
            &items,
            |k| *k,
            |_| Ok(volume_skeleton()),
            |_, _| Ok(()),
        )?;

        let node = scene
            .child_by_key_mut("volume")
            .ok_or_else(|| Error::Rendering("missing volume node".to_string()))?;
        node.set_attr(
            "dimensions",
            vec3_string(self.dimensions.x, self.dimensions.y, self.dimensions.z),
        );
        if let Some(texture) = node.find_kind_mut(NodeKind::ImageTexture) {
            texture.set_attr("url", url);
            texture.set_attr("numberOfSlices", self.number_of_slices.to_string());
            texture.set_attr("slicesOverX", self.slices_over_x.to_string());
            texture.set_attr("slicesOverY", self.slices_over_y.to_string());
        }

        if self.debug {
            debug!("volume render: {stats:?}, nodes {}", scene.node_count());
        }

        Ok(())
    }
}

fn volume_skeleton() -> SceneNode {
    SceneNode::new(NodeKind::VolumeData).with_child(SceneNode::new(NodeKind::ImageTexture))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_requires_url() {
        let mut chart = VolumeSlice::new();
        let mut scene = SceneNode::new(NodeKind::Group);
        assert!(matches!(chart.render(&mut scene), Err(Error::Rendering(_))));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_render_places_volume_node() {
        let mut chart = VolumeSlice::new()
            .image_url("brain.png")
            .number_of_slices(64)
            .slices_over_x(8)
            .slices_over_y(8);
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene).unwrap();

        let volume = scene.child_by_key("volume").unwrap();
        assert_eq!(volume.kind(), NodeKind::VolumeData);
        assert_eq!(volume.attr("dimensions"), Some("40 40 40"));

        let texture = volume.find_kind(NodeKind::ImageTexture).unwrap();
        assert_eq!(texture.attr("url"), Some("brain.png"));
        assert_eq!(texture.attr("numberOfSlices"), Some("64"));
        assert_eq!(texture.attr("slicesOverX"), Some("8"));
        assert_eq!(texture.attr("slicesOverY"), Some("8"));
    }

    #[test]
    fn test_re_render_updates_in_place() {
        let mut chart = VolumeSlice::new().image_url("a.png");
        let mut scene = SceneNode::new(NodeKind::Group);
        chart.render(&mut scene).unwrap();
        scene.child_by_key_mut("volume").unwrap().set_attr("marker", "kept");

        chart = chart.image_url("b.png");
        chart.render(&mut scene).unwrap();

        let volume = scene.child_by_key("volume").unwrap();
        assert_eq!(volume.attr("marker"), Some("kept"));
        assert_eq!(
            volume.find_kind(NodeKind::ImageTexture).unwrap().attr("url"),
            Some("b.png")
        );
        assert_eq!(scene.children().len(), 1);
    }
}
