//! Color types for scene-graph materials and per-vertex color lists.
//!
//! Provides an RGBA color representation with linear interpolation and the
//! normalized "r g b" triplet serialization used by material and color-list
//! attributes, where each channel maps from [0, 255] into [0.0, 1.0].

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t) as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t) as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t) as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t) as u8,
        )
    }

    /// Serialize as a normalized space-separated "r g b" triplet.
    ///
    /// Each channel is mapped from [0, 255] into [0.0, 1.0] by rounding
    /// `channel / 2.55` to a whole percent and dividing by 100, so the
    /// normalized value carries two significant digits.
    #[must_use]
    pub fn to_vertex_triplet(self) -> String {
        format!(
            "{} {} {}",
            normalize_channel(self.r),
            normalize_channel(self.g),
            normalize_channel(self.b)
        )
    }
}

fn normalize_channel(c: u8) -> f64 {
    (f64::from(c) / 2.55).round() / 100.0
}

/// Default categorical palette, index-matched to domain position.
#[must_use]
pub fn category_palette() -> Vec<Rgba> {
    vec![
        Rgba::rgb(255, 165, 0),  // orange
        Rgba::rgb(255, 0, 0),    // red
        Rgba::rgb(255, 255, 0),  // yellow
        Rgba::rgb(0, 128, 0),    // green
        Rgba::rgb(0, 255, 255),  // cyan
        Rgba::rgb(0, 0, 255),    // blue
        Rgba::rgb(128, 0, 128),  // purple
        Rgba::rgb(255, 192, 203),// pink
        Rgba::rgb(165, 42, 42),  // brown
        Rgba::rgb(128, 128, 128),// gray
    ]
}

/// Default sequential ramp for scalar-valued surfaces (viridis stops).
#[must_use]
pub fn sequential_ramp() -> Vec<Rgba> {
    vec![
        Rgba::rgb(68, 1, 84),
        Rgba::rgb(59, 82, 139),
        Rgba::rgb(33, 145, 140),
        Rgba::rgb(94, 201, 98),
        Rgba::rgb(253, 231, 37),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_constructor() {
        let c = Rgba::rgb(10, 20, 30);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert!(mid.r > 100 && mid.r < 150);
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, -1.0), Rgba::BLACK);
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 2.0), Rgba::WHITE);
    }

    #[test]
    fn test_vertex_triplet_extremes() {
        assert_eq!(Rgba::WHITE.to_vertex_triplet(), "1 1 1");
        assert_eq!(Rgba::BLACK.to_vertex_triplet(), "0 0 0");
    }

    #[test]
    fn test_vertex_triplet_rounding() {
        // 127 / 2.55 = 49.8 -> 50 -> 0.5
        assert_eq!(Rgba::rgb(127, 127, 127).to_vertex_triplet(), "0.5 0.5 0.5");
        // 128 / 2.55 = 50.19 -> 50 -> 0.5
        assert_eq!(Rgba::rgb(128, 0, 0).to_vertex_triplet(), "0.5 0 0");
    }

    #[test]
    fn test_palettes_nonempty() {
        assert!(!category_palette().is_empty());
        assert!(!sequential_ramp().is_empty());
    }
}
