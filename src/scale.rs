//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to visual properties (position, color, size).
//! Charts derive defaults from a [`crate::summary::DataSummary`] and their
//! configured 3D extent; a caller-supplied scale is never overwritten, so
//! derivation must be idempotent and side-effect-free.

use log::warn;

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;
}

/// Linear scale for continuous-to-continuous mapping.
///
/// A zero-span domain is a legitimate degenerate case (all-equal data): it
/// logs a warning and maps every input to the start of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        if (domain.1 - domain.0).abs() < f64::EPSILON {
            warn!("linear scale has a zero-span domain ({}, {})", domain.0, domain.1);
        }

        Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        }
    }

    /// Get the domain extent.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    /// Get the range extent.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let span = self.range_max - self.range_min;
        if span.abs() < f64::EPSILON {
            return self.domain_min;
        }
        let t = (value - self.range_min) / span;
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Generate approximately `count` round-valued ticks covering the domain.
    ///
    /// Steps are powers of ten times 1, 2, or 5.
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain_min <= self.domain_max {
            (self.domain_min, self.domain_max)
        } else {
            (self.domain_max, self.domain_min)
        };

        let step = tick_step(start, stop, count.max(1));
        if step <= 0.0 || !step.is_finite() {
            return vec![start];
        }

        let first = (start / step).ceil();
        let last = (stop / step).floor();
        let mut ticks = Vec::new();
        let mut i = first;
        while i <= last {
            ticks.push(i * step);
            i += 1.0;
        }
        ticks
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let span = self.domain_max - self.domain_min;
        if span.abs() < f64::EPSILON {
            return self.range_min;
        }
        let t = (value - self.domain_min) / span;
        self.range_min + t * (self.range_max - self.range_min)
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = stop - start;
    if span <= 0.0 {
        return 0.0;
    }

    let raw = span / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;

    // Snap to 1/2/5 at the geometric midpoints (sqrt(50), sqrt(10), sqrt(2)).
    magnitude
        * if residual >= 7.071 {
            10.0
        } else if residual >= 3.162 {
            5.0
        } else if residual >= 1.414 {
            2.0
        } else {
            1.0
        }
}

/// Band scale: ordered categorical domain, each value occupying a width.
///
/// `step = span / (n + padding)`, `bandwidth = step * (1 - padding)`, and
/// position `i` starts at `range.0 + step * (padding + i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    /// Create a new band scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::ScaleDomain("band scale requires a non-empty domain".to_string()));
        }
        Ok(Self { domain, range, padding: padding.clamp(0.0, 1.0) })
    }

    /// The ordered categorical domain.
    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// The numeric range.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Distance between consecutive band starts.
    #[must_use]
    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        (self.range.1 - self.range.0) / (n + self.padding)
    }

    /// Width occupied by each band.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Position of a domain value's band start, or `None` for unknown keys.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        let step = self.step();
        Some(self.range.0 + step * (self.padding + index as f64))
    }
}

/// Point scale: ordered categorical domain, each value occupying a single
/// point.
///
/// `step = span / max(1, n - 1 + 2 * padding)`, position `i` at
/// `range.0 + step * (padding + i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl PointScale {
    /// Create a new point scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::ScaleDomain("point scale requires a non-empty domain".to_string()));
        }
        Ok(Self { domain, range, padding: padding.max(0.0) })
    }

    /// The ordered categorical domain.
    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Distance between consecutive points.
    #[must_use]
    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let divisions = (n - 1.0 + 2.0 * self.padding).max(1.0);
        (self.range.1 - self.range.0) / divisions
    }

    /// Position of a domain value, or `None` for unknown keys.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        Some(self.range.0 + self.step() * (self.padding + index as f64))
    }
}

/// Ordinal scale mapping categorical keys to palette entries, index-matched
/// by domain position and wrapping modulo palette length.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale {
    domain: Vec<String>,
    palette: Vec<Rgba>,
}

impl OrdinalScale {
    /// Create a new ordinal color scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the palette is empty.
    pub fn new(domain: Vec<String>, palette: Vec<Rgba>) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::ScaleDomain(
                "ordinal scale requires at least one palette color".to_string(),
            ));
        }
        Ok(Self { domain, palette })
    }

    /// The categorical domain.
    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Color for a key. Unknown keys fall back to the first palette entry.
    #[must_use]
    pub fn color(&self, key: &str) -> Rgba {
        match self.domain.iter().position(|k| k == key) {
            Some(index) => self.palette[index % self.palette.len()],
            None => self.palette[0],
        }
    }
}

/// Sequential scale interpolating a color ramp over a numeric domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialScale {
    colors: Vec<Rgba>,
    domain_min: f64,
    domain_max: f64,
}

impl SequentialScale {
    /// Create a new sequential color scale.
    ///
    /// A zero-span domain degenerates to the first ramp color.
    ///
    /// # Errors
    ///
    /// Returns an error if the ramp is empty.
    pub fn new(colors: Vec<Rgba>, domain: (f64, f64)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain(
                "sequential scale requires at least one color".to_string(),
            ));
        }
        if (domain.1 - domain.0).abs() < f64::EPSILON {
            warn!("sequential scale has a zero-span domain ({}, {})", domain.0, domain.1);
        }
        Ok(Self { colors, domain_min: domain.0, domain_max: domain.1 })
    }

    /// The numeric domain.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }
}

impl Scale<f64, Rgba> for SequentialScale {
    fn scale(&self, value: f64) -> Rgba {
        let span = self.domain_max - self.domain_min;
        if span.abs() < f64::EPSILON || self.colors.len() == 1 {
            return self.colors[0];
        }

        let t = ((value - self.domain_min) / span).clamp(0.0, 1.0);
        let segment_count = self.colors.len() - 1;
        let segment = ((t * segment_count as f64).floor() as usize).min(segment_count - 1);
        let local_t = t * segment_count as f64 - segment as f64;

        self.colors[segment].lerp(self.colors[segment + 1], local_t as f32)
    }
}
