//! Input data model: entries, series, and the tagged dataset variant.
//!
//! The external interface accepts two shapes: a single named series, or an
//! ordered sequence of named series. Both are normalized at the boundary into
//! the explicit [`Dataset`] sum type so downstream logic matches on the tag
//! instead of probing field presence.

use crate::error::{Error, Result};

/// A single labeled scalar within a series, optionally carrying 3D
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Entry {
    /// Category label, also the stable identity used for scene-node matching.
    pub key: String,
    /// Scalar value.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "de_number"))]
    pub value: f64,
    /// Optional x coordinate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub x: Option<f64>,
    /// Optional y coordinate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: Option<f64>,
    /// Optional z coordinate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: Option<f64>,
}

impl Entry {
    /// Create an entry without coordinates.
    #[must_use]
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self { key: key.into(), value, x: None, y: None, z: None }
    }

    /// Attach 3D coordinates to the entry.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.z = Some(z);
        self
    }

    /// Whether the entry carries all three spatial coordinates.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.z.is_some()
    }
}

/// A named ordered collection of entries sharing one category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Series {
    /// Series name, the row identity in multi-series data.
    pub key: String,
    /// Ordered entries.
    pub values: Vec<Entry>,
}

impl Series {
    /// Create a series from a key and entries.
    #[must_use]
    pub fn new(key: impl Into<String>, values: Vec<Entry>) -> Self {
        Self { key: key.into(), values }
    }
}

/// Input data, tagged by shape.
///
/// Constructed at the input boundary via [`Dataset::single`] /
/// [`Dataset::multi`], or deserialized from either external JSON shape when
/// the `serde` feature is enabled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Dataset {
    /// One named series of entries.
    Single(Series),
    /// An ordered sequence of named series.
    Multi(Vec<Series>),
}

impl Dataset {
    /// Wrap a single series.
    #[must_use]
    pub fn single(series: Series) -> Self {
        Dataset::Single(series)
    }

    /// Wrap a sequence of series.
    #[must_use]
    pub fn multi(series: Vec<Series>) -> Self {
        Dataset::Multi(series)
    }

    /// Whether this is the multi-series shape.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Dataset::Multi(_))
    }

    /// View the contained series uniformly, regardless of shape.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        match self {
            Dataset::Single(s) => std::slice::from_ref(s),
            Dataset::Multi(list) => list,
        }
    }

    /// Validate the dataset shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] when no entries exist at all, and
    /// [`Error::InvalidDataShape`] for empty keys or non-finite values.
    pub fn validate(&self) -> Result<()> {
        let series = self.series();
        if series.iter().all(|s| s.values.is_empty()) {
            return Err(Error::EmptyData);
        }

        for s in series {
            if s.key.is_empty() {
                return Err(Error::InvalidDataShape("series key is empty".to_string()));
            }
            for entry in &s.values {
                if entry.key.is_empty() {
                    return Err(Error::InvalidDataShape(format!(
                        "entry in series '{}' has an empty key",
                        s.key
                    )));
                }
                if !entry.value.is_finite() {
                    return Err(Error::InvalidDataShape(format!(
                        "entry '{}' in series '{}' has a non-finite value",
                        entry.key, s.key
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Accept both native numbers and stringified numbers for entry values.
#[cfg(feature = "serde")]
fn de_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.parse::<f64>().map_err(serde::de::Error::custom),
    }
}
