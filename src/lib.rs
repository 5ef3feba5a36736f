//! # viz3d
//!
//! Declarative 3D statistical charts over a retained scene graph.
//!
//! viz3d turns tabular data — single series or aligned multi-series — into
//! 3D scene trees: bar fields, bubble clouds, surfaces, ribbons, vector
//! fields, labeled axes, and atlas-backed volumes. Charts are configured
//! through chained builders and render by *reconciling* a persistent
//! container node: nodes for new data keys enter, surviving keys update in
//! place (preserving node identity and any state hung off it), and departed
//! keys exit.
//!
//! ## Quick Start
//!
//! ```rust
//! use viz3d::prelude::*;
//!
//! let data = Dataset::single(Series::new(
//!     "Sales",
//!     vec![Entry::new("Q1", 10.0), Entry::new("Q2", 20.0)],
//! ));
//!
//! let mut scene = SceneNode::new(NodeKind::Group);
//! BarChart::new().render(&mut scene, &data)?;
//! # Ok::<(), viz3d::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialize/Deserialize implementations for the data model

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types, palettes, and vertex color encoding.
pub mod color;

/// Input data model: entries, series, datasets.
pub mod data;

/// Dataset summarization (totals, extents, decimal precision).
pub mod summary;

/// Scale functions for data-to-scene mappings.
pub mod scale;

// ============================================================================
// Scene Modules
// ============================================================================

/// Retained scene graph nodes.
pub mod scene;

/// Keyed enter/update/exit reconciliation.
pub mod reconcile;

/// Geometry and attribute string encoding.
pub mod encode;

/// Semantic node events and handler registration.
pub mod event;

// ============================================================================
// Chart Modules
// ============================================================================

/// Chart and component builders.
pub mod charts;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for viz3d operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use viz3d::prelude::*;
/// ```
pub mod prelude {
    pub use crate::charts::{
        Axis, AxisScale, BarChart, BubbleChart, Dimensions, Direction, RibbonChart, SurfacePlot,
        TickFormatter, VectorField, VectorFn, VolumeSlice,
    };
    pub use crate::color::Rgba;
    pub use crate::data::{Dataset, Entry, Series};
    pub use crate::error::{Error, Result};
    pub use crate::event::{EventKind, NodeEvent};
    pub use crate::reconcile::{reconcile, ReconcileStats};
    pub use crate::scale::{BandScale, LinearScale, OrdinalScale, PointScale, Scale, SequentialScale};
    pub use crate::scene::{NodeKind, SceneNode};
    pub use crate::summary::{summarize, DataSummary};
}
