//! Statistical digest of input data: the data-transform engine.
//!
//! [`summarize`] normalizes both dataset shapes into one [`DataSummary`]
//! (totals, extents, coordinate bounds, decimal precision, threshold bands)
//! that scale derivation and geometry encoding depend on. [`rotate`]
//! transposes a rectangular multi-series matrix.
//!
//! The summary is a transient value object: recomputed on every render pass,
//! never mutated, never cached across calls.

use std::collections::{HashMap, HashSet};

use crate::data::{Dataset, Series};
use crate::error::{Error, Result};

/// Hard ceiling on detected decimal places (formatting-API limit).
const MAX_DECIMAL_PLACES: u32 = 20;

/// Proportional breakpoints for the default threshold bands.
const THRESHOLD_PROPORTIONS: [f64; 4] = [0.15, 0.40, 0.55, 0.90];

/// Shape-independent statistical digest of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataSummary {
    /// Whether the input was the multi-series shape.
    pub multi_series: bool,
    /// Series names, order-preserving (one element for single-series input).
    pub row_keys: Vec<String>,
    /// Per-series value sums, keyed by series name.
    pub row_totals: HashMap<String, f64>,
    /// Largest per-series sum.
    pub row_totals_max: f64,
    /// Ordered union of entry keys across all series (first-seen order,
    /// duplicates collapsed).
    pub column_keys: Vec<String>,
    /// Per-column value sums across series (empty for single-series input).
    pub column_totals: HashMap<String, f64>,
    /// Largest per-column sum (0 for single-series input).
    pub column_totals_max: f64,
    /// Smallest entry value.
    pub value_min: f64,
    /// Largest entry value.
    pub value_max: f64,
    /// `[value_min, value_max]`.
    pub value_extent: [f64; 2],
    /// Per-axis (x, y, z) coordinate minima over entries carrying that axis.
    pub coordinates_min: [Option<f64>; 3],
    /// Per-axis (x, y, z) coordinate maxima over entries carrying that axis.
    pub coordinates_max: [Option<f64>; 3],
    /// Per-axis `[min, max]` coordinate extents.
    pub coordinates_extent: [Option<[f64; 2]>; 3],
    /// Maximum count of decimal digits across values (multi-series only,
    /// capped at 20).
    pub max_decimal_place: u32,
    /// Four evenly-spaced breakpoints within the value extent, rounded to
    /// `max_decimal_place`.
    pub thresholds: [f64; 4],
}

impl DataSummary {
    /// The single series name (first row key).
    #[must_use]
    pub fn row_key(&self) -> &str {
        self.row_keys.first().map_or("", String::as_str)
    }

    /// The single series total (first row total).
    #[must_use]
    pub fn row_total(&self) -> f64 {
        self.row_totals.get(self.row_key()).copied().unwrap_or(0.0)
    }

    /// Coordinate maximum for an axis (0 = x, 1 = y, 2 = z), defaulting to 0.
    #[must_use]
    pub fn coordinate_max(&self, axis: usize) -> f64 {
        self.coordinates_max.get(axis).copied().flatten().unwrap_or(0.0)
    }

    /// Coordinate minimum for an axis (0 = x, 1 = y, 2 = z), defaulting to 0.
    #[must_use]
    pub fn coordinate_min(&self, axis: usize) -> f64 {
        self.coordinates_min.get(axis).copied().flatten().unwrap_or(0.0)
    }
}

/// Compute a [`DataSummary`] from either dataset shape.
///
/// The input is never mutated, and repeated calls on the same input yield
/// deep-equal summaries. Entries missing coordinates simply leave the
/// corresponding axis extrema unset.
///
/// # Errors
///
/// Fails fast with [`Error::InvalidDataShape`] or [`Error::EmptyData`] on
/// malformed input rather than propagating `NaN` into geometry.
pub fn summarize(data: &Dataset) -> Result<DataSummary> {
    data.validate()?;

    let series = data.series();
    let multi_series = data.is_multi();

    let mut row_keys = Vec::with_capacity(series.len());
    let mut row_totals = HashMap::with_capacity(series.len());
    let mut column_keys = Vec::new();
    let mut seen_columns = HashSet::new();
    let mut column_totals: HashMap<String, f64> = HashMap::new();

    let mut value_min = f64::INFINITY;
    let mut value_max = f64::NEG_INFINITY;
    let mut coordinates_min: [Option<f64>; 3] = [None; 3];
    let mut coordinates_max: [Option<f64>; 3] = [None; 3];
    let mut max_decimal_place = 0u32;

    for s in series {
        row_keys.push(s.key.clone());
        let mut total = 0.0;

        for entry in &s.values {
            total += entry.value;
            value_min = value_min.min(entry.value);
            value_max = value_max.max(entry.value);

            if seen_columns.insert(entry.key.clone()) {
                column_keys.push(entry.key.clone());
            }

            if multi_series {
                *column_totals.entry(entry.key.clone()).or_insert(0.0) += entry.value;
                max_decimal_place =
                    max_decimal_place.max(decimal_places(entry.value)).min(MAX_DECIMAL_PLACES);
            }

            for (axis, coord) in [entry.x, entry.y, entry.z].into_iter().enumerate() {
                if let Some(c) = coord {
                    coordinates_min[axis] =
                        Some(coordinates_min[axis].map_or(c, |prev| prev.min(c)));
                    coordinates_max[axis] =
                        Some(coordinates_max[axis].map_or(c, |prev| prev.max(c)));
                }
            }
        }

        row_totals.insert(s.key.clone(), total);
    }

    let row_totals_max = row_totals.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let column_totals_max = column_totals
        .values()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let column_totals_max = if column_totals.is_empty() { 0.0 } else { column_totals_max };

    let thresholds = compute_thresholds(value_min, value_max, max_decimal_place);

    let coordinates_extent = [0, 1, 2].map(|axis| {
        match (coordinates_min[axis], coordinates_max[axis]) {
            (Some(min), Some(max)) => Some([min, max]),
            _ => None,
        }
    });

    Ok(DataSummary {
        multi_series,
        row_keys,
        row_totals,
        row_totals_max,
        column_keys,
        column_totals,
        column_totals_max,
        value_min,
        value_max,
        value_extent: [value_min, value_max],
        coordinates_min,
        coordinates_max,
        coordinates_extent,
        max_decimal_place,
        thresholds,
    })
}

/// Transpose a rectangular multi-series matrix.
///
/// For input `series[i].values[j]`, the output holds `out[j].values[i]`: a
/// shallow copy of the original entry with its `key` overwritten by the
/// original series (row) key. Each output series takes its key from the
/// corresponding column of the first input series. On a well-formed square
/// matrix the operation is its own inverse.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] for empty input and
/// [`Error::InvalidDataShape`] when series value arrays have unequal lengths
/// (ragged matrices are rejected, not padded).
pub fn rotate(series: &[Series]) -> Result<Vec<Series>> {
    let first = series.first().ok_or(Error::EmptyData)?;
    let columns = first.values.len();
    if columns == 0 {
        return Err(Error::EmptyData);
    }

    for (i, s) in series.iter().enumerate() {
        if s.values.len() != columns {
            return Err(Error::InvalidDataShape(format!(
                "series '{}' (index {}) has {} values, expected {}",
                s.key,
                i,
                s.values.len(),
                columns
            )));
        }
    }

    let rotated = (0..columns)
        .map(|j| Series {
            key: first.values[j].key.clone(),
            values: series
                .iter()
                .map(|row| {
                    let mut entry = row.values[j].clone();
                    entry.key = row.key.clone();
                    entry
                })
                .collect(),
        })
        .collect();

    Ok(rotated)
}

/// Count the decimal digits of a value's shortest display form, adjusting
/// for a scientific-notation exponent when one appears.
fn decimal_places(value: f64) -> u32 {
    let text = format!("{value}");

    if let Some(pos) = text.find(['e', 'E']) {
        let (mantissa, exponent) = text.split_at(pos);
        let exponent: i32 = exponent[1..].parse().unwrap_or(0);
        let fraction = mantissa.split('.').nth(1).map_or(0, str::len) as i32;
        return (fraction - exponent).clamp(0, MAX_DECIMAL_PLACES as i32) as u32;
    }

    (text.split('.').nth(1).map_or(0, str::len) as u32).min(MAX_DECIMAL_PLACES)
}

fn compute_thresholds(min: f64, max: f64, decimal_place: u32) -> [f64; 4] {
    let span = max - min;
    let factor = 10f64.powi(decimal_place as i32);
    THRESHOLD_PROPORTIONS.map(|p| ((min + span * p) * factor).round() / factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Entry};
    use approx::assert_relative_eq;

    fn fruit() -> Dataset {
        Dataset::single(Series::new(
            "Fruit",
            vec![Entry::new("Apples", 4.0), Entry::new("Oranges", 2.0)],
        ))
    }

    fn matrix() -> Dataset {
        Dataset::multi(vec![
            Series::new("A", vec![Entry::new("x", 1.0), Entry::new("y", 3.0)]),
            Series::new("B", vec![Entry::new("x", 5.0), Entry::new("y", 0.0)]),
        ])
    }

    #[test]
    fn test_single_series_summary() {
        let summary = summarize(&fruit()).unwrap();
        assert_eq!(summary.row_key(), "Fruit");
        assert_relative_eq!(summary.row_total(), 6.0);
        assert_relative_eq!(summary.value_min, 2.0);
        assert_relative_eq!(summary.value_max, 4.0);
        assert_eq!(summary.column_keys, vec!["Apples", "Oranges"]);
        assert!(summary.column_totals.is_empty());
        assert!(!summary.multi_series);
    }

    #[test]
    fn test_multi_series_summary() {
        let summary = summarize(&matrix()).unwrap();
        assert_eq!(summary.row_keys, vec!["A", "B"]);
        assert_relative_eq!(summary.row_totals["A"], 4.0);
        assert_relative_eq!(summary.row_totals["B"], 5.0);
        assert_relative_eq!(summary.row_totals_max, 5.0);
        assert_relative_eq!(summary.column_totals["x"], 6.0);
        assert_relative_eq!(summary.column_totals["y"], 3.0);
        assert_relative_eq!(summary.column_totals_max, 6.0);
        assert_eq!(summary.column_keys, vec!["x", "y"]);
    }

    #[test]
    fn test_column_union_preserves_first_seen_order() {
        let data = Dataset::multi(vec![
            Series::new("A", vec![Entry::new("b", 1.0), Entry::new("a", 2.0)]),
            Series::new("B", vec![Entry::new("a", 3.0), Entry::new("c", 4.0)]),
        ]);
        let summary = summarize(&data).unwrap();
        assert_eq!(summary.column_keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_summary_idempotent() {
        let data = matrix();
        assert_eq!(summarize(&data).unwrap(), summarize(&data).unwrap());
    }

    #[test]
    fn test_coordinate_extents() {
        let data = Dataset::single(Series::new(
            "Points",
            vec![
                Entry::new("p1", 1.0).at(1.0, 2.0, 3.0),
                Entry::new("p2", 2.0).at(-4.0, 5.0, 0.0),
                Entry::new("p3", 3.0), // no coordinates
            ],
        ));
        let summary = summarize(&data).unwrap();
        assert_eq!(summary.coordinates_min, [Some(-4.0), Some(2.0), Some(0.0)]);
        assert_eq!(summary.coordinates_max, [Some(1.0), Some(5.0), Some(3.0)]);
        assert_eq!(summary.coordinates_extent[0], Some([-4.0, 1.0]));
    }

    #[test]
    fn test_coordinate_extents_absent() {
        let summary = summarize(&fruit()).unwrap();
        assert_eq!(summary.coordinates_min, [None; 3]);
        assert_eq!(summary.coordinates_extent, [None; 3]);
        assert_relative_eq!(summary.coordinate_max(0), 0.0);
    }

    #[test]
    fn test_value_extent_ordered() {
        let summary = summarize(&matrix()).unwrap();
        assert!(summary.value_extent[0] <= summary.value_extent[1]);
    }

    #[test]
    fn test_thresholds_monotone_and_bounded() {
        let summary = summarize(&matrix()).unwrap();
        let t = summary.thresholds;
        assert!(t[0] <= t[1] && t[1] <= t[2] && t[2] <= t[3]);
        assert!(t[0] >= summary.value_min && t[3] <= summary.value_max);
    }

    #[test]
    fn test_thresholds_rounded_to_decimal_place() {
        let data = Dataset::multi(vec![Series::new(
            "A",
            vec![Entry::new("x", 0.0), Entry::new("y", 10.0)],
        )]);
        let summary = summarize(&data).unwrap();
        assert_eq!(summary.max_decimal_place, 0);
        // 0.15/0.40/0.55/0.90 of [0, 10], integer rounded.
        assert_eq!(summary.thresholds, [2.0, 4.0, 6.0, 9.0]);
    }

    #[test]
    fn test_max_decimal_place_detection() {
        let data = Dataset::multi(vec![Series::new(
            "A",
            vec![Entry::new("x", 1.25), Entry::new("y", 3.5)],
        )]);
        let summary = summarize(&data).unwrap();
        assert_eq!(summary.max_decimal_place, 2);
    }

    #[test]
    fn test_decimal_places_plain() {
        assert_eq!(decimal_places(3.0), 0);
        assert_eq!(decimal_places(0.5), 1);
        assert_eq!(decimal_places(1.25), 2);
        assert_eq!(decimal_places(-1.125), 3);
    }

    #[test]
    fn test_decimal_places_capped() {
        // Display prints long fractions for tiny magnitudes; the count is
        // capped at the formatting ceiling.
        assert!(decimal_places(1e-30) <= 20);
    }

    #[test]
    fn test_summarize_rejects_nan() {
        let data = Dataset::single(Series::new("S", vec![Entry::new("x", f64::NAN)]));
        assert!(summarize(&data).is_err());
    }

    #[test]
    fn test_rotate_square_matrix() {
        let Dataset::Multi(series) = matrix() else { panic!("expected multi") };
        let rotated = rotate(&series).unwrap();

        assert_eq!(rotated.len(), 2);
        assert_eq!(rotated[0].key, "x");
        assert_eq!(rotated[1].key, "y");
        assert_eq!(rotated[0].values[0].key, "A");
        assert_eq!(rotated[0].values[0].value, 1.0);
        assert_eq!(rotated[0].values[1].key, "B");
        assert_eq!(rotated[0].values[1].value, 5.0);
    }

    #[test]
    fn test_rotate_is_involution() {
        let Dataset::Multi(series) = matrix() else { panic!("expected multi") };
        let twice = rotate(&rotate(&series).unwrap()).unwrap();
        assert_eq!(twice, series);
    }

    #[test]
    fn test_rotate_rejects_ragged() {
        let series = vec![
            Series::new("A", vec![Entry::new("x", 1.0), Entry::new("y", 2.0)]),
            Series::new("B", vec![Entry::new("x", 3.0)]),
        ];
        assert!(matches!(rotate(&series), Err(Error::InvalidDataShape(_))));
    }

    #[test]
    fn test_rotate_rejects_empty() {
        assert!(matches!(rotate(&[]), Err(Error::EmptyData)));
    }

    #[test]
    fn test_rotate_preserves_coordinates() {
        let series = vec![Series::new(
            "A",
            vec![Entry::new("x", 1.0).at(9.0, 8.0, 7.0)],
        )];
        let rotated = rotate(&series).unwrap();
        assert_eq!(rotated[0].values[0].x, Some(9.0));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::data::{Dataset, Entry};
    use proptest::prelude::*;

    fn arb_matrix() -> impl Strategy<Value = Vec<Series>> {
        // Rectangular matrices: 1-4 rows, 1-4 aligned columns.
        (1usize..=4, 1usize..=4).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(
                proptest::collection::vec(-1000.0f64..1000.0, cols..=cols),
                rows..=rows,
            )
            .prop_map(move |values| {
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, row)| {
                        Series::new(
                            format!("row{i}"),
                            row.into_iter()
                                .enumerate()
                                .map(|(j, v)| Entry::new(format!("col{j}"), v))
                                .collect(),
                        )
                    })
                    .collect()
            })
        })
    }

    proptest! {
        #[test]
        fn prop_summary_idempotent(series in arb_matrix()) {
            let data = Dataset::multi(series);
            prop_assert_eq!(summarize(&data).unwrap(), summarize(&data).unwrap());
        }

        #[test]
        fn prop_value_extent_ordered(series in arb_matrix()) {
            let summary = summarize(&Dataset::multi(series)).unwrap();
            prop_assert!(summary.value_extent[0] <= summary.value_extent[1]);
        }

        #[test]
        fn prop_thresholds_monotone(series in arb_matrix()) {
            let t = summarize(&Dataset::multi(series)).unwrap().thresholds;
            prop_assert!(t[0] <= t[1] && t[1] <= t[2] && t[2] <= t[3]);
        }

        #[test]
        fn prop_rotate_involution(series in arb_matrix()) {
            let twice = rotate(&rotate(&series).unwrap()).unwrap();
            prop_assert_eq!(twice, series);
        }

        #[test]
        fn prop_row_totals_match_sums(series in arb_matrix()) {
            let summary = summarize(&Dataset::multi(series.clone())).unwrap();
            for s in &series {
                let sum: f64 = s.values.iter().map(|e| e.value).sum();
                prop_assert!((summary.row_totals[&s.key] - sum).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_column_keys_unique(series in arb_matrix()) {
            let summary = summarize(&Dataset::multi(series)).unwrap();
            let mut sorted = summary.column_keys.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), summary.column_keys.len());
        }
    }
}
