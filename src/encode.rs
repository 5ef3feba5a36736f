//! Geometry payload encoders for extended scene primitives.
//!
//! Scaled data points become flat attribute strings: coordinate point lists,
//! face-index streams terminated by `-1` sentinels, and per-vertex color
//! lists. Grid meshes are emitted double-sided (each quad twice, windings
//! reversed) because the target renderer does not reliably backface-cull in
//! all configurations.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Serialize a number in its shortest display form.
#[must_use]
pub fn fmt_num(value: f64) -> String {
    format!("{value}")
}

/// Serialize an "x y z" vector attribute.
#[must_use]
pub fn vec3_string(x: f64, y: f64, z: f64) -> String {
    format!("{} {} {}", fmt_num(x), fmt_num(y), fmt_num(z))
}

/// Serialize a flat space-separated coordinate stream, one triple per point.
#[must_use]
pub fn point_string(points: &[[f64; 3]]) -> String {
    points
        .iter()
        .map(|p| vec3_string(p[0], p[1], p[2]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize a per-vertex color list aligned with a point list.
#[must_use]
pub fn color_string(colors: &[Rgba]) -> String {
    colors.iter().map(|c| c.to_vertex_triplet()).collect::<Vec<_>>().join(" ")
}

/// Serialize a face-index stream.
#[must_use]
pub fn index_string(indices: &[i64]) -> String {
    indices.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

/// Check that a point grid is rectangular, returning `(rows, cols)`.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] for an empty grid and [`Error::RaggedGrid`]
/// when any row's length differs from the first row's.
pub fn validate_grid(points: &[Vec<[f64; 3]>]) -> Result<(usize, usize)> {
    let first = points.first().ok_or(Error::EmptyData)?;
    let cols = first.len();
    if cols == 0 {
        return Err(Error::EmptyData);
    }

    for (row, row_points) in points.iter().enumerate().skip(1) {
        if row_points.len() != cols {
            return Err(Error::RaggedGrid { row, expected: cols, actual: row_points.len() });
        }
    }

    Ok((points.len(), cols))
}

/// Compute the double-sided face-index stream for a `rows × cols` grid of
/// vertices stored row-major.
///
/// Each quad with origin `s = j * cols + i` is emitted twice as a closed
/// loop: front winding `s, s+cols, s+cols+1, s+1, s, -1`, then (after all
/// front faces) back winding `s, s+1, s+cols+1, s+cols, s, -1` — the reverse
/// order starting from the same origin index.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] when the grid is smaller than 2×2 (no quad
/// can be formed).
pub fn grid_face_indices(rows: usize, cols: usize) -> Result<Vec<i64>> {
    if rows < 2 || cols < 2 {
        return Err(Error::EmptyData);
    }

    let quads = (rows - 1) * (cols - 1);
    let mut indices = Vec::with_capacity(quads * 12);

    for j in 0..rows - 1 {
        for i in 0..cols - 1 {
            let s = (j * cols + i) as i64;
            let nx = cols as i64;
            indices.extend_from_slice(&[s, s + nx, s + nx + 1, s + 1, s, -1]);
        }
    }

    for j in 0..rows - 1 {
        for i in 0..cols - 1 {
            let s = (j * cols + i) as i64;
            let nx = cols as i64;
            indices.extend_from_slice(&[s, s + 1, s + nx + 1, s + nx, s, -1]);
        }
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_shortest_form() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-2.25), "-2.25");
    }

    #[test]
    fn test_vec3_string() {
        assert_eq!(vec3_string(1.0, 2.5, -3.0), "1 2.5 -3");
    }

    #[test]
    fn test_point_string() {
        let points = [[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
        assert_eq!(point_string(&points), "0 0 0 1 2 3");
    }

    #[test]
    fn test_color_string() {
        let colors = [Rgba::WHITE, Rgba::BLACK];
        assert_eq!(color_string(&colors), "1 1 1 0 0 0");
    }

    #[test]
    fn test_index_string() {
        assert_eq!(index_string(&[0, 2, 3, 1, 0, -1]), "0 2 3 1 0 -1");
    }

    #[test]
    fn test_grid_face_indices_2x2() {
        // One quad per face list, each a closed 6-element tuple ending in -1.
        let indices = grid_face_indices(2, 2).unwrap();
        assert_eq!(indices.len(), 12);

        let front = &indices[..6];
        let back = &indices[6..];
        assert_eq!(front, &[0, 2, 3, 1, 0, -1]);
        assert_eq!(back, &[0, 1, 3, 2, 0, -1]);

        // Back winding is the reverse of the front, same origin.
        let mut reversed: Vec<i64> = front[..5].iter().rev().copied().collect();
        reversed.push(-1);
        assert_eq!(back, reversed.as_slice());
    }

    #[test]
    fn test_grid_face_indices_3x3_counts() {
        let indices = grid_face_indices(3, 3).unwrap();
        // 4 quads, two windings each, 6 entries per face.
        assert_eq!(indices.len(), 4 * 2 * 6);
        assert_eq!(indices.iter().filter(|&&i| i == -1).count(), 8);
        // All front faces precede all back faces.
        assert_eq!(&indices[..6], &[0, 3, 4, 1, 0, -1]);
        assert_eq!(&indices[24..30], &[0, 1, 4, 3, 0, -1]);
    }

    #[test]
    fn test_grid_face_indices_too_small() {
        assert!(grid_face_indices(1, 5).is_err());
        assert!(grid_face_indices(5, 1).is_err());
    }

    #[test]
    fn test_validate_grid_rectangular() {
        let grid = vec![vec![[0.0; 3], [1.0; 3]], vec![[2.0; 3], [3.0; 3]]];
        assert_eq!(validate_grid(&grid).unwrap(), (2, 2));
    }

    #[test]
    fn test_validate_grid_ragged() {
        let grid = vec![vec![[0.0; 3], [1.0; 3]], vec![[2.0; 3]]];
        assert!(matches!(
            validate_grid(&grid),
            Err(Error::RaggedGrid { row: 1, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_validate_grid_empty() {
        assert!(matches!(validate_grid(&[]), Err(Error::EmptyData)));
        assert!(matches!(validate_grid(&[vec![]]), Err(Error::EmptyData)));
    }
}
