//! Level-set tracing on a sampled plane (nullclines, divergence sign boundaries).

use crate::grid::Axis;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A straight piece of a level curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// Traces `f(x, y) = level` with marching squares on the grid spanned by the two axes.
///
/// Corners at or above the level count as "inside"; crossings are placed on cell edges by
/// linear interpolation of the corner values.
pub fn zero_contour<F>(x_axis: &Axis, y_axis: &Axis, level: f64, f: F) -> Result<Vec<Segment>>
where
    F: Fn(f64, f64) -> f64,
{
    if !level.is_finite() {
        bail!("Contour level must be finite (got {level}).");
    }
    x_axis.validate()?;
    y_axis.validate()?;

    let nx = x_axis.samples;
    let ny = y_axis.samples;
    let xs = x_axis.values();
    let ys = y_axis.values();
    let index = |ix: usize, iy: usize| -> usize { ix + iy * nx };
    let mut values = vec![0.0; nx * ny];
    for (iy, &y) in ys.iter().enumerate() {
        for (ix, &x) in xs.iter().enumerate() {
            values[index(ix, iy)] = f(x, y) - level;
        }
    }

    let mut segments = Vec::new();
    for iy in 0..ny - 1 {
        let (y0, y1) = (ys[iy], ys[iy + 1]);
        for ix in 0..nx - 1 {
            let (x0, x1) = (xs[ix], xs[ix + 1]);
            let cell = Cell {
                x0,
                x1,
                y0,
                y1,
                corners: [
                    values[index(ix, iy)],
                    values[index(ix + 1, iy)],
                    values[index(ix + 1, iy + 1)],
                    values[index(ix, iy + 1)],
                ],
            };
            if cell.corners.iter().any(|v| !v.is_finite()) {
                continue;
            }

            for (edge_a, edge_b) in marching_squares_edge_pairs(cell.case_index()) {
                segments.push(Segment {
                    start: cell.edge_point(*edge_a),
                    end: cell.edge_point(*edge_b),
                });
            }
        }
    }

    log::debug!(
        "traced {} contour segments on a {}x{} grid",
        segments.len(),
        nx,
        ny
    );
    Ok(segments)
}

/// One grid square; corners run counter-clockwise from `(x0, y0)`.
struct Cell {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    corners: [f64; 4],
}

impl Cell {
    fn case_index(&self) -> u8 {
        self.corners
            .iter()
            .enumerate()
            .filter(|(_, v)| **v >= 0.0)
            .fold(0u8, |acc, (bit, _)| acc | (1 << bit))
    }

    fn edge_point(&self, edge: u8) -> [f64; 2] {
        let [v0, v1, v2, v3] = self.corners;
        match edge {
            0 => [self.x0 + (self.x1 - self.x0) * interpolate_factor(v0, v1), self.y0],
            1 => [self.x1, self.y0 + (self.y1 - self.y0) * interpolate_factor(v1, v2)],
            2 => [self.x1 + (self.x0 - self.x1) * interpolate_factor(v2, v3), self.y1],
            3 => [self.x0, self.y1 + (self.y0 - self.y1) * interpolate_factor(v3, v0)],
            _ => [self.x0, self.y0],
        }
    }
}

fn marching_squares_edge_pairs(case_index: u8) -> &'static [(u8, u8)] {
    match case_index {
        0 | 15 => &[],
        1 => &[(3, 0)],
        2 => &[(0, 1)],
        3 => &[(3, 1)],
        4 => &[(1, 2)],
        5 => &[(3, 2), (0, 1)],
        6 => &[(0, 2)],
        7 => &[(3, 2)],
        8 => &[(2, 3)],
        9 => &[(0, 2)],
        10 => &[(0, 3), (1, 2)],
        11 => &[(1, 2)],
        12 => &[(1, 3)],
        13 => &[(0, 1)],
        14 => &[(3, 0)],
        _ => &[],
    }
}

fn interpolate_factor(v0: f64, v1: f64) -> f64 {
    let denominator = v0 - v1;
    if denominator.abs() <= 1e-12 {
        0.5
    } else {
        (v0 / denominator).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::zero_contour;
    use crate::grid::Axis;

    #[test]
    fn line_contour_lies_on_the_line() {
        let axis = Axis::new(-1.0, 1.0, 25);
        let segments = zero_contour(&axis, &axis, 0.0, |x, y| x + y).expect("contour");
        assert!(!segments.is_empty(), "expected at least one segment");
        for seg in &segments {
            for p in [seg.start, seg.end] {
                assert!((p[0] + p[1]).abs() < 1e-9, "point {p:?} off the line");
            }
        }
    }

    #[test]
    fn circle_contour_points_are_near_radius() {
        let axis = Axis::new(-2.0, 2.0, 81);
        let segments =
            zero_contour(&axis, &axis, 1.0, |x, y| x * x + y * y).expect("contour");
        assert!(segments.len() > 20);
        for seg in &segments {
            let r = (seg.start[0].powi(2) + seg.start[1].powi(2)).sqrt();
            assert!((r - 1.0).abs() < 0.01, "radius {r}");
        }
    }

    #[test]
    fn no_crossing_yields_no_segments() {
        let axis = Axis::new(0.0, 1.0, 10);
        let segments = zero_contour(&axis, &axis, 0.0, |x, y| 1.0 + x + y).expect("contour");
        assert!(segments.is_empty());
    }

    #[test]
    fn rejects_bad_inputs() {
        let axis = Axis::new(0.0, 1.0, 10);
        assert!(zero_contour(&axis, &axis, f64::NAN, |x, _| x).is_err());
        let bad = Axis::new(0.0, 1.0, 1);
        assert!(zero_contour(&bad, &axis, 0.0, |x, _| x).is_err());
    }
}
