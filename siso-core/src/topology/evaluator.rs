use crate::error::SisoResult;
use crate::field::FieldData;

use super::grid::{strides, unravel};

/// Supplies the sample matrix a parametric topology needs to lower itself to a discrete
/// mesh. The actual spline basis evaluation this stands in for is an external numerical
/// library's job (out of scope, see the workspace notes on ellipsoid/UTM math); this trait
/// exists so [`super::SplineTopology`]/[`super::LrTopology`] can be exercised end-to-end
/// without one.
pub trait SplineEvaluator: std::fmt::Debug {
    /// Given the control-point grid shape (cells per parametric direction) and the
    /// requested subdivisions per cell, return `(num_samples, weights)` where `weights` is
    /// `num_samples` rows by `num_controlpoints` columns.
    fn sample_matrix(&self, cell_shape: &[usize], nvis: usize) -> SisoResult<(usize, FieldData<f64>)>;
}

/// A minimal multilinear (uniform-knot, degree-1) stand-in evaluator: each sample point is
/// the multilinear interpolation of its surrounding control points on a structured grid.
/// Not a production NURBS engine — see the module-level doc comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearEvaluator;

impl SplineEvaluator for LinearEvaluator {
    fn sample_matrix(&self, cell_shape: &[usize], nvis: usize) -> SisoResult<(usize, FieldData<f64>)> {
        let ndim = cell_shape.len();
        let ctrl_shape: Vec<usize> = cell_shape.iter().map(|c| c + 1).collect();
        let ctrl_strides = strides(&ctrl_shape);
        let num_ctrl: usize = ctrl_shape.iter().product();

        let sample_shape: Vec<usize> = cell_shape.iter().map(|c| c * nvis + 1).collect();
        let num_samples: usize = sample_shape.iter().product();

        let mut weights = vec![0.0; num_samples * num_ctrl];
        for sample in 0..num_samples {
            let sample_coord = unravel(sample, &sample_shape);
            let mut contributions: Vec<(usize, f64)> = vec![(0, 1.0)];
            for axis in 0..ndim {
                let t = sample_coord[axis] as f64 / nvis as f64;
                let lo = (t.floor() as usize).min(ctrl_shape[axis] - 1);
                let hi = (lo + 1).min(ctrl_shape[axis] - 1);
                let frac = t - lo as f64;
                let mut next = Vec::with_capacity(contributions.len() * 2);
                for &(base, w) in &contributions {
                    next.push((base + lo * ctrl_strides[axis], w * (1.0 - frac)));
                    if hi != lo {
                        next.push((base + hi * ctrl_strides[axis], w * frac));
                    }
                }
                contributions = next;
            }
            for (ctrl, w) in contributions {
                weights[sample * num_ctrl + ctrl] += w;
            }
        }

        let matrix = FieldData::from_flat(weights, num_ctrl)?;
        Ok((num_samples, matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_evaluator_is_identity_at_nvis_one() {
        let (num_samples, weights) = LinearEvaluator.sample_matrix(&[2, 2], 1).unwrap();
        assert_eq!(num_samples, 9);
        // every sample coincides with exactly one control point at nvis=1
        for sample in 0..num_samples {
            let row = weights.row(sample);
            let ones = row.iter().filter(|&&w| (w - 1.0).abs() < 1e-12).count();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn linear_evaluator_interpolates_midpoints() {
        let (num_samples, weights) = LinearEvaluator.sample_matrix(&[1], 2).unwrap();
        assert_eq!(num_samples, 3);
        // sample 1 is the midpoint of the single cell's two control points
        assert!((weights.row(1)[0] - 0.5).abs() < 1e-12);
        assert!((weights.row(1)[1] - 0.5).abs() < 1e-12);
    }
}
