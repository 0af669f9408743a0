use crate::error::{SisoError, SisoResult};
use crate::field::FieldData;

/// A pure linear map from control-point data to sampled (discretized) node data.
///
/// `weights` is `num_samples` rows by `num_controlpoints` columns; applying the mapper to a
/// field's control-point [`FieldData`] is a plain matrix product, independent of the number
/// of value components the field carries.
#[derive(Debug, Clone)]
pub struct Mapper {
    weights: FieldData<f64>,
}

impl Mapper {
    /// Build a mapper from an explicit `(num_samples, num_controlpoints)` weight matrix.
    pub fn new(weights: FieldData<f64>) -> Self {
        Mapper { weights }
    }

    /// The identity mapper over `num_points` control points (used by already-discrete
    /// topologies, whose `discretize` is a no-op).
    pub fn identity(num_points: usize) -> Self {
        let mut data = vec![0.0; num_points * num_points];
        for i in 0..num_points {
            data[i * num_points + i] = 1.0;
        }
        Mapper {
            weights: FieldData::from_flat(data, num_points)
                .expect("square identity matrix always has uniform row width"),
        }
    }

    /// Number of sample (output) points this mapper produces.
    pub fn num_samples(&self) -> usize {
        self.weights.num_rows()
    }

    /// Number of control (input) points this mapper expects.
    pub fn num_controlpoints(&self) -> usize {
        self.weights.num_comps()
    }

    /// Build a piecewise-assignment mapper over `num_controlpoints` inputs: output row `i`
    /// copies input row `parents[i]` verbatim (a single unit weight, nothing else). Used for
    /// `cellwise` field data, which isn't interpolated across a tessellation the way nodal
    /// data is — each refined cell just inherits its parent cell's value.
    pub fn piecewise(num_controlpoints: usize, parents: &[usize]) -> Self {
        let mut data = vec![0.0; parents.len() * num_controlpoints];
        for (row, &parent) in parents.iter().enumerate() {
            data[row * num_controlpoints + parent] = 1.0;
        }
        Mapper {
            weights: FieldData::from_flat(data, num_controlpoints)
                .expect("row width fixed to num_controlpoints by construction"),
        }
    }

    /// Apply the mapper to control-point data: `out[i, c] = sum_j weights[i, j] * control_points[j, c]`.
    pub fn apply(&self, control_points: &FieldData<f64>) -> SisoResult<FieldData<f64>> {
        if control_points.num_rows() != self.num_controlpoints() {
            return Err(SisoError::ShapeMismatch {
                expected: format!("control_points.num_rows={}", self.num_controlpoints()),
                actual: format!("control_points.num_rows={}", control_points.num_rows()),
            });
        }
        let num_comps = control_points.num_comps();
        let mut out = vec![0.0; self.num_samples() * num_comps];
        for sample in 0..self.num_samples() {
            let row = self.weights.row(sample);
            for (ctrl, &w) in row.iter().enumerate() {
                if w == 0.0 {
                    continue;
                }
                let cp = control_points.row(ctrl);
                for comp in 0..num_comps {
                    out[sample * num_comps + comp] += w * cp[comp];
                }
            }
        }
        FieldData::from_flat(out, num_comps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapper_is_a_no_op() {
        let cps = FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        let mapper = Mapper::identity(2);
        let out = mapper.apply(&cps).unwrap();
        assert_eq!(out, cps);
    }

    #[test]
    fn piecewise_mapper_copies_parent_rows() {
        // 2 original cells; 4 refined sub-cells, 2 inherit each parent.
        let cps = FieldData::from_flat(vec![1.0, 2.0], 1).unwrap();
        let mapper = Mapper::piecewise(2, &[0, 0, 1, 1]);
        assert_eq!(mapper.num_samples(), 4);
        assert_eq!(mapper.num_controlpoints(), 2);
        let out = mapper.apply(&cps).unwrap();
        assert_eq!(out.as_slice(), &[1.0, 1.0, 2.0, 2.0]);
    }
}
