//! The common numeric carrier between pipeline stages
//!
//! [`FieldData`] is a value-semantic 2-D array: `num_rows` entities by `num_comps`
//! components, stored as a flat row-major buffer. This mirrors the flat-`Vec`-backed
//! storage the teacher favors for per-entity data (e.g. `AttrSparseVec`) rather than
//! reaching for a dense-array crate: the shapes involved here are small and the operations
//! (`concat`, `slice`, `join`) are simple index arithmetic over a single `Vec`.

use num_traits::Float;

use crate::error::{SisoError, SisoResult};

/// A typed 2-D numeric buffer: `num_rows` entities, each with `num_comps` components.
///
/// # Invariants
///
/// - every row has the same number of components (`num_comps`, not stored per-row: it is
///   implicit in `data.len() / num_rows`),
/// - `num_comps >= 1` whenever `num_rows > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData<T> {
    data: Vec<T>,
    num_rows: usize,
    num_comps: usize,
}

impl<T: Copy> FieldData<T> {
    /// Build a `FieldData` from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SisoError::ShapeMismatch`] if `data.len()` is not a multiple of `num_comps`,
    /// or if `num_comps == 0` while `data` is non-empty.
    pub fn from_flat(data: Vec<T>, num_comps: usize) -> SisoResult<Self> {
        if num_comps == 0 && !data.is_empty() {
            return Err(SisoError::ShapeMismatch {
                expected: "num_comps >= 1".into(),
                actual: "num_comps = 0".into(),
            });
        }
        if num_comps == 0 {
            return Ok(FieldData {
                data,
                num_rows: 0,
                num_comps: 0,
            });
        }
        if data.len() % num_comps != 0 {
            return Err(SisoError::ShapeMismatch {
                expected: format!("length divisible by num_comps={num_comps}"),
                actual: format!("length={}", data.len()),
            });
        }
        let num_rows = data.len() / num_comps;
        Ok(FieldData {
            data,
            num_rows,
            num_comps,
        })
    }

    /// An empty buffer with the given component count and zero rows.
    pub fn empty(num_comps: usize) -> Self {
        FieldData {
            data: Vec::new(),
            num_rows: 0,
            num_comps,
        }
    }

    /// Number of entities (rows).
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of components (columns) per row.
    pub fn num_comps(&self) -> usize {
        self.num_comps
    }

    /// The flat row-major buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume `self`, returning the flat row-major buffer.
    pub fn into_flat(self) -> Vec<T> {
        self.data
    }

    /// Values of a single row.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.num_comps..(row + 1) * self.num_comps]
    }

    /// Concatenate several buffers component-wise: all inputs must share `num_rows`; the
    /// result has the summed `num_comps`.
    pub fn concat(inputs: &[&FieldData<T>]) -> SisoResult<FieldData<T>> {
        let Some(first) = inputs.first() else {
            return Ok(FieldData::empty(0));
        };
        let num_rows = first.num_rows;
        for other in &inputs[1..] {
            if other.num_rows != num_rows {
                return Err(SisoError::ShapeMismatch {
                    expected: format!("num_rows={num_rows}"),
                    actual: format!("num_rows={}", other.num_rows),
                });
            }
        }
        let num_comps: usize = inputs.iter().map(|f| f.num_comps).sum();
        let mut data = Vec::with_capacity(num_rows * num_comps);
        for row in 0..num_rows {
            for input in inputs {
                data.extend_from_slice(input.row(row));
            }
        }
        FieldData::from_flat(data, num_comps)
    }

    /// Select a subset of components, in the given order. Preserves row count.
    pub fn slice(&self, component_indices: &[usize]) -> SisoResult<FieldData<T>> {
        for &idx in component_indices {
            if idx >= self.num_comps {
                return Err(SisoError::ShapeMismatch {
                    expected: format!("component index < {}", self.num_comps),
                    actual: format!("index {idx}"),
                });
            }
        }
        let mut data = Vec::with_capacity(self.num_rows * component_indices.len());
        for row in 0..self.num_rows {
            let src = self.row(row);
            for &idx in component_indices {
                data.push(src[idx]);
            }
        }
        FieldData::from_flat(data, component_indices.len())
    }

    /// Concatenate several buffers row-wise (append entities): all inputs must share
    /// `num_comps`.
    pub fn join(inputs: &[&FieldData<T>]) -> SisoResult<FieldData<T>> {
        let Some(first) = inputs.first() else {
            return Ok(FieldData::empty(0));
        };
        let num_comps = first.num_comps;
        for other in &inputs[1..] {
            if other.num_comps != num_comps {
                return Err(SisoError::ShapeMismatch {
                    expected: format!("num_comps={num_comps}"),
                    actual: format!("num_comps={}", other.num_comps),
                });
            }
        }
        let mut data = Vec::new();
        for input in inputs {
            data.extend_from_slice(&input.data);
        }
        FieldData::from_flat(data, num_comps)
    }

    /// Reinterpret the buffer with a different component count, keeping the total element
    /// count fixed.
    pub fn reshape(&self, num_comps: usize) -> SisoResult<FieldData<T>> {
        FieldData::from_flat(self.data.clone(), num_comps)
    }

    /// Given a structured N-D point grid (row-major, `axis_len` per axis), return the
    /// `2^ndim` corner points in canonical order (binary counting over axes, low bit =
    /// first axis).
    pub fn corners(&self, axis_lens: &[usize]) -> SisoResult<FieldData<T>> {
        let ndim = axis_lens.len();
        let expected_rows: usize = axis_lens.iter().product();
        if expected_rows != self.num_rows {
            return Err(SisoError::ShapeMismatch {
                expected: format!("num_rows={expected_rows} from axis_lens {axis_lens:?}"),
                actual: format!("num_rows={}", self.num_rows),
            });
        }
        let strides: Vec<usize> = {
            let mut s = vec![1usize; ndim];
            for axis in 1..ndim {
                s[axis] = s[axis - 1] * axis_lens[axis - 1];
            }
            s
        };
        let mut data = Vec::with_capacity((1 << ndim) * self.num_comps);
        for corner in 0..(1usize << ndim) {
            let mut flat_index = 0usize;
            for axis in 0..ndim {
                if (corner >> axis) & 1 == 1 {
                    flat_index += (axis_lens[axis] - 1) * strides[axis];
                }
            }
            data.extend_from_slice(self.row(flat_index));
        }
        FieldData::from_flat(data, self.num_comps)
    }
}

impl<T: Float> FieldData<T> {
    /// Rows of (lon°, lat°) or (lon°, lat°, r) become cartesian (x, y, z). Missing radius
    /// defaults to 1.
    pub fn spherical_to_cartesian(&self) -> SisoResult<FieldData<T>> {
        if self.num_comps != 2 && self.num_comps != 3 {
            return Err(SisoError::ShapeMismatch {
                expected: "num_comps in {2, 3}".into(),
                actual: format!("num_comps={}", self.num_comps),
            });
        }
        let mut data = Vec::with_capacity(self.num_rows * 3);
        for row in 0..self.num_rows {
            let r = self.row(row);
            let lon = r[0].to_radians();
            let lat = r[1].to_radians();
            let radius = if self.num_comps == 3 {
                r[2]
            } else {
                T::one()
            };
            data.push(radius * lat.cos() * lon.cos());
            data.push(radius * lat.cos() * lon.sin());
            data.push(radius * lat.sin());
        }
        FieldData::from_flat(data, 3)
    }

    /// Convert a vector field expressed in local east-north-up frames at `coords`
    /// (lon°/lat°[/r] per row) into cartesian components.
    pub fn spherical_to_cartesian_vector_field(
        &self,
        coords: &FieldData<T>,
    ) -> SisoResult<FieldData<T>> {
        if self.num_comps != 2 && self.num_comps != 3 {
            return Err(SisoError::ShapeMismatch {
                expected: "num_comps in {2, 3}".into(),
                actual: format!("num_comps={}", self.num_comps),
            });
        }
        if coords.num_rows != self.num_rows {
            return Err(SisoError::ShapeMismatch {
                expected: format!("coords.num_rows={}", self.num_rows),
                actual: format!("coords.num_rows={}", coords.num_rows),
            });
        }
        let mut data = Vec::with_capacity(self.num_rows * 3);
        for row in 0..self.num_rows {
            let c = coords.row(row);
            let lon = c[0].to_radians();
            let lat = c[1].to_radians();
            let v = self.row(row);
            let (east, north, up) = if self.num_comps == 3 {
                (v[0], v[1], v[2])
            } else {
                (v[0], v[1], T::zero())
            };
            let (sl, cl) = (lon.sin(), lon.cos());
            let (sp, cp) = (lat.sin(), lat.cos());
            data.push(-east * sl - north * sp * cl + up * cp * cl);
            data.push(east * cl - north * sp * sl + up * cp * sl);
            data.push(north * cp + up * sp);
        }
        FieldData::from_flat(data, 3)
    }

    /// Inverse of [`Self::spherical_to_cartesian_vector_field`]: cartesian vector
    /// components back to local east-north-up, given the same `coords`.
    pub fn cartesian_to_spherical_vector_field(
        &self,
        coords: &FieldData<T>,
    ) -> SisoResult<FieldData<T>> {
        if self.num_comps != 3 {
            return Err(SisoError::ShapeMismatch {
                expected: "num_comps=3".into(),
                actual: format!("num_comps={}", self.num_comps),
            });
        }
        if coords.num_rows != self.num_rows {
            return Err(SisoError::ShapeMismatch {
                expected: format!("coords.num_rows={}", self.num_rows),
                actual: format!("coords.num_rows={}", coords.num_rows),
            });
        }
        let mut data = Vec::with_capacity(self.num_rows * 3);
        for row in 0..self.num_rows {
            let c = coords.row(row);
            let lon = c[0].to_radians();
            let lat = c[1].to_radians();
            let v = self.row(row);
            let (sl, cl) = (lon.sin(), lon.cos());
            let (sp, cp) = (lat.sin(), lat.cos());
            let east = -v[0] * sl + v[1] * cl;
            let north = -v[0] * cl * sp - v[1] * sl * sp + v[2] * cp;
            let up = v[0] * cl * cp + v[1] * sl * cp + v[2] * sp;
            data.push(east);
            data.push(north);
            data.push(up);
        }
        FieldData::from_flat(data, 3)
    }

    /// Rotate every 3-component row by a row-major 3x3 matrix.
    pub fn rotate(&self, matrix: &[[T; 3]; 3]) -> SisoResult<FieldData<T>> {
        if self.num_comps != 3 {
            return Err(SisoError::ShapeMismatch {
                expected: "num_comps=3".into(),
                actual: format!("num_comps={}", self.num_comps),
            });
        }
        let mut data = Vec::with_capacity(self.num_rows * 3);
        for row in 0..self.num_rows {
            let v = self.row(row);
            for m_row in matrix {
                data.push(m_row[0] * v[0] + m_row[1] * v[1] + m_row[2] * v[2]);
            }
        }
        FieldData::from_flat(data, 3)
    }

    /// `true` if every value is finite (not `NaN`/`inf`); used by the `Strict` filter.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl<T: Copy + std::ops::Add<Output = T>> std::ops::Add for FieldData<T> {
    type Output = FieldData<T>;

    fn add(self, rhs: FieldData<T>) -> FieldData<T> {
        assert_eq!(self.num_comps, rhs.num_comps);
        assert_eq!(self.num_rows, rhs.num_rows);
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(a, b)| *a + *b)
            .collect();
        FieldData {
            data,
            num_rows: self.num_rows,
            num_comps: self.num_comps,
        }
    }
}

impl<T: Copy + std::ops::Sub<Output = T>> std::ops::Sub for FieldData<T> {
    type Output = FieldData<T>;

    fn sub(self, rhs: FieldData<T>) -> FieldData<T> {
        assert_eq!(self.num_comps, rhs.num_comps);
        assert_eq!(self.num_rows, rhs.num_rows);
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(a, b)| *a - *b)
            .collect();
        FieldData {
            data,
            num_rows: self.num_rows,
            num_comps: self.num_comps,
        }
    }
}

impl<T: Copy + std::ops::Mul<Output = T>> std::ops::Mul<T> for FieldData<T> {
    type Output = FieldData<T>;

    fn mul(self, scalar: T) -> FieldData<T> {
        let data = self.data.iter().map(|v| *v * scalar).collect();
        FieldData {
            data,
            num_rows: self.num_rows,
            num_comps: self.num_comps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_then_slice_recovers_input() {
        let a = FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap(); // 2 rows x 2
        let b = FieldData::from_flat(vec![10.0, 20.0], 1).unwrap(); // 2 rows x 1
        let combined = FieldData::concat(&[&a, &b]).unwrap();
        assert_eq!(combined.num_rows(), 2);
        assert_eq!(combined.num_comps(), 3);
        let back_a = combined.slice(&[0, 1]).unwrap();
        assert_eq!(back_a, a);
        let back_b = combined.slice(&[2]).unwrap();
        assert_eq!(back_b, b);
    }

    #[test]
    fn concat_rejects_mismatched_rows() {
        let a = FieldData::from_flat(vec![1.0, 2.0], 1).unwrap();
        let b = FieldData::from_flat(vec![1.0, 2.0, 3.0], 1).unwrap();
        assert!(matches!(
            FieldData::concat(&[&a, &b]),
            Err(SisoError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn join_preserves_total_row_count() {
        let a = FieldData::from_flat(vec![1.0, 2.0], 2).unwrap(); // 1 row
        let b = FieldData::from_flat(vec![3.0, 4.0, 5.0, 6.0], 2).unwrap(); // 2 rows
        let joined = FieldData::join(&[&a, &b]).unwrap();
        assert_eq!(joined.num_rows(), 3);
        assert_eq!(joined.num_comps(), 2);
    }

    #[test]
    fn join_rejects_mismatched_comps() {
        let a = FieldData::from_flat(vec![1.0], 1).unwrap();
        let b = FieldData::from_flat(vec![1.0, 2.0], 2).unwrap();
        assert!(matches!(
            FieldData::join(&[&a, &b]),
            Err(SisoError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn corners_of_unit_cube() {
        // a 2x2x2 structured grid, axis_lens = [2, 2, 2]; row-major, x fastest
        let mut data = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    data.push(x as f64);
                    data.push(y as f64);
                    data.push(z as f64);
                }
            }
        }
        let grid = FieldData::from_flat(data, 3).unwrap();
        let corners = grid.corners(&[2, 2, 2]).unwrap();
        assert_eq!(corners.num_rows(), 8);
        assert_eq!(corners.row(0), [0.0, 0.0, 0.0]);
        assert_eq!(corners.row(7), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn spherical_to_cartesian_unit_sphere() {
        let pts = FieldData::from_flat(vec![0.0_f64, 0.0], 2).unwrap();
        let cart = pts.spherical_to_cartesian().unwrap();
        let row = cart.row(0);
        assert!((row[0] - 1.0).abs() < 1e-12);
        assert!(row[1].abs() < 1e-12);
        assert!(row[2].abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_on_bad_flat_length() {
        assert!(matches!(
            FieldData::<f64>::from_flat(vec![1.0, 2.0, 3.0], 2),
            Err(SisoError::ShapeMismatch { .. })
        ));
    }
}
