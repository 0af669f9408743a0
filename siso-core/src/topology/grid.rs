//! Shared index arithmetic for cartesian-product node/cell grids.

/// Row-major strides for a shape (last axis fastest... here axis 0 fastest, matching
/// [`crate::field::FieldData::corners`]'s convention of "low bit = first axis").
pub(crate) fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in 1..shape.len() {
        strides[axis] = strides[axis - 1] * shape[axis - 1];
    }
    strides
}

/// Decompose a flat index into per-axis indices for `shape`, axis-0-fastest.
pub(crate) fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0usize; shape.len()];
    for axis in 0..shape.len() {
        coord[axis] = flat % shape[axis];
        flat /= shape[axis];
    }
    coord
}

/// Build the cell→node connectivity of a structured cartesian grid with `cell_shape` cells
/// per axis (so `cell_shape.len() + 1`-dimensional node grid of shape `cell_shape[i] + 1`).
/// Each cell's `2^ndim` corners are listed in the same binary-counting order as
/// [`crate::field::FieldData::corners`].
pub(crate) fn structured_cells(cell_shape: &[usize]) -> crate::field::FieldData<usize> {
    let ndim = cell_shape.len();
    let node_shape: Vec<usize> = cell_shape.iter().map(|c| c + 1).collect();
    let node_strides = strides(&node_shape);
    let num_cells: usize = if cell_shape.is_empty() {
        0
    } else {
        cell_shape.iter().product()
    };
    let corners_per_cell = 1usize << ndim;

    let mut data = Vec::with_capacity(num_cells * corners_per_cell);
    for cell in 0..num_cells {
        let cell_coord = unravel(cell, cell_shape);
        for corner in 0..corners_per_cell {
            let mut node_flat = 0usize;
            for axis in 0..ndim {
                let offset = (corner >> axis) & 1;
                node_flat += (cell_coord[axis] + offset) * node_strides[axis];
            }
            data.push(node_flat);
        }
    }
    crate::field::FieldData::from_flat(data, corners_per_cell)
        .expect("structured connectivity always has uniform row width")
}

/// For a uniform `nvis`-per-axis refinement of a `cell_shape` grid, map each refined
/// sub-cell's flat index (in the same axis-0-fastest enumeration [`structured_cells`] uses
/// for the refined grid `cell_shape[i] * nvis`) to its parent cell's flat index in the
/// original `cell_shape` grid.
pub(crate) fn cell_refinement_parents(cell_shape: &[usize], nvis: usize) -> Vec<usize> {
    let sample_shape: Vec<usize> = cell_shape.iter().map(|c| c * nvis).collect();
    let num_sub_cells: usize = if sample_shape.is_empty() {
        0
    } else {
        sample_shape.iter().product()
    };
    let cell_strides = strides(cell_shape);

    let mut parents = Vec::with_capacity(num_sub_cells);
    for sub in 0..num_sub_cells {
        let sub_coord = unravel(sub, &sample_shape);
        let mut parent_flat = 0usize;
        for axis in 0..cell_shape.len() {
            parent_flat += (sub_coord[axis] / nvis) * cell_strides[axis];
        }
        parents.push(parent_flat);
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_parents_group_subcells_by_origin_cell_1d() {
        // 2 cells, nvis=2 -> 4 sub-cells, two per parent.
        let parents = cell_refinement_parents(&[2], 2);
        assert_eq!(parents, vec![0, 0, 1, 1]);
    }

    #[test]
    fn refinement_parents_group_subcells_by_origin_cell_2d() {
        // 2x1 cells, nvis=2 -> 4x2 sub-cells; every 2x2 block maps to one parent.
        let parents = cell_refinement_parents(&[2, 1], 2);
        assert_eq!(parents.len(), 8);
        // sub-cells (0,0),(1,0) -> parent 0; (2,0),(3,0) -> parent 1 (axis-0-fastest).
        assert_eq!(parents[0], 0);
        assert_eq!(parents[1], 0);
        assert_eq!(parents[2], 1);
        assert_eq!(parents[3], 1);
    }
}
