use crate::error::{SisoError, SisoResult};
use crate::field::FieldData;
use crate::zone::Shape;

use super::mapper::Mapper;
use super::{DiscreteTopology, Topology};

/// An explicit-connectivity mesh: `cells` lists, per row, the node indices of one cell.
#[derive(Debug, Clone)]
pub struct UnstructuredTopology {
    num_nodes: usize,
    cells: FieldData<usize>,
    celltype: Shape,
}

fn celltype_for_pardim(pardim: usize) -> SisoResult<Shape> {
    match pardim {
        1 => Ok(Shape::Line),
        2 => Ok(Shape::Quadrilateral),
        3 => Ok(Shape::Hexahedron),
        other => Err(SisoError::ShapeMismatch {
            expected: "pardim in {1, 2, 3}".into(),
            actual: format!("pardim={other}"),
        }),
    }
}

impl UnstructuredTopology {
    /// Construct from explicit connectivity; `pardim` selects the cell shape
    /// (1 → Line, 2 → Quadrilateral, 3 → Hexahedron), and `cells.num_comps()` must match its
    /// corner count.
    pub fn new(num_nodes: usize, cells: FieldData<usize>, pardim: usize) -> SisoResult<Self> {
        let celltype = celltype_for_pardim(pardim)?;
        if cells.num_comps() != celltype.corner_count() {
            return Err(SisoError::ShapeMismatch {
                expected: format!("cells.num_comps={}", celltype.corner_count()),
                actual: format!("cells.num_comps={}", cells.num_comps()),
            });
        }
        Ok(UnstructuredTopology {
            num_nodes,
            cells,
            celltype,
        })
    }
}

impl Topology for UnstructuredTopology {
    fn pardim(&self) -> usize {
        match self.celltype {
            Shape::Line => 1,
            Shape::Quadrilateral => 2,
            Shape::Hexahedron => 3,
        }
    }

    fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn num_cells(&self) -> usize {
        self.cells.num_rows()
    }

    /// Already discrete: `discretize` is the identity, ignoring `nvis`.
    fn discretize(&self, _nvis: usize) -> SisoResult<(Box<dyn Topology>, Mapper)> {
        Ok((Box::new(self.clone()), Mapper::identity(self.num_nodes)))
    }
}

impl DiscreteTopology for UnstructuredTopology {
    fn celltype(&self) -> Shape {
        self.celltype
    }

    fn cells(&self) -> &FieldData<usize> {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_connectivity_with_wrong_corner_count() {
        let cells = FieldData::from_flat(vec![0, 1, 2], 3).unwrap();
        assert!(matches!(
            UnstructuredTopology::new(4, cells, 2),
            Err(SisoError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn discretize_capability_is_recoverable_via_downcast() {
        let cells = FieldData::from_flat(vec![0usize, 1, 2, 3], 4).unwrap();
        let topology = UnstructuredTopology::new(4, cells, 2).unwrap();
        let boxed: Box<dyn Topology> = Box::new(topology);
        let discrete = super::super::as_discrete(boxed.as_ref()).unwrap();
        assert_eq!(discrete.celltype(), Shape::Quadrilateral);
    }
}
