use crate::error::SisoResult;

use super::grid::structured_cells;
use super::mapper::Mapper;
use super::unstructured::UnstructuredTopology;
use super::Topology;

/// A cartesian-product grid topology: `cell_shape[i]` cells along parametric direction `i`.
#[derive(Debug, Clone)]
pub struct StructuredTopology {
    cell_shape: Vec<usize>,
}

impl StructuredTopology {
    /// Construct from an explicit cell count per parametric direction (1..=3 entries).
    pub fn new(cell_shape: Vec<usize>) -> Self {
        StructuredTopology { cell_shape }
    }

    pub fn cell_shape(&self) -> &[usize] {
        &self.cell_shape
    }
}

impl Topology for StructuredTopology {
    fn pardim(&self) -> usize {
        self.cell_shape.len()
    }

    fn num_nodes(&self) -> usize {
        self.cell_shape.iter().map(|c| c + 1).product()
    }

    fn num_cells(&self) -> usize {
        self.cell_shape.iter().product()
    }

    /// Structured grids arrive already sampled; `nvis` is accepted for interface symmetry
    /// with the parametric families but has no effect — discretizing only re-expresses the
    /// same nodes as explicit connectivity, via an identity mapper.
    fn discretize(&self, _nvis: usize) -> SisoResult<(Box<dyn Topology>, Mapper)> {
        let cells = structured_cells(&self.cell_shape);
        let discrete = UnstructuredTopology::new(self.num_nodes(), cells, self.pardim())?;
        let mapper = Mapper::identity(self.num_nodes());
        Ok((Box::new(discrete), mapper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discretize_preserves_node_and_cell_counts() {
        let structured = StructuredTopology::new(vec![2, 3]);
        let (discrete, mapper) = structured.discretize(1).unwrap();
        assert_eq!(discrete.num_nodes(), structured.num_nodes());
        assert_eq!(discrete.num_cells(), structured.num_cells());
        assert_eq!(mapper.num_samples(), structured.num_nodes());
    }
}
