use std::sync::Arc;

use crate::error::SisoResult;

use super::evaluator::SplineEvaluator;
use super::grid::{cell_refinement_parents, structured_cells};
use super::mapper::Mapper;
use super::unstructured::UnstructuredTopology;
use super::Topology;

/// A parametric (spline) patch: `cell_shape[i]` spans along parametric direction `i`, with
/// the numeric sample matrix supplied by a pluggable [`SplineEvaluator`] (real basis
/// evaluation is an external library's job, see the module docs).
#[derive(Debug, Clone)]
pub struct SplineTopology {
    cell_shape: Vec<usize>,
    evaluator: Arc<dyn SplineEvaluator>,
}

impl SplineTopology {
    pub fn new(cell_shape: Vec<usize>, evaluator: Arc<dyn SplineEvaluator>) -> Self {
        SplineTopology {
            cell_shape,
            evaluator,
        }
    }

    pub fn cell_shape(&self) -> &[usize] {
        &self.cell_shape
    }
}

impl Topology for SplineTopology {
    fn pardim(&self) -> usize {
        self.cell_shape.len()
    }

    fn num_nodes(&self) -> usize {
        self.cell_shape.iter().map(|c| c + 1).product()
    }

    fn num_cells(&self) -> usize {
        self.cell_shape.iter().product()
    }

    fn discretize(&self, nvis: usize) -> SisoResult<(Box<dyn Topology>, Mapper)> {
        let (num_samples, weights) = self.evaluator.sample_matrix(&self.cell_shape, nvis)?;
        let sample_shape: Vec<usize> = self.cell_shape.iter().map(|c| c * nvis).collect();
        let cells = structured_cells(&sample_shape);
        let discrete = UnstructuredTopology::new(num_samples, cells, self.pardim())?;
        Ok((Box::new(discrete), Mapper::new(weights)))
    }

    fn cell_mapper(&self, nvis: usize) -> SisoResult<Mapper> {
        let parents = cell_refinement_parents(&self.cell_shape, nvis);
        Ok(Mapper::piecewise(self.num_cells(), &parents))
    }
}

/// A locally-refined (LR) spline patch.
///
/// Genuine LR-splines carry an adaptively refined set of basis functions rather than a
/// uniform cell grid; reproducing that adaptive structure is exactly the kind of spline
/// numerical machinery this workspace's out-of-scope boundary excludes (see [`SplineTopology`]).
/// This type captures the same `(cell_shape, evaluator)` contract as its uniform sibling so
/// the rest of the pipeline — discretization, field mapping, zone keying — has a real
/// `Topology` to exercise; only the refinement pattern itself is simplified.
#[derive(Debug, Clone)]
pub struct LrTopology {
    inner: SplineTopology,
}

impl LrTopology {
    pub fn new(cell_shape: Vec<usize>, evaluator: Arc<dyn SplineEvaluator>) -> Self {
        LrTopology {
            inner: SplineTopology::new(cell_shape, evaluator),
        }
    }

    pub fn cell_shape(&self) -> &[usize] {
        self.inner.cell_shape()
    }
}

impl Topology for LrTopology {
    fn pardim(&self) -> usize {
        self.inner.pardim()
    }

    fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }

    fn num_cells(&self) -> usize {
        self.inner.num_cells()
    }

    fn discretize(&self, nvis: usize) -> SisoResult<(Box<dyn Topology>, Mapper)> {
        self.inner.discretize(nvis)
    }

    fn cell_mapper(&self, nvis: usize) -> SisoResult<Mapper> {
        self.inner.cell_mapper(nvis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldData;
    use crate::topology::LinearEvaluator;

    #[test]
    fn spline_discretize_refines_node_count() {
        let spline = SplineTopology::new(vec![2], Arc::new(LinearEvaluator));
        let (discrete, mapper) = spline.discretize(2).unwrap();
        assert_eq!(discrete.num_nodes(), 5); // 2 cells * 2 subdivisions + 1
        assert_eq!(mapper.num_controlpoints(), 3); // 2 cells + 1 control point

        let cps = FieldData::from_flat(vec![0.0, 1.0, 0.0], 1).unwrap();
        let sampled = mapper.apply(&cps).unwrap();
        assert_eq!(sampled.num_rows(), 5);
        assert!((sampled.row(2)[0] - 1.0).abs() < 1e-12); // midpoint sample hits the peak control point
    }

    #[test]
    fn spline_cell_mapper_replicates_parent_cell_values() {
        let spline = SplineTopology::new(vec![2], Arc::new(LinearEvaluator));
        let cell_mapper = spline.cell_mapper(2).unwrap();
        assert_eq!(cell_mapper.num_controlpoints(), 2); // 2 original cells
        assert_eq!(cell_mapper.num_samples(), 4); // 2 cells * 2 subdivisions

        let cellwise = FieldData::from_flat(vec![10.0, 20.0], 1).unwrap();
        let sampled = cell_mapper.apply(&cellwise).unwrap();
        assert_eq!(sampled.as_slice(), &[10.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    fn lr_topology_delegates_to_its_uniform_grid() {
        let lr = LrTopology::new(vec![2, 2], Arc::new(LinearEvaluator));
        assert_eq!(lr.num_cells(), 4);
        let (discrete, _) = lr.discretize(1).unwrap();
        assert_eq!(discrete.num_cells(), 4);
    }
}
