//! Mesh topologies: structured grids, explicit unstructured connectivity, and the
//! parametric (spline / LR-spline) families that lower to an unstructured mesh on demand.
//!
//! `Topology` is the capability-minimal trait every family implements. Only
//! [`UnstructuredTopology`] additionally implements [`DiscreteTopology`] (explicit cell
//! connectivity); callers recover that capability by downcasting the trait object rather
//! than through an inheritance hierarchy, per the workspace design notes.

mod blob;
mod evaluator;
mod grid;
mod mapper;
mod merger;
mod spline;
mod structured;
mod unstructured;

#[cfg(test)]
mod tests;

pub use blob::from_blob;
pub use evaluator::{LinearEvaluator, SplineEvaluator};
pub use mapper::Mapper;
pub use merger::{TopologyMerger, UniformTopologyMerger};
pub use spline::{LrTopology, SplineTopology};
pub use structured::StructuredTopology;
pub use unstructured::UnstructuredTopology;

use downcast_rs::{impl_downcast, Downcast};

use crate::error::SisoResult;
use crate::zone::Shape;

/// A mesh topology: node/cell counts and the ability to lower itself to a discrete,
/// explicitly-connected mesh at a given visualization resolution.
pub trait Topology: Downcast + std::fmt::Debug {
    /// Parametric dimension (1, 2, or 3).
    fn pardim(&self) -> usize;
    /// Total node (point) count.
    fn num_nodes(&self) -> usize;
    /// Total cell (element) count.
    fn num_cells(&self) -> usize;
    /// Lower to a discrete mesh refined `nvis` times per parametric direction, together
    /// with the [`Mapper`] that carries field control-point data onto the refined nodes.
    ///
    /// The returned topology always also implements [`DiscreteTopology`]; recover it with
    /// [`as_discrete`].
    fn discretize(&self, nvis: usize) -> SisoResult<(Box<dyn Topology>, Mapper)>;

    /// Build the [`Mapper`] that carries `cellwise` field data (one row per cell of `self`,
    /// *not* per node) onto the cells `discretize(nvis)` would produce.
    ///
    /// Cellwise data isn't interpolated the way nodal control points are: each refined cell
    /// simply inherits its parent cell's value (piecewise-constant extension), so this is a
    /// pure reindexing rather than a weighted evaluation. The default implementation assumes
    /// `discretize` never changes the cell count (true of [`StructuredTopology`] and
    /// [`UnstructuredTopology`], both of which treat `nvis` as a no-op); parametric families
    /// that actually subdivide cells (e.g. [`SplineTopology`]) override this.
    fn cell_mapper(&self, nvis: usize) -> SisoResult<Mapper> {
        let _ = nvis;
        Ok(Mapper::identity(self.num_cells()))
    }

    /// Build the [`TopologyMerger`] the `BasisMerge` filter uses to fold every source
    /// basis' field data onto one merged mesh for this zone, treating `self` as the
    /// "master" topology (the basis the chosen geometry field lives on).
    ///
    /// The default implementation discretizes `self` once and merges node-for-node; see
    /// [`UniformTopologyMerger`] for the out-of-scope boundary this simplification sits at.
    fn create_merger(&self) -> SisoResult<Box<dyn TopologyMerger>> {
        Ok(Box::new(UniformTopologyMerger::from_master(self)?))
    }
}
impl_downcast!(Topology);

/// The capability of a [`Topology`] that already has explicit cell connectivity.
pub trait DiscreteTopology: Topology {
    /// The shared cell shape (all cells in a discrete topology have the same corner count).
    fn celltype(&self) -> Shape;
    /// Connectivity: rows = cells, columns = node indices per cell (`celltype().corner_count()`
    /// wide).
    fn cells(&self) -> &crate::field::FieldData<usize>;
}

/// Recover the [`DiscreteTopology`] capability from a `Topology` trait object, if the
/// concrete type underneath provides it.
///
/// [`UnstructuredTopology`] is the only concrete type this crate ships that does; it is the
/// common target every other family's `discretize` lowers to.
pub fn as_discrete(topology: &dyn Topology) -> Option<&dyn DiscreteTopology> {
    topology
        .downcast_ref::<UnstructuredTopology>()
        .map(|t| t as &dyn DiscreteTopology)
}
