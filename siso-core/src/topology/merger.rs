//! Per-zone basis merging: [`TopologyMerger`] is the capability [`super::Topology::create_merger`]
//! hands back, used by the `BasisMerge` filter stage to rewrite every source basis' field
//! data onto one common merged topology.

use crate::error::{SisoError, SisoResult};

use super::mapper::Mapper;
use super::unstructured::UnstructuredTopology;
use super::Topology;

/// Produced once per zone by [`super::Topology::create_merger`] from the "master" basis'
/// topology (the one the chosen geometry field lives on). Calling [`Self::map`] with any
/// topology — the master's own, or another basis' — returns the shared merged topology
/// together with the [`Mapper`] that rewrites that particular topology's field data onto it.
///
/// Mapping field data from one basis' spline space onto another's in general requires
/// re-evaluating that basis at the merged topology's sample points — exactly the spline
/// numerical machinery this workspace places out of scope. This implementation handles the
/// case the spec's own invariant requires (`BasisMerge` always merges bases that already
/// agree on node layout once discretized): topologies with matching node counts get an
/// identity mapping onto the merged mesh; anything else is a [`SisoError::CapabilityMismatch`],
/// same as any other filter precondition violation.
pub trait TopologyMerger {
    /// Return the merged topology and the mapper that rewrites `topology`'s field data onto it.
    fn map(&self, topology: &dyn Topology) -> SisoResult<(Box<dyn Topology>, Mapper)>;
}

/// The default [`TopologyMerger`]: discretizes the master topology once (`nvis = 1`) and
/// treats that as the merged mesh every other basis must already agree with node-for-node.
pub struct UniformTopologyMerger {
    merged: UnstructuredTopology,
}

impl UniformTopologyMerger {
    pub(super) fn from_master(master: &dyn Topology) -> SisoResult<Self> {
        let (discrete, _) = master.discretize(1)?;
        let merged = discrete
            .downcast::<UnstructuredTopology>()
            .map_err(|_| SisoError::CapabilityMismatch {
                component: "BasisMerge",
                zone: None,
                field: None,
            })?;
        Ok(UniformTopologyMerger { merged: *merged })
    }
}

impl TopologyMerger for UniformTopologyMerger {
    fn map(&self, topology: &dyn Topology) -> SisoResult<(Box<dyn Topology>, Mapper)> {
        if topology.num_nodes() != self.merged.num_nodes() {
            return Err(SisoError::CapabilityMismatch {
                component: "BasisMerge",
                zone: None,
                field: None,
            });
        }
        Ok((
            Box::new(self.merged.clone()),
            Mapper::identity(self.merged.num_nodes()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::StructuredTopology;

    #[test]
    fn matching_node_counts_merge_with_identity_mapper() {
        let master = StructuredTopology::new(vec![2, 2]);
        let merger = UniformTopologyMerger::from_master(&master).unwrap();
        let other = StructuredTopology::new(vec![2, 2]);
        let (merged, mapper) = merger.map(&other).unwrap();
        assert_eq!(merged.num_nodes(), master.num_nodes());
        assert_eq!(mapper.num_controlpoints(), master.num_nodes());
    }

    #[test]
    fn mismatched_node_counts_are_a_capability_mismatch() {
        let master = StructuredTopology::new(vec![2, 2]);
        let merger = UniformTopologyMerger::from_master(&master).unwrap();
        let other = StructuredTopology::new(vec![3, 3]);
        assert!(matches!(
            merger.map(&other),
            Err(SisoError::CapabilityMismatch { .. })
        ));
    }
}
