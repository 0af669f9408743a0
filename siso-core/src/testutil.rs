//! An in-memory, geometry-only [`Source`] fixture for tests.
//!
//! A direct Rust counterpart of the original implementation's `PureGeometry` reader: no file
//! I/O, a single basis named `"mesh"`, a single `Geometry` field, a single step, and zones
//! built directly from the `(corners, topology, control_points)` triples a caller hands it
//! (typically [`crate::topology::from_blob`]'s output). Filter and assembler tests build
//! pipelines over this instead of a real file-format reader.

use crate::basis::Basis;
use crate::error::{MissingKind, SisoError, SisoResult};
use crate::field::FieldData;
use crate::geometry::CoordinateSystem;
use crate::source::{Field, FieldType, ReaderSettings, Source, SourceProperties};
use crate::step::Step;
use crate::topology::{
    DiscreteTopology, LrTopology, SplineTopology, StructuredTopology, Topology,
    UnstructuredTopology,
};
use crate::zone::{Shape, Zone};

pub struct PureGeometry {
    corners: Vec<Vec<f64>>,
    ndim: Vec<usize>,
    topologies: Vec<Box<dyn Topology>>,
    controlpoints: Vec<FieldData<f64>>,
}

impl PureGeometry {
    pub fn new(patches: Vec<(FieldData<f64>, Box<dyn Topology>, FieldData<f64>)>) -> Self {
        let mut corners = Vec::with_capacity(patches.len());
        let mut ndim = Vec::with_capacity(patches.len());
        let mut topologies = Vec::with_capacity(patches.len());
        let mut controlpoints = Vec::with_capacity(patches.len());
        for (c, t, cp) in patches {
            ndim.push(c.num_comps());
            corners.push(c.into_flat());
            topologies.push(t);
            controlpoints.push(cp);
        }
        PureGeometry {
            corners,
            ndim,
            topologies,
            controlpoints,
        }
    }

    fn shape_for(pardim: usize) -> Shape {
        match pardim {
            1 => Shape::Line,
            2 => Shape::Quadrilateral,
            _ => Shape::Hexahedron,
        }
    }

    fn zone_index(zone: &Zone) -> SisoResult<usize> {
        zone.local_key
            .parse()
            .map_err(|_| SisoError::Missing {
                kind: MissingKind::Zone,
                name: zone.local_key.clone(),
            })
    }
}

/// Clone a `Topology` trait object via downcast to one of this crate's known concrete
/// families — the same downcast mechanism [`crate::topology::as_discrete`] uses for the
/// `DiscreteTopology` capability check, reused here since `Topology` itself is deliberately
/// not object-safe-clonable.
fn clone_topology(topology: &dyn Topology) -> Box<dyn Topology> {
    if let Some(t) = topology.downcast_ref::<StructuredTopology>() {
        Box::new(t.clone())
    } else if let Some(t) = topology.downcast_ref::<UnstructuredTopology>() {
        Box::new(t.clone())
    } else if let Some(t) = topology.downcast_ref::<SplineTopology>() {
        Box::new(t.clone())
    } else if let Some(t) = topology.downcast_ref::<LrTopology>() {
        Box::new(t.clone())
    } else {
        unreachable!("PureGeometry is only ever constructed from this crate's own topology types")
    }
}

impl Source for PureGeometry {
    fn properties(&self) -> SourceProperties {
        SourceProperties {
            instantaneous: true,
            globally_keyed: true,
            single_basis: true,
            ..SourceProperties::default()
        }
    }

    fn configure(&mut self, _settings: &ReaderSettings) -> SisoResult<()> {
        Ok(())
    }

    fn use_geometry(&mut self, _field: &Field) -> SisoResult<()> {
        Ok(())
    }

    fn bases(&self) -> Vec<Basis> {
        vec![Basis::new("mesh")]
    }

    fn basis_of(&self, _field: &Field) -> SisoResult<Basis> {
        Ok(Basis::new("mesh"))
    }

    fn fields(&self, _basis: &Basis) -> Vec<Field> {
        Vec::new()
    }

    fn geometries(&self, _basis: &Basis) -> Vec<Field> {
        let num_comps = self.controlpoints.first().map(FieldData::num_comps).unwrap_or(0);
        vec![Field::new(
            "Geometry",
            FieldType::Geometry {
                num_comps,
                coords: CoordinateSystem::Generic,
            },
        )]
    }

    fn steps(&self) -> Vec<Step> {
        vec![Step::new(0)]
    }

    fn zones(&self, _basis: &Basis) -> SisoResult<Vec<Zone>> {
        self.topologies
            .iter()
            .enumerate()
            .map(|(i, topology)| {
                let shape = Self::shape_for(topology.pardim());
                Zone::new(shape, self.ndim[i], self.corners[i].clone(), i.to_string())
            })
            .collect()
    }

    fn topology(
        &mut self,
        _step: &Step,
        _basis: &Basis,
        zone: &Zone,
    ) -> SisoResult<Box<dyn Topology>> {
        let index = Self::zone_index(zone)?;
        let topology = self
            .topologies
            .get(index)
            .ok_or_else(|| SisoError::Missing {
                kind: MissingKind::Zone,
                name: zone.local_key.clone(),
            })?;
        Ok(clone_topology(topology.as_ref()))
    }

    fn topology_updates(&self, step: &Step, _basis: &Basis) -> bool {
        step.index == 0
    }

    fn field_data(&mut self, _step: &Step, _field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let index = Self::zone_index(zone)?;
        self.controlpoints
            .get(index)
            .cloned()
            .ok_or_else(|| SisoError::Missing {
                kind: MissingKind::Zone,
                name: zone.local_key.clone(),
            })
    }

    fn field_updates(&self, step: &Step, _field: &Field) -> bool {
        step.index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::from_blob;

    fn single_patch_fixture() -> PureGeometry {
        let blob = "# LAGRANGIAN\ncells 1 1\nncomps 2\n0 0\n1 0\n0 1\n1 1\n";
        let patch = from_blob(blob.as_bytes()).unwrap();
        PureGeometry::new(vec![patch])
    }

    #[test]
    fn exposes_one_basis_one_step_and_one_geometry_zone() {
        let mut source = single_patch_fixture();
        assert_eq!(source.bases().len(), 1);
        assert_eq!(source.steps().len(), 1);
        let basis = &source.bases()[0];
        let zones = source.zones(basis).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].shape, Shape::Quadrilateral);

        let step = &source.steps()[0];
        let topology = source.topology(step, basis, &zones[0]).unwrap();
        assert_eq!(topology.num_cells(), 1);

        let geometries = source.geometries(basis);
        assert_eq!(geometries.len(), 1);
        let data = source.field_data(step, &geometries[0], &zones[0]).unwrap();
        assert_eq!(data.num_rows(), 4);
    }

    #[test]
    fn topology_is_re_gettable_across_calls() {
        let mut source = single_patch_fixture();
        let basis = &source.bases()[0];
        let zones = source.zones(basis).unwrap();
        let step = &source.steps()[0];
        let first = source.topology(step, basis, &zones[0]).unwrap();
        let second = source.topology(step, basis, &zones[0]).unwrap();
        assert_eq!(first.num_cells(), second.num_cells());
    }
}
