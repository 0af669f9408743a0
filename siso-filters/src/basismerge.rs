//! Collapses every basis a source exposes onto one synthetic basis named `"mesh"`, folding
//! each basis' field data onto a single merged topology per zone.

use std::cell::RefCell;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use siso_core::{
    Basis, Field, FieldData, MissingKind, ReaderSettings, SisoError, SisoResult, Source,
    SourceProperties, SourcePropertiesOverride, Step, Topology, TopologyMerger, Zone,
};

const MERGED_BASIS_NAME: &str = "mesh";

/// Chooses a *master basis* — the basis the geometry field used for output lives on, via
/// `use_geometry(geom) -> basis_of(geom)` — and per zone builds a [`TopologyMerger`] from
/// that basis' topology. Every other basis' field data is rewritten onto the merged topology
/// through that same merger. Sets `single_basis=true`.
pub struct BasisMerge {
    inner: Box<dyn Source>,
    master_basis: RefCell<Option<Basis>>,
    mergers: RefCell<FxHashMap<String, Box<dyn TopologyMerger>>>,
}

impl BasisMerge {
    pub fn new(inner: Box<dyn Source>) -> Self {
        BasisMerge {
            inner,
            master_basis: RefCell::new(None),
            mergers: RefCell::new(FxHashMap::default()),
        }
    }

    fn master_basis(&self) -> SisoResult<Basis> {
        if let Some(basis) = self.master_basis.borrow().as_ref() {
            return Ok(basis.clone());
        }
        self.inner
            .bases()
            .into_iter()
            .next()
            .ok_or_else(|| SisoError::Missing {
                kind: MissingKind::Basis,
                name: "<any>".to_string(),
            })
    }
}

impl Source for BasisMerge {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            single_basis: Some(true),
            ..SourcePropertiesOverride::default()
        })
    }

    fn configure(&mut self, settings: &ReaderSettings) -> SisoResult<()> {
        self.inner.configure(settings)
    }

    fn use_geometry(&mut self, field: &Field) -> SisoResult<()> {
        let basis = self.inner.basis_of(field)?;
        *self.master_basis.borrow_mut() = Some(basis);
        self.inner.use_geometry(field)
    }

    fn bases(&self) -> Vec<Basis> {
        vec![Basis::new(MERGED_BASIS_NAME)]
    }

    fn basis_of(&self, _field: &Field) -> SisoResult<Basis> {
        Ok(Basis::new(MERGED_BASIS_NAME))
    }

    fn fields(&self, _basis: &Basis) -> Vec<Field> {
        self.inner
            .bases()
            .into_iter()
            .flat_map(|basis| self.inner.fields(&basis))
            .unique_by(|field| field.name.clone())
            .collect()
    }

    fn geometries(&self, _basis: &Basis) -> Vec<Field> {
        self.inner
            .bases()
            .into_iter()
            .flat_map(|basis| self.inner.geometries(&basis))
            .unique_by(|field| field.name.clone())
            .collect()
    }

    fn steps(&self) -> Vec<Step> {
        self.inner.steps()
    }

    fn zones(&self, _basis: &Basis) -> SisoResult<Vec<Zone>> {
        let master = self.master_basis()?;
        self.inner.zones(&master)
    }

    fn topology(&mut self, step: &Step, _basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        let basis = self.master_basis()?;
        let topology = self.inner.topology(step, &basis, zone)?;
        let merger = topology.create_merger()?;
        let (merged, _mapper) = merger.map(topology.as_ref())?;
        self.mergers.borrow_mut().insert(zone.local_key.clone(), merger);
        Ok(merged)
    }

    fn topology_updates(&self, step: &Step, _basis: &Basis) -> bool {
        let Ok(basis) = self.master_basis() else {
            return true;
        };
        self.inner.topology_updates(step, &basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let field_basis = self.inner.basis_of(field)?;
        let field_topology = self.inner.topology(step, &field_basis, zone)?;
        if !self.mergers.borrow().contains_key(&zone.local_key) {
            log::trace!("BasisMerge: merger cache miss for zone {}", zone.local_key);
            let master_basis = self.master_basis()?;
            let master_topology = self.inner.topology(step, &master_basis, zone)?;
            let merger = master_topology.create_merger()?;
            self.mergers.borrow_mut().insert(zone.local_key.clone(), merger);
        }
        let raw = self.inner.field_data(step, field, zone)?;
        let mergers = self.mergers.borrow();
        let merger = mergers
            .get(&zone.local_key)
            .expect("populated just above");
        let (_, mapper) = merger.map(field_topology.as_ref())?;
        mapper.apply(&raw)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;
    use siso_core::{FieldType, ScalarInterpretation, Shape, StructuredTopology};

    #[test]
    fn merges_matching_bases_onto_a_single_mesh_basis() {
        let pressure = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", pressure.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data("pressure", "z0", FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 1).unwrap());

        let mut merge = BasisMerge::new(Box::new(source));
        assert!(merge.properties().single_basis);
        assert_eq!(merge.bases(), vec![Basis::new("mesh")]);

        let basis = Basis::new("mesh");
        let step = Step::new(0);
        let topology = merge.topology(&step, &basis, &zone).unwrap();
        assert_eq!(topology.num_nodes(), 4);

        let data = merge.field_data(&step, &pressure, &zone).unwrap();
        assert_eq!(data.num_rows(), 4);
    }
}
