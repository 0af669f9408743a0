//! Normalizes a (still-)structured topology into explicit [`UnstructuredTopology`]
//! connectivity, in case an earlier stage left the topology discrete in name only.

use std::cell::RefCell;
use std::collections::HashMap;

use siso_core::{
    as_discrete, Basis, Field, FieldData, Mapper, ReaderSettings, SisoResult, Source,
    SourceProperties, SourcePropertiesOverride, Step, Topology, Zone,
};

/// If the inner source's topology already downcasts to [`siso_core::DiscreteTopology`],
/// forwards it unchanged. Otherwise discretizes at `nvis=1` — which for a structured grid is
/// an identity resampling, exactly preserving `num_nodes` — and rewrites field data with the
/// resulting mapper, the same caching strategy [`crate::discretize::Discretize`] uses.
pub struct ForceUnstructured {
    inner: Box<dyn Source>,
    mappers: RefCell<HashMap<(String, String), Mapper>>,
}

impl ForceUnstructured {
    pub fn new(inner: Box<dyn Source>) -> Self {
        ForceUnstructured {
            inner,
            mappers: RefCell::new(HashMap::new()),
        }
    }

    fn cache_key(basis: &Basis, zone: &Zone) -> (String, String) {
        (basis.name().to_string(), zone.local_key.clone())
    }
}

impl Source for ForceUnstructured {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            discrete_topology: Some(true),
            ..SourcePropertiesOverride::default()
        })
    }

    fn configure(&mut self, settings: &ReaderSettings) -> SisoResult<()> {
        self.inner.configure(settings)
    }

    fn use_geometry(&mut self, field: &Field) -> SisoResult<()> {
        self.inner.use_geometry(field)
    }

    fn bases(&self) -> Vec<Basis> {
        self.inner.bases()
    }

    fn basis_of(&self, field: &Field) -> SisoResult<Basis> {
        self.inner.basis_of(field)
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        self.inner.fields(basis)
    }

    fn geometries(&self, basis: &Basis) -> Vec<Field> {
        self.inner.geometries(basis)
    }

    fn steps(&self) -> Vec<Step> {
        self.inner.steps()
    }

    fn zones(&self, basis: &Basis) -> SisoResult<Vec<Zone>> {
        self.inner.zones(basis)
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        let topology = self.inner.topology(step, basis, zone)?;
        if as_discrete(topology.as_ref()).is_some() {
            return Ok(topology);
        }
        let (discrete, mapper) = topology.discretize(1)?;
        self.mappers.borrow_mut().insert(Self::cache_key(basis, zone), mapper);
        Ok(discrete)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let basis = self.inner.basis_of(field)?;
        let key = Self::cache_key(&basis, zone);
        if !self.mappers.borrow().contains_key(&key) {
            // Populates the cache (or confirms no remap is needed) without discarding the
            // topology value the caller might request separately.
            self.topology(step, &basis, zone)?;
        }
        let raw = self.inner.field_data(step, field, zone)?;
        let mappers = self.mappers.borrow();
        match mappers.get(&key) {
            Some(mapper) => mapper.apply(&raw),
            None => Ok(raw),
        }
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
    fn rebuilds_a_structured_topology_preserving_node_and_cell_counts() {
        let pressure = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", pressure.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data("pressure", "z0", FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 1).unwrap());

        let mut force = ForceUnstructured::new(Box::new(source));
        let basis = Basis::new("mesh");
        let step = Step::new(0);
        let topology = force.topology(&step, &basis, &zone).unwrap();
        assert_eq!(topology.num_nodes(), 4);
        assert_eq!(topology.num_cells(), 1);
        assert!(as_discrete(topology.as_ref()).is_some());
        let data = force.field_data(&step, &pressure, &zone).unwrap();
        assert_eq!(data.num_rows(), 4);
    }
}
