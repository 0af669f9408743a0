//! A hand-built in-memory [`siso_core::Source`] for filter tests that need more than
//! [`siso_core::testutil::PureGeometry`] offers — several bases, ordinary scalar/vector
//! fields alongside geometry, or more than one zone. Test-only, mirroring the spirit of the
//! original implementation's `PureGeometry` fixture but generalized for this crate's own
//! filter stages rather than duplicated ad hoc in every test module.

use std::collections::HashMap;

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoError, SisoResult, Source, SourceProperties,
    Step, Topology, Zone,
};

type TopologyFactory = Box<dyn Fn() -> Box<dyn Topology>>;

#[derive(Default)]
pub struct FixtureSource {
    pub properties: SourceProperties,
    bases: Vec<Basis>,
    basis_of: HashMap<String, String>,
    fields: HashMap<String, Vec<Field>>,
    geometries: HashMap<String, Vec<Field>>,
    steps: Vec<Step>,
    zones: Vec<Zone>,
    topologies: HashMap<String, TopologyFactory>,
    data: HashMap<(String, String), FieldData<f64>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        FixtureSource {
            steps: vec![Step::new(0)],
            ..FixtureSource::default()
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_basis(mut self, basis: &str) -> Self {
        self.bases.push(Basis::new(basis));
        self
    }

    pub fn with_field(mut self, basis: &str, field: Field) -> Self {
        self.basis_of.insert(field.name.clone(), basis.to_string());
        self.fields.entry(basis.to_string()).or_default().push(field);
        self
    }

    pub fn with_geometry(mut self, basis: &str, field: Field) -> Self {
        self.basis_of.insert(field.name.clone(), basis.to_string());
        self.geometries.entry(basis.to_string()).or_default().push(field);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn with_topology(
        mut self,
        zone_local_key: &str,
        factory: impl Fn() -> Box<dyn Topology> + 'static,
    ) -> Self {
        self.topologies.insert(zone_local_key.to_string(), Box::new(factory));
        self
    }

    pub fn with_data(mut self, field_name: &str, zone_local_key: &str, data: FieldData<f64>) -> Self {
        self.data.insert((field_name.to_string(), zone_local_key.to_string()), data);
        self
    }
}

impl Source for FixtureSource {
    fn properties(&self) -> SourceProperties {
        self.properties
    }

    fn configure(&mut self, _settings: &ReaderSettings) -> SisoResult<()> {
        Ok(())
    }

    fn use_geometry(&mut self, _field: &Field) -> SisoResult<()> {
        Ok(())
    }

    fn bases(&self) -> Vec<Basis> {
        self.bases.clone()
    }

    fn basis_of(&self, field: &Field) -> SisoResult<Basis> {
        self.basis_of
            .get(&field.name)
            .map(|name| Basis::new(name.clone()))
            .ok_or_else(|| SisoError::Missing {
                kind: siso_core::MissingKind::Basis,
                name: field.name.clone(),
            })
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        self.fields.get(basis.name()).cloned().unwrap_or_default()
    }

    fn geometries(&self, basis: &Basis) -> Vec<Field> {
        self.geometries.get(basis.name()).cloned().unwrap_or_default()
    }

    fn steps(&self) -> Vec<Step> {
        self.steps.clone()
    }

    fn zones(&self, _basis: &Basis) -> SisoResult<Vec<Zone>> {
        Ok(self.zones.clone())
    }

    fn topology(&mut self, _step: &Step, _basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        self.topologies
            .get(&zone.local_key)
            .map(|factory| factory())
            .ok_or_else(|| SisoError::Missing {
                kind: siso_core::MissingKind::Zone,
                name: zone.local_key.clone(),
            })
    }

    fn topology_updates(&self, step: &Step, _basis: &Basis) -> bool {
        step.index == 0
    }

    fn field_data(&mut self, _step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        self.data
            .get(&(field.name.clone(), zone.local_key.clone()))
            .cloned()
            .ok_or_else(|| SisoError::Missing {
                kind: siso_core::MissingKind::Field,
                name: field.name.clone(),
            })
    }

    fn field_updates(&self, step: &Step, _field: &Field) -> bool {
        step.index == 0
    }
}
