//! Invariant-checking wrapper: re-validates shape, row-count and finiteness invariants a
//! misbehaving reader or filter stage might otherwise violate silently.

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, Shape, SisoError, SisoResult, Source,
    SourceProperties, Step, Topology, Zone,
};

/// Wraps a source with checks for: (a) every zone's corner count matches its shape, (b)
/// `field_data` row counts match the zone's topology (`num_cells` for cellwise fields,
/// `num_nodes` otherwise), and (c) no `NaN`/infinite values are emitted. Violations raise
/// [`SisoError::ShapeMismatch`] or [`SisoError::CapabilityMismatch`] rather than panicking;
/// this does not change any [`SourceProperties`] flag.
pub struct Strict {
    inner: Box<dyn Source>,
}

impl Strict {
    pub fn new(inner: Box<dyn Source>) -> Self {
        Strict { inner }
    }

    fn check_zone_shape(zone: &Zone) -> SisoResult<()> {
        let expected = zone.shape.corner_count() * zone.ndim;
        if zone.corners.len() != expected {
            return Err(SisoError::ShapeMismatch {
                expected: format!("{expected} corner coordinates for {:?}", zone.shape),
                actual: format!("{} corner coordinates", zone.corners.len()),
            });
        }
        Ok(())
    }
}

impl Source for Strict {
    fn properties(&self) -> SourceProperties {
        self.inner.properties()
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
        let zones = self.inner.zones(basis)?;
        for zone in &zones {
            Self::check_zone_shape(zone)?;
        }
        Ok(zones)
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        self.inner.topology(step, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let basis = self.inner.basis_of(field)?;
        let topology = self.inner.topology(step, &basis, zone)?;
        let expected = if field.cellwise {
            topology.num_cells()
        } else {
            topology.num_nodes()
        };
        let data = self.inner.field_data(step, field, zone)?;
        if data.num_rows() != expected {
            return Err(SisoError::CapabilityMismatch {
                component: "Strict",
                zone: Some(zone.local_key.clone()),
                field: Some(field.name.clone()),
            });
        }
        if !data.all_finite() {
            return Err(SisoError::CapabilityMismatch {
                component: "Strict",
                zone: Some(zone.local_key.clone()),
                field: Some(field.name.clone()),
            });
        }
        Ok(data)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;
    use siso_core::{FieldType, ScalarInterpretation, StructuredTopology};

    #[test]
    fn rejects_mismatched_field_row_count() {
        let field = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", field.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            // wrong row count: topology has 4 nodes, this only supplies 1
            .with_data("pressure", "z0", FieldData::from_flat(vec![1.0], 1).unwrap());

        let mut strict = Strict::new(Box::new(source));
        let step = Step::new(0);
        let result = strict.field_data(&step, &field, &zone);
        assert!(matches!(result, Err(SisoError::CapabilityMismatch { .. })));
    }

    #[test]
    fn passes_through_well_formed_data() {
        let field = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", field.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data("pressure", "z0", FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 1).unwrap());

        let mut strict = Strict::new(Box::new(source));
        let step = Step::new(0);
        let data = strict.field_data(&step, &field, &zone).unwrap();
        assert_eq!(data.num_rows(), 4);
    }
}
