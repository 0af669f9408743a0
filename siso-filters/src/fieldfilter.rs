//! Restricts a source's ordinary fields to a caller-chosen subset, by case-folded name;
//! geometry fields always pass through untouched.

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoResult, Source, SourceProperties, Step,
    Topology, Zone,
};

/// Filters [`Source::fields`] down to those whose name matches one of `allowed` (or all of
/// them, when `allowed` is empty — matching the "no fields" shorthand the assembler uses to
/// mean "this stage is a no-op"). [`Source::geometries`] is never filtered: a geometry field
/// is needed by every later stage and is not a user-selectable output field.
pub struct FieldFilter {
    inner: Box<dyn Source>,
    allowed: Vec<String>,
}

impl FieldFilter {
    pub fn new(inner: Box<dyn Source>, allowed: Vec<String>) -> Self {
        FieldFilter { inner, allowed }
    }

    fn allows(&self, field: &Field) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|name| field.fits_name(name))
    }
}

impl Source for FieldFilter {
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
        self.inner.fields(basis).into_iter().filter(|f| self.allows(f)).collect()
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
        self.inner.topology(step, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        self.inner.field_data(step, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;
    use siso_core::{FieldType, ScalarInterpretation};

    #[test]
    fn keeps_only_allowed_fields_and_passes_geometries() {
        let pressure = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let velocity = Field::new("velocity", FieldType::Scalar(ScalarInterpretation::Generic));
        let geom = Field::new(
            "Geometry",
            FieldType::Geometry {
                num_comps: 2,
                coords: siso_core::CoordinateSystem::Generic,
            },
        );
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", pressure)
            .with_field("mesh", velocity)
            .with_geometry("mesh", geom);
        let filter = FieldFilter::new(Box::new(source), vec!["PRESSURE".to_string()]);
        let basis = Basis::new("mesh");
        let names: Vec<_> = filter.fields(&basis).iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["pressure".to_string()]);
        assert_eq!(filter.geometries(&basis).len(), 1);
    }
}
