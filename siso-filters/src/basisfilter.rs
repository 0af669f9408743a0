//! Restricts a source to a caller-chosen subset of bases, by case-folded name.

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoResult, Source, SourceProperties, Step,
    Topology, Zone,
};

/// Filters [`Source::bases`] down to those whose name matches one of `allowed_names`
/// (case-insensitively). Every other method forwards straight through; no property change.
pub struct BasisFilter {
    inner: Box<dyn Source>,
    allowed_names: Vec<String>,
}

impl BasisFilter {
    pub fn new(inner: Box<dyn Source>, allowed_names: Vec<String>) -> Self {
        BasisFilter { inner, allowed_names }
    }

    fn allows(&self, basis: &Basis) -> bool {
        self.allowed_names.iter().any(|name| basis.fits_name(name))
    }
}

impl Source for BasisFilter {
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
        self.inner.bases().into_iter().filter(|b| self.allows(b)).collect()
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

    #[test]
    fn keeps_only_allowed_bases() {
        let source = FixtureSource::new().with_basis("mesh").with_basis("aux");
        let filter = BasisFilter::new(Box::new(source), vec!["MESH".to_string()]);
        let names: Vec<_> = filter.bases().iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, vec!["mesh".to_string()]);
    }
}
