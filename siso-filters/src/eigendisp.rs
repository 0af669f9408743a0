//! Reinterprets eigenmode fields as displacement fields, for sinks that have no notion of
//! eigenmodes but understand displacements.

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoResult, Source, SourceProperties, Step,
    Topology, VectorInterpretation, Zone,
};

/// Rewrites every field whose interpretation is `Eigenmode` to `Displacement`. Leaves the
/// field's name, component count and underlying data untouched — only the advertised
/// [`siso_core::FieldType`] changes, via [`siso_core::FieldType::with_interpretation`].
pub struct EigenDisp {
    inner: Box<dyn Source>,
}

impl EigenDisp {
    pub fn new(inner: Box<dyn Source>) -> Self {
        EigenDisp { inner }
    }

    fn rewrite(field: &Field) -> Field {
        if field.is_eigenmode() {
            let mut rewritten = field.clone();
            rewritten.field_type = field.field_type.with_interpretation(VectorInterpretation::Displacement);
            rewritten
        } else {
            field.clone()
        }
    }
}

impl Source for EigenDisp {
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
        self.inner.fields(basis).iter().map(Self::rewrite).collect()
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
    use siso_core::FieldType;

    #[test]
    fn rewrites_eigenmode_fields_to_displacement_and_leaves_others() {
        let mode = Field::new(
            "mode1",
            FieldType::Vector {
                num_comps: 3,
                interpretation: VectorInterpretation::Eigenmode,
            },
        );
        let velocity = Field::new(
            "velocity",
            FieldType::Vector {
                num_comps: 3,
                interpretation: VectorInterpretation::Generic,
            },
        );
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", mode.clone())
            .with_field("mesh", velocity.clone());

        let eigendisp = EigenDisp::new(Box::new(source));
        let basis = Basis::new("mesh");
        let fields = eigendisp.fields(&basis);
        let mode_out = fields.iter().find(|f| f.name == "mode1").unwrap();
        assert_eq!(mode_out.field_type.vector_interpretation(), Some(VectorInterpretation::Displacement));
        let velocity_out = fields.iter().find(|f| f.name == "velocity").unwrap();
        assert_eq!(velocity_out.field_type.vector_interpretation(), Some(VectorInterpretation::Generic));
    }
}
