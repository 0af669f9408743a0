//! Derives new fields from a subset of an existing field's components.

use siso_core::{
    Basis, Field, FieldData, FieldType, ReaderSettings, ScalarInterpretation, SisoResult, Source,
    SourceProperties, SourcePropertiesOverride, SplitFieldSpec, Step, Topology,
    VectorInterpretation, Zone,
};

/// For each [`SplitFieldSpec`], emits a field named `new_name` carrying the listed component
/// subset of `source_name`'s data; if `destroy`, the original field is suppressed from
/// `fields()`. Clears the `split_fields` hint.
pub struct Split {
    inner: Box<dyn Source>,
    specs: Vec<SplitFieldSpec>,
}

fn component_field_type(source: &FieldType, num_comps: usize) -> FieldType {
    if let FieldType::Geometry { coords, .. } = source {
        return FieldType::Geometry {
            num_comps,
            coords: coords.clone(),
        };
    }
    let interpretation = source.vector_interpretation().unwrap_or(VectorInterpretation::Generic);
    if num_comps == 1 {
        FieldType::Scalar(match interpretation {
            VectorInterpretation::Generic => ScalarInterpretation::Generic,
            VectorInterpretation::Eigenmode => ScalarInterpretation::Eigenmode,
            VectorInterpretation::Displacement => ScalarInterpretation::Displacement,
            VectorInterpretation::Flow => ScalarInterpretation::Flow,
        })
    } else {
        FieldType::Vector { num_comps, interpretation }
    }
}

impl Split {
    pub fn new(inner: Box<dyn Source>, specs: Vec<SplitFieldSpec>) -> Self {
        Split { inner, specs }
    }

    fn spec_for_new_name(&self, name: &str) -> Option<&SplitFieldSpec> {
        self.specs.iter().find(|s| s.new_name.eq_ignore_ascii_case(name))
    }
}

impl Source for Split {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            split_fields: Some(false),
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
        if let Some(spec) = self.spec_for_new_name(&field.name) {
            let source_field = Field::new(spec.source_name.clone(), field.field_type.clone());
            return self.inner.basis_of(&source_field);
        }
        self.inner.basis_of(field)
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        let originals = self.inner.fields(basis);
        let mut out = Vec::new();
        for field in &originals {
            let destroyed = self
                .specs
                .iter()
                .any(|s| s.source_name.eq_ignore_ascii_case(&field.name) && s.destroy);
            if !destroyed {
                out.push(field.clone());
            }
        }
        for spec in &self.specs {
            if let Some(source) = originals.iter().find(|f| f.fits_name(&spec.source_name)) {
                out.push(
                    Field::new(
                        spec.new_name.clone(),
                        component_field_type(&source.field_type, spec.components.len()),
                    )
                    .cellwise(source.cellwise)
                    .splittable(false),
                );
            }
        }
        out
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
        if let Some(spec) = self.spec_for_new_name(&field.name).cloned() {
            let source_field = Field::new(spec.source_name.clone(), field.field_type.clone());
            let raw = self.inner.field_data(step, &source_field, zone)?;
            return raw.slice(&spec.components);
        }
        self.inner.field_data(step, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        if let Some(spec) = self.spec_for_new_name(&field.name) {
            return self.inner.field_updates(step, &Field::new(spec.source_name.clone(), field.field_type.clone()));
        }
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;

    #[test]
    fn derives_a_component_subset_and_optionally_destroys_the_source() {
        let velocity = Field::new(
            "velocity",
            FieldType::Vector {
                num_comps: 3,
                interpretation: VectorInterpretation::Generic,
            },
        );
        let zone = siso_core::Zone::new(siso_core::Shape::Line, 1, vec![0.0, 1.0], "z0").unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", velocity.clone())
            .with_zone(zone.clone())
            .with_data(
                "velocity",
                "z0",
                FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap(),
            );

        let spec = SplitFieldSpec {
            source_name: "velocity".to_string(),
            new_name: "velocity_x".to_string(),
            components: vec![0],
            destroy: false,
        };
        let mut split = Split::new(Box::new(source), vec![spec]);
        let basis = Basis::new("mesh");
        let names: Vec<_> = split.fields(&basis).iter().map(|f| f.name.clone()).collect();
        assert!(names.contains(&"velocity".to_string()));
        assert!(names.contains(&"velocity_x".to_string()));

        let step = Step::new(0);
        let new_field = Field::new("velocity_x", FieldType::Scalar(ScalarInterpretation::Generic));
        let data = split.field_data(&step, &new_field, &zone).unwrap();
        assert_eq!(data.num_comps(), 1);
        assert_eq!(data.as_slice(), &[1.0, 4.0]);
    }
}
