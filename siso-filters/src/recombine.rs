//! Derives a new field as the horizontal concatenation of several existing fields' data.

use siso_core::{
    Basis, Field, FieldData, FieldType, ReaderSettings, RecombineFieldSpec, SisoError,
    SisoResult, Source, SourceProperties, SourcePropertiesOverride, Step, Topology,
    VectorInterpretation, Zone,
};

/// For each [`RecombineFieldSpec`], emits a field named `new_name` whose data at read time is
/// `FieldData::concat` of its `source_names`' data, in order. Requires every source field to
/// share the same `cellwise` flag. Clears the `recombine_fields` hint.
pub struct Recombine {
    inner: Box<dyn Source>,
    specs: Vec<RecombineFieldSpec>,
}

impl Recombine {
    pub fn new(inner: Box<dyn Source>, specs: Vec<RecombineFieldSpec>) -> Self {
        Recombine { inner, specs }
    }

    fn spec_for_new_name(&self, name: &str) -> Option<&RecombineFieldSpec> {
        self.specs.iter().find(|s| s.new_name.eq_ignore_ascii_case(name))
    }
}

impl Source for Recombine {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            recombine_fields: Some(false),
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
            if let Some(first) = spec.source_names.first() {
                let source_field = Field::new(first.clone(), field.field_type.clone());
                return self.inner.basis_of(&source_field);
            }
        }
        self.inner.basis_of(field)
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        let originals = self.inner.fields(basis);
        let mut out = originals.clone();
        for spec in &self.specs {
            let sources: Vec<&Field> = spec
                .source_names
                .iter()
                .filter_map(|name| originals.iter().find(|f| f.fits_name(name)))
                .collect();
            if sources.len() != spec.source_names.len() || sources.is_empty() {
                continue;
            }
            let cellwise = sources[0].cellwise;
            let num_comps: usize = sources.iter().map(|f| f.num_comps()).sum();
            let field_type = if num_comps == 1 {
                FieldType::Scalar(siso_core::ScalarInterpretation::Generic)
            } else {
                FieldType::Vector {
                    num_comps,
                    interpretation: VectorInterpretation::Generic,
                }
            };
            out.push(Field::new(spec.new_name.clone(), field_type).cellwise(cellwise));
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
            let basis = self.basis_of(field)?;
            let originals = self.inner.fields(&basis);
            let mut cellwise = None;
            let mut parts = Vec::with_capacity(spec.source_names.len());
            for name in &spec.source_names {
                let descriptor = originals
                    .iter()
                    .find(|f| f.fits_name(name))
                    .cloned()
                    .unwrap_or_else(|| Field::new(name.clone(), field.field_type.clone()));
                match cellwise {
                    None => cellwise = Some(descriptor.cellwise),
                    Some(expected) if expected == descriptor.cellwise => {}
                    Some(_) => {
                        return Err(SisoError::CapabilityMismatch {
                            component: "Recombine",
                            zone: Some(zone.local_key.clone()),
                            field: Some(name.clone()),
                        })
                    }
                }
                parts.push(self.inner.field_data(step, &descriptor, zone)?);
            }
            let refs: Vec<&FieldData<f64>> = parts.iter().collect();
            return FieldData::concat(&refs);
        }
        self.inner.field_data(step, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        if let Some(spec) = self.spec_for_new_name(&field.name) {
            return spec.source_names.iter().any(|name| {
                self.inner
                    .field_updates(step, &Field::new(name.clone(), field.field_type.clone()))
            });
        }
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;
    use siso_core::ScalarInterpretation;

    #[test]
    fn concatenates_source_fields_into_one() {
        let vx = Field::new("vx", FieldType::Scalar(ScalarInterpretation::Generic));
        let vy = Field::new("vy", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone = siso_core::Zone::new(siso_core::Shape::Line, 1, vec![0.0, 1.0], "z0").unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", vx.clone())
            .with_field("mesh", vy.clone())
            .with_zone(zone.clone())
            .with_data("vx", "z0", FieldData::from_flat(vec![1.0, 2.0], 1).unwrap())
            .with_data("vy", "z0", FieldData::from_flat(vec![3.0, 4.0], 1).unwrap());

        let spec = RecombineFieldSpec {
            source_names: vec!["vx".to_string(), "vy".to_string()],
            new_name: "velocity".to_string(),
        };
        let mut recombine = Recombine::new(Box::new(source), vec![spec]);
        let basis = Basis::new("mesh");
        let names: Vec<_> = recombine.fields(&basis).iter().map(|f| f.name.clone()).collect();
        assert!(names.contains(&"velocity".to_string()));

        let step = Step::new(0);
        let velocity = Field::new(
            "velocity",
            FieldType::Vector {
                num_comps: 2,
                interpretation: siso_core::VectorInterpretation::Generic,
            },
        );
        let data = recombine.field_data(&step, &velocity, &zone).unwrap();
        assert_eq!(data.num_comps(), 2);
        assert_eq!(data.row(0), [1.0, 3.0]);
        assert_eq!(data.row(1), [2.0, 4.0]);
    }
}
