//! Emits `<name>_x`, `<name>_y`, `<name>_z` component fields alongside every splittable
//! vector field, leaving the original field in place.

use siso_core::{
    Basis, Field, FieldData, FieldType, ReaderSettings, ScalarInterpretation, SisoResult,
    Source, SourceProperties, Step, Topology, Zone,
};

const SUFFIXES: [&str; 3] = ["x", "y", "z"];

/// Decomposes every field with `splittable=true` and a vector type into up to three
/// single-component fields named with the `_x`/`_y`/`_z` suffixes, one per leading component
/// (a 4th-or-later component is not decomposed — see the workspace design notes). The
/// original field is always kept.
pub struct Decompose {
    inner: Box<dyn Source>,
}

impl Decompose {
    pub fn new(inner: Box<dyn Source>) -> Self {
        Decompose { inner }
    }

    fn find_component(&self, name: &str) -> Option<(Field, usize)> {
        for basis in self.inner.bases() {
            for field in self.inner.fields(&basis) {
                if !field.splittable || !field.is_vector() {
                    continue;
                }
                for (index, suffix) in SUFFIXES.iter().enumerate().take(field.num_comps().min(3)) {
                    if name.eq_ignore_ascii_case(&format!("{}_{suffix}", field.name)) {
                        return Some((field.clone(), index));
                    }
                }
            }
        }
        None
    }
}

impl Source for Decompose {
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
        if let Some((source, _)) = self.find_component(&field.name) {
            return self.inner.basis_of(&source);
        }
        self.inner.basis_of(field)
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        let originals = self.inner.fields(basis);
        let mut out = originals.clone();
        for field in &originals {
            if !field.splittable || !field.is_vector() {
                continue;
            }
            for suffix in SUFFIXES.iter().take(field.num_comps().min(3)) {
                out.push(
                    Field::new(format!("{}_{suffix}", field.name), FieldType::Scalar(ScalarInterpretation::Generic))
                        .cellwise(field.cellwise),
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
        if let Some((source, component)) = self.find_component(&field.name) {
            let data = self.inner.field_data(step, &source, zone)?;
            return data.slice(&[component]);
        }
        self.inner.field_data(step, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        if let Some((source, _)) = self.find_component(&field.name) {
            return self.inner.field_updates(step, &source);
        }
        self.inner.field_updates(step, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;
    use siso_core::VectorInterpretation;

    #[test]
    fn decomposing_then_selecting_a_component_equals_the_slice() {
        let velocity = Field::new(
            "velocity",
            FieldType::Vector {
                num_comps: 3,
                interpretation: VectorInterpretation::Generic,
            },
        )
        .splittable(true);
        let zone = siso_core::Zone::new(siso_core::Shape::Line, 1, vec![0.0, 1.0], "z0").unwrap();
        let raw = FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", velocity.clone())
            .with_zone(zone.clone())
            .with_data("velocity", "z0", raw.clone());

        let mut decompose = Decompose::new(Box::new(source));
        let basis = Basis::new("mesh");
        let names: Vec<_> = decompose.fields(&basis).iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["velocity", "velocity_x", "velocity_y", "velocity_z"]);

        let step = Step::new(0);
        let vy = Field::new("velocity_y", FieldType::Scalar(ScalarInterpretation::Generic));
        let data = decompose.field_data(&step, &vy, &zone).unwrap();
        assert_eq!(data.as_slice(), raw.slice(&[1]).unwrap().as_slice());
    }
}
