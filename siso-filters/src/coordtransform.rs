//! Converts geometry and vector field data along a fixed chain of coordinate systems.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use siso_core::geometry::{convert_coords, convert_vectors};
use siso_core::{
    Basis, CoordinateSystem, Field, FieldData, ReaderSettings, SisoError, SisoResult, Source,
    SourceProperties, Step, Topology, Zone,
};

/// Applies a fixed hop-by-hop coordinate conversion (as planned by
/// [`siso_core::optimal_system`]) to every geometry field, and the corresponding vector-field
/// rotation to every other vector field, leaving scalars untouched.
///
/// Geometry conversion at each hop caches the pre-conversion point data, keyed by
/// `(system_name, zone)`; the vector conversion for that same hop looks the cached points up
/// to supply the positional context `convert_vectors` needs (e.g. a local east-north-up
/// frame). The cache is populated by reading the geometry field for a zone before any vector
/// field of that zone is read — the assembler and every sink in this workspace follow that
/// order (geometry is always consumed first within a zone).
pub struct CoordTransform {
    inner: Box<dyn Source>,
    path: Vec<CoordinateSystem>,
    points: RefCell<FxHashMap<(&'static str, String), FieldData<f64>>>,
}

impl CoordTransform {
    pub fn new(inner: Box<dyn Source>, path: Vec<CoordinateSystem>) -> Self {
        CoordTransform {
            inner,
            path,
            points: RefCell::new(FxHashMap::default()),
        }
    }

    fn convert_geometry(&self, zone: &Zone, mut data: FieldData<f64>) -> SisoResult<FieldData<f64>> {
        for hop in self.path.windows(2) {
            let (src, tgt) = (&hop[0], &hop[1]);
            self.points
                .borrow_mut()
                .insert((src.name(), zone.local_key.clone()), data.clone());
            data = convert_coords(src, tgt, &data)?;
        }
        Ok(data)
    }

    fn convert_vector(&self, zone: &Zone, mut data: FieldData<f64>) -> SisoResult<FieldData<f64>> {
        for hop in self.path.windows(2) {
            let (src, tgt) = (&hop[0], &hop[1]);
            let key = (src.name(), zone.local_key.clone());
            let points = self.points.borrow();
            let coords = points.get(&key).ok_or_else(|| {
                log::trace!("CoordTransform: point cache miss for {} at zone {}", src.name(), zone.local_key);
                SisoError::CapabilityMismatch {
                    component: "CoordTransform",
                    zone: Some(zone.local_key.clone()),
                    field: None,
                }
            })?;
            data = convert_vectors(src, tgt, &data, coords)?;
        }
        Ok(data)
    }
}

impl Source for CoordTransform {
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
        self.inner.zones(basis)
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        self.inner.topology(step, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let raw = self.inner.field_data(step, field, zone)?;
        if self.path.len() < 2 {
            return Ok(raw);
        }
        if field.is_geometry() {
            self.convert_geometry(zone, raw)
        } else if field.is_vector() {
            self.convert_vector(zone, raw)
        } else {
            Ok(raw)
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
    use siso_core::{Ellipsoid, FieldType, Shape};

    #[test]
    fn converts_geodetic_geometry_to_utm_and_leaves_scalars_alone() {
        let geometry = Field::new(
            "geometry",
            FieldType::Geometry {
                num_comps: 2,
                coords: CoordinateSystem::Geodetic(Ellipsoid::Wgs84),
            },
        );
        let pressure = Field::new("pressure", FieldType::Scalar(siso_core::ScalarInterpretation::Generic));
        let zone = siso_core::Zone::new(Shape::Line, 1, vec![0.0, 1.0], "z0").unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", geometry.clone())
            .with_field("mesh", pressure.clone())
            .with_zone(zone.clone())
            .with_data("geometry", "z0", FieldData::from_flat(vec![15.0, 50.0], 2).unwrap())
            .with_data("pressure", "z0", FieldData::from_flat(vec![42.0], 1).unwrap());

        let path = vec![
            CoordinateSystem::Geodetic(Ellipsoid::Wgs84),
            CoordinateSystem::Utm {
                zone_number: 33,
                zone_letter: 'N',
            },
        ];
        let mut transform = CoordTransform::new(Box::new(source), path);
        let step = Step::new(0);
        let data = transform.field_data(&step, &geometry, &zone).unwrap();
        assert_eq!(data.num_comps(), 2);
        assert!(data.all_finite());

        let scalar = transform.field_data(&step, &pressure, &zone).unwrap();
        assert_eq!(scalar.as_slice(), &[42.0]);
    }

    #[test]
    fn empty_path_is_a_passthrough() {
        let geometry = Field::new(
            "geometry",
            FieldType::Geometry {
                num_comps: 2,
                coords: CoordinateSystem::Generic,
            },
        );
        let zone = siso_core::Zone::new(Shape::Line, 1, vec![0.0, 1.0], "z0").unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", geometry.clone())
            .with_zone(zone.clone())
            .with_data("geometry", "z0", FieldData::from_flat(vec![1.0, 2.0], 2).unwrap());

        let mut transform = CoordTransform::new(Box::new(source), Vec::new());
        let step = Step::new(0);
        let data = transform.field_data(&step, &geometry, &zone).unwrap();
        assert_eq!(data.as_slice(), &[1.0, 2.0]);
    }
}
