//! Lowers a source's (possibly parametric) topology to an explicit discrete mesh sampled
//! `nvis` times per parametric direction, remapping field data onto the sampled nodes.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use siso_core::{
    Basis, Field, FieldData, Mapper, ReaderSettings, SisoResult, Source, SourceProperties,
    SourcePropertiesOverride, Step, Topology, Zone,
};

/// The nodal mapper `Topology::discretize` hands back, alongside the `Topology::cell_mapper`
/// built from the same (pre-discretization) topology for `cellwise` fields (see SPEC_FULL.md
/// §4.2).
struct CachedMappers {
    nodal: Mapper,
    cell: Mapper,
}

/// Overrides `topology()` to call [`Topology::discretize`], caching the returned [`Mapper`]
/// per `(basis, zone)`; overrides `field_data()` to apply that cached mapper to the inner
/// source's control-point data, routing `cellwise` fields through [`Topology::cell_mapper`]
/// instead of the nodal one. Sets `discrete_topology=true`.
pub struct Discretize {
    inner: Box<dyn Source>,
    nvis: usize,
    mappers: RefCell<FxHashMap<(String, String), CachedMappers>>,
}

impl Discretize {
    pub fn new(inner: Box<dyn Source>, nvis: usize) -> Self {
        Discretize {
            inner,
            nvis,
            mappers: RefCell::new(FxHashMap::default()),
        }
    }

    fn cache_key(basis: &Basis, zone: &Zone) -> (String, String) {
        (basis.name().to_string(), zone.local_key.clone())
    }
}

impl Source for Discretize {
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
        let source_topology = self.inner.topology(step, basis, zone)?;
        let cell = source_topology.cell_mapper(self.nvis)?;
        let (discrete, nodal) = source_topology.discretize(self.nvis)?;
        self.mappers
            .borrow_mut()
            .insert(Self::cache_key(basis, zone), CachedMappers { nodal, cell });
        Ok(discrete)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let basis = self.inner.basis_of(field)?;
        let key = Self::cache_key(&basis, zone);
        if !self.mappers.borrow().contains_key(&key) {
            log::trace!("Discretize: mapper cache miss for zone {}", zone.local_key);
            self.topology(step, &basis, zone)?;
        }
        let control_points = self.inner.field_data(step, field, zone)?;
        let mappers = self.mappers.borrow();
        let cached = mappers.get(&key).expect("populated by topology() just above");
        if field.cellwise {
            cached.cell.apply(&control_points)
        } else {
            cached.nodal.apply(&control_points)
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
    use siso_core::{FieldType, Shape, StructuredTopology};

    #[test]
    fn preserves_node_and_cell_counts_for_a_structured_topology() {
        let geometry = Field::new(
            "Geometry",
            FieldType::Geometry {
                num_comps: 2,
                coords: siso_core::CoordinateSystem::Generic,
            },
        );
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_geometry("mesh", geometry.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data(
                "Geometry",
                "z0",
                FieldData::from_flat(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2).unwrap(),
            );

        let mut discretize = Discretize::new(Box::new(source), 1);
        assert!(discretize.properties().discrete_topology);
        let basis = Basis::new("mesh");
        let step = Step::new(0);
        let topology = discretize.topology(&step, &basis, &zone).unwrap();
        assert_eq!(topology.num_nodes(), 4);
        assert_eq!(topology.num_cells(), 1);

        let data = discretize.field_data(&step, &geometry, &zone).unwrap();
        assert_eq!(data.num_rows(), 4);
    }

    #[test]
    fn cellwise_field_routes_through_the_cell_mapper() {
        let geometry = Field::new(
            "Geometry",
            FieldType::Geometry {
                num_comps: 2,
                coords: siso_core::CoordinateSystem::Generic,
            },
        );
        let pressure = Field::new("pressure", FieldType::Scalar(siso_core::ScalarInterpretation::Generic))
            .cellwise(true);
        let zone = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "z0")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_geometry("mesh", geometry.clone())
            .with_field("mesh", pressure.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data(
                "Geometry",
                "z0",
                FieldData::from_flat(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2).unwrap(),
            )
            // one cell, one control value
            .with_data("pressure", "z0", FieldData::from_flat(vec![7.0], 1).unwrap());

        let mut discretize = Discretize::new(Box::new(source), 1);
        let basis = Basis::new("mesh");
        let step = Step::new(0);
        discretize.topology(&step, &basis, &zone).unwrap();

        let data = discretize.field_data(&step, &pressure, &zone).unwrap();
        assert_eq!(data.num_rows(), 1);
        assert_eq!(data.row(0), [7.0]);
    }

    #[test]
    fn cellwise_field_on_a_refined_spline_inherits_its_parent_cells_value() {
        use std::sync::Arc;

        use siso_core::LinearEvaluator;

        let geometry = Field::new(
            "Geometry",
            FieldType::Geometry {
                num_comps: 1,
                coords: siso_core::CoordinateSystem::Generic,
            },
        );
        let density = Field::new("density", FieldType::Scalar(siso_core::ScalarInterpretation::Generic))
            .cellwise(true);
        let zone = Zone::new(Shape::Line, 1, vec![0.0, 2.0], "z0").unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_geometry("mesh", geometry)
            .with_field("mesh", density.clone())
            .with_zone(zone.clone())
            .with_topology("z0", || {
                Box::new(siso_core::SplineTopology::new(vec![2], Arc::new(LinearEvaluator)))
            })
            // 2 original cells, one density value each
            .with_data("density", "z0", FieldData::from_flat(vec![10.0, 20.0], 1).unwrap());

        let mut discretize = Discretize::new(Box::new(source), 2);
        let basis = Basis::new("mesh");
        let step = Step::new(0);
        discretize.topology(&step, &basis, &zone).unwrap();

        let data = discretize.field_data(&step, &density, &zone).unwrap();
        // 2 cells * nvis(2) subdivisions = 4 refined cells, each copying its parent's value.
        assert_eq!(data.as_slice(), &[10.0, 10.0, 20.0, 20.0]);
    }
}
