//! Fuses every zone of a basis into one, joining node arrays and renumbering cell
//! connectivity so the whole basis is addressable as a single zone.

use siso_core::{
    as_discrete, Basis, Field, FieldData, ReaderSettings, Shape, SisoError, SisoResult, Source,
    SourceProperties, SourcePropertiesOverride, Step, Topology, UnstructuredTopology, Zone,
};

const MERGED_ZONE_KEY: &str = "merged";

/// Collapses all zones a basis exposes into a single synthetic zone: node arrays are
/// concatenated zone-by-zone (in `Source::zones` order) and every zone's cell connectivity
/// is renumbered by adding the running node-count offset of the zones ahead of it. Requires
/// the inner source's topology to already be a [`siso_core::DiscreteTopology`] (the
/// assembler only inserts this stage after ensuring that, via `Discretize(1)` if needed).
/// Sets `single_zoned=true`.
pub struct ZoneMerge {
    inner: Box<dyn Source>,
}

impl ZoneMerge {
    pub fn new(inner: Box<dyn Source>) -> Self {
        ZoneMerge { inner }
    }

    fn merged_zone(&self, basis: &Basis) -> SisoResult<Option<Zone>> {
        let zones = self.inner.zones(basis)?;
        Ok(zones.into_iter().next().map(|first| Zone {
            local_key: MERGED_ZONE_KEY.to_string(),
            global_key: first.global_key,
            ..first
        }))
    }
}

impl Source for ZoneMerge {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            single_zoned: Some(true),
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
        Ok(self.merged_zone(basis)?.into_iter().collect())
    }

    fn topology(&mut self, step: &Step, basis: &Basis, _zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        let source_zones = self.inner.zones(basis)?;
        let mut node_offset = 0usize;
        let mut celltype: Option<Shape> = None;
        let mut merged_cells = Vec::new();
        for zone in &source_zones {
            let topology = self.inner.topology(step, basis, zone)?;
            let discrete = as_discrete(topology.as_ref()).ok_or_else(|| SisoError::CapabilityMismatch {
                component: "ZoneMerge",
                zone: Some(zone.local_key.clone()),
                field: None,
            })?;
            match celltype {
                None => celltype = Some(discrete.celltype()),
                Some(expected) if expected == discrete.celltype() => {}
                Some(_) => {
                    return Err(SisoError::CapabilityMismatch {
                        component: "ZoneMerge",
                        zone: Some(zone.local_key.clone()),
                        field: None,
                    })
                }
            }
            let cells = discrete.cells();
            for row in 0..cells.num_rows() {
                merged_cells.extend(cells.row(row).iter().map(|&node| node + node_offset));
            }
            node_offset += topology.num_nodes();
        }
        let celltype = celltype.ok_or_else(|| SisoError::CapabilityMismatch {
            component: "ZoneMerge",
            zone: None,
            field: None,
        })?;
        let cells = FieldData::from_flat(merged_cells, celltype.corner_count())?;
        let pardim = match celltype {
            Shape::Line => 1,
            Shape::Quadrilateral => 2,
            Shape::Hexahedron => 3,
        };
        Ok(Box::new(UnstructuredTopology::new(node_offset, cells, pardim)?))
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        self.inner.topology_updates(step, basis)
    }

    fn field_data(&mut self, step: &Step, field: &Field, _zone: &Zone) -> SisoResult<FieldData<f64>> {
        let basis = self.inner.basis_of(field)?;
        let source_zones = self.inner.zones(&basis)?;
        let mut parts = Vec::with_capacity(source_zones.len());
        for zone in &source_zones {
            parts.push(self.inner.field_data(step, field, zone)?);
        }
        let refs: Vec<&FieldData<f64>> = parts.iter().collect();
        FieldData::join(&refs)
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
    fn joins_node_arrays_and_renumbers_cells() {
        let pressure = Field::new("pressure", FieldType::Scalar(ScalarInterpretation::Generic));
        let zone_a = Zone::new(Shape::Quadrilateral, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], "a")
            .unwrap();
        let zone_b = Zone::new(Shape::Quadrilateral, 2, vec![2.0, 0.0, 3.0, 0.0, 2.0, 1.0, 3.0, 1.0], "b")
            .unwrap();
        let source = FixtureSource::new()
            .with_basis("mesh")
            .with_field("mesh", pressure.clone())
            .with_zone(zone_a.clone())
            .with_zone(zone_b.clone())
            .with_topology("a", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_topology("b", || Box::new(StructuredTopology::new(vec![1, 1])))
            .with_data("pressure", "a", FieldData::from_flat(vec![1.0, 2.0, 3.0, 4.0], 1).unwrap())
            .with_data("pressure", "b", FieldData::from_flat(vec![5.0, 6.0, 7.0, 8.0], 1).unwrap());

        // Discretize first, since ZoneMerge requires an already-discrete topology.
        let mut merge = ZoneMerge::new(Box::new(crate::discretize::Discretize::new(Box::new(source), 1)));
        assert!(merge.properties().single_zoned);

        let basis = Basis::new("mesh");
        let step = Step::new(0);
        let zones = merge.zones(&basis).unwrap();
        assert_eq!(zones.len(), 1);

        let topology = merge.topology(&step, &basis, &zones[0]).unwrap();
        assert_eq!(topology.num_nodes(), 8);
        assert_eq!(topology.num_cells(), 2);

        let data = merge.field_data(&step, &pressure, &zones[0]).unwrap();
        assert_eq!(data.num_rows(), 8);
    }
}
