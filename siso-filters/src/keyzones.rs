//! Assigns stable global zone keys by corner-vertex coincidence, via
//! [`siso_core::vertexdict::ZoneManager`].

use std::cell::RefCell;

use siso_core::vertexdict::ZoneManager;
use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoError, SisoResult, Source, SourceProperties,
    SourcePropertiesOverride, Step, Topology, Zone,
};

/// Feeds every zone yielded by the inner source through a [`ZoneManager`], so zones shared
/// across patches (coincident corners, within tolerance) resolve to the same `global_key`.
/// Sets `globally_keyed=true`. Precondition (checked at construction): the inner source must
/// not already be globally keyed — stacking two `KeyZones` would silently re-key already
/// stable identifiers.
pub struct KeyZones {
    inner: Box<dyn Source>,
    manager: RefCell<ZoneManager>,
}

impl KeyZones {
    pub fn new(inner: Box<dyn Source>) -> SisoResult<Self> {
        if inner.properties().globally_keyed {
            return Err(SisoError::CapabilityMismatch {
                component: "KeyZones",
                zone: None,
                field: None,
            });
        }
        Ok(KeyZones {
            inner,
            manager: RefCell::new(ZoneManager::new()),
        })
    }
}

impl Source for KeyZones {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            globally_keyed: Some(true),
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
        let zones = self.inner.zones(basis)?;
        let mut manager = self.manager.borrow_mut();
        Ok(zones.iter().map(|zone| manager.lookup(zone)).collect())
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
