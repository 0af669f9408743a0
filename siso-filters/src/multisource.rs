//! Concatenates timesteps across several sources that share an identical field/zone layout.

use siso_core::{
    Basis, Field, FieldData, ReaderSettings, SisoError, SisoResult, Source, SourceProperties,
    SourcePropertiesOverride, Step, Topology, Zone,
};

/// Presents several sources' timesteps as one continuous sequence, in source order. Reads
/// `bases`/`fields`/`geometries`/`zones` from the first source only — the layout is assumed
/// identical across all of them, which the assembler is responsible for validating before
/// construction. Maintains a prefix table of cumulative step counts, built lazily the first
/// time `steps()` or a per-step method is called, and bisected by `source_at` to route a
/// global step index to its owning source and that source's own local [`Step`]. Forces
/// `instantaneous=false`, since a sink can no longer assume any one step is a complete
/// standalone snapshot relative to the others it will see.
pub struct MultiSource {
    sources: Vec<Box<dyn Source>>,
    prefix: Vec<usize>,
}

impl MultiSource {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        MultiSource { sources, prefix: Vec::new() }
    }

    fn ensure_prefix(&mut self) {
        if !self.prefix.is_empty() || self.sources.is_empty() {
            return;
        }
        let mut total = 0usize;
        let mut prefix = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            total += source.steps().len();
            prefix.push(total);
        }
        self.prefix = prefix;
    }

    /// Bisects the prefix table for the source owning global step `index`, returning its
    /// index into `self.sources` and the local [`Step`] within that source.
    fn source_at(&self, index: usize) -> SisoResult<(usize, Step)> {
        let source_index = self
            .prefix
            .partition_point(|&cumulative| cumulative <= index);
        if source_index >= self.sources.len() {
            return Err(SisoError::Missing {
                kind: siso_core::MissingKind::Zone,
                name: format!("global step {index}"),
            });
        }
        let local_offset = if source_index == 0 { 0 } else { self.prefix[source_index - 1] };
        let local_index = index - local_offset;
        let local_step = self.sources[source_index]
            .steps()
            .get(local_index)
            .cloned()
            .ok_or_else(|| SisoError::Missing {
                kind: siso_core::MissingKind::Zone,
                name: format!("global step {index}"),
            })?;
        Ok((source_index, local_step))
    }
}

impl Source for MultiSource {
    fn properties(&self) -> SourceProperties {
        let base = self.sources.first().map(|s| s.properties()).unwrap_or_default();
        base.update(SourcePropertiesOverride {
            instantaneous: Some(false),
            ..SourcePropertiesOverride::default()
        })
    }

    fn configure(&mut self, settings: &ReaderSettings) -> SisoResult<()> {
        for source in &mut self.sources {
            source.configure(settings)?;
        }
        Ok(())
    }

    fn use_geometry(&mut self, field: &Field) -> SisoResult<()> {
        for source in &mut self.sources {
            source.use_geometry(field)?;
        }
        Ok(())
    }

    fn bases(&self) -> Vec<Basis> {
        self.sources.first().map(|s| s.bases()).unwrap_or_default()
    }

    fn basis_of(&self, field: &Field) -> SisoResult<Basis> {
        match self.sources.first() {
            Some(source) => source.basis_of(field),
            None => Err(SisoError::Missing {
                kind: siso_core::MissingKind::Basis,
                name: field.name.clone(),
            }),
        }
    }

    fn fields(&self, basis: &Basis) -> Vec<Field> {
        self.sources.first().map(|s| s.fields(basis)).unwrap_or_default()
    }

    fn geometries(&self, basis: &Basis) -> Vec<Field> {
        self.sources.first().map(|s| s.geometries(basis)).unwrap_or_default()
    }

    fn steps(&self) -> Vec<Step> {
        let mut global_index = 0usize;
        let mut out = Vec::new();
        for source in &self.sources {
            for local in source.steps() {
                out.push(Step { index: global_index, value: local.value });
                global_index += 1;
            }
        }
        out
    }

    fn zones(&self, basis: &Basis) -> SisoResult<Vec<Zone>> {
        match self.sources.first() {
            Some(source) => source.zones(basis),
            None => Ok(Vec::new()),
        }
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        self.ensure_prefix();
        let (source_index, local_step) = self.source_at(step.index)?;
        self.sources[source_index].topology(&local_step, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        match self.source_at(step.index) {
            Ok((source_index, local_step)) => self.sources[source_index].topology_updates(&local_step, basis),
            Err(_) => false,
        }
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        self.ensure_prefix();
        let (source_index, local_step) = self.source_at(step.index)?;
        self.sources[source_index].field_data(&local_step, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        match self.source_at(step.index) {
            Ok((source_index, local_step)) => self.sources[source_index].field_updates(&local_step, field),
            Err(_) => false,
        }
    }
}
