//! Groups source timesteps into slabs and exposes one representative step per slab.

use siso_core::{Basis, Field, FieldData, ReaderSettings, SisoResult, Source, SourceProperties, SourcePropertiesOverride, Step, Topology, Zone};

/// Python-`list[start:stop:step]` index selection over `0..n`, used as slab boundaries: every
/// selected index closes a slab that began right after the previous one (the first slab
/// always starts at 0). A non-positive `step`, or a selection that picks nothing, yields no
/// slabs at all, matching "empty or out-of-range yields nothing".
fn slice_indices(n: usize, start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Vec<usize> {
    let step = step.unwrap_or(1);
    if step <= 0 || n == 0 {
        return Vec::new();
    }
    let n_isize = n as isize;
    let normalize = |v: isize| -> isize {
        if v < 0 {
            (v + n_isize).max(0)
        } else {
            v
        }
    };
    let start = normalize(start.unwrap_or(0)).clamp(0, n_isize);
    let stop = normalize(stop.unwrap_or(n_isize)).clamp(0, n_isize);
    let mut out = Vec::new();
    let mut i = start;
    while i < stop {
        out.push(i as usize);
        i += step;
    }
    out
}

fn slabs_from_boundaries(steps: &[Step], boundaries: &[usize]) -> Vec<Vec<Step>> {
    let mut groups = Vec::with_capacity(boundaries.len());
    let mut begin = 0usize;
    for &end in boundaries {
        groups.push(steps[begin..=end].to_vec());
        begin = end + 1;
    }
    groups
}

fn output_steps(groups: &[Vec<Step>]) -> Vec<Step> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| Step {
            index,
            value: group.last().and_then(|s| s.value),
        })
        .collect()
}

/// Groups source steps into slabs via Python-style slice boundaries and emits one output
/// step per slab, backed by the last member of that slab. `field_updates` is the logical OR
/// over every member's `field_updates`.
pub struct StepSlice {
    inner: Box<dyn Source>,
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
}

impl StepSlice {
    pub fn new(inner: Box<dyn Source>, start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        StepSlice { inner, start, stop, step }
    }

    fn groups(&self) -> Vec<Vec<Step>> {
        let source_steps = self.inner.steps();
        let boundaries = slice_indices(source_steps.len(), self.start, self.stop, self.step);
        slabs_from_boundaries(&source_steps, &boundaries)
    }
}

impl Source for StepSlice {
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
        output_steps(&self.groups())
    }

    fn zones(&self, basis: &Basis) -> SisoResult<Vec<Zone>> {
        self.inner.zones(basis)
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        let groups = self.groups();
        let last = groups.get(step.index).and_then(|g| g.last()).cloned().unwrap_or_else(|| step.clone());
        self.inner.topology(&last, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        let groups = self.groups();
        match groups.get(step.index) {
            Some(group) => group.iter().any(|member| self.inner.topology_updates(member, basis)),
            None => false,
        }
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let groups = self.groups();
        let last = groups.get(step.index).and_then(|g| g.last()).cloned().unwrap_or_else(|| step.clone());
        self.inner.field_data(&last, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        let groups = self.groups();
        match groups.get(step.index) {
            Some(group) => group.iter().any(|member| self.inner.field_updates(member, field)),
            None => false,
        }
    }
}

/// A [`StepSlice`] that always collapses every source step into a single slab. Sets
/// `instantaneous=true`, since the sink now sees exactly one timestep.
pub struct LastTime {
    inner: Box<dyn Source>,
}

impl LastTime {
    pub fn new(inner: Box<dyn Source>) -> Self {
        LastTime { inner }
    }

    fn groups(&self) -> Vec<Vec<Step>> {
        let source_steps = self.inner.steps();
        if source_steps.is_empty() {
            Vec::new()
        } else {
            vec![source_steps]
        }
    }
}

impl Source for LastTime {
    fn properties(&self) -> SourceProperties {
        self.inner.properties().update(SourcePropertiesOverride {
            instantaneous: Some(true),
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
        output_steps(&self.groups())
    }

    fn zones(&self, basis: &Basis) -> SisoResult<Vec<Zone>> {
        self.inner.zones(basis)
    }

    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>> {
        let groups = self.groups();
        let last = groups.get(step.index).and_then(|g| g.last()).cloned().unwrap_or_else(|| step.clone());
        self.inner.topology(&last, basis, zone)
    }

    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool {
        let groups = self.groups();
        match groups.get(step.index) {
            Some(group) => group.iter().any(|member| self.inner.topology_updates(member, basis)),
            None => false,
        }
    }

    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>> {
        let groups = self.groups();
        let last = groups.get(step.index).and_then(|g| g.last()).cloned().unwrap_or_else(|| step.clone());
        self.inner.field_data(&last, field, zone)
    }

    fn field_updates(&self, step: &Step, field: &Field) -> bool {
        let groups = self.groups();
        match groups.get(step.index) {
            Some(group) => group.iter().any(|member| self.inner.field_updates(member, field)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureSource;

    fn three_step_source() -> FixtureSource {
        FixtureSource::new().with_basis("mesh").with_steps(vec![Step::new(0), Step::new(1), Step::new(2)])
    }

    #[test]
    fn full_open_slice_is_identity_on_steps() {
        let mut slice = StepSlice::new(Box::new(three_step_source()), None, None, None);
        let steps = slice.steps();
        assert_eq!(steps.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn last_time_yields_one_step_covering_every_member() {
        let mut last = LastTime::new(Box::new(three_step_source()));
        let steps = last.steps();
        assert_eq!(steps.len(), 1);
        assert!(last.properties().instantaneous);
        assert_eq!(last.groups()[0].len(), 3);
    }

    #[test]
    fn stride_two_groups_steps_into_pairs() {
        let source = FixtureSource::new().with_basis("mesh").with_steps(vec![
            Step::new(0),
            Step::new(1),
            Step::new(2),
            Step::new(3),
        ]);
        let mut slice = StepSlice::new(Box::new(source), None, None, Some(2));
        let steps = slice.steps();
        assert_eq!(steps.len(), 2);
    }
}
