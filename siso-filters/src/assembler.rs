//! Composes filter stages around a raw [`Source`] in the one fixed order the pipeline always
//! uses, driven by what the source already guarantees and what the sink requires.

use siso_core::geometry::optimal_system;
use siso_core::{
    CoordinateSystem, Field, RecombineFieldSpec, SisoError, SisoResult, Source,
    SourceRequirements, SplitFieldSpec,
};

use crate::basisfilter::BasisFilter;
use crate::basismerge::BasisMerge;
use crate::coordtransform::CoordTransform;
use crate::decompose::Decompose;
use crate::discretize::Discretize;
use crate::eigendisp::EigenDisp;
use crate::fieldfilter::FieldFilter;
use crate::force_unstructured::ForceUnstructured;
use crate::keyzones::KeyZones;
use crate::recombine::Recombine;
use crate::split::Split;
use crate::strict::Strict;
use crate::timeslice::{LastTime, StepSlice};
use crate::zonemerge::ZoneMerge;

/// How the assembler should group/select output timesteps (assembler step 13). `None` skips
/// the stage entirely; `Slice`/`Last` are mutually exclusive per the spec's "StepSlice or
/// LastTime (exclusive)".
#[derive(Debug, Clone)]
pub enum TimeSelection {
    None,
    Slice { start: Option<isize>, stop: Option<isize>, step: Option<isize> },
    Last,
}

impl Default for TimeSelection {
    fn default() -> Self {
        TimeSelection::None
    }
}

/// User-facing knobs the assembler threads through the fixed 16-step insertion order.
#[derive(Debug, Clone, Default)]
pub struct AssemblerOptions {
    /// Wrap with [`Strict`] both before (step 1) and after (step 15) the rest of the chain.
    pub strict: bool,
    /// Restrict bases by name (step 3); `None` skips [`BasisFilter`].
    pub basis_filter: Option<Vec<String>>,
    /// Sampling density for [`Discretize`]; `1` or less never triggers step 4's unconditional
    /// `Discretize(nvis)` (the guarded `Discretize(1)` at step 6 may still run).
    pub nvis: usize,
    /// User-forced unstructured output (feeds both step 6's guard and step 11).
    pub forced_unstructured: bool,
    /// Non-empty triggers step 8's [`Split`].
    pub split_specs: Vec<SplitFieldSpec>,
    /// Non-empty triggers step 9's [`Recombine`].
    pub recombine_specs: Vec<RecombineFieldSpec>,
    /// Step 10's [`Decompose`].
    pub decompose: bool,
    /// Step 12's [`EigenDisp`].
    pub eigenmodes_as_displacement: bool,
    /// Step 13's time selection.
    pub time_selection: TimeSelection,
    /// Restrict emitted fields by name (step 14); `None` skips [`FieldFilter`].
    pub field_filter: Option<Vec<String>>,
    /// Restricts step 16's geometry candidates to those whose coordinate system is named
    /// `in_coords` (`--in-coords`); `None` considers every geometry field.
    pub in_coords: Option<String>,
    /// The coordinate system the sink wants geometry expressed in.
    pub out_coords: CoordinateSystem,
}

/// Build the filter chain around `source` for a sink advertising `requirements`, per the
/// fixed insertion order. Returns the fully wrapped [`Source`], ready for a writer to drive.
pub fn assemble(
    source: Box<dyn Source>,
    requirements: SourceRequirements,
    options: &AssemblerOptions,
) -> SisoResult<Box<dyn Source>> {
    let mut source = source;

    // 1. Optionally Strict.
    if options.strict {
        source = Box::new(Strict::new(source));
    }

    // 2. If not S.globally_keyed: KeyZones.
    if !source.properties().globally_keyed {
        source = Box::new(KeyZones::new(source)?);
    }

    // 3. If basis_filter set: BasisFilter.
    if let Some(allowed) = &options.basis_filter {
        source = Box::new(BasisFilter::new(source, allowed.clone()));
    }

    // 4. If nvis > 1: Discretize(nvis).
    if options.nvis > 1 {
        source = Box::new(Discretize::new(source, options.nvis));
    }

    // 5. If R.require_single_basis and not S.single_basis: BasisMerge.
    if requirements.require_single_basis && !source.properties().single_basis {
        source = Box::new(BasisMerge::new(source));
    }

    // 6. If not S.discrete_topology and (require_discrete_topology or require_single_zone or
    //    forced unstructured): Discretize(1).
    if !source.properties().discrete_topology
        && (requirements.require_discrete_topology
            || requirements.require_single_zone
            || options.forced_unstructured)
    {
        source = Box::new(Discretize::new(source, 1));
    }

    // 7. If R.require_single_zone and not S.single_zoned: ZoneMerge.
    if requirements.require_single_zone && !source.properties().single_zoned {
        source = Box::new(ZoneMerge::new(source));
    }

    // 8. If S.split_fields non-empty: Split.
    if !options.split_specs.is_empty() {
        source = Box::new(Split::new(source, options.split_specs.clone()));
    }

    // 9. If S.recombine_fields non-empty: Recombine.
    if !options.recombine_specs.is_empty() {
        source = Box::new(Recombine::new(source, options.recombine_specs.clone()));
    }

    // 10. If decomposition requested: Decompose.
    if options.decompose {
        source = Box::new(Decompose::new(source));
    }

    // 11. If unstructured forced: ForceUnstructured.
    if options.forced_unstructured {
        source = Box::new(ForceUnstructured::new(source));
    }

    // 12. If eigenmodes-as-displacement: EigenDisp.
    if options.eigenmodes_as_displacement {
        source = Box::new(EigenDisp::new(source));
    }

    // 13. Time selection: StepSlice or LastTime (exclusive).
    source = match &options.time_selection {
        TimeSelection::None => source,
        TimeSelection::Slice { start, stop, step } => Box::new(StepSlice::new(source, *start, *stop, *step)),
        TimeSelection::Last => Box::new(LastTime::new(source)),
    };

    // 14. FieldFilter if requested.
    if let Some(allowed) = &options.field_filter {
        source = Box::new(FieldFilter::new(source, allowed.clone()));
    }

    // 15. Optionally final Strict.
    if options.strict {
        source = Box::new(Strict::new(source));
    }

    // 16. Coordinate-system planner.
    let mut candidate_fields = Vec::new();
    let mut candidate_systems = Vec::new();
    for basis in source.bases() {
        for field in source.geometries(&basis) {
            let Some(coords) = field.coords() else { continue };
            if let Some(wanted) = &options.in_coords {
                if coords.name() != wanted.as_str() && !matches!(coords, CoordinateSystem::Named(name) if name.eq_ignore_ascii_case(wanted))
                {
                    continue;
                }
            }
            candidate_systems.push(coords.clone());
            candidate_fields.push(field);
        }
    }
    let (chosen_index, path) = optimal_system(&candidate_systems, &options.out_coords).ok_or_else(|| {
        SisoError::ConversionUnavailable {
            from: candidate_systems.first().map(|c| c.name().to_string()).unwrap_or_default(),
            to: options.out_coords.name().to_string(),
            considered: candidate_systems.iter().map(|c| c.name().to_string()).collect(),
        }
    })?;
    let chosen: Field = candidate_fields[chosen_index].clone();
    source.use_geometry(&chosen)?;
    if !path.is_empty() {
        source = Box::new(CoordTransform::new(source, path));
    }

    Ok(source)
}
