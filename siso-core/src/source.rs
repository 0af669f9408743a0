//! The `Source` contract filter stages, the pipeline assembler and concrete readers all
//! speak, plus the settings and field-description types around it.

use crate::basis::Basis;
use crate::error::SisoResult;
use crate::field::FieldData;
use crate::step::Step;
use crate::topology::Topology;
use crate::zone::Zone;

/// How a scalar field's values should be interpreted by a downstream writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarInterpretation {
    Generic,
    Eigenmode,
    Displacement,
    Flow,
}

/// How a vector field's components should be interpreted by a downstream writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorInterpretation {
    Generic,
    Eigenmode,
    Displacement,
    Flow,
}

/// The shape and meaning of a field's data.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarInterpretation),
    Vector {
        num_comps: usize,
        interpretation: VectorInterpretation,
    },
    Geometry {
        num_comps: usize,
        coords: crate::geometry::CoordinateSystem,
    },
}

impl FieldType {
    /// `true` for [`FieldType::Scalar`].
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldType::Scalar(_))
    }

    /// `true` for [`FieldType::Vector`].
    pub fn is_vector(&self) -> bool {
        matches!(self, FieldType::Vector { .. })
    }

    /// `true` for [`FieldType::Geometry`].
    pub fn is_geometry(&self) -> bool {
        matches!(self, FieldType::Geometry { .. })
    }

    /// Number of value components: 1 for a scalar, `num_comps` otherwise.
    pub fn num_comps(&self) -> usize {
        match self {
            FieldType::Scalar(_) => 1,
            FieldType::Vector { num_comps, .. } => *num_comps,
            FieldType::Geometry { num_comps, .. } => *num_comps,
        }
    }

    /// The vector interpretation, read through the scalar↔vector correspondence; `None`
    /// for a geometry field (geometries have no interpretation to rewrite).
    pub fn vector_interpretation(&self) -> Option<VectorInterpretation> {
        match self {
            FieldType::Scalar(interp) => Some(match interp {
                ScalarInterpretation::Generic => VectorInterpretation::Generic,
                ScalarInterpretation::Eigenmode => VectorInterpretation::Eigenmode,
                ScalarInterpretation::Displacement => VectorInterpretation::Displacement,
                ScalarInterpretation::Flow => VectorInterpretation::Flow,
            }),
            FieldType::Vector { interpretation, .. } => Some(*interpretation),
            FieldType::Geometry { .. } => None,
        }
    }

    /// Return a copy of `self` with its interpretation rewritten to `interpretation`,
    /// leaving geometries untouched. Used by the `EigenDisp` filter.
    pub fn with_interpretation(&self, interpretation: VectorInterpretation) -> FieldType {
        match self {
            FieldType::Scalar(_) => FieldType::Scalar(match interpretation {
                VectorInterpretation::Generic => ScalarInterpretation::Generic,
                VectorInterpretation::Eigenmode => ScalarInterpretation::Eigenmode,
                VectorInterpretation::Displacement => ScalarInterpretation::Displacement,
                VectorInterpretation::Flow => ScalarInterpretation::Flow,
            }),
            FieldType::Vector { num_comps, .. } => FieldType::Vector {
                num_comps: *num_comps,
                interpretation,
            },
            geometry => geometry.clone(),
        }
    }
}

/// A named field a [`Source`] can produce data for.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// `true` if this field's data is per-cell rather than per-node.
    pub cellwise: bool,
    /// `true` if a filter is permitted to split this field into per-component fields.
    pub splittable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
            cellwise: false,
            splittable: false,
        }
    }

    pub fn cellwise(mut self, cellwise: bool) -> Self {
        self.cellwise = cellwise;
        self
    }

    pub fn splittable(mut self, splittable: bool) -> Self {
        self.splittable = splittable;
        self
    }

    /// `true` if `name` (case-folded) names this field.
    pub fn fits_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// `true` for a [`FieldType::Scalar`] field.
    pub fn is_scalar(&self) -> bool {
        self.field_type.is_scalar()
    }

    /// `true` for a [`FieldType::Vector`] field.
    pub fn is_vector(&self) -> bool {
        self.field_type.is_vector()
    }

    /// `true` for a [`FieldType::Geometry`] field.
    pub fn is_geometry(&self) -> bool {
        self.field_type.is_geometry()
    }

    /// Number of value components.
    pub fn num_comps(&self) -> usize {
        self.field_type.num_comps()
    }

    /// `true` if this field's interpretation is [`VectorInterpretation::Eigenmode`] /
    /// [`ScalarInterpretation::Eigenmode`].
    pub fn is_eigenmode(&self) -> bool {
        matches!(
            self.field_type.vector_interpretation(),
            Some(VectorInterpretation::Eigenmode)
        )
    }

    /// The coordinate system a [`FieldType::Geometry`] field is defined in, if any.
    pub fn coords(&self) -> Option<&crate::geometry::CoordinateSystem> {
        match &self.field_type {
            FieldType::Geometry { coords, .. } => Some(coords),
            _ => None,
        }
    }
}

/// Boolean capability flags a [`Source`] advertises, read by the pipeline assembler to
/// decide which filters need inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceProperties {
    /// Every step carries a complete, independent snapshot (no `_updates` deltas to track).
    pub instantaneous: bool,
    /// Zones already carry a `global_key`.
    pub globally_keyed: bool,
    /// `topology()` already returns a [`crate::topology::DiscreteTopology`]-capable value.
    pub discrete_topology: bool,
    /// All fields live on a single basis.
    pub single_basis: bool,
    /// All zones have already been fused into one.
    pub single_zoned: bool,
    /// Hint: field names this source would like split (see the `Split` filter).
    pub split_fields: bool,
    /// Hint: field names this source would like recombined (see the `Recombine` filter).
    pub recombine_fields: bool,
}

impl SourceProperties {
    /// Return a copy of `self` with any of the given overrides applied, leaving
    /// unspecified fields unchanged — the structural "copy with overrides" update filters
    /// use when they only change one or two flags.
    pub fn update(&self, overrides: SourcePropertiesOverride) -> SourceProperties {
        SourceProperties {
            instantaneous: overrides.instantaneous.unwrap_or(self.instantaneous),
            globally_keyed: overrides.globally_keyed.unwrap_or(self.globally_keyed),
            discrete_topology: overrides.discrete_topology.unwrap_or(self.discrete_topology),
            single_basis: overrides.single_basis.unwrap_or(self.single_basis),
            single_zoned: overrides.single_zoned.unwrap_or(self.single_zoned),
            split_fields: overrides.split_fields.unwrap_or(self.split_fields),
            recombine_fields: overrides.recombine_fields.unwrap_or(self.recombine_fields),
        }
    }
}

/// The sparse set of [`SourceProperties`] fields a filter wants to override; every field
/// left `None` passes the wrapped source's value through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePropertiesOverride {
    pub instantaneous: Option<bool>,
    pub globally_keyed: Option<bool>,
    pub discrete_topology: Option<bool>,
    pub single_basis: Option<bool>,
    pub single_zoned: Option<bool>,
    pub split_fields: Option<bool>,
    pub recombine_fields: Option<bool>,
}

/// Symmetric requirement flags a sink (writer) advertises; the pipeline assembler compares
/// these against a source's [`SourceProperties`] to decide which filters to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRequirements {
    pub require_single_basis: bool,
    pub require_discrete_topology: bool,
    pub require_single_zone: bool,
    pub require_instantaneous: bool,
}

/// Byte order a concrete reader should assume for a binary format whose endianness isn't
/// self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Native,
    Little,
    Big,
}

/// The dimensional interpretation a gridded (e.g. NetCDF/WRF) reader should assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimensionality {
    #[default]
    Volumetric,
    Planar,
    Extrude,
}

/// Whether a gridded field lives on cell interiors or cell faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Staggering {
    #[default]
    Inner,
    Outer,
}

/// Whether to apply a rationality (NURBS weight) correction when reading spline control
/// points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rationality {
    Always,
    Never,
    #[default]
    None,
}

/// Settings a concrete reader is configured with before producing a [`Source`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReaderSettings {
    pub endianness: Endianness,
    pub dimensionality: Dimensionality,
    pub staggering: Staggering,
    pub periodic: bool,
    pub mesh_filename: Option<std::path::PathBuf>,
    pub rationality: Rationality,
}

/// Settings a concrete writer is configured with before consuming a [`Source`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriterSettings {
    pub output_mode: Option<String>,
    pub endianness: Endianness,
}

/// A request to derive a new field from a subset of an existing field's components.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFieldSpec {
    pub source_name: String,
    pub new_name: String,
    pub components: Vec<usize>,
    /// If `true`, the original field is suppressed once split.
    pub destroy: bool,
}

/// A request to derive a new field as the horizontal concatenation of several sources'
/// components.
#[derive(Debug, Clone, PartialEq)]
pub struct RecombineFieldSpec {
    pub source_names: Vec<String>,
    pub new_name: String,
}

/// The contract every reader, filter stage, and `MultiSource` implements: a pull-driven,
/// lazily-evaluated handle onto a converter-pipeline stage.
///
/// Implementors own their upstream (a concrete reader, or another `Box<dyn Source>`)
/// exclusively; there is no shared mutable state between stages. All methods that touch
/// underlying storage return [`crate::error::SisoResult`] rather than panicking.
pub trait Source {
    /// Capability flags this source (and everything it wraps) currently satisfies.
    fn properties(&self) -> SourceProperties;

    /// Apply reader-level settings. A no-op for filter stages; meaningful only at the
    /// concrete-reader root of a pipeline.
    fn configure(&mut self, settings: &ReaderSettings) -> SisoResult<()>;

    /// Select which field supplies the geometry (point coordinates) for subsequent
    /// `topology`/`field_data` calls.
    fn use_geometry(&mut self, field: &Field) -> SisoResult<()>;

    /// All bases this source exposes fields on.
    fn bases(&self) -> Vec<Basis>;

    /// The basis `field` lives on.
    fn basis_of(&self, field: &Field) -> SisoResult<Basis>;

    /// Fields defined on `basis`.
    fn fields(&self, basis: &Basis) -> Vec<Field>;

    /// Geometry (coordinate) fields defined on `basis`.
    fn geometries(&self, basis: &Basis) -> Vec<Field>;

    /// All timesteps this source yields, in order.
    fn steps(&self) -> Vec<Step>;

    /// Zones (patches) defined on `basis`.
    fn zones(&self, basis: &Basis) -> SisoResult<Vec<Zone>>;

    /// The topology of `zone` on `basis` at `step`.
    fn topology(&mut self, step: &Step, basis: &Basis, zone: &Zone) -> SisoResult<Box<dyn Topology>>;

    /// `true` if `basis`'s topology changes at `step` (vs. carrying the prior step's
    /// topology forward unchanged).
    fn topology_updates(&self, step: &Step, basis: &Basis) -> bool;

    /// `field`'s data for `zone` at `step`.
    fn field_data(&mut self, step: &Step, field: &Field, zone: &Zone) -> SisoResult<FieldData<f64>>;

    /// `true` if `field`'s data changes at `step`.
    fn field_updates(&self, step: &Step, field: &Field) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_update_only_touches_specified_fields() {
        let base = SourceProperties {
            instantaneous: true,
            ..SourceProperties::default()
        };
        let updated = base.update(SourcePropertiesOverride {
            globally_keyed: Some(true),
            ..SourcePropertiesOverride::default()
        });
        assert!(updated.instantaneous); // carried through
        assert!(updated.globally_keyed); // overridden
        assert!(!updated.single_basis); // still default
    }

    #[test]
    fn field_name_matching_is_case_insensitive() {
        let field = Field::new("Velocity", FieldType::Scalar(ScalarInterpretation::Generic));
        assert!(field.fits_name("velocity"));
        assert!(!field.fits_name("pressure"));
    }
}
