//! # siso-core
//!
//! This crate implements the data model and registries shared by the `siso` conversion
//! pipeline: the 2-D [`field::FieldData`] carrier, the [`topology`] hierarchy, the
//! [`zone`]/[`vertexdict`] global-key manager, the [`geometry`] coordinate-system registry
//! and path planner, and the [`source`] contracts that readers, writers and filter stages
//! are built against.
//!
//! This documentation focuses on the implementation side of things and API usage; for the
//! conceptual model (patches, zones, bases) refer to the crate-level overview in the
//! workspace `SPEC_FULL.md`.

// ------ MODULE DECLARATIONS

pub mod basis;
pub mod error;
pub mod field;
pub mod geometry;
pub mod io;
pub mod source;
pub mod step;
pub mod topology;
pub mod vertexdict;
pub mod zone;

/// An in-memory `Source` fixture used by this crate's and `siso-filters`' tests. Compiled
/// whenever either this crate's own test suite runs, or a downstream crate enables the
/// `testutil` feature from its `[dev-dependencies]` — the same pattern the wider ecosystem
/// uses to share test fixtures across a workspace without shipping them in release builds.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// ------ RE-EXPORTS

pub use basis::Basis;
pub use error::{MissingKind, SisoError, SisoResult};
pub use field::FieldData;
pub use geometry::{CoordinateSystem, Ellipsoid};
pub use io::{Reader, Writer};
pub use source::{
    Dimensionality, Endianness, Field, FieldType, Rationality, ReaderSettings,
    RecombineFieldSpec, ScalarInterpretation, Source, SourceProperties, SourcePropertiesOverride,
    SourceRequirements, Staggering, SplitFieldSpec, VectorInterpretation, WriterSettings,
};
pub use step::Step;
pub use topology::{
    as_discrete, from_blob, DiscreteTopology, LinearEvaluator, LrTopology, Mapper,
    SplineEvaluator, SplineTopology, StructuredTopology, Topology, TopologyMerger,
    UniformTopologyMerger, UnstructuredTopology,
};
pub use zone::{Shape, Zone};
