//! # siso
//!
//! Facade crate over the pipelined transformation graph that mediates between simulation
//! data readers and visualization-oriented writers: [`siso_core`] holds the data model,
//! registries and the `Source`/`Reader`/`Writer` contracts, and [`siso_filters`] holds the
//! composable filter stages, the pipeline assembler and [`siso_filters::MultiSource`]. This
//! crate adds nothing of its own beyond the [`prelude`] re-export, the way `honeycomb`
//! fronts `honeycomb-core` and `honeycomb-kernels`.

pub use siso_core as core;
pub use siso_filters as filters;

pub mod prelude {
    // ------ CORE RE-EXPORTS

    pub use siso_core::geometry::{conversion_path, convert_coords, convert_vectors, optimal_system};
    pub use siso_core::{
        as_discrete, Basis, CoordinateSystem, Dimensionality, DiscreteTopology, Endianness,
        Ellipsoid, Field, FieldData, FieldType, Mapper, MissingKind, Rationality, Reader,
        ReaderSettings, RecombineFieldSpec, ScalarInterpretation, Shape, SisoError, SisoResult,
        Source, SourceProperties, SourcePropertiesOverride, SourceRequirements, Staggering,
        SplitFieldSpec, Step, StructuredTopology, Topology, TopologyMerger,
        UniformTopologyMerger, UnstructuredTopology, VectorInterpretation, Writer,
        WriterSettings, Zone,
    };

    // ------ FILTER RE-EXPORTS

    pub use siso_filters::{
        assemble, AssemblerOptions, BasisFilter, BasisMerge, CoordTransform, Decompose,
        Discretize, EigenDisp, FieldFilter, ForceUnstructured, KeyZones, LastTime, MultiSource,
        Recombine, Split, Strict, StepSlice, TimeSelection, ZoneMerge,
    };
}
