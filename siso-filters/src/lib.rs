//! # siso-filters
//!
//! The composable `Source -> Source` filter stages described in the workspace spec §4.6,
//! the fixed-order pipeline assembler (§4.7), and [`MultiSource`] (§4.8).
//!
//! Every filter stage is a concrete type that owns its wrapped `Box<dyn siso_core::Source>`
//! exclusively (no shared mutable state between stages, per the workspace's concurrency
//! design notes) and implements [`siso_core::Source`] itself, forwarding the methods it
//! doesn't need to change straight through to the inner source. Stacking filters is just
//! nesting `Box::new(Filter::new(inner))` calls; [`assembler::assemble`] does this in the
//! spec's fixed order given a source's capabilities and a sink's requirements.

mod assembler;
mod basisfilter;
mod basismerge;
mod coordtransform;
mod decompose;
mod discretize;
mod eigendisp;
mod fieldfilter;
mod force_unstructured;
mod keyzones;
mod multisource;
mod recombine;
mod split;
mod strict;
mod timeslice;
mod zonemerge;

pub use assembler::{assemble, AssemblerOptions, TimeSelection};
pub use basisfilter::BasisFilter;
pub use basismerge::BasisMerge;
pub use coordtransform::CoordTransform;
pub use decompose::Decompose;
pub use discretize::Discretize;
pub use eigendisp::EigenDisp;
pub use fieldfilter::FieldFilter;
pub use force_unstructured::ForceUnstructured;
pub use keyzones::KeyZones;
pub use multisource::MultiSource;
pub use recombine::Recombine;
pub use split::Split;
pub use strict::Strict;
pub use timeslice::{LastTime, StepSlice};
pub use zonemerge::ZoneMerge;

#[cfg(test)]
mod test_support;
