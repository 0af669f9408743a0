//! The external `Reader`/`Writer` contracts concrete file-format adapters implement.
//!
//! Both traits are thin: the actual HDF5/NetCDF/G2/LR-text parsing and VTU/VTS/PVD/raw
//! writing are out of scope for this crate (see the workspace spec §1) and live in
//! downstream adapter crates. What lives here is only the shape those adapters must
//! present to the pipeline assembler and driver.

use std::path::Path;

use crate::error::SisoResult;
use crate::source::{Field, Source, SourceRequirements, WriterSettings};

/// Discovers and opens a concrete source file format.
///
/// `open` returns an owned `Box<dyn Source>`; scoped acquisition (the original
/// implementation's `__enter__`/`__exit__` context manager) is expressed the Rust way —
/// through RAII. A concrete reader's `Source` implementation acquires its file handle in
/// `open` and releases it in its `Drop` impl, so the handle is released on every exit path,
/// including an error unwinding through the pipeline, without a separate `close` call.
pub trait Reader {
    /// `true` if this reader can plausibly handle the file at `path` (e.g. by extension or
    /// magic-byte sniffing). Fast and side-effect free; never opens the file for real.
    fn applicable(&self, path: &Path) -> bool;

    /// Open `path` and produce the [`Source`] it exposes.
    fn open(&self, path: &Path) -> SisoResult<Box<dyn Source>>;
}

/// Consumes a fully-assembled pipeline and emits a concrete output format.
pub trait Writer {
    /// Requirement flags the pipeline assembler reads to decide which filters to insert
    /// ahead of this writer.
    fn requirements(&self) -> SourceRequirements;

    /// Apply writer-level settings (endianness, output mode) before [`Self::consume`].
    fn configure(&mut self, settings: &WriterSettings) -> SisoResult<()>;

    /// Drive `source` to completion: for each step, for each basis, for each zone, pull
    /// topology and field data and emit bytes. `geometry` is the field the assembler chose
    /// to supply point coordinates (see §4.7 step 16 of the workspace spec).
    fn consume(&mut self, source: &mut dyn Source, geometry: &Field) -> SisoResult<()>;
}
