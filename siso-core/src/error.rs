//! Main error type

/// Convenience type alias
pub type SisoResult<T> = Result<T, SisoError>;

/// Which kind of named entity was missing, for [`SisoError::Missing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    /// A basis referenced by name was not present on the source.
    Basis,
    /// A field referenced by name was not present on the given basis.
    Field,
    /// A zone referenced by local key was not present on the source.
    Zone,
}

impl std::fmt::Display for MissingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MissingKind::Basis => "basis",
            MissingKind::Field => "field",
            MissingKind::Zone => "zone",
        };
        f.write_str(s)
    }
}

/// # Pipeline-level error enum.
///
/// Every fallible operation exposed by `siso-core`/`siso-filters` returns a [`SisoResult`]
/// wrapping one of these variants rather than panicking; see §7 of the workspace spec for
/// the taxonomy this mirrors.
#[derive(Debug, thiserror::Error)]
pub enum SisoError {
    /// No reader claims the given path.
    #[error("no reader recognizes input: {path}")]
    SourceUnrecognized {
        /// The unrecognized input path, as given.
        path: String,
    },
    /// A filter's precondition was violated.
    #[error("capability mismatch in {component}{}{}", .zone.as_ref().map(|z| format!(", zone {z}")).unwrap_or_default(), .field.as_ref().map(|f| format!(", field {f}")).unwrap_or_default())]
    CapabilityMismatch {
        /// The filter or component that detected the violation.
        component: &'static str,
        /// The zone local key involved, if any.
        zone: Option<String>,
        /// The field name involved, if any.
        field: Option<String>,
    },
    /// No path exists in the coordinate-system graph to the requested target.
    #[error("no conversion path to {to} (considered: {})", .considered.join(", "))]
    ConversionUnavailable {
        /// The source system name that could not be routed.
        from: String,
        /// The requested target system name.
        to: String,
        /// The candidate source systems that were considered and rejected.
        considered: Vec<String>,
    },
    /// A `FieldData` operation violated a shape or component-count invariant.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// A description of the shape that was required.
        expected: String,
        /// A description of the shape that was actually given.
        actual: String,
    },
    /// A binary/text topology blob failed to parse.
    #[error("malformed input at byte offset {offset}: {message}")]
    DataFormatError {
        /// Byte offset into the blob where parsing failed.
        offset: usize,
        /// Human-readable description of the failure.
        message: String,
    },
    /// A referenced basis, field or zone is not present.
    #[error("unknown {kind}: {name}")]
    Missing {
        /// The kind of entity that was missing.
        kind: MissingKind,
        /// The name or key that was looked up.
        name: String,
    },
}
