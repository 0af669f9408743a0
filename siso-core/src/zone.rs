//! Patch identity: [`Zone`] and its [`Shape`].

use crate::error::{SisoError, SisoResult};

/// The reference shape of a zone, which fixes its corner count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// 2 corners.
    Line,
    /// 4 corners.
    Quadrilateral,
    /// 8 corners.
    Hexahedron,
}

impl Shape {
    /// The number of corner points this shape expects.
    pub fn corner_count(self) -> usize {
        match self {
            Shape::Line => 2,
            Shape::Quadrilateral => 4,
            Shape::Hexahedron => 8,
        }
    }
}

/// A patch: a single parametric tile of a multi-patch geometry.
///
/// `corners` holds ordered N-D points (flattened `[x0, y0, .., x1, y1, ..]`, `ndim` per
/// corner); `local_key` identifies the zone uniquely within its source, `global_key` is
/// `None` until [`crate::vertexdict::ZoneManager::lookup`] assigns one by corner-vertex
/// coincidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// The zone's reference shape, fixing its corner count.
    pub shape: Shape,
    /// Number of spatial dimensions each corner point has.
    pub ndim: usize,
    /// Flattened corner coordinates, `shape.corner_count() * ndim` values.
    pub corners: Vec<f64>,
    /// Identifier unique within the owning source.
    pub local_key: String,
    /// Identifier unique across all sources feeding a single conversion, once assigned.
    pub global_key: Option<usize>,
}

impl Zone {
    /// Construct a new, not-yet-globally-keyed zone. Validates that `corners` has exactly
    /// `shape.corner_count() * ndim` entries.
    pub fn new(
        shape: Shape,
        ndim: usize,
        corners: Vec<f64>,
        local_key: impl Into<String>,
    ) -> SisoResult<Self> {
        let expected = shape.corner_count() * ndim;
        if corners.len() != expected {
            return Err(SisoError::ShapeMismatch {
                expected: format!("{expected} corner coordinates ({:?}, ndim={ndim})", shape),
                actual: format!("{} corner coordinates", corners.len()),
            });
        }
        Ok(Zone {
            shape,
            ndim,
            corners,
            local_key: local_key.into(),
            global_key: None,
        })
    }

    /// Iterate over this zone's corner points as N-D coordinate slices.
    pub fn corner_points(&self) -> impl Iterator<Item = &[f64]> {
        self.corners.chunks_exact(self.ndim)
    }

    /// Return a copy of this zone with `global_key` set.
    pub fn with_global_key(&self, key: usize) -> Zone {
        Zone {
            global_key: Some(key),
            ..self.clone()
        }
    }
}
