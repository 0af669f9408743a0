//! Tolerant N-D point lookup, and the global zone-key manager built on top of it.
//!
//! [`VertexDict`] is deliberately **not** a hash map over floats: two points are considered
//! the same key if they are within `(rtol, atol)` of each other componentwise, so equality
//! is not exact and can't be hashed directly. Instead each coordinate axis keeps its own
//! sorted `(entry_id, value)` index; a lookup bounds every axis to `[minval, maxval]`,
//! bisects each axis' index to the matching range, and intersects the resulting candidate
//! id sets. This per-axis sorted-index approach is load-bearing (see the Design Notes in
//! the workspace spec) and must not be replaced by a float hash map.

use rustc_hash::FxHashSet;

use crate::zone::{Shape, Zone};

const DEFAULT_RTOL: f64 = 1e-5;
const DEFAULT_ATOL: f64 = 1e-8;

/// A mapping from N-D points to values of type `V`, tolerant of floating-point noise.
///
/// Two points are equal if every component `a`, `b` satisfies `|a - b| <= atol + rtol *
/// max(|a|, |b|)`.
#[derive(Debug)]
pub struct VertexDict<V> {
    rtol: f64,
    atol: f64,
    /// `None` entries are tombstones left behind by `remove`.
    values: Vec<Option<V>>,
    /// Per-axis sorted `(entry_id, coordinate value)` pairs.
    axes: Vec<Vec<(usize, f64)>>,
}

impl<V> Default for VertexDict<V> {
    fn default() -> Self {
        VertexDict::new(DEFAULT_RTOL, DEFAULT_ATOL)
    }
}

impl<V> VertexDict<V> {
    /// Construct an empty dict with explicit tolerances.
    pub fn new(rtol: f64, atol: f64) -> Self {
        VertexDict {
            rtol,
            atol,
            values: Vec::new(),
            axes: Vec::new(),
        }
    }

    /// Bounds for a single coordinate value, within which another value is considered a
    /// match.
    ///
    /// Three branches, preserved exactly as the original implementation wrote them: the
    /// near-zero branch is intentionally asymmetric (both divisors are `1 - rtol`), and is
    /// not a typo to be "fixed" into symmetry.
    fn bounds(&self, key: f64) -> (f64, f64) {
        if key >= self.atol {
            (
                (key - self.atol) / (1.0 + self.rtol),
                (key + self.atol) / (1.0 - self.rtol),
            )
        } else if key <= -self.atol {
            (
                (key - self.atol) / (1.0 - self.rtol),
                (key + self.atol) / (1.0 + self.rtol),
            )
        } else {
            (
                (key - self.atol) / (1.0 - self.rtol),
                (key + self.atol) / (1.0 - self.rtol),
            )
        }
    }

    /// Candidate live entry ids whose point is within tolerance of `point`, across every
    /// axis.
    fn candidates(&self, point: &[f64]) -> FxHashSet<usize> {
        let mut candidates: Option<FxHashSet<usize>> = None;
        for (axis, &coord) in point.iter().enumerate() {
            let Some(lut) = self.axes.get(axis) else {
                return FxHashSet::default();
            };
            let (minval, maxval) = self.bounds(coord);
            let lo = lut.partition_point(|(_, v)| *v < minval);
            let hi = lut.partition_point(|(_, v)| *v < maxval);
            let this_axis: FxHashSet<usize> = lut[lo..hi].iter().map(|(id, _)| *id).collect();
            candidates = Some(match candidates {
                None => this_axis,
                Some(prev) => prev.intersection(&this_axis).copied().collect(),
            });
        }
        candidates.unwrap_or_default()
    }

    /// The first live (non-tombstoned) candidate id matching `point`, if any.
    fn find(&self, point: &[f64]) -> Option<usize> {
        self.candidates(point)
            .into_iter()
            .find(|&id| self.values[id].is_some())
    }

    /// Look up the value associated with `point`, if any entry is within tolerance.
    pub fn get(&self, point: &[f64]) -> Option<&V> {
        self.find(point).and_then(|id| self.values[id].as_ref())
    }

    /// Insert `value` at `point`, appending a fresh entry (this dict does not overwrite
    /// existing entries in place; callers owning a [`ZoneManager`] rely on this to grow the
    /// per-axis indices monotonically).
    pub fn insert(&mut self, point: &[f64], value: V) {
        if self.axes.len() < point.len() {
            self.axes.resize_with(point.len(), Vec::new);
        }
        let id = self.values.len();
        for (axis, &coord) in point.iter().enumerate() {
            let lut = &mut self.axes[axis];
            let pos = lut.partition_point(|(_, v)| *v < coord);
            lut.insert(pos, (id, coord));
        }
        self.values.push(Some(value));
    }

    /// Tombstone the entry matching `point`, if any. Iteration and lookups skip tombstoned
    /// entries.
    pub fn remove(&mut self, point: &[f64]) {
        if let Some(id) = self.find(point) {
            self.values[id] = None;
        }
    }

    /// Number of entries ever inserted, live or tombstoned.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if no entries have ever been inserted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assigns stable global zone keys by corner-vertex coincidence.
///
/// Each corner of each zone is registered in an internal [`VertexDict`] mapping a corner
/// point to the set of global keys it has been seen under. A zone's global key is the
/// (unique, by invariant) intersection of the candidate sets of all of its corners; an
/// empty intersection mints a fresh key.
#[derive(Debug, Default)]
pub struct ZoneManager {
    lut: VertexDict<FxHashSet<usize>>,
    shapes: Vec<Shape>,
}

impl ZoneManager {
    /// Construct an empty manager.
    pub fn new() -> Self {
        ZoneManager::default()
    }

    /// Number of distinct global zones minted so far.
    pub fn zone_count(&self) -> usize {
        self.shapes.len()
    }

    /// Resolve `zone`'s global key, minting a fresh one if this is the first time any of
    /// its corners have been seen.
    ///
    /// If `zone.global_key` is already set, this only validates shape consistency and
    /// returns a clone. Otherwise, the candidate key sets of every corner are intersected;
    /// by the one-to-one vertex invariant the intersection holds at most one key.
    ///
    /// # Panics
    ///
    /// Panics if the intersection across corners yields more than one candidate key: this
    /// indicates the caller fed in zones whose vertices are not one-to-one, which the
    /// original implementation treats as a programming-error-level assertion rather than a
    /// recoverable error.
    pub fn lookup(&mut self, zone: &Zone) -> Zone {
        if let Some(key) = zone.global_key {
            assert_eq!(
                self.shapes[key], zone.shape,
                "zone {} re-keyed with inconsistent shape",
                zone.local_key
            );
            return zone.clone();
        }

        let mut keys: Option<FxHashSet<usize>> = None;
        for point in zone.corner_points() {
            let candidate = self.lut.get(point).cloned().unwrap_or_default();
            keys = Some(match keys {
                None => candidate,
                Some(prev) => prev.intersection(&candidate).copied().collect(),
            });
        }
        let keys = keys.unwrap_or_default();
        assert!(
            keys.len() < 2,
            "zone {} corners resolve to multiple global keys: {keys:?}",
            zone.local_key
        );

        let key = if let Some(&key) = keys.iter().next() {
            assert_eq!(
                self.shapes[key], zone.shape,
                "zone {} matches existing global zone {key} with inconsistent shape",
                zone.local_key
            );
            key
        } else {
            let key = self.shapes.len();
            self.shapes.push(zone.shape);
            for point in zone.corner_points() {
                match self.lut.get(point) {
                    Some(existing) => {
                        let mut updated = existing.clone();
                        updated.insert(key);
                        self.lut.remove(point);
                        self.lut.insert(point, updated);
                    }
                    None => {
                        let mut set = FxHashSet::default();
                        set.insert(key);
                        self.lut.insert(point, set);
                    }
                }
            }
            log::debug!(
                "local zone {} associated with new global zone {key}",
                zone.local_key
            );
            key
        };

        zone.with_global_key(key)
    }
}
