//! Coordinate-system tagging, the ellipsoid table and the conversion-path planner.
//!
//! This module contains all code related to naming and relating coordinate systems. The
//! actual numeric conversion between systems — the "guts" of ellipsoid/UTM math — is
//! explicitly out of scope per the workspace spec and is delegated to `proj4rs`; see
//! [`registry`] for the converter table that calls into it.

mod ellipsoid;
mod registry;

#[cfg(test)]
mod tests;

pub use ellipsoid::Ellipsoid;
pub use registry::{conversion_path, convert_coords, convert_vectors, optimal_system};

/// A tagged coordinate system.
///
/// Each variant carries a stable `name()` used as a node key in the converter graph, and a
/// tuple of display parameters. `Generic` accepts any input; `Named` matches another
/// `Named` system by case-folded identifier only.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSystem {
    /// Accepts or compares equal to anything; the "don't care" system.
    Generic,
    /// An opaque, reader-supplied identifier with no known conversion semantics.
    Named(String),
    /// Longitude/latitude/height on the given reference ellipsoid.
    Geodetic(Ellipsoid),
    /// Universal Transverse Mercator, zone `zone_number` with hemisphere `zone_letter`.
    Utm {
        /// UTM zone number, 1..=60.
        zone_number: u32,
        /// `'N'` for the northern hemisphere band, `'M'` for southern (see
        /// [`Self::parse_utm_band`] for why only these two letters are ever stored).
        zone_letter: char,
    },
    /// Earth-centered, Earth-fixed cartesian (ECEF).
    Geocentric,
}

impl CoordinateSystem {
    /// The stable registry name used as a node key in the converter graph.
    pub fn name(&self) -> &'static str {
        match self {
            CoordinateSystem::Generic => "Generic",
            CoordinateSystem::Named(_) => "Named",
            CoordinateSystem::Geodetic(_) => "Geodetic",
            CoordinateSystem::Utm { .. } => "UTM",
            CoordinateSystem::Geocentric => "Geocentric",
        }
    }

    /// Display parameters, used for human-readable rendering only.
    pub fn parameters(&self) -> Vec<String> {
        match self {
            CoordinateSystem::Generic | CoordinateSystem::Geocentric => Vec::new(),
            CoordinateSystem::Named(identifier) => {
                if identifier.is_empty() {
                    Vec::new()
                } else {
                    vec![identifier.clone()]
                }
            }
            CoordinateSystem::Geodetic(ellipsoid) => vec![ellipsoid.name().to_string()],
            CoordinateSystem::Utm {
                zone_number,
                zone_letter,
            } => vec![zone_number.to_string(), zone_letter.to_string()],
        }
    }

    /// The default instance of the system named `name`, used by the path planner to
    /// materialize intermediate hops it didn't receive as concrete input/output systems.
    pub fn default_for_name(name: &str) -> CoordinateSystem {
        match name {
            "Generic" => CoordinateSystem::Generic,
            "Named" => CoordinateSystem::Named(String::new()),
            "Geodetic" => CoordinateSystem::Geodetic(Ellipsoid::Wgs84),
            "Geocentric" => CoordinateSystem::Geocentric,
            other => panic!("no default instance for coordinate system {other}"),
        }
    }

    /// `true` if `code` (case-folded) names this system.
    pub fn fits_system_name(&self, code: &str) -> bool {
        match self {
            CoordinateSystem::Named(identifier) => identifier.eq_ignore_ascii_case(code),
            other => other.name().eq_ignore_ascii_case(code),
        }
    }

    /// `true` for the northern-hemisphere UTM band.
    pub fn utm_northern(&self) -> Option<bool> {
        match self {
            CoordinateSystem::Utm { zone_letter, .. } => Some(*zone_letter >= 'N'),
            _ => None,
        }
    }

    /// Parse a UTM zone-letter/direction suffix the way the original implementation does:
    /// take the first character of the trailing string and classify it.
    ///
    /// A single-character suffix is used as the MGRS latitude band letter directly
    /// (uppercased). A multi-character suffix (e.g. `"north"`/`"south"`) is collapsed to
    /// `'N'` if it starts with `'N'`/`'n'`, else `'M'` — `'M'` rather than `'S'`, matching
    /// the original's subtle (if arguably mislabeled) convention: anything that isn't
    /// northern is tagged with the letter immediately south of the equator band `'N'` in
    /// the UTM band lettering, not a literal "south" marker. This is preserved verbatim
    /// rather than "corrected" to `'S'`.
    pub fn parse_utm_band(suffix: &str) -> char {
        if suffix.len() > 1 {
            if suffix.to_ascii_uppercase().starts_with('N') {
                'N'
            } else {
                'M'
            }
        } else {
            suffix.to_ascii_uppercase().chars().next().unwrap_or('N')
        }
    }
}

/// Parse a coordinate-system string of the grammar `name[:param[:param]...]`.
///
/// Known names: `generic`, `named:<string>`, `geodetic[:wgs84|grs80|wgs72|sphere]`,
/// `geocentric`, `utm:<zone><letter|direction>`. Anything else becomes `Named(code)`
/// verbatim, exactly as the original's `find_system` falls back to `Named.make((code,))`.
pub fn find_system(code: &str) -> CoordinateSystem {
    let mut parts = code.split(':');
    let name = parts.next().unwrap_or_default();
    let params: Vec<&str> = parts.collect();

    match name.to_ascii_lowercase().as_str() {
        "generic" if params.is_empty() => CoordinateSystem::Generic,
        "named" if params.len() == 1 => CoordinateSystem::Named(params[0].to_string()),
        "geodetic" if params.len() <= 1 => {
            let ellipsoid = params
                .first()
                .and_then(|p| Ellipsoid::find(p))
                .unwrap_or(Ellipsoid::Wgs84);
            CoordinateSystem::Geodetic(ellipsoid)
        }
        "geocentric" if params.is_empty() => CoordinateSystem::Geocentric,
        "utm" if params.len() == 1 => {
            let zone = params[0];
            let split_at = zone
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i);
            match split_at {
                Some(i) if i > 0 => {
                    let zone_number: u32 = zone[..i].parse().unwrap_or(0);
                    let zone_letter = CoordinateSystem::parse_utm_band(&zone[i..]);
                    CoordinateSystem::Utm {
                        zone_number,
                        zone_letter,
                    }
                }
                _ => CoordinateSystem::Named(code.to_string()),
            }
        }
        _ => CoordinateSystem::Named(code.to_string()),
    }
}
