//! Reference ellipsoids.

/// A reference ellipsoid: semi-major axis `a` (metres) and flattening `f`.
///
/// Parameters are the standard IAU/IERS reference values; `Spherical` is the degenerate
/// `f = 0` case used when no particular datum is required.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ellipsoid {
    /// A perfect sphere of the given radius (flattening is always zero).
    Spherical {
        /// Radius, in metres.
        radius: f64,
    },
    /// WGS84, the GPS/most-web-maps reference ellipsoid.
    Wgs84,
    /// GRS80, the geodetic reference system underlying most national datums (e.g. ETRS89).
    Grs80,
    /// WGS72, the predecessor to WGS84.
    Wgs72,
}

impl Ellipsoid {
    /// The mean radius used for the default [`Ellipsoid::Spherical`] variant.
    pub const DEFAULT_SPHERE_RADIUS: f64 = 6_371_008.8;

    /// Construct the default sphere (mean Earth radius).
    pub fn sphere() -> Self {
        Ellipsoid::Spherical {
            radius: Self::DEFAULT_SPHERE_RADIUS,
        }
    }

    /// Semi-major axis, in metres.
    pub fn semi_major_axis(self) -> f64 {
        match self {
            Ellipsoid::Spherical { radius } => radius,
            Ellipsoid::Wgs84 => 6_378_137.0,
            Ellipsoid::Grs80 => 6_378_137.0,
            Ellipsoid::Wgs72 => 6_378_135.0,
        }
    }

    /// Flattening `f = (a - b) / a`.
    pub fn flattening(self) -> f64 {
        match self {
            Ellipsoid::Spherical { .. } => 0.0,
            Ellipsoid::Wgs84 => 1.0 / 298.257_223_563,
            Ellipsoid::Grs80 => 1.0 / 298.257_222_101,
            Ellipsoid::Wgs72 => 1.0 / 298.26,
        }
    }

    /// Stable registry name, matched case-insensitively.
    pub fn name(self) -> &'static str {
        match self {
            Ellipsoid::Spherical { .. } => "Sphere",
            Ellipsoid::Wgs84 => "WGS84",
            Ellipsoid::Grs80 => "GRS80",
            Ellipsoid::Wgs72 => "WGS72",
        }
    }

    /// Look up an ellipsoid by its registry name (case-insensitive).
    pub fn find(name: &str) -> Option<Ellipsoid> {
        match name.to_ascii_lowercase().as_str() {
            "sphere" => Some(Ellipsoid::sphere()),
            "wgs84" => Some(Ellipsoid::Wgs84),
            "grs80" => Some(Ellipsoid::Grs80),
            "wgs72" => Some(Ellipsoid::Wgs72),
            _ => None,
        }
    }

    /// The `proj4rs` parameter fragment describing this ellipsoid's shape: `+R=<radius>`
    /// for a sphere, `+a=<semi-major> +rf=<1/f>` otherwise. Geodesy math itself (the actual
    /// projection/ECEF formulas) is delegated entirely to `proj4rs`; this crate only
    /// produces the proj-string parameters.
    pub fn proj_params(self) -> String {
        if self.flattening() == 0.0 {
            format!("+R={}", self.semi_major_axis())
        } else {
            format!(
                "+a={} +rf={}",
                self.semi_major_axis(),
                1.0 / self.flattening()
            )
        }
    }
}
