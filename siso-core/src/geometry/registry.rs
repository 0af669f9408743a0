//! The converter graph, BFS path planner, and the `proj4rs`-backed numeric converters.

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use crate::error::{SisoError, SisoResult};
use crate::field::FieldData;

use super::{CoordinateSystem, Ellipsoid};

type CoordConverter = fn(&CoordinateSystem, &CoordinateSystem, &FieldData<f64>) -> SisoResult<FieldData<f64>>;
type VectorConverter = fn(
    &CoordinateSystem,
    &CoordinateSystem,
    &FieldData<f64>,
    &FieldData<f64>,
) -> SisoResult<FieldData<f64>>;

/// Registered source → [target, ...] edges of the coordinate-system converter graph.
static NEIGHBORS: LazyLock<HashMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    m.entry("Geodetic").or_default().push("Geocentric");
    m.entry("Geodetic").or_default().push("UTM");
    m.entry("UTM").or_default().push("Geodetic");
    m
});

static COORD_CONVERTERS: LazyLock<HashMap<(&'static str, &'static str), CoordConverter>> =
    LazyLock::new(|| {
        let mut m: HashMap<(&'static str, &'static str), CoordConverter> = HashMap::new();
        m.insert(("Geodetic", "Geocentric"), geodetic_to_geocentric);
        m.insert(("Geodetic", "UTM"), geodetic_to_utm);
        m.insert(("UTM", "Geodetic"), utm_to_geodetic);
        m
    });

static VECTOR_CONVERTERS: LazyLock<HashMap<(&'static str, &'static str), VectorConverter>> =
    LazyLock::new(|| {
        let mut m: HashMap<(&'static str, &'static str), VectorConverter> = HashMap::new();
        m.insert(("Geodetic", "Geocentric"), geodetic_to_geocentric_vf);
        m.insert(("Geodetic", "UTM"), geodetic_to_utm_vf);
        m.insert(("UTM", "Geodetic"), utm_to_geodetic_vf);
        m
    });

/// Find the shortest sequence of registered hops from `src` to `tgt`, in source→target
/// order, or `None` if `tgt` is unreachable.
///
/// `src == tgt`, or any `{Generic, Named}` source against a `Generic` target, is treated as
/// a no-op (empty path) rather than run through the graph.
pub fn conversion_path(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
) -> Option<Vec<CoordinateSystem>> {
    if src == tgt {
        return Some(Vec::new());
    }
    if matches!(src, CoordinateSystem::Generic | CoordinateSystem::Named(_))
        && matches!(tgt, CoordinateSystem::Generic)
    {
        return Some(Vec::new());
    }

    let mut visited: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(src.name());

    while let Some(node) = queue.pop_front() {
        let neighbors = NEIGHBORS.get(node).map(Vec::as_slice).unwrap_or(&[]);
        for &neighbor in neighbors {
            if visited.contains_key(neighbor) || neighbor == src.name() {
                continue;
            }
            visited.insert(neighbor, node);
            if neighbor == tgt.name() {
                return Some(construct_backpath(src, tgt, &visited));
            }
            queue.push_back(neighbor);
        }
    }

    None
}

fn construct_backpath(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    visited: &HashMap<&str, &str>,
) -> Vec<CoordinateSystem> {
    let mut path = vec![tgt.clone()];
    let mut name = visited[tgt.name()];
    while name != src.name() {
        path.push(CoordinateSystem::default_for_name(name));
        name = visited[name];
    }
    path.push(src.clone());
    path.reverse();
    path
}

/// Return the index and conversion path of the candidate in `candidates` with the shortest
/// path to `target`, or `None` if no candidate reaches it. Ties keep the first candidate.
pub fn optimal_system(
    candidates: &[CoordinateSystem],
    target: &CoordinateSystem,
) -> Option<(usize, Vec<CoordinateSystem>)> {
    let mut optimal: Option<(usize, Vec<CoordinateSystem>)> = None;
    for (index, system) in candidates.iter().enumerate() {
        let Some(new_path) = conversion_path(system, target) else {
            continue;
        };
        let better = match &optimal {
            None => true,
            Some((_, prev_path)) => new_path.len() < prev_path.len(),
        };
        if better {
            log::debug!(
                "optimal_system: candidate {index} ({}) reaches {} in {} hop(s)",
                system.name(),
                target.name(),
                new_path.len()
            );
            optimal = Some((index, new_path));
        }
    }
    optimal
}

/// Look up and invoke the registered point converter for `(src.name(), tgt.name())`.
pub fn convert_coords(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let converter = COORD_CONVERTERS
        .get(&(src.name(), tgt.name()))
        .ok_or_else(|| unregistered(src, tgt))?;
    converter(src, tgt, data)
}

/// Look up and invoke the registered vector-field converter for `(src.name(), tgt.name())`.
pub fn convert_vectors(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
    coords: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let converter = VECTOR_CONVERTERS
        .get(&(src.name(), tgt.name()))
        .ok_or_else(|| unregistered(src, tgt))?;
    converter(src, tgt, data, coords)
}

fn unregistered(src: &CoordinateSystem, tgt: &CoordinateSystem) -> SisoError {
    SisoError::ConversionUnavailable {
        from: src.name().to_string(),
        to: tgt.name().to_string(),
        considered: vec![format!("{src:?}")],
    }
}

// --- proj4rs-backed numeric bodies ---
//
// Every function below treats `proj4rs` as the black-box geodesy library the spec calls
// for: this crate never computes a Transverse Mercator or ECEF formula itself, it only
// builds proj-strings and hands rows of coordinates to `proj4rs::transform::transform`.

fn build_proj(proj_string: &str) -> SisoResult<proj4rs::proj::Proj> {
    proj4rs::proj::Proj::from_proj_string(proj_string).map_err(|err| SisoError::ConversionUnavailable {
        from: proj_string.to_string(),
        to: String::new(),
        considered: vec![format!("{err:?}")],
    })
}

fn utm_proj_string(ellipsoid: Ellipsoid, zone_number: u32, northern: bool) -> String {
    format!(
        "+proj=utm +zone={zone_number}{} {} +units=m +no_defs",
        if northern { "" } else { " +south" },
        ellipsoid.proj_params()
    )
}

fn geodetic_proj_string(ellipsoid: Ellipsoid) -> String {
    format!("+proj=longlat {} +no_defs", ellipsoid.proj_params())
}

fn geocentric_proj_string(ellipsoid: Ellipsoid) -> String {
    format!("+proj=geocent {} +no_defs", ellipsoid.proj_params())
}

fn geodetic_to_geocentric(
    src: &CoordinateSystem,
    _tgt: &CoordinateSystem,
    data: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let CoordinateSystem::Geodetic(ellipsoid) = src else {
        unreachable!("registry only dispatches Geodetic sources here")
    };
    if data.num_comps() != 2 && data.num_comps() != 3 {
        return Err(SisoError::ShapeMismatch {
            expected: "num_comps in {2, 3}".into(),
            actual: format!("num_comps={}", data.num_comps()),
        });
    }
    let from = build_proj(&geodetic_proj_string(*ellipsoid))?;
    let to = build_proj(&geocentric_proj_string(*ellipsoid))?;

    let mut out = Vec::with_capacity(data.num_rows() * 3);
    for row in 0..data.num_rows() {
        let r = data.row(row);
        let height = if data.num_comps() == 3 { r[2] } else { 0.0 };
        let mut point = (r[0].to_radians(), r[1].to_radians(), height);
        proj4rs::transform::transform(&from, &to, &mut point).map_err(|err| {
            SisoError::ConversionUnavailable {
                from: "Geodetic".into(),
                to: "Geocentric".into(),
                considered: vec![format!("{err:?}")],
            }
        })?;
        out.push(point.0);
        out.push(point.1);
        out.push(point.2);
    }
    FieldData::from_flat(out, 3)
}

fn geodetic_to_utm(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let CoordinateSystem::Geodetic(ellipsoid) = src else {
        unreachable!("registry only dispatches Geodetic sources here")
    };
    let CoordinateSystem::Utm {
        zone_number,
        zone_letter,
    } = tgt
    else {
        unreachable!("registry only dispatches UTM targets here")
    };
    project_points(
        data,
        &geodetic_proj_string(*ellipsoid),
        &utm_proj_string(*ellipsoid, *zone_number, *zone_letter >= 'N'),
        "Geodetic",
        "UTM",
    )
}

fn utm_to_geodetic(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let CoordinateSystem::Utm {
        zone_number,
        zone_letter,
    } = src
    else {
        unreachable!("registry only dispatches UTM sources here")
    };
    let CoordinateSystem::Geodetic(ellipsoid) = tgt else {
        unreachable!("registry only dispatches Geodetic targets here")
    };
    let mut out = project_points(
        data,
        &utm_proj_string(*ellipsoid, *zone_number, *zone_letter >= 'N'),
        &geodetic_proj_string(*ellipsoid),
        "UTM",
        "Geodetic",
    )?;
    // project_points hands back radians for a longlat target; convert back to degrees.
    let comps = out.num_comps();
    let mut flat = out.into_flat();
    for row in flat.chunks_mut(comps) {
        row[0] = row[0].to_degrees();
        row[1] = row[1].to_degrees();
    }
    out = FieldData::from_flat(flat, comps)?;
    Ok(out)
}

/// Apply a `proj4rs` transform to every row's first two components (lon/lat radians in
/// for a `longlat` source, degrees in for a projected source since `proj4rs` expects
/// radians only for geographic CRS endpoints); trailing components (height, etc.) pass
/// through untouched.
fn project_points(
    data: &FieldData<f64>,
    from_proj: &str,
    to_proj: &str,
    from_label: &'static str,
    to_label: &'static str,
) -> SisoResult<FieldData<f64>> {
    if data.num_comps() != 2 && data.num_comps() != 3 {
        return Err(SisoError::ShapeMismatch {
            expected: "num_comps in {2, 3}".into(),
            actual: format!("num_comps={}", data.num_comps()),
        });
    }
    let from = build_proj(from_proj)?;
    let to = build_proj(to_proj)?;
    let from_is_geographic = from_proj.contains("longlat");

    let mut out = Vec::with_capacity(data.num_rows() * data.num_comps());
    for row in 0..data.num_rows() {
        let r = data.row(row);
        let (x0, y0) = if from_is_geographic {
            (r[0].to_radians(), r[1].to_radians())
        } else {
            (r[0], r[1])
        };
        let height = if data.num_comps() == 3 { r[2] } else { 0.0 };
        let mut point = (x0, y0, height);
        proj4rs::transform::transform(&from, &to, &mut point).map_err(|err| {
            SisoError::ConversionUnavailable {
                from: from_label.into(),
                to: to_label.into(),
                considered: vec![format!("{err:?}")],
            }
        })?;
        out.push(point.0);
        out.push(point.1);
        if data.num_comps() == 3 {
            out.push(point.2);
        }
    }
    FieldData::from_flat(out, data.num_comps())
}

fn geodetic_to_geocentric_vf(
    _src: &CoordinateSystem,
    _tgt: &CoordinateSystem,
    data: &FieldData<f64>,
    coords: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    data.spherical_to_cartesian_vector_field(coords)
}

/// Numerical (central-difference) Jacobian `d(x, y) / d(lon, lat)`, in metres per radian,
/// of the Geodetic→UTM point projection at `(lon_deg, lat_deg)`.
///
/// Analytic UTM convergence/scale-factor formulas are exactly the "numerical guts" the spec
/// places out of scope; differentiating the already-black-boxed point converter gives a
/// correct-to-the-precision-of-the-step Jacobian without this crate implementing that
/// math itself.
fn utm_jacobian(
    ellipsoid: Ellipsoid,
    zone_number: u32,
    northern: bool,
    lon_deg: f64,
    lat_deg: f64,
) -> SisoResult<[[f64; 2]; 2]> {
    const EPS: f64 = 1e-6; // radians
    let from = build_proj(&geodetic_proj_string(ellipsoid))?;
    let to = build_proj(&utm_proj_string(ellipsoid, zone_number, northern))?;
    let project = |lon_rad: f64, lat_rad: f64| -> SisoResult<(f64, f64)> {
        let mut point = (lon_rad, lat_rad, 0.0);
        proj4rs::transform::transform(&from, &to, &mut point).map_err(|err| {
            SisoError::ConversionUnavailable {
                from: "Geodetic".into(),
                to: "UTM".into(),
                considered: vec![format!("{err:?}")],
            }
        })?;
        Ok((point.0, point.1))
    };

    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let (x_lon_plus, y_lon_plus) = project(lon + EPS, lat)?;
    let (x_lon_minus, y_lon_minus) = project(lon - EPS, lat)?;
    let (x_lat_plus, y_lat_plus) = project(lon, lat + EPS)?;
    let (x_lat_minus, y_lat_minus) = project(lon, lat - EPS)?;

    Ok([
        [(x_lon_plus - x_lon_minus) / (2.0 * EPS), (x_lat_plus - x_lat_minus) / (2.0 * EPS)],
        [(y_lon_plus - y_lon_minus) / (2.0 * EPS), (y_lat_plus - y_lat_minus) / (2.0 * EPS)],
    ])
}

fn geodetic_to_utm_vf(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
    coords: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let CoordinateSystem::Geodetic(ellipsoid) = src else {
        unreachable!("registry only dispatches Geodetic sources here")
    };
    let CoordinateSystem::Utm {
        zone_number,
        zone_letter,
    } = tgt
    else {
        unreachable!("registry only dispatches UTM targets here")
    };
    if coords.num_rows() != data.num_rows() {
        return Err(SisoError::ShapeMismatch {
            expected: format!("coords.num_rows={}", data.num_rows()),
            actual: format!("coords.num_rows={}", coords.num_rows()),
        });
    }
    let northern = *zone_letter >= 'N';
    let radius = ellipsoid.semi_major_axis();

    let mut out = Vec::with_capacity(data.num_rows() * data.num_comps());
    for row in 0..data.num_rows() {
        let c = coords.row(row);
        let lat_rad = c[1].to_radians();
        let v = data.row(row);
        let rest = &v[2..];

        let jacobian = utm_jacobian(*ellipsoid, *zone_number, northern, c[0], c[1])?;
        let dlon = v[0] / (radius * lat_rad.cos());
        let dlat = v[1] / radius;
        let dx = jacobian[0][0] * dlon + jacobian[0][1] * dlat;
        let dy = jacobian[1][0] * dlon + jacobian[1][1] * dlat;

        out.push(dx);
        out.push(dy);
        out.extend_from_slice(rest);
    }
    FieldData::from_flat(out, data.num_comps())
}

fn utm_to_geodetic_vf(
    src: &CoordinateSystem,
    tgt: &CoordinateSystem,
    data: &FieldData<f64>,
    coords: &FieldData<f64>,
) -> SisoResult<FieldData<f64>> {
    let CoordinateSystem::Utm {
        zone_number,
        zone_letter,
    } = src
    else {
        unreachable!("registry only dispatches UTM sources here")
    };
    let CoordinateSystem::Geodetic(ellipsoid) = tgt else {
        unreachable!("registry only dispatches Geodetic targets here")
    };
    if coords.num_rows() != data.num_rows() {
        return Err(SisoError::ShapeMismatch {
            expected: format!("coords.num_rows={}", data.num_rows()),
            actual: format!("coords.num_rows={}", coords.num_rows()),
        });
    }
    let northern = *zone_letter >= 'N';
    let radius = ellipsoid.semi_major_axis();

    // coords are given in Geodetic (lon/lat degrees), the natural frame to evaluate the
    // forward Jacobian at and then invert.
    let mut out = Vec::with_capacity(data.num_rows() * data.num_comps());
    for row in 0..data.num_rows() {
        let c = coords.row(row);
        let lat_rad = c[1].to_radians();
        let v = data.row(row);
        let rest = &v[2..];

        let j = utm_jacobian(*ellipsoid, *zone_number, northern, c[0], c[1])?;
        let det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
        let inv = [
            [j[1][1] / det, -j[0][1] / det],
            [-j[1][0] / det, j[0][0] / det],
        ];
        let dlon = inv[0][0] * v[0] + inv[0][1] * v[1];
        let dlat = inv[1][0] * v[0] + inv[1][1] * v[1];

        out.push(dlon * radius * lat_rad.cos());
        out.push(dlat * radius);
        out.extend_from_slice(rest);
    }
    FieldData::from_flat(out, data.num_comps())
}
