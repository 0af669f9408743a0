use super::*;
use crate::field::FieldData;

#[test]
fn utm_roundtrip_stays_within_millimetres() {
    let geodetic = CoordinateSystem::Geodetic(Ellipsoid::Wgs84);
    let utm = CoordinateSystem::Utm {
        zone_number: 31,
        zone_letter: 'N',
    };

    let lonlat = FieldData::from_flat(vec![2.3522, 48.8566], 2).unwrap();
    let projected = convert_coords(&geodetic, &utm, &lonlat).unwrap();
    assert_eq!(projected.num_comps(), 2);

    let back = convert_coords(&utm, &geodetic, &projected).unwrap();
    let original = lonlat.row(0);
    let roundtripped = back.row(0);
    assert!((original[0] - roundtripped[0]).abs() < 1e-6);
    assert!((original[1] - roundtripped[1]).abs() < 1e-6);
}

#[test]
fn path_from_utm_to_geocentric_hops_through_geodetic() {
    let utm = CoordinateSystem::Utm {
        zone_number: 32,
        zone_letter: 'N',
    };
    let path = conversion_path(&utm, &CoordinateSystem::Geocentric).unwrap();
    assert_eq!(
        path,
        vec![
            CoordinateSystem::Utm {
                zone_number: 32,
                zone_letter: 'N'
            },
            CoordinateSystem::Geodetic(Ellipsoid::Wgs84),
            CoordinateSystem::Geocentric,
        ]
    );
}

#[test]
fn same_system_path_is_empty() {
    let sys = CoordinateSystem::Geodetic(Ellipsoid::Wgs84);
    assert_eq!(conversion_path(&sys, &sys), Some(Vec::new()));
}

#[test]
fn generic_target_is_always_reachable_from_generic_or_named() {
    assert_eq!(
        conversion_path(&CoordinateSystem::Generic, &CoordinateSystem::Generic),
        Some(Vec::new())
    );
    assert_eq!(
        conversion_path(
            &CoordinateSystem::Named("foo".into()),
            &CoordinateSystem::Generic
        ),
        Some(Vec::new())
    );
}

#[test]
fn unreachable_systems_return_none() {
    assert_eq!(
        conversion_path(&CoordinateSystem::Generic, &CoordinateSystem::Geocentric),
        None
    );
}

#[test]
fn optimal_system_prefers_shortest_path() {
    let target = CoordinateSystem::Geocentric;
    let candidates = vec![
        CoordinateSystem::Utm {
            zone_number: 31,
            zone_letter: 'N',
        },
        CoordinateSystem::Geodetic(Ellipsoid::Wgs84),
    ];
    let (index, path) = optimal_system(&candidates, &target).unwrap();
    assert_eq!(index, 1);
    assert_eq!(path.len(), 1);
}

#[test]
fn optimal_system_skips_unreachable_candidates() {
    let target = CoordinateSystem::Geocentric;
    let candidates = vec![CoordinateSystem::Generic, CoordinateSystem::Geodetic(Ellipsoid::Wgs84)];
    let (index, _) = optimal_system(&candidates, &target).unwrap();
    assert_eq!(index, 1);
}

#[test]
fn vector_field_roundtrip_through_geocentric_preserves_magnitude() {
    let geodetic = CoordinateSystem::Geodetic(Ellipsoid::Wgs84);
    let coords = FieldData::from_flat(vec![0.0, 0.0], 2).unwrap();
    let vectors = FieldData::from_flat(vec![1.0, 0.0, 0.0], 3).unwrap();

    let cartesian = convert_vectors(&geodetic, &CoordinateSystem::Geocentric, &vectors, &coords).unwrap();
    let magnitude: f64 = cartesian.row(0).iter().map(|c| c * c).sum::<f64>().sqrt();
    assert!((magnitude - 1.0).abs() < 1e-9);
}
