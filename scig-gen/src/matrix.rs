//! Pairwise facility network matrices.
//!
//! Great-circle distances on a spherical earth, plus the transport-emission
//! matrix derived from them by a fixed linear factor. Both matrices are
//! fixed-size, sized once from the facility count, symmetric, and zero on
//! the diagonal.

use tracing::instrument;

use crate::model::Facility;

/// Spherical-earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Transport emission per kilometer of great-circle distance.
pub const TRANSPORT_EMISSION_FACTOR: f64 = 1.05;

/// The pairwise matrices over a facility set, indexed by facility id.
#[derive(Clone, Debug, PartialEq)]
pub struct FacilityMatrices {
    /// Great-circle distance in kilometers; symmetric, zero diagonal.
    pub distance_km: Vec<Vec<f64>>,
    /// Transport emission, `distance_km * TRANSPORT_EMISSION_FACTOR`
    /// elementwise.
    pub transport_emission: Vec<Vec<f64>>,
}

/// Haversine great-circle distance in kilometers between two (lon, lat)
/// points given in degrees.
#[must_use]
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Build the distance and transport-emission matrices for `facilities`.
#[instrument(skip(facilities), fields(count = facilities.len()))]
#[must_use]
pub fn build_matrices(facilities: &[Facility]) -> FacilityMatrices {
    let count = facilities.len();
    let mut distance_km = vec![vec![0.0; count]; count];

    for i in 0..count {
        for j in (i + 1)..count {
            let d = haversine_km(
                facilities[i].lon,
                facilities[i].lat,
                facilities[j].lon,
                facilities[j].lat,
            );
            distance_km[i][j] = d;
            distance_km[j][i] = d;
        }
    }

    let transport_emission = distance_km
        .iter()
        .map(|row| row.iter().map(|d| d * TRANSPORT_EMISSION_FACTOR).collect())
        .collect();

    FacilityMatrices { distance_km, transport_emission }
}

#[cfg(test)]
mod tests {
    use assertables::assert_in_delta;

    use super::*;

    fn facility(id: usize, lon: f64, lat: f64) -> Facility {
        Facility {
            id,
            lat,
            lon,
            lead_time: 2,
            service_index: 1,
            capacity: 50,
        }
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        // 6371 km * pi / 180.
        assert_in_delta!(haversine_km(0.0, 0.0, 1.0, 0.0), 111.195, 0.001);
    }

    #[test]
    fn london_to_paris_is_about_343_km() {
        assert_in_delta!(haversine_km(-0.1278, 51.5074, 2.3522, 48.8566), 343.5, 2.0);
    }

    #[test]
    fn matrices_are_symmetric_with_zero_diagonal() {
        let facilities = vec![
            facility(0, 0.0, 0.0),
            facility(1, 10.0, 10.0),
            facility(2, -20.0, 35.0),
        ];
        let matrices = build_matrices(&facilities);

        for i in 0..3 {
            assert_eq!(matrices.distance_km[i][i], 0.0);
            assert_eq!(matrices.transport_emission[i][i], 0.0);
            for j in 0..3 {
                assert_eq!(matrices.distance_km[i][j], matrices.distance_km[j][i]);
                assert_eq!(
                    matrices.transport_emission[i][j],
                    matrices.distance_km[i][j] * TRANSPORT_EMISSION_FACTOR
                );
            }
        }
        assert!(matrices.distance_km[0][1] > 0.0);
    }

    #[test]
    fn empty_facility_set_yields_empty_matrices() {
        let matrices = build_matrices(&[]);
        assert!(matrices.distance_km.is_empty());
        assert!(matrices.transport_emission.is_empty());
    }
}
