//! Great-circle distance on a spherical earth.

use serde::{Deserialize, Serialize};

/// Mean earth radius used for the haversine approximation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a pair from optional parts, rejecting missing or non-finite values.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Some(Self {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }
}

/// Haversine distance in kilometres, rounded to 3 decimal places.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    round3(EARTH_RADIUS_KM * c)
}

/// Distance from `origin` to the point `(latitude, longitude)`.
///
/// Returns `None` when either side is missing or non-finite.
#[must_use]
pub fn distance_km(
    origin: Option<Coordinates>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<f64> {
    let origin = origin.filter(|o| o.latitude.is_finite() && o.longitude.is_finite())?;
    let target = Coordinates::from_parts(latitude, longitude)?;
    Some(haversine_km(origin, target))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELHI: Coordinates = Coordinates {
        latitude: 28.6139,
        longitude: 77.2090,
    };
    const CONNAUGHT_PLACE: Coordinates = Coordinates {
        latitude: 28.6304,
        longitude: 77.2177,
    };

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(DELHI, DELHI), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let points = [
            DELHI,
            CONNAUGHT_PLACE,
            Coordinates { latitude: -33.8688, longitude: 151.2093 },
            Coordinates { latitude: 51.5074, longitude: -0.1278 },
            Coordinates { latitude: 89.9, longitude: -179.9 },
            Coordinates { latitude: -90.0, longitude: 180.0 },
        ];
        for a in points {
            for b in points {
                assert_eq!(haversine_km(a, b), haversine_km(b, a), "{a:?} <-> {b:?}");
            }
        }
    }

    #[test]
    fn known_short_distance() {
        let d = haversine_km(DELHI, CONNAUGHT_PLACE);
        assert!((d - 1.998).abs() < 0.01, "unexpected distance {d}");
    }

    #[test]
    fn known_long_distance() {
        let london = Coordinates { latitude: 51.5074, longitude: -0.1278 };
        let paris = Coordinates { latitude: 48.8566, longitude: 2.3522 };
        let d = haversine_km(london, paris);
        assert!((d - 343.5).abs() < 1.0, "unexpected distance {d}");
    }

    #[test]
    fn result_has_at_most_three_decimals() {
        let d = haversine_km(DELHI, CONNAUGHT_PLACE);
        assert_eq!(d, (d * 1000.0).round() / 1000.0);
    }

    #[test]
    fn missing_origin_yields_none() {
        assert_eq!(distance_km(None, Some(28.6), Some(77.2)), None);
    }

    #[test]
    fn missing_target_yields_none() {
        assert_eq!(distance_km(Some(DELHI), None, Some(77.2)), None);
        assert_eq!(distance_km(Some(DELHI), Some(28.6), None), None);
    }

    #[test]
    fn non_finite_target_yields_none() {
        assert_eq!(distance_km(Some(DELHI), Some(f64::NAN), Some(77.2)), None);
        assert_eq!(distance_km(Some(DELHI), Some(28.6), Some(f64::INFINITY)), None);
    }

    #[test]
    fn present_pairs_yield_non_negative_distance() {
        let d = distance_km(Some(DELHI), Some(28.6304), Some(77.2177)).expect("distance");
        assert!(d >= 0.0);
    }
}
