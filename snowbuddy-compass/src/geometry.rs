use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::GeoPoint;

/// Mean radius of the earth in meters, spherical approximation
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distances at or above this are displayed in kilometers
const KILOMETER_CUTOFF: f64 = 1000.0;

/// Wrap any angle into `[0, 360)`. Non-finite angles become `0`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }

    let wrapped = degrees.rem_euclid(360.0);

    // rem_euclid rounds tiny negative angles up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Initial great-circle bearing from `from` towards `to`, clockwise from north.
///
/// Identical points have no meaningful bearing and yield `0`.
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if from.same_position(to) {
        return 0.0;
    }

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    if y == 0.0 && x == 0.0 {
        return 0.0;
    }

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine distance in meters between two points
pub fn distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Distance label as shown under the compass, `"999m"` below a kilometer and `"1.5km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters >= KILOMETER_CUTOFF {
        format!("{:.1}km", meters / 1000.0)
    } else {
        let whole = meters.round().max(0.0) as u64;
        format!("{whole}m")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
/// One of the 8 principal compass points
pub enum CardinalDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CardinalDirection {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Snap a bearing to the nearest compass point
    pub fn from_bearing(bearing: f64) -> Self {
        let index = (normalize_degrees(bearing) / 45.0).round() as usize % Self::ALL.len();
        Self::ALL[index]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn pt(lat: f64, long: f64) -> GeoPoint {
        GeoPoint::new(lat, long)
    }

    fn random_points(seed: u64, count: usize) -> Vec<GeoPoint> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| pt(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0)))
            .collect()
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        assert_eq!(normalize_degrees(f64::NAN), 0.0);
        assert_eq!(normalize_degrees(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = pt(0.0, 0.0);
        assert!((bearing(&origin, &pt(1.0, 0.0)) - 0.0).abs() < EPSILON);
        assert!((bearing(&origin, &pt(0.0, 1.0)) - 90.0).abs() < EPSILON);
        assert!((bearing(&origin, &pt(-1.0, 0.0)) - 180.0).abs() < EPSILON);
        assert!((bearing(&origin, &pt(0.0, -1.0)) - 270.0).abs() < EPSILON);
    }

    #[test]
    fn test_identical_points() {
        for p in random_points(1, 200) {
            assert_eq!(bearing(&p, &p), 0.0, "Bearing to self for {p:?}");
            assert_eq!(distance(&p, &p), 0.0, "Distance to self for {p:?}");
        }
    }

    #[test]
    fn test_pole_bearing_in_range() {
        let pole = pt(90.0, 0.0);
        let same_pole = pt(90.0, 45.0);
        let b = bearing(&pole, &same_pole);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn test_bearing_range() {
        let points = random_points(2, 100);
        for pair in points.windows(2) {
            let b = bearing(&pair[0], &pair[1]);
            assert!((0.0..360.0).contains(&b), "Bearing {b} out of range");
        }
    }

    #[test]
    fn test_distance_symmetric_and_non_negative() {
        let points = random_points(3, 100);
        for pair in points.windows(2) {
            let there = distance(&pair[0], &pair[1]);
            let back = distance(&pair[1], &pair[0]);
            assert!(there >= 0.0);
            assert!((there - back).abs() < 1e-6, "{there} != {back}");
        }
    }

    #[test]
    fn test_one_degree_of_equator() {
        let d = distance(&pt(0.0, 0.0), &pt(0.0, 1.0));
        assert!((d - 111_194.93).abs() < 1.0, "Got {d}");
    }

    #[test]
    fn test_distance_monotonic_along_axis() {
        let origin = pt(0.0, 0.0);

        let mut last = 0.0;
        for step in 1..=179 {
            let d = distance(&origin, &pt(0.0, step as f64));
            assert!(d > last, "Longitude step {step} did not increase distance");
            last = d;
        }

        let mut last = 0.0;
        for step in 1..=90 {
            let d = distance(&origin, &pt(step as f64, 0.0));
            assert!(d > last, "Latitude step {step} did not increase distance");
            last = d;
        }
    }

    #[test]
    fn test_antipodes_do_not_nan() {
        let d = distance(&pt(0.0, 0.0), &pt(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn test_format_distance_cutoff() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(12.4), "12m");
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(1500.0), "1.5km");
        assert_eq!(format_distance(23_460.0), "23.5km");
    }

    #[test]
    fn test_cardinal_direction() {
        assert_eq!(CardinalDirection::from_bearing(0.0), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_bearing(22.4), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_bearing(22.6), CardinalDirection::NE);
        assert_eq!(CardinalDirection::from_bearing(90.0), CardinalDirection::E);
        assert_eq!(CardinalDirection::from_bearing(200.0), CardinalDirection::S);
        assert_eq!(CardinalDirection::from_bearing(359.0), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_bearing(-45.0), CardinalDirection::NW);
        assert_eq!(CardinalDirection::SW.to_string(), "SW");
    }
}
