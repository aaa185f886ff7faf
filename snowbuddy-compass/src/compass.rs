use serde::{Deserialize, Serialize};

use crate::{
    geometry::{CardinalDirection, bearing, distance, format_distance, normalize_degrees},
    location::GeoPoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, specta::Type)]
/// Everything the compass needs to draw, freshly derived on every sensor update
pub struct CompassReading {
    /// Great-circle bearing to the target, clockwise from north
    pub bearing_degrees: f64,
    /// Haversine distance to the target
    pub distance_meters: f64,
    /// Smoothed device heading, clockwise from north
    pub heading_degrees: f64,
    /// How far to rotate a forward-pointing arrow so it points at the target
    pub relative_angle_degrees: f64,
}

impl CompassReading {
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_meters)
    }

    pub fn direction(&self) -> CardinalDirection {
        CardinalDirection::from_bearing(self.bearing_degrees)
    }
}

/// Angle between the bearing to a target and the device heading, in `[0, 360)`
pub fn relative_angle(bearing: f64, heading: f64) -> f64 {
    normalize_degrees(bearing - heading)
}

/// Combine both positions and the current smoothed heading into a [CompassReading].
///
/// Callers must have both points, a missing fix is a UI state rather than something to compute.
pub fn compute_reading(
    self_point: &GeoPoint,
    target: &GeoPoint,
    smoothed_heading: f64,
) -> CompassReading {
    let bearing_degrees = bearing(self_point, target);
    let heading_degrees = normalize_degrees(smoothed_heading);

    CompassReading {
        bearing_degrees,
        distance_meters: distance(self_point, target),
        heading_degrees,
        relative_angle_degrees: relative_angle(bearing_degrees, heading_degrees),
    }
}
