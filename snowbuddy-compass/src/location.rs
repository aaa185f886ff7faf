use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

/// A "part" of a location, in degrees
pub type LocationComponent = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, specta::Type)]
/// A position fix as gotten from a Geolocation API
pub struct GeoPoint {
    /// Latitude, -90 to 90
    pub latitude: LocationComponent,
    /// Longitude, -180 to 180
    pub longitude: LocationComponent,
    /// When the sensor produced this fix
    pub captured_at: UtcDT,
}

impl GeoPoint {
    /// Create a point captured right now
    pub fn new(latitude: LocationComponent, longitude: LocationComponent) -> Self {
        Self::at(latitude, longitude, Utc::now())
    }

    pub fn at(
        latitude: LocationComponent,
        longitude: LocationComponent,
        captured_at: UtcDT,
    ) -> Self {
        Self {
            latitude,
            longitude,
            captured_at,
        }
    }

    /// Whether both components are finite and within their ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Compare coordinates only, two fixes of the same spot taken at different times are the
    /// same position
    pub fn same_position(&self, other: &Self) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

pub trait LocationService {
    /// Get the device's current location, [None] if the sensor couldn't get a fix
    fn get_loc(&self) -> Option<GeoPoint>;
}
