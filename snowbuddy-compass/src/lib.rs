mod compass;
mod filter;
mod friend;
mod geometry;
mod heading;
mod location;
mod session;
mod settings;

pub use compass::{CompassReading, compute_reading, relative_angle};
pub use filter::{DEFAULT_FILTER_CAPACITY, FilterPhase, HeadingFilter};
pub use friend::{Friend, format_time_ago};
pub use geometry::{
    CardinalDirection, EARTH_RADIUS_METERS, bearing, distance, format_distance, normalize_degrees,
};
pub use heading::{HeadingSource, OrientationEvent, normalize_heading, normalize_heading_with_source};
pub use location::{GeoPoint, LocationComponent, LocationService, UtcDT};
pub use session::{
    ChannelSensors, CompassSession, CompassUiState, CompassView, NavigationState, SensorEvent,
    SensorSource, StateUpdateSender,
};
pub use settings::CompassSettings;

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
