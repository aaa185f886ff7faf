use serde::{Deserialize, Serialize};

use crate::geometry::normalize_degrees;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, specta::Type)]
/// A raw device orientation event, platforms fill in whichever fields they support
pub struct OrientationEvent {
    /// Heading clockwise from north, provided natively by some platforms
    pub compass_heading: Option<f64>,
    /// Rotation around the device's z axis, counter-clockwise from north
    pub alpha: Option<f64>,
}

impl OrientationEvent {
    pub fn from_compass(compass_heading: f64) -> Self {
        Self {
            compass_heading: Some(compass_heading),
            alpha: None,
        }
    }

    pub fn from_alpha(alpha: f64) -> Self {
        Self {
            compass_heading: None,
            alpha: Some(alpha),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
/// Which field of an [OrientationEvent] a heading was derived from
pub enum HeadingSource {
    /// Platform compass heading, already clockwise
    Compass,
    /// Converted from counter-clockwise alpha
    Alpha,
    /// Nothing usable in the event, assumed north
    Fallback,
}

impl HeadingSource {
    /// Whether the heading reflects an actual sensor value
    pub fn is_sensor(&self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

/// Normalize an orientation event to a heading clockwise from north in `[0, 360)`, along with
/// where the heading came from.
///
/// A compass heading wins over alpha. Non-finite values count as missing.
pub fn normalize_heading_with_source(event: &OrientationEvent) -> (f64, HeadingSource) {
    if let Some(heading) = event.compass_heading.filter(|h| h.is_finite()) {
        (normalize_degrees(heading), HeadingSource::Compass)
    } else if let Some(alpha) = event.alpha.filter(|a| a.is_finite()) {
        (normalize_degrees(360.0 - alpha), HeadingSource::Alpha)
    } else {
        (0.0, HeadingSource::Fallback)
    }
}

/// Normalize an orientation event to a heading clockwise from north in `[0, 360)`, events
/// without any usable field yield `0`
pub fn normalize_heading(event: &OrientationEvent) -> f64 {
    normalize_heading_with_source(event).0
}
