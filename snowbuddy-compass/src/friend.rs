use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    location::{GeoPoint, UtcDT},
    settings::CompassSettings,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// Another member of the group, as seen through presence and location broadcasts
pub struct Friend {
    pub id: Uuid,
    pub username: String,
    /// Last location they shared, [None] until their first ping
    pub location: Option<GeoPoint>,
    /// Last time we heard anything from them
    pub last_seen: UtcDT,
}

impl Friend {
    pub fn new(id: Uuid, username: impl Into<String>, last_seen: UtcDT) -> Self {
        Self {
            id,
            username: username.into(),
            location: None,
            last_seen,
        }
    }

    /// Record a location broadcast, which also counts as hearing from them
    pub fn update_location(&mut self, location: GeoPoint) {
        self.last_seen = self.last_seen.max(location.captured_at);
        self.location = Some(location);
    }

    /// Whether we heard from them within the configured online window
    pub fn is_online(&self, now: UtcDT, settings: &CompassSettings) -> bool {
        now - self.last_seen < settings.online_window()
    }

    pub fn last_seen_label(&self, now: UtcDT) -> String {
        format_time_ago(self.last_seen, now)
    }
}

/// Short "time since" label for roster entries, `"Just now"`, `"4m ago"`, `"2h ago"`
pub fn format_time_ago(then: UtcDT, now: UtcDT) -> String {
    let minutes = (now - then).num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else {
        format!("{}h ago", minutes / 60)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    fn ago(now: UtcDT, seconds: i64) -> UtcDT {
        now - TimeDelta::seconds(seconds)
    }

    #[test]
    fn test_time_ago_labels() {
        let now = Utc::now();
        assert_eq!(format_time_ago(ago(now, 0), now), "Just now");
        assert_eq!(format_time_ago(ago(now, 59), now), "Just now");
        assert_eq!(format_time_ago(ago(now, 60), now), "1m ago");
        assert_eq!(format_time_ago(ago(now, 59 * 60), now), "59m ago");
        assert_eq!(format_time_ago(ago(now, 60 * 60), now), "1h ago");
        assert_eq!(format_time_ago(ago(now, 5 * 60 * 60 + 59), now), "5h ago");
    }

    #[test]
    fn test_future_is_just_now() {
        let now = Utc::now();
        assert_eq!(format_time_ago(ago(now, -300), now), "Just now");
    }

    #[test]
    fn test_online_window() {
        let now = Utc::now();
        let settings = CompassSettings::default();
        let mut friend = Friend::new(Uuid::new_v4(), "alex", ago(now, 14));
        assert!(friend.is_online(now, &settings));

        friend.last_seen = ago(now, 15);
        assert!(!friend.is_online(now, &settings));

        let relaxed = CompassSettings {
            online_window_seconds: 60,
            ..Default::default()
        };
        assert!(friend.is_online(now, &relaxed));
    }

    #[test]
    fn test_location_refreshes_last_seen() {
        let now = Utc::now();
        let mut friend = Friend::new(Uuid::new_v4(), "sam", ago(now, 600));
        assert_eq!(friend.last_seen_label(now), "10m ago");

        friend.update_location(GeoPoint::at(46.0, 7.0, now));
        assert_eq!(friend.last_seen, now);
        assert!(friend.location.is_some());

        // A stale, late-arriving fix doesn't move last_seen backwards
        friend.update_location(GeoPoint::at(46.1, 7.1, ago(now, 60)));
        assert_eq!(friend.last_seen, now);
    }
}
