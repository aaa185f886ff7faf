use std::path::Path;

use serde::{Deserialize, Serialize};
use snowbuddy_compass::{
    CompassReading, CompassSettings, CompassUiState, GeoPoint, OrientationEvent, SensorEvent,
};

pub mod prelude {
    pub use anyhow::{Context, anyhow, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// One line of a replay script
pub enum ReplayStep {
    /// New fix for this device
    SelfAt { latitude: f64, longitude: f64 },
    /// The target broadcast a new location
    TargetAt { latitude: f64, longitude: f64 },
    /// This device lost its fix
    LocationLost,
    /// Raw orientation event
    Orientation(OrientationEvent),
    /// Make the sensor stream fail with the given message
    Fail(String),
}

impl From<ReplayStep> for SensorEvent {
    fn from(step: ReplayStep) -> Self {
        match step {
            ReplayStep::SelfAt {
                latitude,
                longitude,
            } => SensorEvent::SelfLocation(GeoPoint::new(latitude, longitude)),
            ReplayStep::TargetAt {
                latitude,
                longitude,
            } => SensorEvent::TargetLocation(GeoPoint::new(latitude, longitude)),
            ReplayStep::LocationLost => SensorEvent::LocationUnavailable,
            ReplayStep::Orientation(event) => SensorEvent::Orientation(event),
            ReplayStep::Fail(why) => SensorEvent::Error(why),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// A line of replay output
pub enum ReplayOutput {
    /// UI state after a step was applied
    Update(CompassUiState),
    /// The script ran out, contains the last reading
    Finished(Option<CompassReading>),
}

/// Parse a replay script, one JSON [ReplayStep] per line. Blank lines and lines starting with `#`
/// are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ReplayStep>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid step on line {number}"))
        })
        .collect()
}

/// Read settings from a JSON file, or use the defaults when no path is given
pub fn load_settings(path: Option<&Path>) -> Result<CompassSettings> {
    let settings = if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse settings")?
    } else {
        CompassSettings::default()
    };

    settings.validate().context("Invalid settings")?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = r#"
            # start at the lift
            {"self_at": {"latitude": 46.0, "longitude": 7.0}}
            {"target_at": {"latitude": 46.01, "longitude": 7.0}}

            {"orientation": {"alpha": 90.0}}
            "location_lost"
            {"fail": "compass broke"}
        "#;

        let steps = parse_script(script).expect("Failed to parse");
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[2],
            ReplayStep::Orientation(OrientationEvent::from_alpha(90.0))
        );
        assert_eq!(steps[3], ReplayStep::LocationLost);
        assert_eq!(steps[4], ReplayStep::Fail("compass broke".to_string()));
    }

    #[test]
    fn test_parse_error_has_line() {
        let script = "\"location_lost\"\n{\"self_at\": 12}\n";
        let err = parse_script(script).expect_err("Bad step parsed");
        assert!(err.to_string().contains("line 2"), "Got: {err}");
    }

    #[test]
    fn test_step_into_event() {
        let event: SensorEvent = ReplayStep::TargetAt {
            latitude: 1.0,
            longitude: 2.0,
        }
        .into();

        match event {
            SensorEvent::TargetLocation(point) => {
                assert_eq!((point.latitude, point.longitude), (1.0, 2.0));
            }
            other => panic!("Wrong event {other:?}"),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = load_settings(None).expect("Defaults invalid");
        assert_eq!(settings, CompassSettings::default());
    }

    #[test]
    fn test_partial_settings_file() {
        let path = std::env::temp_dir().join(format!(
            "snowbuddy-settings-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"filter_capacity": 8}"#).expect("Failed to write");

        let settings = load_settings(Some(&path)).expect("Failed to load");
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.filter_capacity, 8);
        assert_eq!(
            settings.online_window_seconds,
            CompassSettings::default().online_window_seconds
        );
    }
}
