use std::time::Duration;

use anyhow::bail;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{filter::DEFAULT_FILTER_CAPACITY, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
#[serde(default)]
/// Tunables for the compass and friend roster
pub struct CompassSettings {
    /// How many heading samples to smooth over, higher is steadier but lags more
    pub filter_capacity: u32,
    /// A friend counts as online if we heard from them within this many seconds
    pub online_window_seconds: u32,
    /// How often a running session asks the location service for a new fix
    pub location_poll_seconds: u32,
}

impl CompassSettings {
    pub fn validate(&self) -> Result {
        if self.filter_capacity == 0 {
            bail!("filter_capacity must be at least 1");
        }
        if self.location_poll_seconds == 0 {
            bail!("location_poll_seconds must be at least 1");
        }
        Ok(())
    }

    pub fn filter_capacity(&self) -> usize {
        self.filter_capacity as usize
    }

    pub fn online_window(&self) -> TimeDelta {
        TimeDelta::seconds(self.online_window_seconds as i64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.location_poll_seconds as u64)
    }
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            filter_capacity: DEFAULT_FILTER_CAPACITY as u32,
            online_window_seconds: 15,
            location_poll_seconds: 5,
        }
    }
}
