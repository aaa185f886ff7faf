use std::{sync::Arc, time::Duration};

use anyhow::bail;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, RwLockWriteGuard, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    compass::{CompassReading, compute_reading},
    filter::HeadingFilter,
    geometry::CardinalDirection,
    heading::{OrientationEvent, normalize_heading_with_source},
    location::{GeoPoint, LocationService},
    prelude::*,
    settings::CompassSettings,
};

pub trait StateUpdateSender {
    fn send_update(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Something a sensor (or the realtime channel) told us
pub enum SensorEvent {
    /// New fix for this device, for platforms that push position updates
    SelfLocation(GeoPoint),
    /// This device lost its fix
    LocationUnavailable,
    /// The friend we're navigating to broadcast a new location
    TargetLocation(GeoPoint),
    /// Raw device orientation reading
    Orientation(OrientationEvent),
    /// Sensors were shut down by the user, this is a success state
    Closed,
    /// The sensor source hit a critical error and can't continue
    Error(String),
}

impl From<OrientationEvent> for SensorEvent {
    fn from(v: OrientationEvent) -> Self {
        Self::Orientation(v)
    }
}

pub trait SensorSource: Send + Sync {
    /// Wait for the next batch of sensor events
    fn receive_events(&self) -> impl Future<Output = impl Iterator<Item = SensorEvent>>;
}

/// A [SensorSource] fed through a channel, platform callbacks push into the sender half.
///
/// Once every sender is dropped and the queue drains the source reports [SensorEvent::Closed].
pub struct ChannelSensors {
    rx: Mutex<mpsc::Receiver<SensorEvent>>,
}

impl ChannelSensors {
    const BATCH: usize = 20;

    pub fn new(buffer: usize) -> (mpsc::Sender<SensorEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx: Mutex::new(rx) })
    }
}

impl SensorSource for ChannelSensors {
    async fn receive_events(&self) -> impl Iterator<Item = SensorEvent> {
        let mut rx = self.rx.lock().await;
        let mut buf = Vec::with_capacity(Self::BATCH);
        if rx.recv_many(&mut buf, Self::BATCH).await == 0 {
            buf.push(SensorEvent::Closed);
        }
        buf.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// A reading with its display-ready labels
pub struct CompassView {
    pub reading: CompassReading,
    pub distance_label: String,
    pub direction: CardinalDirection,
    /// False when the heading is the north fallback rather than a sensor value
    pub heading_from_sensor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// What the compass panel should show
pub enum CompassUiState {
    /// We don't have a fix for this device yet
    AwaitingLocation,
    /// The friend hasn't shared a location yet
    AwaitingTarget,
    Navigating(CompassView),
}

#[derive(Debug, Clone)]
/// All state for navigating towards a single target. Recomputes the reading whenever any input
/// changes, inputs don't need to arrive together.
pub struct NavigationState {
    filter: HeadingFilter,

    /// This device's last fix
    self_point: Option<GeoPoint>,

    /// The target's last known position
    target: Option<GeoPoint>,

    /// Smoothed heading, [None] until the first orientation sample
    heading: Option<f64>,

    /// Whether the latest orientation sample had a usable field
    heading_from_sensor: bool,

    /// Latest derived reading, only present when both points are known
    reading: Option<CompassReading>,
}

impl NavigationState {
    pub fn new(settings: &CompassSettings, target: Option<GeoPoint>) -> Self {
        Self {
            filter: HeadingFilter::new(settings.filter_capacity()),
            self_point: None,
            target,
            heading: None,
            heading_from_sensor: false,
            reading: None,
        }
    }

    pub fn filter(&self) -> &HeadingFilter {
        &self.filter
    }

    pub fn reading(&self) -> Option<CompassReading> {
        self.reading
    }

    pub fn self_point(&self) -> Option<GeoPoint> {
        self.self_point
    }

    pub fn target(&self) -> Option<GeoPoint> {
        self.target
    }

    /// Heading used for readings, north until a sample arrives
    pub fn heading(&self) -> f64 {
        self.heading.unwrap_or(0.0)
    }

    fn recompute(&mut self) -> Option<CompassReading> {
        self.reading = match (&self.self_point, &self.target) {
            (Some(me), Some(target)) => Some(compute_reading(me, target, self.heading())),
            _ => None,
        };
        self.reading
    }

    /// Smooth in a new orientation sample and recompute
    pub fn push_orientation(&mut self, event: &OrientationEvent) -> Option<CompassReading> {
        let (raw, source) = normalize_heading_with_source(event);
        let smoothed = self.filter.add_sample(raw);
        self.heading = Some(smoothed);
        self.heading_from_sensor = source.is_sensor();
        self.recompute()
    }

    /// Set this device's position, out of range fixes and fixes older than the current one are
    /// dropped
    pub fn update_self(&mut self, point: GeoPoint) -> Option<CompassReading> {
        if !point.is_valid() {
            warn!("Ignoring invalid self location {point:?}");
        } else if self
            .self_point
            .is_some_and(|current| point.captured_at < current.captured_at)
        {
            debug!("Ignoring stale self location {point:?}");
        } else {
            self.self_point = Some(point);
        }
        self.recompute()
    }

    /// Forget this device's position, the compass waits for a new fix
    pub fn clear_self(&mut self) {
        self.self_point = None;
        self.recompute();
    }

    /// Move the current target, heading history is kept as it's the same session
    pub fn update_target(&mut self, point: GeoPoint) -> Option<CompassReading> {
        if point.is_valid() {
            self.target = Some(point);
        } else {
            warn!("Ignoring invalid target location {point:?}");
        }
        self.recompute()
    }

    /// Switch to a different target, starting a fresh session
    pub fn retarget(&mut self, target: Option<GeoPoint>) -> Option<CompassReading> {
        self.reset();
        self.target = target.filter(GeoPoint::is_valid);
        self.recompute()
    }

    /// Drop all heading history
    pub fn reset(&mut self) {
        self.filter.reset();
        self.heading = None;
        self.heading_from_sensor = false;
        self.recompute();
    }

    pub fn as_ui_state(&self) -> CompassUiState {
        if self.self_point.is_none() {
            CompassUiState::AwaitingLocation
        } else if let Some(reading) = self.reading {
            CompassUiState::Navigating(CompassView {
                reading,
                distance_label: reading.distance_label(),
                direction: reading.direction(),
                heading_from_sensor: self.heading_from_sensor,
            })
        } else {
            CompassUiState::AwaitingTarget
        }
    }
}

/// A live compass pointed at one target. Consumes events from a [SensorSource], polls
/// [LocationService] for this device's fix, and notifies the UI via [StateUpdateSender] after
/// every change.
pub struct CompassSession<L: LocationService, S: SensorSource, U: StateUpdateSender> {
    state: RwLock<NavigationState>,
    sensors: Arc<S>,
    location: L,
    state_update_sender: U,
    interval: Duration,
    cancel: CancellationToken,
}

impl<L: LocationService, S: SensorSource, U: StateUpdateSender> CompassSession<L, S, U> {
    pub fn new(
        settings: &CompassSettings,
        target: Option<GeoPoint>,
        sensors: Arc<S>,
        location: L,
        state_update_sender: U,
    ) -> Self {
        Self {
            state: RwLock::new(NavigationState::new(settings, target)),
            sensors,
            location,
            state_update_sender,
            interval: settings.poll_interval(),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn get_ui_state(&self) -> CompassUiState {
        self.state.read().await.as_ui_state()
    }

    pub async fn latest_reading(&self) -> Option<CompassReading> {
        self.state.read().await.reading()
    }

    /// Point the compass at someone else, heading history doesn't carry over
    pub async fn retarget(&self, target: Option<GeoPoint>) {
        info!("Retargeting compass to {target:?}");
        self.state.write().await.retarget(target);
        self.state_update_sender.send_update();
    }

    /// Stop the session, [Self::main_loop] returns `Ok(None)`
    pub async fn end_session(&self) {
        self.cancel.cancel();
    }

    fn poll_location(&self, state: &mut NavigationState) {
        if let Some(point) = self.location.get_loc() {
            state.update_self(point);
        } else {
            warn!("Location unavailable, waiting for a new fix");
            state.clear_self();
        }
    }

    /// Apply a single event, returns whether the session should end
    fn consume_event(&self, state: &mut NavigationState, event: SensorEvent) -> Result<bool> {
        match event {
            SensorEvent::Orientation(orientation) => {
                state.push_orientation(&orientation);
            }
            SensorEvent::SelfLocation(point) => {
                state.update_self(point);
            }
            SensorEvent::LocationUnavailable => {
                warn!("Sensors reported location unavailable");
                state.clear_self();
            }
            SensorEvent::TargetLocation(point) => {
                debug!("Target moved to {point:?}");
                state.update_target(point);
            }
            SensorEvent::Closed => {
                return Ok(true);
            }
            SensorEvent::Error(why) => bail!("Sensor error: {why}"),
        }
        Ok(false)
    }

    /// Main loop of the session, handles sensor events and periodic location polling.
    /// Returns the last reading if sensors closed normally.
    pub async fn main_loop(&self) -> Result<Option<CompassReading>> {
        info!("Compass session started");

        let mut interval = tokio::time::interval(self.interval);
        // First tick completes immediately, it's covered by the poll below
        interval.tick().await;

        let mut state = self.state.write().await;
        self.poll_location(&mut state);
        drop(state);
        self.state_update_sender.send_update();

        let res = 'session: loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break 'session Ok(None);
                }

                events = self.sensors.receive_events() => {
                    let mut state = self.state.write().await;
                    for event in events {
                        match self.consume_event(&mut state, event) {
                            Ok(should_break) => {
                                if should_break {
                                    break 'session Ok(state.reading());
                                }
                            }
                            Err(why) => { break 'session Err(why); }
                        }
                    }
                    drop(state);
                    self.state_update_sender.send_update();
                }

                _ = interval.tick() => {
                    let mut state = self.state.write().await;
                    self.poll_location(&mut state);
                    drop(state);
                    self.state_update_sender.send_update();
                }
            }
        };

        self.state.write().await.reset();
        self.state_update_sender.send_update();

        info!("Compass session ended");

        res
    }

    pub async fn lock_state(&self) -> RwLockWriteGuard<'_, NavigationState> {
        self.state.write().await
    }
}
