use std::{io::Read, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use log::{debug, info};
use snowbuddy_compass::{
    ChannelSensors, CompassSession, GeoPoint, LocationService, SensorEvent, StateUpdateSender,
    compute_reading,
};
use snowbuddy_test_shared::*;
use tokio::sync::mpsc;

#[derive(Parser)]
struct Cli {
    /// JSON file with compass settings, defaults are used if omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single compass reading between two points
    #[command(allow_negative_numbers = true)]
    Reading {
        from_lat: f64,
        from_long: f64,
        to_lat: f64,
        to_long: f64,
        /// Device heading, clockwise from north
        #[arg(long, default_value_t = 0.0)]
        heading: f64,
    },
    /// Replay a script of sensor events through a compass session
    Replay {
        /// Script with one JSON step per line, reads stdin if omitted
        script: Option<PathBuf>,
    },
}

/// Location service that reports the script's first fix, later fixes arrive as events
struct StartingFix(Option<GeoPoint>);

impl LocationService for StartingFix {
    fn get_loc(&self) -> Option<GeoPoint> {
        self.0
    }
}

struct UpdateSender(mpsc::UnboundedSender<()>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        self.0.send(()).ok();
    }
}

type Session = CompassSession<StartingFix, ChannelSensors, UpdateSender>;

fn print_output(output: &ReplayOutput) -> Result {
    let line = serde_json::to_string(output).context("Failed to serialize output")?;
    println!("{line}");
    Ok(())
}

fn read_script(path: Option<PathBuf>) -> Result<String> {
    if let Some(path) = path {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script {}", path.display()))
    } else {
        let mut buf = String::with_capacity(1024);
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read script from stdin")?;
        Ok(buf)
    }
}

/// Send steps one at a time, printing the UI state after each is applied
async fn feed(
    tx: mpsc::Sender<SensorEvent>,
    session: &Session,
    steps: Vec<ReplayStep>,
    updates: &mut mpsc::UnboundedReceiver<()>,
) -> Result {
    // Initial location poll
    updates.recv().await;

    for step in steps {
        debug!("Replaying {step:?}");
        let is_failure = matches!(step, ReplayStep::Fail(_));

        // Skip notifications from location polls so the next one is for this step
        while updates.try_recv().is_ok() {}

        tx.send(step.into())
            .await
            .context("Session stopped accepting events")?;
        updates.recv().await;

        print_output(&ReplayOutput::Update(session.get_ui_state().await))?;

        if is_failure {
            break;
        }
    }

    // Dropping the sender closes the sensors and ends the session
    Ok(())
}

async fn replay(settings: snowbuddy_compass::CompassSettings, script: String) -> Result {
    let steps = parse_script(&script)?;
    info!("Replaying {} steps", steps.len());

    let first_fix = steps.iter().find_map(|step| match step {
        ReplayStep::SelfAt {
            latitude,
            longitude,
        } => Some(GeoPoint::new(*latitude, *longitude)),
        _ => None,
    });

    let (tx, sensors) = ChannelSensors::new(1);
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    let session: Session = CompassSession::new(
        &settings,
        None,
        Arc::new(sensors),
        StartingFix(first_fix),
        UpdateSender(update_tx),
    );

    let (res, fed) = tokio::join!(
        session.main_loop(),
        feed(tx, &session, steps, &mut update_rx)
    );

    fed.context("Failed to feed script")?;
    let reading = res.context("Replay failed")?;

    print_output(&ReplayOutput::Finished(reading))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Reading {
            from_lat,
            from_long,
            to_lat,
            to_long,
            heading,
        } => {
            let from = GeoPoint::new(from_lat, from_long);
            let to = GeoPoint::new(to_lat, to_long);
            if !from.is_valid() || !to.is_valid() {
                bail!("Coordinates out of range");
            }

            let reading = compute_reading(&from, &to, heading);
            println!(
                "bearing:  {:.1}° ({})",
                reading.bearing_degrees,
                reading.direction()
            );
            println!("distance: {}", reading.distance_label());
            println!("heading:  {:.1}°", reading.heading_degrees);
            println!("relative: {:.1}°", reading.relative_angle_degrees);
            Ok(())
        }
        Commands::Replay { script } => {
            let script = read_script(script)?;
            replay(settings, script).await
        }
    }
}
