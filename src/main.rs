#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod flight_control;
mod logger;
mod vehicle_link;

use crate::config::{Invocation, MissionConfig, USAGE};
use crate::flight_control::{FlightComputer, MissionOutcome, NavLog, Supervisor};
use crate::vehicle_link::VehicleEndpoint;
use std::{process::ExitCode, time::Duration};

/// Time the vehicle gets to stream its initial state before the mission starts.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

const EXIT_LINK_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let config = match MissionConfig::from_env() {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    info!("Creating log file");
    let nav_log = match NavLog::start_log(&config.log_dir, &config.log_file) {
        Ok(nav_log) => Some(nav_log),
        Err(e) => {
            warn!("Flying without nav log: {e}");
            None
        }
    };

    info!("starting connection");
    let endpoint = config.endpoint();
    let (link, telemetry_rx) = match VehicleEndpoint::connect(&endpoint).await {
        Ok(res) => res,
        Err(e) => {
            error!("Could not reach vehicle at {endpoint}: {e}");
            return ExitCode::from(EXIT_LINK_FAILURE);
        }
    };
    tokio::time::sleep(SETTLE_DELAY).await;

    let f_cont = FlightComputer::new(link.command_sink(), config.thresholds);
    let mut supervisor = Supervisor::new(f_cont, nav_log);
    let outcome = supervisor.run(telemetry_rx).await;
    info!("Processed {} telemetry events", supervisor.dispatcher().stats().total());
    link.shutdown().await;

    info!("Closing log file");
    match supervisor.stop_log() {
        Some(Ok(path)) => info!("Nav log written to {}", path.display()),
        Some(Err(e)) => warn!("Could not close nav log: {e}"),
        None => {}
    }

    match outcome {
        MissionOutcome::Completed => ExitCode::SUCCESS,
        MissionOutcome::LinkClosed { phase } => {
            error!("Vehicle link lost during {phase}");
            ExitCode::from(EXIT_LINK_FAILURE)
        }
    }
}
