use super::{
    command_sink::CommandSink,
    event_dispatcher::EventDispatcher,
    flight_computer::FlightComputer,
    flight_phase::FlightPhase,
    nav_log::NavLog,
    telemetry::TelemetryEvent,
};
use crate::{error, info, warn};
use std::{io, path::PathBuf};
use tokio::sync::mpsc::Receiver;

/// How a mission run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    /// The state machine went back to `Manual` and left the mission.
    Completed,
    /// Telemetry stopped arriving before the mission finished.
    LinkClosed { phase: FlightPhase },
}

/// Drives a [`FlightComputer`] from a stream of telemetry events.
///
/// Events are processed strictly one after another: telemetry update, guard
/// evaluation and command issuance of one event finish before the next event is
/// taken from the channel, so no locking is needed around the flight computer.
pub struct Supervisor<S: CommandSink> {
    f_cont: FlightComputer<S>,
    dispatcher: EventDispatcher,
    nav_log: Option<NavLog>,
}

impl<S: CommandSink> Supervisor<S> {
    pub fn new(f_cont: FlightComputer<S>, nav_log: Option<NavLog>) -> Self {
        Self { f_cont, dispatcher: EventDispatcher::new(), nav_log }
    }

    #[cfg(test)]
    pub fn f_cont(&self) -> &FlightComputer<S> { &self.f_cont }

    pub fn dispatcher(&self) -> &EventDispatcher { &self.dispatcher }

    /// Handles a single event and reports whether the mission is still running.
    pub fn handle(&mut self, event: TelemetryEvent) -> bool {
        if let Err(e) = self.dispatcher.dispatch(&mut self.f_cont, event) {
            error!("Command failed in phase {}: {e}", self.f_cont.phase());
        }
        if let Some(nav_log) = self.nav_log.as_mut() {
            if let Err(e) = nav_log.record(&event, self.f_cont.phase()) {
                warn!("Dropping nav log after write failure: {e}");
                self.nav_log = None;
            }
        }
        self.f_cont.in_mission()
    }

    /// Consumes telemetry until the mission completes or the channel closes.
    pub async fn run(&mut self, mut telemetry_rx: Receiver<TelemetryEvent>) -> MissionOutcome {
        if !self.f_cont.in_mission() {
            return MissionOutcome::Completed;
        }
        while let Some(event) = telemetry_rx.recv().await {
            if !self.handle(event) {
                info!("Mission complete!");
                return MissionOutcome::Completed;
            }
        }
        let phase = self.f_cont.phase();
        warn!(
            "Telemetry ended in phase {phase} before mission completion! Target was {}, {} waypoints left.",
            self.f_cont.target_position(),
            self.f_cont.plan().len()
        );
        MissionOutcome::LinkClosed { phase }
    }

    /// Closes the nav log, if one is open.
    pub fn stop_log(&mut self) -> Option<io::Result<PathBuf>> {
        self.nav_log.take().map(NavLog::stop_log)
    }
}
