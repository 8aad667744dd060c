use super::{
    command_sink::{CommandError, CommandSink},
    common::vec3d::Vec3D,
    flight_phase::FlightPhase,
    mission_plan::MissionPlan,
    telemetry::TelemetryModel,
    thresholds::FlightThresholds,
};
use crate::{fatal, log, phase, warn};

/// Heading commanded with every position setpoint.
const WAYPOINT_HEADING: f64 = 0.0;

/// The mission state machine.
///
/// Owns the single authoritative phase, telemetry model and mission plan. Each
/// `on_*` entry point is called after the matching field of the telemetry model
/// has been overwritten; it evaluates the guards of the current phase and fires
/// at most one transition.
///
/// Transitions are optimistic: the phase advances even when the sink reports a
/// failure, and the failure is returned to the caller.
#[derive(Debug)]
pub struct FlightComputer<S: CommandSink> {
    phase: FlightPhase,
    telemetry: TelemetryModel,
    /// Current setpoint `(north, east, altitude)`.
    target_position: Vec3D<f64>,
    plan: MissionPlan,
    in_mission: bool,
    thresholds: FlightThresholds,
    sink: S,
}

impl<S: CommandSink> FlightComputer<S> {
    /// Creates a flight computer in `Manual`, ready to start the mission.
    pub fn new(sink: S, thresholds: FlightThresholds) -> Self {
        Self {
            phase: FlightPhase::Manual,
            telemetry: TelemetryModel::new(),
            target_position: Vec3D::zero(),
            plan: MissionPlan::new(),
            in_mission: true,
            thresholds,
            sink,
        }
    }

    pub fn phase(&self) -> FlightPhase { self.phase }
    pub fn telemetry_mut(&mut self) -> &mut TelemetryModel { &mut self.telemetry }
    pub fn target_position(&self) -> Vec3D<f64> { self.target_position }
    pub fn plan(&self) -> &MissionPlan { &self.plan }
    pub fn in_mission(&self) -> bool { self.in_mission }

    #[cfg(test)]
    pub fn sink(&self) -> &S { &self.sink }

    /// Handles a local position update.
    ///
    /// # Errors
    /// The first [`CommandError`] of a fired transition.
    pub fn on_local_position(&mut self) -> Result<(), CommandError> {
        if !self.in_mission {
            return Ok(());
        }
        match self.phase {
            FlightPhase::Takeoff => {
                if self.takeoff_altitude_reached() {
                    self.plan = MissionPlan::circuit();
                    return self.waypoint_transition();
                }
            }
            FlightPhase::Waypoint => {
                if self.waypoint_reached() {
                    return if self.plan.is_empty() {
                        self.landing_transition()
                    } else {
                        self.waypoint_transition()
                    };
                }
            }
            FlightPhase::Manual
            | FlightPhase::Arming
            | FlightPhase::Landing
            | FlightPhase::Disarming => {}
        }
        Ok(())
    }

    /// Handles a local velocity update.
    ///
    /// # Errors
    /// The first [`CommandError`] of a fired transition.
    pub fn on_local_velocity(&mut self) -> Result<(), CommandError> {
        if !self.in_mission {
            return Ok(());
        }
        match self.phase {
            FlightPhase::Landing => {
                if self.landed() {
                    return self.disarming_transition();
                }
            }
            FlightPhase::Manual
            | FlightPhase::Arming
            | FlightPhase::Takeoff
            | FlightPhase::Waypoint
            | FlightPhase::Disarming => {}
        }
        Ok(())
    }

    /// Handles an armed/guided state change.
    ///
    /// # Errors
    /// The first [`CommandError`] of a fired transition.
    pub fn on_vehicle_state(&mut self) -> Result<(), CommandError> {
        if !self.in_mission {
            return Ok(());
        }
        match self.phase {
            FlightPhase::Manual => return self.arming_transition(),
            FlightPhase::Arming => {
                if self.telemetry.armed() {
                    return self.takeoff_transition();
                }
            }
            FlightPhase::Disarming => {
                if !self.telemetry.armed() && !self.telemetry.guided() {
                    return self.manual_transition();
                }
            }
            FlightPhase::Takeoff | FlightPhase::Waypoint | FlightPhase::Landing => {}
        }
        Ok(())
    }

    /// Within `altitude_fraction` of the commanded altitude.
    fn takeoff_altitude_reached(&self) -> bool {
        self.telemetry.local_altitude()
            > self.thresholds.altitude_fraction * self.target_position.z()
    }

    /// Horizontally at the target and no longer drifting past it.
    fn waypoint_reached(&self) -> bool {
        let close = self
            .target_position
            .horizontally_within(&self.telemetry.local_position(), self.thresholds.arrival_radius);
        let settled =
            self.telemetry.local_velocity().horizontal_abs() < self.thresholds.settle_speed;
        close && settled
    }

    fn landed(&self) -> bool {
        self.telemetry.altitude_above_home() < self.thresholds.home_altitude_margin
            && self.telemetry.local_position().z().abs() < self.thresholds.landed_epsilon
    }

    /// Takes control, arms and records the current global position as home.
    pub fn arming_transition(&mut self) -> Result<(), CommandError> {
        let home = self.telemetry.global_position();
        let issued = Self::issue(&mut self.sink, |sink| {
            sink.take_control()?;
            sink.arm()?;
            sink.set_home_position(home.x(), home.y(), home.z())
        });
        self.enter(FlightPhase::Arming);
        issued
    }

    /// Commands a climb to the altitude the circuit is flown at.
    pub fn takeoff_transition(&mut self) -> Result<(), CommandError> {
        let altitude = MissionPlan::CIRCUIT_ALTITUDE;
        self.target_position = self.target_position.with_z(altitude);
        let issued = Self::issue(&mut self.sink, |sink| sink.takeoff(altitude));
        self.enter(FlightPhase::Takeoff);
        issued
    }

    /// Pops the next waypoint and commands the vehicle towards it.
    ///
    /// # Panics
    /// If the plan is exhausted. The waypoint guard checks emptiness first.
    pub fn waypoint_transition(&mut self) -> Result<(), CommandError> {
        let target = self
            .plan
            .pop_next()
            .unwrap_or_else(|e| fatal!("Waypoint transition without waypoints: {e}"));
        self.target_position = target;
        log!("Heading for waypoint {target}, {} more queued", self.plan.len());
        let issued = Self::issue(&mut self.sink, |sink| {
            sink.cmd_position(target.x(), target.y(), target.z(), WAYPOINT_HEADING)
        });
        self.enter(FlightPhase::Waypoint);
        issued
    }

    pub fn landing_transition(&mut self) -> Result<(), CommandError> {
        let issued = Self::issue(&mut self.sink, |sink| sink.land());
        self.enter(FlightPhase::Landing);
        issued
    }

    pub fn disarming_transition(&mut self) -> Result<(), CommandError> {
        let issued = Self::issue(&mut self.sink, |sink| {
            sink.disarm()?;
            sink.release_control()
        });
        self.enter(FlightPhase::Disarming);
        issued
    }

    /// Hands control back and ends the mission. `stop` is sent even when
    /// releasing control fails.
    pub fn manual_transition(&mut self) -> Result<(), CommandError> {
        let issued = Self::issue(&mut self.sink, |sink| {
            let released = sink.release_control();
            let stopped = sink.stop();
            released.and(stopped)
        });
        self.in_mission = false;
        self.enter(FlightPhase::Manual);
        issued
    }

    fn issue(
        sink: &mut S,
        commands: impl FnOnce(&mut S) -> Result<(), CommandError>,
    ) -> Result<(), CommandError> {
        let issued = commands(sink);
        if let Err(e) = &issued {
            warn!("Command issuance failed: {e}. Phase advances regardless!");
        }
        issued
    }

    fn enter(&mut self, next: FlightPhase) {
        let name: &'static str = next.into();
        phase!("{name} transition ({} -> {next})", self.phase);
        self.phase = next;
    }
}
