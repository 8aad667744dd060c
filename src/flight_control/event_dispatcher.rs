use super::{
    command_sink::{CommandError, CommandSink},
    flight_computer::FlightComputer,
    telemetry::{TelemetryEvent, TelemetryModel},
};
use crate::event;

/// Receiver of telemetry notifications, one slot per telemetry kind.
///
/// The dispatcher writes the payload into [`TelemetryHandler::telemetry_mut`]
/// before invoking the slot, so slots take no arguments.
pub trait TelemetryHandler {
    type Error;

    fn telemetry_mut(&mut self) -> &mut TelemetryModel;
    fn on_local_position(&mut self) -> Result<(), Self::Error>;
    fn on_local_velocity(&mut self) -> Result<(), Self::Error>;
    fn on_vehicle_state(&mut self) -> Result<(), Self::Error>;
}

impl<S: CommandSink> TelemetryHandler for FlightComputer<S> {
    type Error = CommandError;

    fn telemetry_mut(&mut self) -> &mut TelemetryModel { FlightComputer::telemetry_mut(self) }

    fn on_local_position(&mut self) -> Result<(), CommandError> {
        FlightComputer::on_local_position(self)
    }

    fn on_local_velocity(&mut self) -> Result<(), CommandError> {
        FlightComputer::on_local_velocity(self)
    }

    fn on_vehicle_state(&mut self) -> Result<(), CommandError> {
        FlightComputer::on_vehicle_state(self)
    }
}

/// Per-kind count of dispatched events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub positions: usize,
    pub velocities: usize,
    pub vehicle_states: usize,
}

impl DispatchStats {
    pub fn total(&self) -> usize { self.positions + self.velocities + self.vehicle_states }
}

/// Routes telemetry events into a [`TelemetryHandler`], one event at a time.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    stats: DispatchStats,
}

impl EventDispatcher {
    pub fn new() -> Self { Self::default() }

    pub fn stats(&self) -> DispatchStats { self.stats }

    /// Overwrites the handler's telemetry with `event`, then invokes the matching slot.
    ///
    /// # Errors
    /// Whatever the slot returns.
    pub fn dispatch<H: TelemetryHandler>(
        &mut self,
        handler: &mut H,
        event: TelemetryEvent,
    ) -> Result<(), H::Error> {
        event.apply(handler.telemetry_mut());
        event!("Dispatching {event:?}");
        match event {
            TelemetryEvent::LocalPosition(_) => {
                self.stats.positions += 1;
                handler.on_local_position()
            }
            TelemetryEvent::LocalVelocity(_) => {
                self.stats.velocities += 1;
                handler.on_local_velocity()
            }
            TelemetryEvent::VehicleState { .. } => {
                self.stats.vehicle_states += 1;
                handler.on_vehicle_state()
            }
        }
    }
}
