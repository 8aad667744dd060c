use strum_macros::Display;

/// A command the flight computer issues to the vehicle.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum VehicleCommand {
    TakeControl,
    ReleaseControl,
    Arm,
    Disarm,
    SetHomePosition { lat: f64, lon: f64, alt: f64 },
    Takeoff { target_altitude: f64 },
    /// Third component is the positive target altitude, heading in radians.
    Position { north: f64, east: f64, down: f64, heading: f64 },
    Land,
    /// Terminates the vehicle connection.
    Stop,
}

#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum CommandError {
    /// The link carrying commands to the vehicle is gone.
    LinkClosed,
    /// The sink refused the command outright, e.g. after it was stopped.
    Rejected,
}

impl std::error::Error for CommandError {}

/// Capability the flight computer drives the vehicle through.
///
/// Commands are fire-and-forget: an `Ok` means the command was handed off, not
/// that the vehicle acknowledged it. Implementors only provide [`CommandSink::issue`].
pub trait CommandSink {
    fn issue(&mut self, command: VehicleCommand) -> Result<(), CommandError>;

    fn take_control(&mut self) -> Result<(), CommandError> {
        self.issue(VehicleCommand::TakeControl)
    }

    fn release_control(&mut self) -> Result<(), CommandError> {
        self.issue(VehicleCommand::ReleaseControl)
    }

    fn arm(&mut self) -> Result<(), CommandError> { self.issue(VehicleCommand::Arm) }

    fn disarm(&mut self) -> Result<(), CommandError> { self.issue(VehicleCommand::Disarm) }

    fn set_home_position(&mut self, lat: f64, lon: f64, alt: f64) -> Result<(), CommandError> {
        self.issue(VehicleCommand::SetHomePosition { lat, lon, alt })
    }

    fn takeoff(&mut self, target_altitude: f64) -> Result<(), CommandError> {
        self.issue(VehicleCommand::Takeoff { target_altitude })
    }

    fn cmd_position(
        &mut self,
        north: f64,
        east: f64,
        down: f64,
        heading: f64,
    ) -> Result<(), CommandError> {
        self.issue(VehicleCommand::Position { north, east, down, heading })
    }

    fn land(&mut self) -> Result<(), CommandError> { self.issue(VehicleCommand::Land) }

    fn stop(&mut self) -> Result<(), CommandError> { self.issue(VehicleCommand::Stop) }
}
