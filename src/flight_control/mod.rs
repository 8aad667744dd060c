//! The mission core: telemetry model, mission plan and the phase state machine,
//! plus the glue that feeds telemetry events into it one at a time.

pub(crate) mod command_sink;
pub(crate) mod common;
mod event_dispatcher;
mod flight_computer;
mod flight_phase;
mod mission_plan;
mod nav_log;
mod supervisor;
pub(crate) mod telemetry;
mod thresholds;

pub use command_sink::{CommandError, CommandSink, VehicleCommand};
pub use event_dispatcher::{DispatchStats, EventDispatcher, TelemetryHandler};
pub use flight_computer::FlightComputer;
pub use flight_phase::FlightPhase;
pub use mission_plan::{MissionPlan, PlanError};
pub use nav_log::NavLog;
pub use supervisor::{MissionOutcome, Supervisor};
pub use telemetry::{TelemetryEvent, TelemetryModel};
pub use thresholds::FlightThresholds;
