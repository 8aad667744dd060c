use strum_macros::{Display, EnumIter};

/// Stage of the scripted mission. Exactly one is active at any time.
#[derive(Debug, Display, EnumIter, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum FlightPhase {
    #[default]
    Manual,
    Arming,
    Takeoff,
    Waypoint,
    Landing,
    Disarming,
}

impl From<FlightPhase> for &'static str {
    fn from(value: FlightPhase) -> Self {
        match value {
            FlightPhase::Manual => "manual",
            FlightPhase::Arming => "arming",
            FlightPhase::Takeoff => "takeoff",
            FlightPhase::Waypoint => "waypoint",
            FlightPhase::Landing => "landing",
            FlightPhase::Disarming => "disarming",
        }
    }
}
