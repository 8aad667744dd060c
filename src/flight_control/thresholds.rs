/// Policy constants for the phase guards.
///
/// The defaults reproduce the reference mission; [`crate::config`] may override
/// them from the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightThresholds {
    /// Horizontal distance to the target below which a waypoint counts as reached.
    pub arrival_radius: f64,
    /// Horizontal speed below which the vehicle counts as settled.
    pub settle_speed: f64,
    /// Fraction of the takeoff altitude that ends the takeoff phase.
    pub altitude_fraction: f64,
    /// Local altitude magnitude below which the vehicle counts as on the ground.
    pub landed_epsilon: f64,
    /// Global altitude above home below which landing may complete.
    pub home_altitude_margin: f64,
}

impl FlightThresholds {
    pub const DEFAULT_ARRIVAL_RADIUS: f64 = 1.0;
    pub const DEFAULT_SETTLE_SPEED: f64 = 1.0;
    pub const DEFAULT_ALTITUDE_FRACTION: f64 = 0.95;
    pub const DEFAULT_LANDED_EPSILON: f64 = 0.01;
    pub const DEFAULT_HOME_ALTITUDE_MARGIN: f64 = 1.0;
}

impl Default for FlightThresholds {
    fn default() -> Self {
        Self {
            arrival_radius: Self::DEFAULT_ARRIVAL_RADIUS,
            settle_speed: Self::DEFAULT_SETTLE_SPEED,
            altitude_fraction: Self::DEFAULT_ALTITUDE_FRACTION,
            landed_epsilon: Self::DEFAULT_LANDED_EPSILON,
            home_altitude_margin: Self::DEFAULT_HOME_ALTITUDE_MARGIN,
        }
    }
}
