use super::common::vec3d::Vec3D;
use std::collections::VecDeque;
use strum_macros::Display;

/// Errors raised by the [`MissionPlan`].
#[derive(Debug, Display, PartialEq, Eq)]
pub enum PlanError {
    /// `pop_next` was called on an exhausted plan.
    EmptyPlan,
}

impl std::error::Error for PlanError {}

/// Ordered FIFO of pending waypoints `(north, east, altitude)`.
///
/// Waypoints only ever leave from the front; an empty plan means the circuit is done.
#[derive(Debug, Clone, Default)]
pub struct MissionPlan {
    pending: VecDeque<Vec3D<f64>>,
}

impl MissionPlan {
    /// Altitude every circuit corner is flown at, and the takeoff target.
    pub const CIRCUIT_ALTITUDE: f64 = 3.0;
    /// Side length of the square circuit in local north/east units.
    const CIRCUIT_SIDE: f64 = 20.0;

    /// Creates an empty plan.
    pub fn new() -> Self { Self { pending: VecDeque::new() } }

    /// Creates a plan holding the square circuit from [`MissionPlan::compute_circuit`].
    pub fn circuit() -> Self { Self { pending: Self::compute_circuit().into() } }

    /// The fixed square circuit: north 20, then east 20, back south, back west to the origin.
    pub fn compute_circuit() -> [Vec3D<f64>; 4] {
        [
            Vec3D::new(Self::CIRCUIT_SIDE, 0.0, Self::CIRCUIT_ALTITUDE),
            Vec3D::new(Self::CIRCUIT_SIDE, Self::CIRCUIT_SIDE, Self::CIRCUIT_ALTITUDE),
            Vec3D::new(0.0, Self::CIRCUIT_SIDE, Self::CIRCUIT_ALTITUDE),
            Vec3D::new(0.0, 0.0, Self::CIRCUIT_ALTITUDE),
        ]
    }

    /// Removes and returns the front waypoint.
    ///
    /// # Errors
    /// [`PlanError::EmptyPlan`] if no waypoint remains.
    pub fn pop_next(&mut self) -> Result<Vec3D<f64>, PlanError> {
        self.pending.pop_front().ok_or(PlanError::EmptyPlan)
    }

    pub fn len(&self) -> usize { self.pending.len() }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}
