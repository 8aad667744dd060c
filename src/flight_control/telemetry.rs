use super::common::vec3d::Vec3D;
use strum_macros::Display;

/// Latest known vehicle telemetry.
///
/// Every field is overwritten by the matching inbound event and never smoothed,
/// validated or reset. Readers get copies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryModel {
    /// Local north/east/down position. Altitude is `-local_position.z()`.
    local_position: Vec3D<f64>,
    /// Local north/east/down velocity.
    local_velocity: Vec3D<f64>,
    /// Global latitude/longitude/altitude.
    global_position: Vec3D<f64>,
    /// Global latitude/longitude/altitude of home as reported by the vehicle.
    global_home: Vec3D<f64>,
    armed: bool,
    guided: bool,
}

impl TelemetryModel {
    pub fn new() -> Self { Self::default() }

    pub fn apply_position(&mut self, local_position: Vec3D<f64>) {
        self.local_position = local_position;
    }

    pub fn apply_velocity(&mut self, local_velocity: Vec3D<f64>) {
        self.local_velocity = local_velocity;
    }

    pub fn apply_vehicle_flags(
        &mut self,
        armed: bool,
        guided: bool,
        global_position: Vec3D<f64>,
        global_home: Vec3D<f64>,
    ) {
        self.armed = armed;
        self.guided = guided;
        self.global_position = global_position;
        self.global_home = global_home;
    }

    pub fn local_position(&self) -> Vec3D<f64> { self.local_position }
    pub fn local_velocity(&self) -> Vec3D<f64> { self.local_velocity }
    pub fn global_position(&self) -> Vec3D<f64> { self.global_position }
    pub fn armed(&self) -> bool { self.armed }
    pub fn guided(&self) -> bool { self.guided }

    /// Altitude above the local origin (positive up).
    pub fn local_altitude(&self) -> f64 { -self.local_position.z() }

    /// Global altitude above the reported home altitude.
    pub fn altitude_above_home(&self) -> f64 {
        self.global_position.z() - self.global_home.z()
    }
}

/// One inbound telemetry notification together with its payload.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    LocalPosition(Vec3D<f64>),
    LocalVelocity(Vec3D<f64>),
    VehicleState {
        armed: bool,
        guided: bool,
        global_position: Vec3D<f64>,
        global_home: Vec3D<f64>,
    },
}

impl TelemetryEvent {
    /// Overwrites the fields of `model` this event carries.
    pub fn apply(&self, model: &mut TelemetryModel) {
        match *self {
            TelemetryEvent::LocalPosition(pos) => model.apply_position(pos),
            TelemetryEvent::LocalVelocity(vel) => model.apply_velocity(vel),
            TelemetryEvent::VehicleState { armed, guided, global_position, global_home } => {
                model.apply_vehicle_flags(armed, guided, global_position, global_home);
            }
        }
    }
}
