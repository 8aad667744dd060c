use crate::flight_control::{TelemetryEvent, VehicleCommand, common::Vec3D};

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Vector3 {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

impl From<Vector3> for Vec3D<f64> {
    fn from(value: Vector3) -> Self { Vec3D::new(value.x, value.y, value.z) }
}

/// Vehicle -> flyer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Upstream {
    #[prost(oneof = "UpstreamContent", tags = "1, 2, 3")]
    pub content: Option<UpstreamContent>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct VehicleState {
    #[prost(bool, tag = "1")]
    pub armed: bool,
    #[prost(bool, tag = "2")]
    pub guided: bool,
    #[prost(message, optional, tag = "3")]
    pub global_position: Option<Vector3>,
    #[prost(message, optional, tag = "4")]
    pub global_home: Option<Vector3>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum UpstreamContent {
    #[prost(message, tag = "1")]
    LocalPosition(Vector3),
    #[prost(message, tag = "2")]
    LocalVelocity(Vector3),
    #[prost(message, tag = "3")]
    VehicleState(VehicleState),
}

impl From<UpstreamContent> for TelemetryEvent {
    fn from(value: UpstreamContent) -> Self {
        match value {
            UpstreamContent::LocalPosition(pos) => TelemetryEvent::LocalPosition(pos.into()),
            UpstreamContent::LocalVelocity(vel) => TelemetryEvent::LocalVelocity(vel.into()),
            UpstreamContent::VehicleState(state) => TelemetryEvent::VehicleState {
                armed: state.armed,
                guided: state.guided,
                global_position: state.global_position.unwrap_or_default().into(),
                global_home: state.global_home.unwrap_or_default().into(),
            },
        }
    }
}

/// Flyer -> vehicle.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Downstream {
    #[prost(oneof = "DownstreamContent", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub content: Option<DownstreamContent>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct TakeControl {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ReleaseControl {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Arm {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Disarm {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct SetHomePosition {
    #[prost(double, tag = "1")]
    pub lat: f64,
    #[prost(double, tag = "2")]
    pub lon: f64,
    #[prost(double, tag = "3")]
    pub alt: f64,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Takeoff {
    #[prost(double, tag = "1")]
    pub target_altitude: f64,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct PositionTarget {
    #[prost(double, tag = "1")]
    pub north: f64,
    #[prost(double, tag = "2")]
    pub east: f64,
    #[prost(double, tag = "3")]
    pub down: f64,
    #[prost(double, tag = "4")]
    pub heading: f64,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Land {}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DownstreamContent {
    #[prost(message, tag = "1")]
    TakeControl(TakeControl),
    #[prost(message, tag = "2")]
    ReleaseControl(ReleaseControl),
    #[prost(message, tag = "3")]
    Arm(Arm),
    #[prost(message, tag = "4")]
    Disarm(Disarm),
    #[prost(message, tag = "5")]
    SetHomePosition(SetHomePosition),
    #[prost(message, tag = "6")]
    Takeoff(Takeoff),
    #[prost(message, tag = "7")]
    Position(PositionTarget),
    #[prost(message, tag = "8")]
    Land(Land),
}

impl DownstreamContent {
    /// Wire form of `command`. `Stop` only concerns the local link and has none.
    pub fn from_command(command: VehicleCommand) -> Option<Self> {
        Some(match command {
            VehicleCommand::TakeControl => Self::TakeControl(TakeControl {}),
            VehicleCommand::ReleaseControl => Self::ReleaseControl(ReleaseControl {}),
            VehicleCommand::Arm => Self::Arm(Arm {}),
            VehicleCommand::Disarm => Self::Disarm(Disarm {}),
            VehicleCommand::SetHomePosition { lat, lon, alt } => {
                Self::SetHomePosition(SetHomePosition { lat, lon, alt })
            }
            VehicleCommand::Takeoff { target_altitude } => Self::Takeoff(Takeoff { target_altitude }),
            VehicleCommand::Position { north, east, down, heading } => {
                Self::Position(PositionTarget { north, east, down, heading })
            }
            VehicleCommand::Land => Self::Land(Land {}),
            VehicleCommand::Stop => return None,
        })
    }
}
