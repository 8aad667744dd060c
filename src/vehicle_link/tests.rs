use super::vehicle_messages::{
    Downstream, DownstreamContent, PositionTarget, SetHomePosition, Takeoff, Upstream,
    UpstreamContent, Vector3, VehicleState,
};
use super::{LinkError, VehicleEndpoint};
use crate::flight_control::{
    CommandError, CommandSink, FlightComputer, FlightPhase, FlightThresholds, MissionOutcome,
    MissionPlan, Supervisor, TelemetryEvent, VehicleCommand, common::Vec3D,
};
use prost::Message;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn loopback() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("tcp:{}", listener.local_addr().unwrap());
    (listener, endpoint)
}

#[allow(clippy::cast_possible_truncation)]
async fn write_frame(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_u32(bytes.len() as u32).await.unwrap();
    stream.write_all(bytes).await.unwrap();
}

async fn send_upstream(stream: &mut TcpStream, content: UpstreamContent) {
    write_frame(stream, &Upstream { content: Some(content) }.encode_to_vec()).await;
}

/// What the vehicle makes of a decoded command frame.
fn command_of(content: &DownstreamContent) -> VehicleCommand {
    match *content {
        DownstreamContent::TakeControl(_) => VehicleCommand::TakeControl,
        DownstreamContent::ReleaseControl(_) => VehicleCommand::ReleaseControl,
        DownstreamContent::Arm(_) => VehicleCommand::Arm,
        DownstreamContent::Disarm(_) => VehicleCommand::Disarm,
        DownstreamContent::SetHomePosition(SetHomePosition { lat, lon, alt }) => {
            VehicleCommand::SetHomePosition { lat, lon, alt }
        }
        DownstreamContent::Takeoff(Takeoff { target_altitude }) => {
            VehicleCommand::Takeoff { target_altitude }
        }
        DownstreamContent::Position(PositionTarget { north, east, down, heading }) => {
            VehicleCommand::Position { north, east, down, heading }
        }
        DownstreamContent::Land(_) => VehicleCommand::Land,
    }
}

/// Next downstream command, `None` once the flyer closed its side.
async fn read_command(stream: &mut TcpStream) -> Option<VehicleCommand> {
    let length = stream.read_u32().await.ok()?;
    let mut buffer = vec![0u8; length as usize];
    stream.read_exact(&mut buffer).await.ok()?;
    let frame = Downstream::decode(buffer.as_slice()).unwrap();
    Some(command_of(&frame.content.unwrap()))
}

fn v3(x: f64, y: f64, z: f64) -> Vector3 { Vector3 { x, y, z } }

fn state(armed: bool, guided: bool, alt: f64) -> UpstreamContent {
    UpstreamContent::VehicleState(VehicleState {
        armed,
        guided,
        global_position: Some(v3(37.0, -122.0, 10.0 + alt)),
        global_home: Some(v3(37.0, -122.0, 10.0)),
    })
}

#[test]
fn test_parse_endpoint() {
    assert_eq!(VehicleEndpoint::parse_endpoint("tcp:127.0.0.1:5760").unwrap(), "127.0.0.1:5760");
    assert_eq!(VehicleEndpoint::parse_endpoint("tcp:localhost:1").unwrap(), "localhost:1");
    assert!(matches!(
        VehicleEndpoint::parse_endpoint("udp:127.0.0.1:5760"),
        Err(LinkError::UnsupportedScheme(_))
    ));
    for bad in ["tcp:127.0.0.1", "tcp::5760", "tcp:localhost:70000", "tcp:localhost:port"] {
        assert!(matches!(VehicleEndpoint::parse_endpoint(bad), Err(LinkError::InvalidEndpoint(_))));
    }
}

#[test]
fn test_stop_has_no_wire_form() {
    assert!(DownstreamContent::from_command(VehicleCommand::Stop).is_none());
    let cmd = VehicleCommand::Position { north: 20.0, east: 20.0, down: 3.0, heading: 0.0 };
    assert_eq!(command_of(&DownstreamContent::from_command(cmd).unwrap()), cmd);
}

#[test]
fn test_missing_global_vectors_default_to_zero() {
    let event = TelemetryEvent::from(UpstreamContent::VehicleState(VehicleState {
        armed: true,
        guided: false,
        global_position: None,
        global_home: Some(v3(1.0, 2.0, 3.0)),
    }));
    assert_eq!(event, TelemetryEvent::VehicleState {
        armed: true,
        guided: false,
        global_position: Vec3D::zero(),
        global_home: Vec3D::new(1.0, 2.0, 3.0),
    });
}

#[tokio::test]
async fn test_connect_refused() {
    let (listener, endpoint) = loopback().await;
    drop(listener);
    assert!(matches!(VehicleEndpoint::connect(&endpoint).await, Err(LinkError::Io(_))));
}

#[tokio::test]
async fn test_telemetry_in_order_and_garbage_skipped() {
    let (listener, endpoint) = loopback().await;
    let (endpoint, mut telemetry_rx) = VehicleEndpoint::connect(&endpoint).await.unwrap();
    let (mut vehicle, _) = listener.accept().await.unwrap();

    send_upstream(&mut vehicle, UpstreamContent::LocalPosition(v3(1.0, 2.0, -3.0))).await;
    write_frame(&mut vehicle, &[0xff, 0xff, 0xff]).await;
    write_frame(&mut vehicle, &Upstream { content: None }.encode_to_vec()).await;
    send_upstream(&mut vehicle, UpstreamContent::LocalVelocity(v3(0.5, 0.0, 0.0))).await;
    send_upstream(&mut vehicle, state(true, false, 0.0)).await;

    let received = tokio::time::timeout(TEST_TIMEOUT, async {
        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(telemetry_rx.recv().await.unwrap());
        }
        events
    })
    .await
    .unwrap();
    assert_eq!(received[0], TelemetryEvent::LocalPosition(Vec3D::new(1.0, 2.0, -3.0)));
    assert_eq!(received[1], TelemetryEvent::LocalVelocity(Vec3D::new(0.5, 0.0, 0.0)));
    assert!(matches!(received[2], TelemetryEvent::VehicleState { armed: true, guided: false, .. }));

    // Hanging up closes the telemetry channel.
    drop(vehicle);
    assert_eq!(tokio::time::timeout(TEST_TIMEOUT, telemetry_rx.recv()).await.unwrap(), None);
    tokio::time::timeout(TEST_TIMEOUT, endpoint.shutdown()).await.unwrap();
}

#[tokio::test]
async fn test_stop_flushes_queued_commands_then_closes() {
    let (listener, endpoint) = loopback().await;
    let (endpoint, mut telemetry_rx) = VehicleEndpoint::connect(&endpoint).await.unwrap();
    let (mut vehicle, _) = listener.accept().await.unwrap();

    let mut sink = endpoint.command_sink();
    sink.take_control().unwrap();
    sink.takeoff(3.0).unwrap();
    sink.release_control().unwrap();
    sink.stop().unwrap();
    // Nothing queued behind the close marker would ever be written.
    assert_eq!(sink.arm(), Err(CommandError::Rejected));

    let mut commands = Vec::new();
    while let Some(cmd) = tokio::time::timeout(TEST_TIMEOUT, read_command(&mut vehicle)).await.unwrap() {
        commands.push(cmd);
    }
    assert_eq!(commands, vec![
        VehicleCommand::TakeControl,
        VehicleCommand::Takeoff { target_altitude: 3.0 },
        VehicleCommand::ReleaseControl,
    ]);

    assert_eq!(tokio::time::timeout(TEST_TIMEOUT, telemetry_rx.recv()).await.unwrap(), None);
    assert_eq!(endpoint.command_sink().arm(), Err(CommandError::LinkClosed));
    endpoint.shutdown().await;
}

#[tokio::test]
async fn test_mission_over_link() {
    let (listener, endpoint) = loopback().await;
    let (endpoint, telemetry_rx) = VehicleEndpoint::connect(&endpoint).await.unwrap();
    let (mut vehicle, _) = listener.accept().await.unwrap();

    let vehicle_task = tokio::spawn(async move {
        let mut script = vec![
            state(false, false, 0.0),
            state(true, true, 0.0),
            UpstreamContent::LocalPosition(v3(0.0, 0.0, -2.95)),
        ];
        for corner in MissionPlan::compute_circuit() {
            script.push(UpstreamContent::LocalVelocity(v3(0.1, 0.1, 0.0)));
            script.push(UpstreamContent::LocalPosition(v3(corner.x(), corner.y(), -3.0)));
        }
        script.extend([
            state(true, true, 0.2),
            UpstreamContent::LocalPosition(v3(0.0, 0.0, 0.0)),
            UpstreamContent::LocalVelocity(v3(0.0, 0.0, 0.0)),
            state(false, false, 0.0),
        ]);
        for content in script {
            send_upstream(&mut vehicle, content).await;
        }
        let mut commands = Vec::new();
        while let Some(cmd) = read_command(&mut vehicle).await {
            commands.push(cmd);
        }
        commands
    });

    let f_cont = FlightComputer::new(endpoint.command_sink(), FlightThresholds::default());
    let mut supervisor = Supervisor::new(f_cont, None);
    let outcome = tokio::time::timeout(TEST_TIMEOUT, supervisor.run(telemetry_rx)).await.unwrap();
    assert_eq!(outcome, MissionOutcome::Completed);
    assert_eq!(supervisor.f_cont().phase(), FlightPhase::Manual);

    let commands = tokio::time::timeout(TEST_TIMEOUT, vehicle_task).await.unwrap().unwrap();
    assert_eq!(commands.first(), Some(&VehicleCommand::TakeControl));
    assert_eq!(commands.iter().filter(|c| matches!(c, VehicleCommand::Position { .. })).count(), 4);
    assert_eq!(&commands[commands.len() - 4..], &[
        VehicleCommand::Land,
        VehicleCommand::Disarm,
        VehicleCommand::ReleaseControl,
        VehicleCommand::ReleaseControl,
    ]);
    endpoint.shutdown().await;
}
