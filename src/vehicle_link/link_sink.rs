use super::vehicle_endpoint::DownstreamFrame;
use super::vehicle_messages::{Downstream, DownstreamContent};
use crate::event;
use crate::flight_control::{CommandError, CommandSink, VehicleCommand};
use prost::Message;
use tokio::sync::mpsc::UnboundedSender;

/// [`CommandSink`] that encodes commands and queues them on the vehicle link.
///
/// Queueing never blocks. `stop` queues the close marker, so every command
/// issued before it still reaches the vehicle. Commands issued through this
/// sink after its `stop` would never be written and are rejected instead.
#[derive(Debug, Clone)]
pub struct LinkCommandSink {
    downstream_sender: UnboundedSender<DownstreamFrame>,
    stopped: bool,
}

impl LinkCommandSink {
    pub(crate) fn new(downstream_sender: UnboundedSender<DownstreamFrame>) -> Self {
        Self { downstream_sender, stopped: false }
    }

    /// Encoded frame for `command`, `None` for the close marker.
    fn encode(command: VehicleCommand) -> DownstreamFrame {
        DownstreamContent::from_command(command)
            .map(|content| Downstream { content: Some(content) }.encode_to_vec())
    }
}

impl CommandSink for LinkCommandSink {
    fn issue(&mut self, command: VehicleCommand) -> Result<(), CommandError> {
        if self.stopped {
            return Err(CommandError::Rejected);
        }
        event!("Issuing {command:?}");
        self.downstream_sender.send(Self::encode(command)).map_err(|_| CommandError::LinkClosed)?;
        self.stopped = command == VehicleCommand::Stop;
        Ok(())
    }
}
