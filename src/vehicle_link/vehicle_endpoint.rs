use super::{link_sink::LinkCommandSink, vehicle_messages};
use crate::flight_control::TelemetryEvent;
use crate::{event, info, warn};
use prost::Message;
use std::fmt::{Display, Formatter};
use std::io::{Cursor, ErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors of the vehicle link.
#[derive(Debug)]
pub enum LinkError {
    /// Endpoint string does not start with `tcp:`.
    UnsupportedScheme(String),
    /// Endpoint string has no usable `host:port` part.
    InvalidEndpoint(String),
    Io(std::io::Error),
    Decode(prost::DecodeError),
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::UnsupportedScheme(ep) => write!(f, "unsupported link scheme in '{ep}'"),
            LinkError::InvalidEndpoint(ep) => write!(f, "invalid link endpoint '{ep}'"),
            LinkError::Io(e) => write!(f, "link I/O error: {e}"),
            LinkError::Decode(e) => write!(f, "undecodable frame: {e}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<std::io::Error> for LinkError {
    fn from(value: std::io::Error) -> Self { LinkError::Io(value) }
}

impl From<prost::DecodeError> for LinkError {
    fn from(value: prost::DecodeError) -> Self { LinkError::Decode(value) }
}

/// Frame sent to the tx task. `None` flushes everything queued before it and
/// closes the link.
pub(crate) type DownstreamFrame = Option<Vec<u8>>;

/// TCP client connection to the vehicle.
///
/// Every frame is a big-endian `u32` length followed by a prost message:
/// [`vehicle_messages::Upstream`] inbound, [`vehicle_messages::Downstream`] outbound.
pub struct VehicleEndpoint {
    downstream_sender: mpsc::UnboundedSender<DownstreamFrame>,
    cancel: CancellationToken,
    rx_handle: Option<JoinHandle<()>>,
    tx_handle: Option<JoinHandle<()>>,
}

impl VehicleEndpoint {
    /// Capacity of the telemetry channel towards the supervisor.
    const TELEMETRY_BUFFER: usize = 64;
    /// Largest accepted upstream frame.
    const MAX_FRAME_LEN: u32 = 64 * 1024;

    /// Splits `tcp:<host>:<port>` into the socket address part.
    ///
    /// # Errors
    /// [`LinkError::UnsupportedScheme`] or [`LinkError::InvalidEndpoint`].
    pub fn parse_endpoint(endpoint: &str) -> Result<&str, LinkError> {
        let addr = endpoint
            .strip_prefix("tcp:")
            .ok_or_else(|| LinkError::UnsupportedScheme(endpoint.to_string()))?;
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(addr),
            _ => Err(LinkError::InvalidEndpoint(endpoint.to_string())),
        }
    }

    /// Connects to the vehicle and starts the rx and tx tasks.
    ///
    /// # Returns
    /// The endpoint and the channel decoded telemetry arrives on. The channel closes
    /// when the vehicle hangs up or the link is stopped.
    ///
    /// # Errors
    /// Malformed endpoint strings and connection failures.
    pub async fn connect(
        endpoint: &str,
    ) -> Result<(Self, mpsc::Receiver<TelemetryEvent>), LinkError> {
        let addr = Self::parse_endpoint(endpoint)?;
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        info!("Connected to vehicle at {addr}");
        Ok(Self::start(socket))
    }

    fn start(socket: TcpStream) -> (Self, mpsc::Receiver<TelemetryEvent>) {
        let (rx_socket, tx_socket) = socket.into_split();
        let (telemetry_sender, telemetry_receiver) = mpsc::channel(Self::TELEMETRY_BUFFER);
        let (downstream_sender, downstream_receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let rx_cancel = cancel.clone();
        let rx_handle = tokio::spawn(async move {
            let result = tokio::select! {
                res = Self::handle_connection_rx(rx_socket, &telemetry_sender) => res,
                () = rx_cancel.cancelled() => Ok(()),
            };
            Self::report_closed("rx", result);
            rx_cancel.cancel();
        });

        let tx_cancel = cancel.clone();
        let tx_handle = tokio::spawn(async move {
            let result = tokio::select! {
                res = Self::handle_connection_tx(tx_socket, downstream_receiver) => res,
                () = tx_cancel.cancelled() => Ok(()),
            };
            Self::report_closed("tx", result);
            tx_cancel.cancel();
        });

        let inst = Self {
            downstream_sender,
            cancel,
            rx_handle: Some(rx_handle),
            tx_handle: Some(tx_handle),
        };
        (inst, telemetry_receiver)
    }

    async fn handle_connection_rx(
        mut socket: OwnedReadHalf,
        telemetry_sender: &mpsc::Sender<TelemetryEvent>,
    ) -> Result<(), LinkError> {
        loop {
            let length = socket.read_u32().await?;
            if length > Self::MAX_FRAME_LEN {
                return Err(LinkError::Io(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("frame of {length} bytes exceeds limit"),
                )));
            }
            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;

            let content = match vehicle_messages::Upstream::decode(&mut Cursor::new(buffer)) {
                Ok(vehicle_messages::Upstream { content: Some(content) }) => content,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping telemetry frame: {}", LinkError::from(e));
                    continue;
                }
            };
            let event = TelemetryEvent::from(content);
            event!("Received {event:?}");
            if telemetry_sender.send(event).await.is_err() {
                // Nobody listens anymore.
                return Ok(());
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn handle_connection_tx(
        mut socket: OwnedWriteHalf,
        mut downstream_receiver: mpsc::UnboundedReceiver<DownstreamFrame>,
    ) -> Result<(), LinkError> {
        while let Some(Some(message_buffer)) = downstream_receiver.recv().await {
            socket.write_u32(message_buffer.len() as u32).await?;
            socket.write_all(&message_buffer).await?;
        }
        socket.shutdown().await?;
        Ok(())
    }

    fn report_closed(half: &str, result: Result<(), LinkError>) {
        match result {
            Ok(()) => {}
            Err(LinkError::Io(e))
                if e.kind() == ErrorKind::UnexpectedEof
                    || e.kind() == ErrorKind::ConnectionReset
                    || e.kind() == ErrorKind::ConnectionAborted =>
            {
                info!("Vehicle closed the connection ({half})");
            }
            Err(e) => warn!("Closing vehicle link ({half}) due to {e}"),
        }
    }

    /// A command sink writing into this link.
    pub fn command_sink(&self) -> LinkCommandSink {
        LinkCommandSink::new(self.downstream_sender.clone())
    }

    /// Flushes queued commands, closes the link and waits for both tasks.
    pub async fn shutdown(mut self) {
        let _ = self.downstream_sender.send(None);
        // The tx task ends on the `None` frame and cancels rx in turn.
        if let Some(tx_handle) = self.tx_handle.take() {
            tx_handle.await.ok();
        }
        self.cancel.cancel();
        if let Some(rx_handle) = self.rx_handle.take() {
            rx_handle.await.ok();
        }
    }
}

impl Drop for VehicleEndpoint {
    fn drop(&mut self) { self.cancel.cancel(); }
}
