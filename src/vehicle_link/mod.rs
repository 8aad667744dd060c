//! Transport adapter between the vehicle and the mission core.
//! `vehicle_endpoint` owns the TCP connection and its framing, `vehicle_messages`
//! defines the wire messages and `link_sink` turns core commands into frames.

mod link_sink;
mod vehicle_endpoint;
mod vehicle_messages;

pub use link_sink::LinkCommandSink;
pub use vehicle_endpoint::{LinkError, VehicleEndpoint};

#[cfg(test)]
mod tests;
