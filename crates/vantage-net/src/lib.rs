//! Server message types and the queues that carry them between the network
//! I/O thread and the tick loop.

pub mod channel;
pub mod messages;

pub use channel::{ChannelError, InboundQueue, InboundSender, Outbox, inbound_channel, outbound_channel};
pub use messages::{ActionKind, ClientMessage, ServerMessage};
