// nethawk-api: Async client for the NetHawk backend (HTTP + Socket.IO push channel)

pub mod channel;
pub mod client;
pub mod error;
pub mod events;
pub mod models;
pub mod socketio;
pub mod transport;

mod overview;
mod profiles;

pub use channel::{ChannelEvent, ChannelState, PushChannel, RawEvent, ReconnectConfig};
pub use client::BackendClient;
pub use error::Error;
pub use transport::TransportConfig;
