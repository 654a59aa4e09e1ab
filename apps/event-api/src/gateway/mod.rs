pub mod bootstrap;
pub mod events;
pub mod fanout;
pub mod handler;
pub mod hub;
pub mod registry;
pub mod server;
pub mod session;
pub mod topics;

pub use hub::BroadcastHub;
