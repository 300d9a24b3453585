pub mod access;
pub mod bot;
pub mod commands;
pub mod fanout;
pub mod registry;

pub use access::AccessFilter;
pub use bot::RelayBot;
pub use registry::ChannelRegistry;
