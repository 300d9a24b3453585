pub mod connection;
pub mod error;
pub mod framer;
pub mod irc_parser;
pub mod types;
pub mod writer;

pub use connection::{connect, register};
pub use error::IrcError;
pub use framer::LineFramer;
pub use types::{ChatMessage, InboundLine};
pub use writer::IrcWriter;
