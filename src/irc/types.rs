/// A chat message received from one of the joined channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub user: String,
    pub channel: String,
    pub body: String,
}

/// How the worker should treat one inbound protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine<'a> {
    /// Keep-alive probe. Holds everything after `PING`, echoed back verbatim.
    Ping { payload: &'a str },
    /// A `PRIVMSG` line, still unparsed.
    Chat(&'a str),
    /// Server notice. `raw` is the whole line as received.
    Notice {
        source: Option<&'a str>,
        text: &'a str,
        raw: &'a str,
    },
    Ignored { command: Option<&'a str> },
}
