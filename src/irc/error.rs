use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        source: std::io::Error,
    },
    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),
    #[error("Connection closed by server")]
    ConnectionClosed,
}

/// Ways a `PRIVMSG` line can fail to match `:<user>!<ident>@<host> PRIVMSG #<channel> :<body>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatParseError {
    #[error("expected at least 4 tokens, found {0}")]
    TooFewTokens(usize),
    #[error("prefix does not start with ':'")]
    MissingPrefix,
    #[error("prefix has no '!' user delimiter")]
    MissingUserDelimiter,
    #[error("prefix has no '@' host delimiter")]
    MissingHost,
    #[error("prefix has an empty user")]
    EmptyUser,
    #[error("expected PRIVMSG, found {0}")]
    UnexpectedCommand(String),
    #[error("target channel is empty")]
    EmptyChannel,
}

pub type Result<T, E = IrcError> = std::result::Result<T, E>;
