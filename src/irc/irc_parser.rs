use super::error::ChatParseError;
use super::types::{ChatMessage, InboundLine};

#[derive(Debug, Default)]
pub struct IrcMessage<'a> {
    prefix: Option<&'a str>,
    command: Option<&'a str>,
    params: Vec<&'a str>,
}

impl<'a> IrcMessage<'a> {
    pub fn command(&self) -> Option<&'a str> {
        self.command
    }

    pub fn prefix(&self) -> Option<&'a str> {
        self.prefix
    }

    pub fn params(&self) -> &[&'a str] {
        &self.params
    }

    pub fn parse(line: &'a str) -> Self {
        let mut message = IrcMessage::default();
        let mut remainder = line.trim_end_matches(['\r', '\n']);

        // Tags are not requested from the server; skip them if present anyway.
        if remainder.starts_with('@') {
            match remainder.split_once(' ') {
                Some((_, rest)) => remainder = rest,
                None => return message,
            }
        }
        if let Some(prefixed) = remainder.strip_prefix(':') {
            match prefixed.split_once(' ') {
                Some((prefix, rest)) => {
                    message.prefix = Some(prefix);
                    remainder = rest;
                }
                None => {
                    message.prefix = Some(prefixed);
                    return message;
                }
            }
        }

        let (middle, trailing) = match remainder.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing)),
            None => (remainder, None),
        };
        let mut parts = middle.split(' ').filter(|s| !s.is_empty());
        message.command = parts.next();
        message.params.extend(parts);
        message.params.extend(trailing);
        message
    }
}

/// Decides what kind of line this is. Only the keep-alive probe is matched on
/// the raw text; everything else goes by the command token.
pub fn classify(line: &str) -> InboundLine<'_> {
    if let Some(payload) = line.strip_prefix("PING") {
        if payload.is_empty() || payload.starts_with(' ') {
            return InboundLine::Ping { payload };
        }
    }

    let message = IrcMessage::parse(line);
    match message.command() {
        Some("PRIVMSG") => InboundLine::Chat(line),
        Some("NOTICE") => InboundLine::Notice {
            source: message.prefix(),
            text: message.params().last().copied().unwrap_or_default(),
            raw: line,
        },
        command => InboundLine::Ignored { command },
    }
}

/// Tokenizes `:<user>!<ident>@<host> PRIVMSG #<channel> :<body>`.
///
/// The body is rebuilt from the remaining whitespace-separated tokens joined
/// by single spaces, minus the leading `:` of the trailing parameter. A
/// leading IRCv3 tag block is skipped if the server sends one.
pub fn parse_chat_line(line: &str) -> Result<ChatMessage, ChatParseError> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first().is_some_and(|t| t.starts_with('@')) {
        tokens.remove(0);
    }

    let [prefix, command, target, first_body, rest @ ..] = tokens.as_slice() else {
        return Err(ChatParseError::TooFewTokens(tokens.len()));
    };

    let source = prefix
        .strip_prefix(':')
        .ok_or(ChatParseError::MissingPrefix)?;
    let (user, user_host) = source
        .split_once('!')
        .ok_or(ChatParseError::MissingUserDelimiter)?;
    if !user_host.contains('@') {
        return Err(ChatParseError::MissingHost);
    }
    if user.is_empty() {
        return Err(ChatParseError::EmptyUser);
    }
    if *command != "PRIVMSG" {
        return Err(ChatParseError::UnexpectedCommand(command.to_string()));
    }

    let channel = target.strip_prefix('#').unwrap_or(*target);
    if channel.is_empty() {
        return Err(ChatParseError::EmptyChannel);
    }

    let mut body = first_body.strip_prefix(':').unwrap_or(*first_body).to_string();
    for token in rest {
        body.push(' ');
        body.push_str(token);
    }

    Ok(ChatMessage {
        user: user.to_lowercase(),
        channel: channel.to_lowercase(),
        body,
    })
}
