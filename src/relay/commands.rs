use crate::config::normalize_name;
use crate::irc::ChatMessage;
use crate::state::RelayState;

pub const COMMAND_MARKER: char = '!';

/// A chat body of the form `!<name> [args...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> Command<'a> {
    /// Returns `None` for bodies that do not start with the marker.
    pub fn parse(body: &'a str) -> Option<Self> {
        let rest = body.strip_prefix(COMMAND_MARKER)?;
        let mut tokens = rest.split_whitespace();
        let name = if rest.starts_with(char::is_whitespace) {
            ""
        } else {
            tokens.next().unwrap_or_default()
        };
        Some(Self {
            name,
            args: tokens.collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Dice,
    ToggleMulti,
    AddMulti { channel: String },
    LeaveMulti,
}

impl BotCommand {
    /// Unknown names and malformed arguments yield `None`.
    pub fn from_command(command: &Command<'_>) -> Option<Self> {
        match command.name {
            "dice" => Some(Self::Dice),
            "togglemulti" => Some(Self::ToggleMulti),
            "addmulti" => match command.args.as_slice() {
                [target] => {
                    let channel = normalize_name(target);
                    (!channel.is_empty()).then_some(Self::AddMulti { channel })
                }
                _ => None,
            },
            "leavemulti" => Some(Self::LeaveMulti),
            _ => None,
        }
    }

    /// Whether the sender of `message` may run this command.
    ///
    /// `dice` is open to everyone that passed the access filter. The relay
    /// management commands need a channel owner, and `leavemulti` must also
    /// be issued from the owner's own channel.
    pub fn is_authorized(&self, message: &ChatMessage, state: &RelayState) -> bool {
        match self {
            Self::Dice => true,
            Self::ToggleMulti | Self::AddMulti { .. } => state.is_channel_owner(&message.user),
            Self::LeaveMulti => {
                state.is_channel_owner(&message.user) && message.user == message.channel
            }
        }
    }
}
