use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::access::AccessFilter;
use super::commands::{BotCommand, Command};
use super::fanout::fan_out;
use super::registry::ChannelRegistry;
use crate::irc::error::{IrcError, Result as IrcResult};
use crate::irc::irc_parser::{classify, parse_chat_line};
use crate::irc::{ChatMessage, InboundLine, IrcWriter, LineFramer};

const READ_CHUNK_SIZE: usize = 1024;

pub const ACTIVE_STATUS: &str = "I'm active now :)";
pub const SLEEPING_STATUS: &str = "I'm going to sleep...";

/// The relay worker: reads the connection, answers keep-alives, runs chat
/// commands and relays everything else between the registered channels.
///
/// Lines are handled one at a time, each completely (including all of its
/// writes) before the next read.
pub struct RelayBot<W> {
    writer: IrcWriter<W>,
    registry: ChannelRegistry,
    access: AccessFilter,
    framer: LineFramer,
    session_id: Uuid,
}

impl<W> RelayBot<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: IrcWriter<W>, registry: ChannelRegistry, access: AccessFilter) -> Self {
        Self {
            writer,
            registry,
            access,
            framer: LineFramer::new(),
            session_id: Uuid::new_v4(),
        }
    }

    /// Runs until the connection fails or `shutdown_rx` fires. A shutdown
    /// closes the write side and returns `Ok`; end of stream is an error.
    pub async fn run<R>(mut self, mut reader: R, mut shutdown_rx: oneshot::Receiver<()>) -> IrcResult<()>
    where
        R: AsyncRead + Unpin,
    {
        tracing::info!(session.id = %self.session_id, "Relay worker started");
        let mut buf = vec![0u8; READ_CHUNK_SIZE];

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    tracing::info!(session.id = %self.session_id, "Shutdown signal received. Closing connection");
                    if let Err(e) = self.writer.shutdown().await {
                        tracing::warn!(session.id = %self.session_id, error = %e, "Failed to close connection cleanly");
                    }
                    return Ok(());
                }
                read = reader.read(&mut buf) => {
                    let n = read.map_err(|e| {
                        tracing::error!(session.id = %self.session_id, error = %e, "Error reading from chat");
                        IrcError::Io(e)
                    })?;
                    if n == 0 {
                        let pending = self.framer.pending_len();
                        if pending > 0 {
                            tracing::warn!(session.id = %self.session_id, pending, "Discarding incomplete line at end of stream");
                        }
                        tracing::info!(session.id = %self.session_id, "Connection closed by server (EOF)");
                        return Err(IrcError::ConnectionClosed);
                    }
                    for line in self.framer.push(&buf[..n]) {
                        self.handle_line(&line).await?;
                    }
                }
            }
        }
    }

    /// Handles one complete protocol line. Only transport errors are returned.
    pub async fn handle_line(&mut self, line: &str) -> IrcResult<()> {
        match classify(line) {
            InboundLine::Ping { payload } => {
                tracing::debug!(session.id = %self.session_id, "Received server PING, responding with PONG");
                self.writer.pong(payload).await
            }
            InboundLine::Chat(raw) => match parse_chat_line(raw) {
                Ok(message) => self.handle_chat(message).await,
                Err(e) => {
                    tracing::warn!(session.id = %self.session_id, error = %e, line = raw, "Dropping malformed chat line");
                    Ok(())
                }
            },
            InboundLine::Notice { source, text, raw } => {
                tracing::info!(session.id = %self.session_id, source = source.unwrap_or_default(), line = raw, "NOTICE: {}", text);
                Ok(())
            }
            InboundLine::Ignored { command } => {
                tracing::trace!(session.id = %self.session_id, command = command.unwrap_or_default(), "Ignoring line");
                Ok(())
            }
        }
    }

    async fn handle_chat(&mut self, message: ChatMessage) -> IrcResult<()> {
        if !self.access.allowed(&message.user) {
            tracing::debug!(user = %message.user, channel.name = %message.channel, "Dropping message from filtered user");
            return Ok(());
        }

        match Command::parse(&message.body) {
            Some(command) => self.dispatch(&message, &command).await,
            None => self.relay(&message).await,
        }
    }

    async fn dispatch(&mut self, message: &ChatMessage, command: &Command<'_>) -> IrcResult<()> {
        let Some(bot_command) = BotCommand::from_command(command) else {
            tracing::debug!(user = %message.user, command = command.name, "Ignoring unknown or malformed command");
            return Ok(());
        };

        let authorized = self
            .registry
            .read(|state| bot_command.is_authorized(message, state))
            .await;
        if !authorized {
            tracing::debug!(user = %message.user, command = command.name, "Ignoring unauthorized command");
            return Ok(());
        }

        tracing::info!(user = %message.user, channel.name = %message.channel, command = command.name, "Running command");
        match bot_command {
            BotCommand::Dice => {
                let roll = roll_dice();
                self.writer
                    .privmsg(
                        &message.channel,
                        &format!("Hi {}, your number: {}", message.user, roll),
                    )
                    .await
            }
            BotCommand::ToggleMulti => {
                let snapshot = self.registry.toggle_active().await;
                let status = if snapshot.active {
                    ACTIVE_STATUS
                } else {
                    SLEEPING_STATUS
                };
                tracing::info!(relay.active = snapshot.active, "Relay toggled");
                fan_out(&mut self.writer, &snapshot.channels, None, None, status).await?;
                Ok(())
            }
            BotCommand::AddMulti { channel } => {
                if !self.registry.join(&mut self.writer, &channel).await? {
                    tracing::debug!(channel.name = %channel, "Channel already registered");
                    return Ok(());
                }
                self.writer
                    .privmsg(
                        &channel,
                        &format!(
                            "You have been added to the multi chat {}. !leavemulti to leave.",
                            channel
                        ),
                    )
                    .await
            }
            BotCommand::LeaveMulti => {
                self.writer
                    .privmsg(&message.channel, &format!("Bye, bye {}", message.user))
                    .await?;
                self.registry.leave(&mut self.writer, &message.channel).await?;
                Ok(())
            }
        }
    }

    async fn relay(&mut self, message: &ChatMessage) -> IrcResult<()> {
        let snapshot = self.registry.snapshot().await;
        if !snapshot.active {
            tracing::trace!(channel.name = %message.channel, "Relay inactive, not forwarding");
            return Ok(());
        }

        let delivered = fan_out(
            &mut self.writer,
            &snapshot.channels,
            Some(&message.channel),
            Some(&message.user),
            &message.body,
        )
        .await?;
        tracing::debug!(user = %message.user, channel.name = %message.channel, delivered, "Relayed message");
        Ok(())
    }
}

fn roll_dice() -> u8 {
    rand::thread_rng().gen_range(1..=6)
}
