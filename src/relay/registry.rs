use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::irc::IrcWriter;
use crate::irc::error::Result as IrcResult;
use crate::state::RelayState;

/// Copy of the relay state taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySnapshot {
    pub channels: Vec<String>,
    pub active: bool,
}

/// Lock-guarded owner of [`RelayState`]. Every read or write of the channel
/// list or the relay switch goes through the one mutex held here, and
/// membership changes emit their protocol line while still holding it.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    state: Arc<Mutex<RelayState>>,
}

impl ChannelRegistry {
    pub fn new(channels: impl IntoIterator<Item = String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState::new(channels))),
        }
    }

    /// Runs `f` against the state while holding the lock.
    pub async fn read<T>(&self, f: impl FnOnce(&RelayState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    pub async fn snapshot(&self) -> RelaySnapshot {
        self.read(|state| RelaySnapshot {
            channels: state.channels().to_vec(),
            active: state.is_active(),
        })
        .await
    }

    /// Flips the relay switch. Returns the new value with the channels to
    /// announce it to.
    pub async fn toggle_active(&self) -> RelaySnapshot {
        let mut state = self.state.lock().await;
        let active = state.toggle_active();
        RelaySnapshot {
            channels: state.channels().to_vec(),
            active,
        }
    }

    /// Sends `JOIN #<channel>` and then registers the channel. Returns
    /// `false` without writing anything if it is already registered.
    pub async fn join<W>(&self, writer: &mut IrcWriter<W>, channel: &str) -> IrcResult<bool>
    where
        W: AsyncWrite + Unpin,
    {
        let mut state = self.state.lock().await;
        if state.contains(channel) {
            return Ok(false);
        }
        writer.join(channel).await?;
        state.insert(channel.to_string());
        tracing::info!(channel.name = %channel, channels.count = state.channels().len(), "Joined channel");
        Ok(true)
    }

    /// Sends `PART #<channel>` and then unregisters the channel. Returns
    /// `false` without writing anything if it is not registered.
    pub async fn leave<W>(&self, writer: &mut IrcWriter<W>, channel: &str) -> IrcResult<bool>
    where
        W: AsyncWrite + Unpin,
    {
        let mut state = self.state.lock().await;
        if !state.contains(channel) {
            return Ok(false);
        }
        writer.part(channel).await?;
        state.remove(channel);
        tracing::info!(channel.name = %channel, channels.count = state.channels().len(), "Left channel");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irc::error::IrcError;
    use crate::irc::writer::BrokenPipe;

    fn registry(channels: &[&str]) -> ChannelRegistry {
        ChannelRegistry::new(channels.iter().map(|s| s.to_string()))
    }

    fn written(writer: &IrcWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.get_ref().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_join_emits_join_and_registers() {
        let registry = registry(&["alice"]);
        let mut writer = IrcWriter::new(Vec::new());

        assert!(registry.join(&mut writer, "carol").await.unwrap());
        assert_eq!(written(&writer), "JOIN #carol\r\n");
        assert_eq!(registry.snapshot().await.channels, vec!["alice", "carol"]);
    }

    #[tokio::test]
    async fn test_join_existing_channel_is_noop() {
        let registry = registry(&["alice"]);
        let mut writer = IrcWriter::new(Vec::new());

        assert!(!registry.join(&mut writer, "alice").await.unwrap());
        assert!(writer.get_ref().is_empty());
        assert_eq!(registry.snapshot().await.channels, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_leave_emits_part_and_unregisters() {
        let registry = registry(&["alice", "bob"]);
        let mut writer = IrcWriter::new(Vec::new());

        assert!(registry.leave(&mut writer, "alice").await.unwrap());
        assert_eq!(written(&writer), "PART #alice\r\n");
        assert_eq!(registry.snapshot().await.channels, vec!["bob"]);

        assert!(!registry.leave(&mut writer, "alice").await.unwrap());
        assert_eq!(written(&writer), "PART #alice\r\n");
    }

    #[tokio::test]
    async fn test_toggle_returns_new_state_and_channels() {
        let registry = registry(&["alice", "bob"]);

        let snapshot = registry.toggle_active().await;
        assert!(!snapshot.active);
        assert_eq!(snapshot.channels, vec!["alice", "bob"]);
        assert!(!registry.snapshot().await.active);

        assert!(registry.toggle_active().await.active);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let registry = registry(&["alice"]);
        let observer = registry.clone();
        let mut writer = IrcWriter::new(Vec::new());

        registry.join(&mut writer, "bob").await.unwrap();
        assert!(observer.read(|state| state.is_channel_owner("bob")).await);
    }

    #[tokio::test]
    async fn test_failed_join_write_leaves_channel_unregistered() {
        let registry = registry(&["alice"]);
        let mut writer = IrcWriter::new(BrokenPipe);

        let result = registry.join(&mut writer, "carol").await;
        assert!(matches!(result, Err(IrcError::Io(_))));
        assert_eq!(registry.snapshot().await.channels, vec!["alice"]);

        assert!(matches!(registry.leave(&mut writer, "alice").await, Err(IrcError::Io(_))));
        assert_eq!(registry.snapshot().await.channels, vec!["alice"]);
    }
}
