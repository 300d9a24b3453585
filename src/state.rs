/// Everything the relay mutates at runtime: the joined channels, in join
/// order, and whether chat is currently relayed between them.
#[derive(Debug)]
pub struct RelayState {
    channels: Vec<String>,
    active: bool,
}

impl RelayState {
    pub fn new(channels: impl IntoIterator<Item = String>) -> Self {
        let mut state = Self {
            channels: Vec::new(),
            active: true,
        };
        for channel in channels {
            state.insert(channel);
        }
        state
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flips the relay switch and returns the new value.
    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Channel names double as owner logins: whoever's login matches a joined
    /// channel owns it and may manage the relay.
    pub fn is_channel_owner(&self, user: &str) -> bool {
        self.contains(user)
    }

    /// Appends `channel` unless already present. Returns whether it was added.
    pub fn insert(&mut self, channel: String) -> bool {
        if self.contains(&channel) {
            return false;
        }
        self.channels.push(channel);
        true
    }

    pub fn remove(&mut self, channel: &str) -> bool {
        match self.channels.iter().position(|c| c == channel) {
            Some(index) => {
                self.channels.remove(index);
                true
            }
            None => false,
        }
    }
}
