use std::collections::HashSet;

/// Per-user allow/deny lists, fixed at startup.
///
/// A non-empty whitelist admits only its members. The blacklist is checked
/// after it and always wins.
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    whitelist: HashSet<String>,
    blacklist: HashSet<String>,
}

impl AccessFilter {
    pub fn new(
        whitelist: impl IntoIterator<Item = String>,
        blacklist: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            whitelist: whitelist.into_iter().map(|u| u.to_lowercase()).collect(),
            blacklist: blacklist.into_iter().map(|u| u.to_lowercase()).collect(),
        }
    }

    pub fn allowed(&self, user: &str) -> bool {
        let user = user.to_lowercase();
        (self.whitelist.is_empty() || self.whitelist.contains(&user))
            && !self.blacklist.contains(&user)
    }
}
