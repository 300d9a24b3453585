use crate::error::{ConfigError, Result as AppResult};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";
pub const DEFAULT_PORT: u16 = 6697;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

/// Chat password. Never printed, not even in debug output.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct OAuthToken(String);

impl OAuthToken {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OAuthToken(***)")
    }
}

#[derive(Debug)]
pub struct AppSettings {
    pub bot_username: String,
    pub oauth_token: OAuthToken,
    pub channels: Vec<String>,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    bot_username: Option<String>,
    oauth_token: Option<OAuthToken>,
    #[serde(default, deserialize_with = "deserialize_optional_name_list")]
    channels: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_name_list")]
    whitelist: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_name_list")]
    blacklist: Vec<String>,
    server: ServerConfig,
}

impl RawSettings {
    fn validate(self) -> Result<AppSettings, ConfigError> {
        let bot_username = self
            .bot_username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ConfigError::Missing("bot_username".to_string()))?;
        let oauth_token = self
            .oauth_token
            .filter(|token| !token.expose().trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("oauth_token".to_string()))?;
        let channels = self
            .channels
            .ok_or_else(|| ConfigError::Missing("channels".to_string()))?;
        if channels.is_empty() {
            return Err(ConfigError::InvalidValue(
                "channels must name at least one channel".to_string(),
            ));
        }

        Ok(AppSettings {
            bot_username,
            oauth_token,
            channels,
            whitelist: self.whitelist,
            blacklist: self.blacklist,
            server: self.server,
        })
    }
}

/// Loads settings from the config file (explicit path, or an optional
/// `config.*` in the working directory) overlaid with `MULTICHAT_*` variables.
pub fn load_settings(config_path: Option<&Path>) -> AppResult<AppSettings> {
    let file = match config_path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("config").required(false),
    };

    let settings = builder_with_defaults()?
        .add_source(file)
        .add_source(
            Environment::with_prefix("MULTICHAT")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    settings_from_config(settings).map_err(Into::into)
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", DEFAULT_HOST)
        .and_then(|b| b.set_default("server.port", i64::from(DEFAULT_PORT)))
        .and_then(|b| b.set_default("server.tls", true))
        .map_err(|e| ConfigError::Load(e.to_string()))
}

fn settings_from_config(settings: Config) -> Result<AppSettings, ConfigError> {
    let raw: RawSettings = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    raw.validate()
}

/// Canonical form of a user or channel name: trimmed, lowercased, no `#`.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}

fn deserialize_optional_name_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_name_list(deserializer).map(Some)
}

/// Accepts an array of names or one comma-separated string. Order is kept and
/// repeated names are collapsed onto their first occurrence.
fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let items: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(arr) => arr
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(D::Error::custom("Array must contain only strings")),
            })
            .collect::<Result<_, _>>()?,
        Value::Null => Vec::new(),
        _ => return Err(D::Error::custom("Expected string or array of strings")),
    };

    let mut names: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let name = normalize_name(&item);
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn settings_from_json(json: &str) -> Result<AppSettings, ConfigError> {
        let settings = builder_with_defaults()?
            .add_source(File::from_str(json, FileFormat::Json))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        settings_from_config(settings)
    }

    #[test]
    fn test_full_config() {
        let settings = settings_from_json(
            r##"{
                "bot_username": "relaybot",
                "oauth_token": "oauth:abc123",
                "channels": ["Alice", "#bob", "alice"],
                "whitelist": ["User1"],
                "blacklist": "spammer, troll",
                "server": { "host": "127.0.0.1", "port": 6667, "tls": false }
            }"##,
        )
        .unwrap();

        assert_eq!(settings.bot_username, "relaybot");
        assert_eq!(settings.oauth_token.expose(), "oauth:abc123");
        assert_eq!(settings.channels, vec!["alice", "bob"]);
        assert_eq!(settings.whitelist, vec!["user1"]);
        assert_eq!(settings.blacklist, vec!["spammer", "troll"]);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 6667);
        assert!(!settings.server.tls);
    }

    #[test]
    fn test_defaults_for_optional_keys() {
        let settings = settings_from_json(
            r#"{ "bot_username": "relaybot", "oauth_token": "oauth:x", "channels": "alice,bob" }"#,
        )
        .unwrap();

        assert_eq!(settings.channels, vec!["alice", "bob"]);
        assert!(settings.whitelist.is_empty());
        assert!(settings.blacklist.is_empty());
        assert_eq!(settings.server.host, DEFAULT_HOST);
        assert_eq!(settings.server.port, DEFAULT_PORT);
        assert!(settings.server.tls);
    }

    #[test]
    fn test_missing_required_keys_are_fatal() {
        let err = settings_from_json(r#"{ "oauth_token": "oauth:x", "channels": ["a"] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "bot_username"));

        let err = settings_from_json(r#"{ "bot_username": "bot", "channels": ["a"] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "oauth_token"));

        let err = settings_from_json(r#"{ "bot_username": "bot", "oauth_token": "oauth:x" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "channels"));
    }

    #[test]
    fn test_empty_channel_list_is_rejected() {
        let err = settings_from_json(
            r#"{ "bot_username": "bot", "oauth_token": "oauth:x", "channels": [] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_non_string_list_entry_is_rejected() {
        let err = settings_from_json(
            r#"{ "bot_username": "bot", "oauth_token": "oauth:x", "channels": ["a", 3] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_token_is_redacted_in_debug_output() {
        let settings = settings_from_json(
            r#"{ "bot_username": "bot", "oauth_token": "oauth:topsecret", "channels": ["a"] }"#,
        )
        .unwrap();
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("topsecret"));
        assert!(printed.contains("OAuthToken(***)"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  #Alice "), "alice");
        assert_eq!(normalize_name("bob"), "bob");
    }
}
