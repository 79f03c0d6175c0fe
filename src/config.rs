use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds before an unresolved profile fetch is given up on.
    #[serde(default = "SessionConfig::default_profile_fetch_timeout_secs")]
    pub profile_fetch_timeout_secs: u64,
    #[serde(default = "SessionConfig::default_command_buffer")]
    pub command_buffer: usize,
}

impl SessionConfig {
    pub(crate) fn profile_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.profile_fetch_timeout_secs)
    }

    fn default_profile_fetch_timeout_secs() -> u64 {
        10
    }

    fn default_command_buffer() -> usize {
        32
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_fetch_timeout_secs: SessionConfig::default_profile_fetch_timeout_secs(),
            command_buffer: SessionConfig::default_command_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let config = Config::from_yaml("session:\n  profile_fetch_timeout_secs: 3\n").unwrap();

        assert_eq!(config.session.profile_fetch_timeout_secs, 3);
        assert_eq!(
            config.session.command_buffer,
            SessionConfig::default_command_buffer()
        );
    }

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let config = Config::from_yaml("{}").unwrap();

        assert_eq!(config.session.profile_fetch_timeout_secs, 10);
    }
}
