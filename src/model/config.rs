use serde::{Deserialize, Serialize};

/// Configuration from `<data-dir>/config.toml`. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Artificial delay of the demo credential check
    #[serde(default = "default_auth_delay_ms")]
    pub delay_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            delay_ms: default_auth_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a search keystroke reaches the filters
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Title column width (terminal cells) in board and list output
    #[serde(default = "default_title_width")]
    pub title_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            title_width: default_title_width(),
        }
    }
}

fn default_auth_delay_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_title_width() -> usize {
    40
}
