use crate::robots::WindowScan;
use serde::Deserialize;

/// Main configuration structure for Sumi-Robots
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Policy resolution options
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ResolverConfig {
    /// Retry failed prefix matches with the rule path as a regular expression
    #[serde(rename = "regex-mode", default)]
    pub regex_mode: bool,

    /// How many visit-time windows of a group are consulted
    #[serde(rename = "window-scan", default)]
    pub window_scan: WindowScan,
}

/// Identity used when a query does not name an agent
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Product token of the crawler
    pub name: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "SumiBot".to_string(),
        }
    }
}
