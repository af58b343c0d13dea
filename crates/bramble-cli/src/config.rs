use bramble_core::{BrambleError, BrambleResult, ThresholdTable};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct BrambleConfig {
    #[serde(default)]
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_bind")]
    pub bind: String,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            bind: default_api_bind(),
            max_records: default_max_records(),
        }
    }
}

fn default_api_port() -> u16 {
    3200
}
fn default_api_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_max_records() -> usize {
    1000
}

impl BrambleConfig {
    pub fn from_file(path: &str) -> BrambleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BrambleError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_documented_defaults() {
        let config: BrambleConfig = toml::from_str("").unwrap();
        assert_eq!(config.thresholds.seek_time.too_fast, 30);
        assert_eq!(config.thresholds.timing.user_to_pass_min, 300);
        assert_eq!(config.api.port, 3200);
    }

    #[test]
    fn thresholds_and_policy_are_overridable() {
        let config: BrambleConfig = toml::from_str(
            r#"
            [thresholds.press_time]
            bot_max = 25

            [thresholds.decision]
            policy = "score-or-confidence"
            bot_score_floor = 4.0

            [api]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.press_time.bot_max, 25);
        assert!(config.thresholds.decision.decide(4.0, 0));
        assert_eq!(config.api.port, 8080);
    }
}
