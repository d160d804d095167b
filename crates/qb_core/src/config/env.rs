use std::env;

use super::GameConfig;
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "QUIZBALL_CONFIG_PATH";

/// Load the config file named by [`CONFIG_PATH_ENV`], or the defaults when the
/// variable is unset or blank.
pub fn load_from_env() -> Result<GameConfig, ConfigError> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(GameConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(GameConfig::default());
    }

    GameConfig::load(path)
}
