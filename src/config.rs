//! Runtime configuration read from the environment (and `.env` if present).

use crate::remote::DEFAULT_ENDPOINT_URL;
use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub session_path: PathBuf,
    pub endpoint_url: String,
    pub acting_user: String,
    pub icons_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            session_path: PathBuf::from("data/session.json"),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            acting_user: "rose".to_string(),
            icons_dir: PathBuf::from("icons"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            session_path: non_empty("APP_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            endpoint_url: non_empty("APP_ENDPOINT_URL").unwrap_or(defaults.endpoint_url),
            acting_user: non_empty("APP_ACTING_USER").unwrap_or(defaults.acting_user),
            icons_dir: non_empty("APP_ICONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.icons_dir),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
