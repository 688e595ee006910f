//! Runtime configuration.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! `event_reports.toml` in the working directory, then `EVENT_REPORTS_*`
//! environment variables. Every collaborator receives the paths it needs from
//! here at construction time.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "event_reports.toml";
const ENV_PREFIX: &str = "EVENT_REPORTS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the `events` and `reports` tables.
    pub database_path: PathBuf,
    /// The letterhead every report is composed on.
    pub template_path: PathBuf,
    /// Directory receiving generated `.docx` artifacts.
    pub reports_dir: PathBuf,
    /// Root against which event photo paths are resolved.
    pub media_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("database.db"),
            template_path: PathBuf::from("word_templates/college_letterhead.docx"),
            reports_dir: PathBuf::from("generated_reports"),
            media_root: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
