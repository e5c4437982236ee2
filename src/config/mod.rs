// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file. Besides the static
//! settings (cache sizing, helper binaries, storage locations) it also holds
//! the user's playback preferences, which are written back whenever they
//! change.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::RepeatMode;

const CONFIG_NAME: &str = "cadenza";

const DATABASE_FILE: &str = "cadenza.db";
const LOG_FILE: &str = "cadenza.log";
const CACHE_DIR_NAME: &str = "cadenza-cache";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,

    pub volume: u8,
    pub autoplay: bool,
    pub shuffle: bool,
    pub repeat_mode: RepeatMode,
    pub ad_block: bool,

    /// Number of upcoming queue tracks kept downloaded.
    pub cache_window: usize,
    pub max_concurrent_downloads: usize,

    pub search_limit: usize,
    pub recommendation_limit: usize,

    pub ytdlp_binary: String,
    pub cache_dir: Option<PathBuf>,
    pub database_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            volume: 50,
            autoplay: true,
            shuffle: false,
            repeat_mode: RepeatMode::Off,
            ad_block: true,
            cache_window: 5,
            max_concurrent_downloads: 3,
            search_limit: 15,
            recommendation_limit: 15,
            ytdlp_binary: "yt-dlp".to_string(),
            cache_dir: None,
            database_file: None,
        }
    }
}

impl AppConfig {
    /// The directory holding prefetched audio, removed again on exit.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(CACHE_DIR_NAME))
    }

    /// The SQLite database holding playlists and play history.
    pub fn database_file(&self) -> PathBuf {
        self.database_file
            .clone()
            .unwrap_or_else(|| data_dir().join(DATABASE_FILE))
    }

    pub fn log_file(&self) -> PathBuf {
        data_dir().join(LOG_FILE)
    }
}

// Application data lives next to the configuration file.
fn data_dir() -> PathBuf {
    confy::get_configuration_file_path(CONFIG_NAME, None)
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_playback_expectations() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.volume, 50);
        assert!(cfg.autoplay);
        assert!(!cfg.shuffle);
        assert_eq!(cfg.repeat_mode, RepeatMode::Off);
        assert!(cfg.ad_block);
        assert_eq!(cfg.cache_window, 5);
        assert_eq!(cfg.max_concurrent_downloads, 3);
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let cfg = AppConfig {
            cache_dir: Some(PathBuf::from("/var/tmp/somewhere")),
            ..AppConfig::default()
        };
        assert_eq!(cfg.cache_dir(), PathBuf::from("/var/tmp/somewhere"));
    }

    #[test]
    fn default_cache_dir_is_in_temp() {
        let cfg = AppConfig::default();
        assert!(cfg.cache_dir().starts_with(std::env::temp_dir()));
        assert!(cfg.cache_dir().ends_with(CACHE_DIR_NAME));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "volume": 80, "shuffle": true }"#).unwrap();
        assert_eq!(cfg.volume, 80);
        assert!(cfg.shuffle);
        assert_eq!(cfg.cache_window, 5);
        assert_eq!(cfg.ytdlp_binary, "yt-dlp");
    }
}
