use crate::error::{ClipError, Result};
use crate::transcode::CodecSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Materialize the whole stream locally, then cut the staged file.
    #[serde(rename = "download")]
    DownloadThenCut,
    /// Seek directly into the remote stream; nothing is staged.
    #[default]
    #[serde(rename = "remote")]
    RemoteSeekCut,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DownloadThenCut => write!(f, "download"),
            Strategy::RemoteSeekCut => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "download" | "download-then-cut" => Ok(Strategy::DownloadThenCut),
            "remote" | "remote-seek-cut" => Ok(Strategy::RemoteSeekCut),
            _ => Err(format!(
                "Unknown strategy: {}. Use 'download' or 'remote'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_strategy: Strategy,
    pub ffmpeg_path: PathBuf,
    pub ytdlp_path: PathBuf,
    /// Directory for staging files; the system temp dir when unset.
    pub staging_dir: Option<PathBuf>,
    pub codecs: CodecSet,
    pub resolve_timeout_secs: u64,
    /// Connect timeout for staging downloads.
    pub connect_timeout_secs: u64,
    /// Longest pause between body chunks before a staging download fails.
    pub read_timeout_secs: u64,
    pub default_output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::default(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ytdlp_path: PathBuf::from("yt-dlp"),
            staging_dir: None,
            codecs: CodecSet::default(),
            resolve_timeout_secs: 60,
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            default_output: PathBuf::from("cut_video.mp4"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    ClipError::Config(format!("{}: {e}", config_path.display()))
                })?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(strategy) = std::env::var("YTCLIP_STRATEGY") {
            if let Ok(s) = strategy.parse() {
                self.default_strategy = s;
            }
        }
        if let Ok(path) = std::env::var("YTCLIP_FFMPEG") {
            self.ffmpeg_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("YTCLIP_YTDLP") {
            self.ytdlp_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("YTCLIP_STAGING_DIR") {
            self.staging_dir = Some(PathBuf::from(dir));
        }
        if let Ok(timeout) = std::env::var("YTCLIP_RESOLVE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.resolve_timeout_secs = t;
            }
        }
        if let Ok(timeout) = std::env::var("YTCLIP_CONNECT_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.connect_timeout_secs = t;
            }
        }
        if let Ok(timeout) = std::env::var("YTCLIP_READ_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.read_timeout_secs = t;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolve_timeout_secs == 0 {
            return Err(ClipError::Config(
                "Resolve timeout must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(ClipError::Config(
                "Download timeouts must be greater than 0".to_string(),
            ));
        }

        if self.codecs.video.trim().is_empty() || self.codecs.audio.trim().is_empty() {
            return Err(ClipError::Config(
                "Video and audio codecs must not be empty".to_string(),
            ));
        }

        if let Some(dir) = &self.staging_dir {
            if !dir.is_dir() {
                return Err(ClipError::Config(format!(
                    "Staging directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ytclip").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "download".parse::<Strategy>().unwrap(),
            Strategy::DownloadThenCut
        );
        assert_eq!("remote".parse::<Strategy>().unwrap(), Strategy::RemoteSeekCut);
        assert_eq!("REMOTE".parse::<Strategy>().unwrap(), Strategy::RemoteSeekCut);
        assert!("stream".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_strategy, Strategy::RemoteSeekCut);
        assert_eq!(config.codecs.video, "libx264");
        assert_eq!(config.codecs.audio, "aac");
        assert_eq!(config.codecs.audio_bitrate, "192k");
        assert_eq!(config.default_output, PathBuf::from("cut_video.mp4"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            default_strategy = "download"
            resolve_timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.default_strategy, Strategy::DownloadThenCut);
        assert_eq!(config.resolve_timeout(), Duration::from_secs(15));
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            resolve_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_download_timeouts() {
        let config = Config::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(30));

        let config = Config {
            read_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ClipError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_staging_dir() {
        let config = Config {
            staging_dir: Some(PathBuf::from("/nonexistent/ytclip/staging")),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ClipError::Config(_))));
    }
}
