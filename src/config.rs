use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where produced files are written; relative paths resolve against the working directory.
    pub download_directory: String,
    /// The yt-dlp executable, either a bare name looked up on PATH or a full path.
    pub ytdlp_path: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            download_directory: ".".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Listener address, with `HOST` / `PORT` from the environment taking precedence.
    pub fn bind_address(&self) -> String {
        let host = std::env::var("HOST").unwrap_or_else(|_| self.host.clone());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(self.port);
        format!("{}:{}", host, port)
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "vidgrab", "vidgrab")
        .ok_or_else(|| anyhow!("no home directory to keep settings in"))
}

async fn config_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    fs::create_dir_all(dirs.config_dir()).await?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// Settings from the per-user `config.toml`. A first run writes the defaults there.
pub async fn load_config() -> Result<Config> {
    read_config_from(&config_path().await?).await
}

pub async fn save_config(config: &Config) -> Result<()> {
    write_config(&config_path().await?, config).await
}

async fn read_config_from(path: &Path) -> Result<Config> {
    match fs::read_to_string(path).await {
        Ok(text) => parse_config(&text).with_context(|| format!("{} is not valid TOML settings", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("Writing default settings to {}", path.display());
            let config = Config::default();
            write_config(path, &config).await?;
            Ok(config)
        }
        Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
    }
}

async fn write_config(path: &Path, config: &Config) -> Result<()> {
    let text = toml::to_string_pretty(config)?;
    fs::write(path, text)
        .await
        .with_context(|| format!("cannot write {}", path.display()))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_write_to_working_directory() {
        let config = Config::default();
        assert_eq!(config.download_directory, ".");
        assert_eq!(config.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn older_files_fill_in_missing_fields() {
        let config = parse_config(r#"download_directory = "/srv/videos""#).unwrap();
        assert_eq!(config.download_directory, "/srv/videos");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            download_directory: "out".into(),
            ytdlp_path: "/usr/local/bin/yt-dlp".into(),
            host: "0.0.0.0".into(),
            port: 9000,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text).unwrap(), config);
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(parse_config("port = \"not a number\"").is_err());
    }

    #[tokio::test]
    async fn first_load_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = read_config_from(&path).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let changed = Config { port: 9191, ..Config::default() };
        write_config(&path, &changed).await.unwrap();
        assert_eq!(read_config_from(&path).await.unwrap(), changed);
    }

    #[tokio::test]
    async fn malformed_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = [").unwrap();

        let err = read_config_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
