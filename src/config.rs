use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Address the API listens on
  pub bind: String,
  pub database: DatabaseConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: "0.0.0.0:3000".to_string(),
      database: DatabaseConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  pub host: String,
  pub port: u16,
  pub name: String,
  pub user: String,
  pub max_connections: u32,
  /// How many times to probe the database at startup before giving up
  pub connect_attempts: u32,
  /// Fixed wait between startup probes
  pub retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      host: "db".to_string(),
      port: 5432,
      name: "larder".to_string(),
      user: "postgres".to_string(),
      max_connections: 5,
      connect_attempts: 5,
      retry_delay_secs: 5,
    }
  }
}

impl DatabaseConfig {
  pub fn retry_delay(&self) -> Duration {
    Duration::from_secs(self.retry_delay_secs)
  }

  /// Connection string for the database.
  ///
  /// `DATABASE_URL` wins outright. Otherwise the URL is assembled from this
  /// config and the password from [`Config::get_db_password`], if any.
  pub fn url(&self) -> Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
      return Ok(url);
    }
    self.url_with_password(Config::get_db_password().as_deref())
  }

  fn url_with_password(&self, password: Option<&str>) -> Result<String> {
    let mut url = Url::parse(&format!("postgres://{}:{}/", self.host, self.port))
      .map_err(|e| eyre!("Invalid database host {}: {}", self.host, e))?;

    url
      .set_username(&self.user)
      .map_err(|_| eyre!("Invalid database user {}", self.user))?;
    url
      .set_password(password)
      .map_err(|_| eyre!("Invalid database password"))?;
    url.set_path(&self.name);

    Ok(url.to_string())
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// Base URL of the API, including the `/api` prefix
  pub api_url: String,
  pub cache: CacheConfig,
  /// Directory for the client's rolling log files
  pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_url: "http://localhost:3000/api".to_string(),
      cache: CacheConfig::default(),
      log_dir: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// SQLite file holding the offline snapshot (default: data dir)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./larder.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/larder/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("larder.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("larder").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Get the database password from environment variables.
  ///
  /// Checks LARDER_DB_PASSWORD first, then POSTGRES_PASSWORD as fallback.
  pub fn get_db_password() -> Option<String> {
    std::env::var("LARDER_DB_PASSWORD")
      .or_else(|_| std::env::var("POSTGRES_PASSWORD"))
      .ok()
  }

  /// Directory for application data (cache database, logs).
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("larder"))
  }
}
