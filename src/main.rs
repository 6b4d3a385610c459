mod api;
mod app;
mod cache;
mod config;
mod event;
mod logging;
mod models;
mod server;
mod shopping;
mod store;
mod ui;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cache::{CacheStorage, NoopStorage, SnapshotCache, SqliteStorage};
use crate::config::Config;
use crate::shopping::{list_cache_key, ListController};

#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(about = "Recipes and a shared shopping list, served over HTTP with a terminal client")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./larder.yaml, then $XDG_CONFIG_HOME/larder/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the REST API server
  Serve {
    /// Address to listen on, overrides the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Keep data in memory instead of PostgreSQL
    #[arg(long)]
    ephemeral: bool,
  },
  /// Open the shopping list in the terminal
  Shop {
    /// Base URL of the API, overrides the config file
    #[arg(short, long)]
    api_url: Option<String>,

    /// Don't read or write the offline snapshot
    #[arg(long)]
    no_cache: bool,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;

  match args.command {
    Command::Serve { bind, ephemeral } => {
      logging::init_server();

      let mut server = config.server;
      if let Some(bind) = bind {
        server.bind = bind;
      }
      server::run(&server, ephemeral).await
    }
    Command::Shop { api_url, no_cache } => {
      let mut client = config.client;
      if let Some(api_url) = api_url {
        client.api_url = api_url;
      }
      if no_cache {
        client.cache.enabled = false;
      }
      shop(client).await
    }
  }
}

async fn shop(client: config::ClientConfig) -> Result<()> {
  let log_dir = match client.log_dir.clone() {
    Some(dir) => dir,
    None => Config::data_dir()?.join("logs"),
  };
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;
  let _guard = logging::init_client(&log_dir);

  let api = ApiClient::new(&client.api_url)?;

  if !client.cache.enabled {
    info!("Offline snapshot disabled");
    return run_client(api, NoopStorage).await;
  }

  let path = match client.cache.path.clone() {
    Some(path) => path,
    None => Config::data_dir()?.join("cache.db"),
  };
  match SqliteStorage::open(&path) {
    Ok(storage) => run_client(api, storage).await,
    Err(e) => {
      // A broken cache file shouldn't keep the list from opening
      warn!(error = %e, path = %path.display(), "Running without offline snapshot");
      run_client(api, NoopStorage).await
    }
  }
}

async fn run_client<S: CacheStorage>(api: ApiClient, storage: S) -> Result<()> {
  let api_url = api.base_url().to_string();
  let cache = SnapshotCache::new(storage, list_cache_key(&api_url));
  info!(api_url = %api_url, "Opening shopping list");

  let mut app = app::App::new(ListController::new(api, cache), api_url);
  app.run().await
}
