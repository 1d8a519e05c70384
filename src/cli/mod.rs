//! CLI entry point for Prasaddys.

pub mod auth;
pub mod media;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::{Credentials, FileSecureStore};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Prasaddys media CLI
#[derive(Parser, Debug)]
#[command(name = "prasaddys", version, about = "Prasaddys media client CLI")]
pub struct Cli {
    /// Config file (defaults to ~/.prasaddys/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Browse albums
    Albums(AlbumsArgs),
    /// Search YouTube
    Youtube(YoutubeArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in (browser + PKCE by default)
    Login(LoginArgs),
    /// Show authentication status
    Status,
    /// Remove stored tokens
    Logout,
    /// Exchange the refresh token for a new access token
    Refresh,
}

/// Arguments for `prasaddys auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Use the device-code flow instead of a browser redirect
    #[arg(long)]
    pub device: bool,

    /// Email to pre-fill on the sign-in page
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AlbumsArgs {
    #[command(subcommand)]
    pub command: AlbumsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AlbumsCommands {
    /// List one page of albums
    List(PageArgs),
    /// Search albums by text
    Search(SearchArgs),
}

#[derive(Parser, Debug)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = crate::client::DEFAULT_PAGE_SIZE)]
    pub limit: u32,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    pub query: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Parser, Debug)]
pub struct YoutubeArgs {
    #[command(subcommand)]
    pub command: YoutubeCommands,
}

#[derive(Subcommand, Debug)]
pub enum YoutubeCommands {
    /// Search for videos
    Search(YoutubeSearchArgs),
}

#[derive(Parser, Debug)]
pub struct YoutubeSearchArgs {
    pub query: String,

    /// Continuation token from a previous page
    #[arg(long)]
    pub page_token: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Config from `--config` (or the default file) with the environment on top.
    pub fn load_config(&self) -> Result<AppConfig, ApiError> {
        match &self.config {
            Some(path) => {
                let config = AppConfig::load_from_path(path)?;
                config.merge_from(&AppConfig::from_env());
                Ok(config)
            }
            None => AppConfig::load(),
        }
    }
}

/// Credentials backed by the default file store.
pub fn default_credentials() -> Credentials {
    Credentials::new(Arc::new(FileSecureStore::new_default()))
}
