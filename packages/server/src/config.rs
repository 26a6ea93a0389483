//! Server configuration.
//!
//! Every option can be given as a command line flag or an environment
//! variable. The binary loads a `.env` file before parsing.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::domain::Principal;

/// How the WebSocket upgrade decides who is connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IdentityMode {
    /// Trust the client-supplied `userID` query parameter
    #[default]
    QueryParam,
    /// Require a `token` query parameter and use its verified subject
    Token,
}

/// What the relay loop does when a frame cannot be relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FrameErrorPolicy {
    /// Close the connection and deregister it
    #[default]
    Terminate,
    /// Drop the offending frame and keep reading
    Skip,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "flexin-server")]
#[command(about = "Real-time direct message relay for the Flexin social network", long_about = None)]
pub struct Config {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "FLEXIN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "FLEXIN_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Secret used to sign and verify access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// How WebSocket clients identify themselves
    #[arg(long, env = "FLEXIN_IDENTITY_MODE", value_enum, default_value_t = IdentityMode::QueryParam)]
    pub identity_mode: IdentityMode,

    /// What to do with a connection that sends a frame that cannot be relayed
    #[arg(long, env = "FLEXIN_FRAME_ERROR_POLICY", value_enum, default_value_t = FrameErrorPolicy::Terminate)]
    pub frame_error_policy: FrameErrorPolicy,

    /// Origins allowed to open a WebSocket (any origin when none is given)
    #[arg(
        long = "allowed-origin",
        env = "FLEXIN_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// JSON file with the users to load into the user directory
    #[arg(long, env = "FLEXIN_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "FLEXIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            identity_mode: self.identity_mode,
            frame_error_policy: self.frame_error_policy,
            allowed_origins: self.allowed_origins.clone(),
        }
    }
}

/// Connection-level settings consumed by the WebSocket handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaySettings {
    pub identity_mode: IdentityMode,
    pub frame_error_policy: FrameErrorPolicy,
    pub allowed_origins: Vec<String>,
}

impl RelaySettings {
    /// Whether an upgrade carrying `origin` may proceed.
    ///
    /// With an empty allow-list every request passes, including ones without
    /// an `Origin` header.
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|origin| self.allowed_origins.iter().any(|allowed| allowed == origin))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read users file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse users file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load the user directory seed from a JSON array of principals.
pub fn load_users(path: &Path) -> Result<Vec<Principal>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
