//! Configuration loading and listen-address resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Default listen port, matching the service this backend replaces
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Resolved service listen configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
}

impl ServiceConfig {
    /// Listen address in `host:port` form
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the listen configuration following priority order:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable (`PODIUM_HOST` / `PODIUM_PORT`)
    /// 3. TOML config file (`[server]` table)
    /// 4. Compiled default (fallback)
    ///
    /// `config_file` overrides the default config file search; a file that
    /// exists but cannot be parsed is a hard error rather than a silent
    /// fall-through.
    pub fn resolve(
        cli_host: Option<&str>,
        cli_port: Option<u16>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let file = load_config_table(config_file)?;

        let host = resolve_host(cli_host, file.as_ref());
        let port = resolve_port(cli_port, file.as_ref())?;

        Ok(ServiceConfig { host, port })
    }
}

fn resolve_host(cli_arg: Option<&str>, file: Option<&toml::Value>) -> String {
    // Priority 1: Command-line argument
    if let Some(host) = cli_arg {
        tracing::debug!("Using host from command line: {}", host);
        return host.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(host) = std::env::var("PODIUM_HOST") {
        tracing::debug!("Using host from PODIUM_HOST: {}", host);
        return host;
    }

    // Priority 3: TOML config file
    if let Some(host) = file
        .and_then(|c| c.get("server"))
        .and_then(|s| s.get("host"))
        .and_then(|v| v.as_str())
    {
        tracing::debug!("Using host from config file: {}", host);
        return host.to_string();
    }

    // Priority 4: Compiled default
    DEFAULT_HOST.to_string()
}

fn resolve_port(cli_arg: Option<u16>, file: Option<&toml::Value>) -> Result<u16> {
    // Priority 1: Command-line argument
    if let Some(port) = cli_arg {
        tracing::debug!("Using port from command line: {}", port);
        return Ok(port);
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var("PODIUM_PORT") {
        let port = raw
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("PODIUM_PORT is not a valid port: {}", raw)))?;
        tracing::debug!("Using port from PODIUM_PORT: {}", port);
        return Ok(port);
    }

    // Priority 3: TOML config file
    if let Some(value) = file
        .and_then(|c| c.get("server"))
        .and_then(|s| s.get("port"))
    {
        let port = value
            .as_integer()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| Error::Config(format!("config file port is invalid: {}", value)))?;
        tracing::debug!("Using port from config file: {}", port);
        return Ok(port);
    }

    // Priority 4: Compiled default
    Ok(DEFAULT_PORT)
}

/// Parse the config file into a TOML table, if one is present
///
/// An explicit path must exist and parse. A discovered default file must
/// parse if it exists; absence of any default file is not an error.
fn load_config_table(explicit: Option<&Path>) -> Result<Option<toml::Value>> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_file() {
            Some(path) => path,
            None => return Ok(None),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let table = toml::from_str::<toml::Value>(&content)
        .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))?;
    Ok(Some(table))
}

/// Default config file search: `./podium.toml`, then the platform config
/// directory (`~/.config/podium/config.toml` on Linux)
fn default_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("podium.toml");
    if local.exists() {
        return Some(local);
    }

    let user_config = dirs::config_dir().map(|d| d.join("podium").join("config.toml"))?;
    if user_config.exists() {
        Some(user_config)
    } else {
        None
    }
}
