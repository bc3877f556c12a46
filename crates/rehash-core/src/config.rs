// crates/rehash-core/src/config.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RehashError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "creds/db.toml";
pub const DEFAULT_SECTION: &str = "postgresql";

/// Raw key/value section as it appears in the config file.
#[derive(Debug, Deserialize)]
struct RawSection {
    ssh_host: String,
    ssh_private_key_path: String,
    ssh_username: String,
    remote_bind_address: String,
    db_name: String,
    db_user: String,
    db_password: String,
    db_host: String,
}

#[derive(Debug, Clone)]
pub struct SshParams {
    pub host: String,
    pub port: u16,
    pub private_key: PathBuf,
    pub username: String,
    pub remote_host: String,
    pub remote_port: u16,
}

#[derive(Debug, Clone)]
pub struct DbParams {
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ssh: SshParams,
    pub db: DbParams,
}

impl Config {
    /// Loads the named section from a TOML config file.
    pub fn load(path: &Path, section: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, section)
    }

    pub fn from_toml_str(content: &str, section: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;
        let raw = table
            .get(section)
            .ok_or_else(|| {
                RehashError::Config(format!("section '{}' not found in config file", section))
            })?
            .clone();
        let raw: RawSection = raw
            .try_into()
            .map_err(|err| RehashError::Config(format!("section '{}': {}", section, err)))?;

        let (ssh_host, ssh_port) = split_host_port(&raw.ssh_host, "ssh_host")?;
        let (remote_host, remote_port) =
            split_host_port(&raw.remote_bind_address, "remote_bind_address")?;

        Ok(Self {
            ssh: SshParams {
                host: ssh_host,
                port: ssh_port,
                private_key: expand_tilde(&raw.ssh_private_key_path),
                username: raw.ssh_username,
                remote_host,
                remote_port,
            },
            db: DbParams {
                dbname: raw.db_name,
                user: raw.db_user,
                password: raw.db_password,
                host: raw.db_host,
            },
        })
    }
}

fn split_host_port(value: &str, key: &str) -> Result<(String, u16)> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| RehashError::Config(format!("{} must be host:port, got '{}'", key, value)))?;
    if host.is_empty() {
        return Err(RehashError::Config(format!(
            "{} has an empty host in '{}'",
            key, value
        )));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| RehashError::Config(format!("{} has invalid port '{}'", key, port)))?;
    Ok((host.to_string(), port))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
