// crates/rehash-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RehashError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hash batch misaligned: {0}")]
    HashAlignment(String),
}

pub type Result<T> = std::result::Result<T, RehashError>;
