//! fn-project: network file format, codec and validation.
//!
//! A network is saved as a [`NetworkFile`]: nodes in tick order with their
//! parameters, positions and port values, plus flow and logic links addressed
//! by node index. The primary format is binary ([`save`]/[`load`]); YAML and
//! JSON share the same schema for inspection and hand editing.

pub mod codec;
pub mod convert;
pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::Path;

use fn_sim::{EngineError, Network};

pub use convert::{file_to_network, network_to_file};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_file};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not a network file (bad magic)")]
    BadMagic,

    #[error("Network file truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("Binary codec error: {0}")]
    Codec(#[from] postcard::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Yaml,
    Json,
}

impl Format {
    /// `.yaml`/`.yml` and `.json` are text; anything else is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => Format::Binary,
        }
    }
}

/// Serialize a network to the binary format.
pub fn save(network: &Network, name: &str) -> ProjectResult<Vec<u8>> {
    let file = network_to_file(network, name)?;
    codec::encode(&file)
}

/// Rebuild a network from the binary format.
pub fn load(bytes: &[u8]) -> ProjectResult<Network> {
    file_to_network(&decode_file(bytes)?)
}

/// Decode, migrate and validate a binary file without building a network.
pub fn decode_file(bytes: &[u8]) -> ProjectResult<NetworkFile> {
    let file = migrate_to_latest(codec::decode(bytes)?)?;
    validate_file(&file)?;
    Ok(file)
}

pub fn to_yaml(file: &NetworkFile) -> ProjectResult<String> {
    validate_file(file)?;
    Ok(serde_yaml::to_string(file)?)
}

pub fn from_yaml(content: &str) -> ProjectResult<NetworkFile> {
    let file: NetworkFile = serde_yaml::from_str(content)?;
    let file = migrate_to_latest(file)?;
    validate_file(&file)?;
    Ok(file)
}

pub fn to_json(file: &NetworkFile) -> ProjectResult<String> {
    validate_file(file)?;
    Ok(serde_json::to_string_pretty(file)?)
}

pub fn from_json(content: &str) -> ProjectResult<NetworkFile> {
    let file: NetworkFile = serde_json::from_str(content)?;
    let file = migrate_to_latest(file)?;
    validate_file(&file)?;
    Ok(file)
}

/// Read a network file in the format implied by its extension.
pub fn load_path(path: &Path) -> ProjectResult<NetworkFile> {
    match Format::from_path(path) {
        Format::Binary => decode_file(&std::fs::read(path)?),
        Format::Yaml => from_yaml(&std::fs::read_to_string(path)?),
        Format::Json => from_json(&std::fs::read_to_string(path)?),
    }
}

/// Write a network file in the format implied by its extension.
pub fn save_path(path: &Path, file: &NetworkFile) -> ProjectResult<()> {
    match Format::from_path(path) {
        Format::Binary => {
            validate_file(file)?;
            std::fs::write(path, codec::encode(file)?)?
        }
        Format::Yaml => std::fs::write(path, to_yaml(file)?)?,
        Format::Json => std::fs::write(path, to_json(file)?)?,
    }
    Ok(())
}
