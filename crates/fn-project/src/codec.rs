//! Binary network encoding.
//!
//! Layout: 4-byte magic `FNET`, little-endian `u32` schema version, then the
//! postcard-encoded [`NetworkFile`]. The header is read first so files from a
//! newer engine are rejected before their body is decoded.

use tracing::debug;

use crate::migrate::LATEST_VERSION;
use crate::schema::NetworkFile;
use crate::{ProjectError, ProjectResult};

pub const MAGIC: [u8; 4] = *b"FNET";
pub const HEADER_LEN: usize = 8;

pub fn encode(file: &NetworkFile) -> ProjectResult<Vec<u8>> {
    let body = postcard::to_stdvec(file)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&file.version.to_le_bytes());
    bytes.extend_from_slice(&body);
    debug!(bytes = bytes.len(), nodes = file.nodes.len(), "encoded network");
    Ok(bytes)
}

/// Decode without migrating; the returned file may be an older version.
pub fn decode(bytes: &[u8]) -> ProjectResult<NetworkFile> {
    if bytes.len() < HEADER_LEN {
        return Err(ProjectError::Truncated { len: bytes.len() });
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if header[..4] != MAGIC {
        return Err(ProjectError::BadMagic);
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version > LATEST_VERSION {
        return Err(crate::ValidationError::UnsupportedVersion { version }.into());
    }

    let file: NetworkFile = postcard::from_bytes(body)?;
    if file.version != version {
        return Err(ProjectError::Serialization(format!(
            "header version {} does not match body version {}",
            version, file.version
        )));
    }
    Ok(file)
}
