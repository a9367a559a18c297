//! Index persistence
//!
//! Two companion artifacts:
//! - the vector artifact: little-endian binary, `MAGIC | version:u32 |
//!   dimension:u32 | count:u64 | count*dimension f32`
//! - the metadata artifact: versioned JSON holding the ordinal-aligned
//!   `texts` and `metadatas`, plus the SHA-256 and count of the vector
//!   artifact it belongs to
//!
//! Both are written to temp files, fsynced, then renamed; the metadata
//! artifact is renamed last. A pair left over from an interrupted save
//! fails the digest check on load instead of loading misaligned.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{RagError, Result};
use crate::index::flat::FlatIndex;
use crate::types::ChunkMetadata;

const MAGIC: &[u8; 4] = b"FQVX";
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Version of both artifact layouts
pub const SCHEMA_VERSION: u32 = 1;

/// Contents of the metadata artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub schema_version: u32,
    pub embedding_model: String,
    pub dimension: usize,
    pub count: usize,
    /// Hex SHA-256 of the vector artifact bytes
    pub index_sha256: String,
    pub created_at: String,
    pub texts: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
}

/// Serialize vectors into the binary artifact layout
pub fn encode_vectors(index: &FlatIndex) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + index.raw().len() * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(index.dimension() as u32).to_le_bytes());
    bytes.extend_from_slice(&(index.len() as u64).to_le_bytes());
    for value in index.raw() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Parse the binary artifact layout
pub fn decode_vectors(bytes: &[u8]) -> Result<FlatIndex> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(RagError::IndexCorrupt(
            "vector artifact has no valid header".to_string(),
        ));
    }

    let version = u32::from_le_bytes(le_array(&bytes[4..8]));
    if version != SCHEMA_VERSION {
        return Err(RagError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    let dimension = u32::from_le_bytes(le_array(&bytes[8..12])) as usize;
    let count = u64::from_le_bytes(le_array(&bytes[12..20])) as usize;

    let body = &bytes[HEADER_LEN..];
    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RagError::IndexCorrupt("vector count overflows".to_string()))?;

    if body.len() != expected {
        return Err(RagError::IndexCorrupt(format!(
            "expected {} bytes of vector data for {} x {}, found {}",
            expected,
            count,
            dimension,
            body.len()
        )));
    }

    let data = body
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes(le_array(b)))
        .collect();

    FlatIndex::from_raw(dimension, data)
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write both artifacts
pub fn save(
    index_path: &Path,
    meta_path: &Path,
    index: &FlatIndex,
    texts: &[String],
    metadatas: &[ChunkMetadata],
    embedding_model: &str,
) -> Result<()> {
    if texts.len() != index.len() || metadatas.len() != index.len() {
        return Err(RagError::IndexCorrupt(format!(
            "refusing to save misaligned index: {} vectors, {} texts, {} metadatas",
            index.len(),
            texts.len(),
            metadatas.len()
        )));
    }

    let vector_bytes = encode_vectors(index);
    let manifest = IndexManifest {
        schema_version: SCHEMA_VERSION,
        embedding_model: embedding_model.to_string(),
        dimension: index.dimension(),
        count: index.len(),
        index_sha256: sha256_hex(&vector_bytes),
        created_at: Utc::now().to_rfc3339(),
        texts: texts.to_vec(),
        metadatas: metadatas.to_vec(),
    };
    let manifest_bytes = serde_json::to_vec(&manifest)?;

    let index_tmp = write_temp(index_path, &vector_bytes)?;
    let meta_tmp = match write_temp(meta_path, &manifest_bytes) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&index_tmp);
            return Err(e);
        }
    };

    fs::rename(&index_tmp, index_path)?;
    fs::rename(&meta_tmp, meta_path)?;

    tracing::info!(
        count = manifest.count,
        index = %index_path.display(),
        metadata = %meta_path.display(),
        "Saved index artifacts"
    );

    Ok(())
}

/// Read and cross-check both artifacts
pub fn load(index_path: &Path, meta_path: &Path) -> Result<(FlatIndex, IndexManifest)> {
    let vector_bytes = fs::read(index_path)?;
    let manifest_bytes = fs::read(meta_path)?;

    let manifest: IndexManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| RagError::IndexCorrupt(format!("metadata artifact: {}", e)))?;

    if manifest.schema_version != SCHEMA_VERSION {
        return Err(RagError::UnsupportedVersion {
            found: manifest.schema_version,
            supported: SCHEMA_VERSION,
        });
    }

    let digest = sha256_hex(&vector_bytes);
    if digest != manifest.index_sha256 {
        return Err(RagError::IndexCorrupt(format!(
            "vector artifact digest {} does not match metadata ({})",
            digest, manifest.index_sha256
        )));
    }

    let index = decode_vectors(&vector_bytes)?;

    let aligned = index.len() == manifest.count
        && manifest.texts.len() == manifest.count
        && manifest.metadatas.len() == manifest.count
        && index.dimension() == manifest.dimension;

    if !aligned {
        return Err(RagError::IndexCorrupt(format!(
            "ordinal misalignment: {} vectors (dim {}), {} texts, {} metadatas, manifest count {} (dim {})",
            index.len(),
            index.dimension(),
            manifest.texts.len(),
            manifest.metadatas.len(),
            manifest.count,
            manifest.dimension
        )));
    }

    Ok((index, manifest))
}

/// Write `bytes` next to `path` under a temp name and fsync it
fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| RagError::InvalidArgument(format!("not a file path: {}", path.display())))?;
    name.push(".tmp");
    let tmp = path.with_file_name(name);

    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    Ok(tmp)
}
