//! Binary assets (bitmaps, vector decorations, fonts) and their inline encoding
//!
//! Adapters only look assets up or record the payloads that arrive with
//! their input; nothing here fetches over the network.

use crate::{Error, Result};
use base64::Engine as Base64Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub mime: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Asset {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Build an asset from raw bytes, sniffing the MIME type.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime = sniff_mime(&data).to_string();
        Self { mime, data }
    }

    /// Decode a `data:` URI or a bare base64 payload.
    pub fn from_encoded(payload: &str) -> Result<Self> {
        let payload = payload.trim();
        if let Some(rest) = payload.strip_prefix("data:") {
            let (meta, body) = rest
                .split_once(',')
                .ok_or_else(|| Error::ImportError("malformed data URI".into()))?;
            let mime = meta.split(';').next().filter(|m| !m.is_empty());
            let data = if meta.ends_with(";base64") {
                B64.decode(body)
                    .map_err(|e| Error::ImportError(format!("invalid base64 in data URI: {}", e)))?
            } else {
                body.as_bytes().to_vec()
            };
            return Ok(match mime {
                Some(m) => Asset::new(m, data),
                None => Asset::from_bytes(data),
            });
        }
        if payload.starts_with('<') {
            return Ok(Asset::new("image/svg+xml", payload.as_bytes().to_vec()));
        }
        let data = B64
            .decode(payload)
            .map_err(|e| Error::ImportError(format!("invalid base64 asset payload: {}", e)))?;
        Ok(Asset::from_bytes(data))
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, B64.encode(&self.data))
    }
}

/// Guess a MIME type from magic bytes.
pub fn sniff_mime(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'w', b'O', b'F', b'2', ..] => "font/woff2",
        [b'w', b'O', b'F', b'F', ..] => "font/woff",
        [0x00, 0x01, 0x00, 0x00, ..] => "font/ttf",
        [b'O', b'T', b'T', b'O', ..] => "font/otf",
        _ => {
            let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
            let head = head.trim_start();
            if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
                "image/svg+xml"
            } else {
                "application/octet-stream"
            }
        }
    }
}

/// Lookup surface the compiler uses to inline referenced assets
pub trait AssetResolver {
    fn asset(&self, key: &str) -> Option<&Asset>;
}

/// Ordered, id-keyed in-memory asset collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetStore {
    assets: BTreeMap<String, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, asset: Asset) {
        self.assets.insert(key.into(), asset);
    }

    pub fn insert_encoded(&mut self, key: impl Into<String>, payload: &str) -> Result<()> {
        self.insert(key, Asset::from_encoded(payload)?);
        Ok(())
    }

    /// Add every asset from `other`, replacing entries with the same key.
    pub fn extend(&mut self, other: AssetStore) {
        self.assets.extend(other.assets);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

impl AssetResolver for AssetStore {
    fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }
}

/// Looks in `primary` first, then in `fallback`
pub struct Layered<'a> {
    pub primary: &'a dyn AssetResolver,
    pub fallback: &'a dyn AssetResolver,
}

impl AssetResolver for Layered<'_> {
    fn asset(&self, key: &str) -> Option<&Asset> {
        self.primary.asset(key).or_else(|| self.fallback.asset(key))
    }
}

mod base64_bytes {
    use super::{Base64Engine, B64};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&B64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        B64.decode(raw.as_bytes()).map_err(serde::de::Error::custom)
    }
}
