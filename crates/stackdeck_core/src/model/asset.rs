//! Keyed binary/asset slot values.

use serde::{Deserialize, Serialize};

/// Asset key of the workspace background image.
pub const BACKGROUND_IMAGE_KEY: &str = "backgroundImage";

/// Asset payload: raw bytes or an inline data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum AssetValue {
    Binary(Vec<u8>),
    DataUrl(String),
}

impl AssetValue {
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::DataUrl(url) => url.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
