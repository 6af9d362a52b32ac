//! The loadable form of a compiled unit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current script image format version. Bumped whenever the image layout
/// changes incompatibly; loaders reject images with a different version.
pub const IMAGE_FORMAT_VERSION: u32 = 1;

/// A self-contained, loadable representation of one compiled unit.
///
/// The image carries everything a node needs to reconstruct the compiled
/// program: the canonical source, the unit name, and the set of ambient
/// bindings the program requires from its execution scope. Loading the same
/// image bytes on any node with the same engine configuration yields an
/// identical program, which is what makes a packaged archive resolvable
/// cluster-wide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptImage {
    /// Image format version; see [`IMAGE_FORMAT_VERSION`].
    pub format: u32,

    /// Fully qualified unit name.
    pub unit_name: String,

    /// Canonical source text of the unit.
    pub source: String,

    /// Names of the ambient bindings the unit requires at evaluation time.
    pub required_bindings: BTreeSet<String>,

    /// Whether the unit name is attached as debug metadata when the image is
    /// loaded, so runtime error positions name their submission.
    pub debug_info: bool,
}

impl ScriptImage {
    /// Serializes the image into its archive payload bytes.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Reconstructs an image from archive payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageDecodeError> {
        let image: Self = serde_json::from_slice(bytes)?;
        if image.format != IMAGE_FORMAT_VERSION {
            return Err(ImageDecodeError::UnsupportedFormat {
                found: image.format,
                supported: IMAGE_FORMAT_VERSION,
            });
        }
        Ok(image)
    }
}

/// Errors raised while loading a script image.
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    /// The payload is not a well-formed image.
    #[error("malformed script image: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The image was produced by an incompatible format version.
    #[error("unsupported script image format {found} (supported: {supported})")]
    UnsupportedFormat {
        /// The version found in the payload.
        found: u32,
        /// The version this build supports.
        supported: u32,
    },
}
