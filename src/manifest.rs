//! Dataset manifest.
//!
//! One JSON record per generation run describing the rendered images and,
//! when segmentation masks are enabled, the label-to-pass-index mapping a
//! consumer needs to decode them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    config::RenderConfig,
    core::{ImageFormat, ImageSize},
    error::{SyntherError, SyntherResult},
    labels::LabeledObjects,
};

pub const MANIFEST_FILE_NAME: &str = "dataset_info.json";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatasetManifest {
    pub images_size: ImageSize,
    pub rendered_images_format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labeled_objects_info: Option<BTreeMap<String, Vec<u32>>>,
}

impl DatasetManifest {
    pub fn compose(render: &RenderConfig, masks_enabled: bool, labels: &LabeledObjects) -> Self {
        Self {
            images_size: render.resolution,
            rendered_images_format: render.image_format,
            labeled_objects_info: masks_enabled.then(|| labels.label_pass_indices()),
        }
    }

    /// Writes the manifest into `folder`, overwriting any previous one.
    /// Returns the written path.
    pub fn write(&self, folder: &Path) -> SyntherResult<PathBuf> {
        let path = folder.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SyntherError::serde(format!("serialize dataset manifest: {e}")))?;
        std::fs::write(&path, json)
            .with_context(|| format!("write dataset manifest '{}'", path.display()))?;
        Ok(path)
    }
}
