//! Generation run configuration.
//!
//! The host-managed settings surface, deserialized from JSON: which
//! collection holds the labeled objects, how the background and lights are
//! randomized, where rendered images and masks go, and how many dataset items
//! to produce.

use std::path::PathBuf;

use crate::{
    core::{ImageFormat, ImageSize},
    error::{SyntherError, SyntherResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    Plane,
    Custom,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BackgroundConfig {
    pub mode: BackgroundMode,
    #[serde(default)]
    pub plane_object: Option<String>,
    #[serde(default)]
    pub textures_folder: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub randomize_brightness: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LightsConfig {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default = "default_true")]
    pub randomize_toggle: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    pub resolution: ImageSize,
    pub image_format: ImageFormat,
    pub rendered_images_folder: PathBuf,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct MasksConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub segmentation_masks_folder: Option<PathBuf>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub labeled_objects_collection: Option<String>,
    pub background: BackgroundConfig,
    #[serde(default)]
    pub lights: LightsConfig,
    pub render: RenderConfig,
    #[serde(default)]
    pub masks: MasksConfig,
    pub items_to_generate: u64,
    #[serde(default)]
    pub first_item_index: u64,
    /// Randomization seed; absent means a fresh OS-entropy seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    pub fn validate(&self) -> SyntherResult<()> {
        if self.items_to_generate == 0 {
            return Err(SyntherError::validation("items_to_generate must be >= 1"));
        }
        if self.render.resolution.width == 0 || self.render.resolution.height == 0 {
            return Err(SyntherError::validation(
                "render resolution width/height must be > 0",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            collection: None,
            randomize_toggle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_config() -> GeneratorConfig {
        GeneratorConfig {
            labeled_objects_collection: Some("Labeled Objects".to_string()),
            background: BackgroundConfig {
                mode: BackgroundMode::Custom,
                plane_object: None,
                textures_folder: None,
                randomize_brightness: false,
            },
            lights: LightsConfig::default(),
            render: RenderConfig {
                resolution: ImageSize::new(1920, 1080),
                image_format: ImageFormat::Png,
                rendered_images_folder: PathBuf::from("out"),
            },
            masks: MasksConfig::default(),
            items_to_generate: 1,
            first_item_index: 0,
            seed: None,
        }
    }

    #[test]
    fn validate_rejects_zero_items() {
        let mut cfg = basic_config();
        cfg.items_to_generate = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_resolution() {
        let mut cfg = basic_config();
        cfg.render.resolution = ImageSize::new(0, 1080);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let s = r#"{
            "background": { "mode": "plane" },
            "render": {
                "resolution": [64, 64],
                "image_format": "JPEG",
                "rendered_images_folder": "out"
            },
            "items_to_generate": 3
        }"#;
        let cfg: GeneratorConfig = serde_json::from_str(s).unwrap();
        assert_eq!(cfg.background.mode, BackgroundMode::Plane);
        assert!(cfg.background.randomize_brightness);
        assert!(cfg.lights.randomize_toggle);
        assert!(!cfg.masks.enabled);
        assert_eq!(cfg.first_item_index, 0);
        assert_eq!(cfg.seed, None);
    }
}
