//! Background strategies.
//!
//! In plane mode a dedicated plane object gets an emission material whose
//! image texture is cycled round-robin through a folder of backgrounds, and
//! whose emission strength can be randomized per frame. Custom mode leaves
//! the scene's own background untouched.

use std::path::{Path, PathBuf};

use rand::{Rng, rngs::StdRng};

use crate::{
    config::{BackgroundConfig, BackgroundMode},
    core::FrameIndex,
    error::{SyntherError, SyntherResult},
    randomize::Randomize,
    scene::{DataPath, ImageTexture, KeyValue, Material, Scene},
};

pub const PLANE_MATERIAL_NAME: &str = "BS Plane Material";

pub const ALLOWED_TEXTURE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Emission strength draws are uniform over this range.
pub const EMISSION_STRENGTH_RANGE: std::ops::RangeInclusive<f64> = 0.05..=2.99;

/// Infinite round-robin over the usable texture files of one folder, in the
/// order the filesystem enumerates them.
#[derive(Clone, Debug)]
pub struct TextureCycler {
    paths: Vec<PathBuf>,
    next: usize,
}

impl TextureCycler {
    pub fn scan(folder: &Path) -> SyntherResult<Self> {
        let entries = std::fs::read_dir(folder).map_err(|e| {
            SyntherError::not_found(format!(
                "background textures folder '{}': {e}",
                folder.display()
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SyntherError::not_found(format!(
                    "background textures folder '{}': {e}",
                    folder.display()
                ))
            })?;
            let path = entry.path();
            if path.is_file() && has_allowed_extension(&path) {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(SyntherError::not_found(format!(
                "background textures folder '{}' must hold at least one texture with an allowed \
                 extension ({})",
                folder.display(),
                ALLOWED_TEXTURE_EXTENSIONS.join(", ")
            )));
        }

        Ok(Self { paths, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The next texture path in the cycle; wraps around forever.
    pub fn next_path(&mut self) -> PathBuf {
        let path = self.paths[self.next].clone();
        self.next = (self.next + 1) % self.paths.len();
        path
    }
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            ALLOWED_TEXTURE_EXTENSIONS
                .iter()
                .any(|allowed| e.eq_ignore_ascii_case(allowed))
        })
}

#[derive(Debug)]
pub struct BackgroundPlane {
    plane: String,
    cycler: TextureCycler,
}

impl BackgroundPlane {
    /// Builds (or rebuilds) the plane's emission material and scans the
    /// texture folder. The material is recreated from scratch each run.
    pub fn new(scene: &mut Scene, config: &BackgroundConfig) -> SyntherResult<Self> {
        let plane = config
            .plane_object
            .as_deref()
            .ok_or_else(|| {
                SyntherError::missing_configuration("you have to specify the background plane")
            })?
            .to_string();
        scene.require_object(&plane)?;

        let folder = config.textures_folder.as_deref().ok_or_else(|| {
            SyntherError::missing_configuration(
                "you have to specify the background textures folder",
            )
        })?;
        let cycler = TextureCycler::scan(folder)?;

        scene.upsert_material(Material::new(PLANE_MATERIAL_NAME));
        scene.require_object_mut(&plane)?.active_material =
            Some(PLANE_MATERIAL_NAME.to_string());

        Ok(Self { plane, cycler })
    }

    pub fn plane(&self) -> &str {
        &self.plane
    }

    /// Loads the next texture of the cycle into the material's image slot.
    pub fn set_next_texture(&mut self, scene: &mut Scene) -> SyntherResult<()> {
        let path = self.cycler.next_path();
        let (width, height) = image::image_dimensions(&path).map_err(|e| {
            SyntherError::validation(format!(
                "background texture '{}' is not a readable image: {e}",
                path.display()
            ))
        })?;

        scene.require_material_mut(PLANE_MATERIAL_NAME)?.texture = Some(ImageTexture {
            source: path,
            width,
            height,
        });
        Ok(())
    }
}

#[derive(Debug)]
pub enum Background {
    Plane(BackgroundPlane),
    Custom,
}

impl Background {
    pub fn configure(scene: &mut Scene, config: &BackgroundConfig) -> SyntherResult<Self> {
        match config.mode {
            BackgroundMode::Plane => Ok(Self::Plane(BackgroundPlane::new(scene, config)?)),
            BackgroundMode::Custom => Ok(Self::Custom),
        }
    }

    pub fn is_plane(&self) -> bool {
        matches!(self, Self::Plane(_))
    }

    /// Advances the background texture; a no-op outside plane mode.
    pub fn set_next_texture(&mut self, scene: &mut Scene) -> SyntherResult<()> {
        match self {
            Self::Plane(plane) => plane.set_next_texture(scene),
            Self::Custom => Ok(()),
        }
    }
}

impl Randomize for Background {
    /// Draws a fresh emission strength and keyframes it at `frame`. Texture
    /// advancing is a render-time side effect, not part of the keyframe.
    fn insert_animation_keyframe(
        &mut self,
        scene: &mut Scene,
        rng: &mut StdRng,
        frame: FrameIndex,
    ) -> SyntherResult<()> {
        if !self.is_plane() {
            return Ok(());
        }

        let strength = rng.random_range(EMISSION_STRENGTH_RANGE);
        scene
            .require_material_mut(PLANE_MATERIAL_NAME)?
            .emission_strength = strength;
        scene.keyframe_insert(
            PLANE_MATERIAL_NAME,
            DataPath::EmissionStrength,
            frame,
            KeyValue::Float(strength),
        );
        Ok(())
    }
}
