#![forbid(unsafe_code)]

pub mod background;
pub mod compositor;
pub mod config;
pub mod core;
pub mod curve;
pub mod error;
pub mod generator;
pub mod labels;
pub mod manifest;
pub mod randomize;
pub mod scene;

pub use background::{Background, BackgroundPlane, TextureCycler};
pub use config::{
    BackgroundConfig, BackgroundMode, GeneratorConfig, LightsConfig, MasksConfig, RenderConfig,
};
pub use crate::core::{
    FrameIndex, FrameRange, ImageFormat, ImageSize, MAX_ANIMATION_FRAME, MaskDepth,
};
pub use curve::{LoxodromeSpec, loxodrome_points};
pub use error::{SyntherError, SyntherResult};
pub use generator::{BakeRenderHost, DatasetGenerator, GeneratorState, RenderHost};
pub use labels::{LabelGroup, LabeledObject, LabeledObjects};
pub use manifest::{DatasetManifest, MANIFEST_FILE_NAME};
pub use randomize::{Lights, Randomize};
pub use scene::{
    Collection, DataPath, KeyValue, Material, ObjectKind, Scene, SceneObject,
};
