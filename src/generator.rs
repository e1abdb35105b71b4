//! Dataset generation orchestration.
//!
//! One generation run walks `Configuring → Validated → Animating → Rendering
//! → Done`, dropping into the terminal `Failed` state on any configuration or
//! filesystem error. Configuration and validation raise before a single
//! keyframe or file is touched; once the host render starts, failures are the
//! host's to report.

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    background::Background,
    compositor,
    config::GeneratorConfig,
    core::{FrameIndex, FrameRange},
    error::{SyntherError, SyntherResult},
    labels::LabeledObjects,
    manifest::DatasetManifest,
    randomize::{Lights, Randomize},
    scene::{RenderEngine, Scene},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorState {
    Configuring,
    Validated,
    Animating,
    Rendering,
    Done,
    Failed,
}

/// External render loop. The host owns frame iteration and pixel production;
/// it must visit every frame of `range` exactly once, ascending, and fire
/// `on_frame` on each frame transition.
pub trait RenderHost {
    fn render_animation(
        &mut self,
        scene: &mut Scene,
        range: FrameRange,
        on_frame: &mut dyn FnMut(&mut Scene) -> SyntherResult<()>,
    ) -> SyntherResult<()>;
}

/// Render host that bakes animation state without producing pixels: it steps
/// every frame, applies keyframed values, and fires the frame callback.
#[derive(Debug, Default)]
pub struct BakeRenderHost {
    pub rendered_frames: Vec<FrameIndex>,
}

impl BakeRenderHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderHost for BakeRenderHost {
    fn render_animation(
        &mut self,
        scene: &mut Scene,
        range: FrameRange,
        on_frame: &mut dyn FnMut(&mut Scene) -> SyntherResult<()>,
    ) -> SyntherResult<()> {
        for frame in range.frames() {
            scene.frame_set(frame)?;
            on_frame(scene)?;
            self.rendered_frames.push(frame);
        }
        Ok(())
    }
}

pub struct DatasetGenerator {
    config: GeneratorConfig,
    plan: FrameRange,
    labels: LabeledObjects,
    background: Background,
    lights: Option<Lights>,
    manifest: DatasetManifest,
    rng: StdRng,
    state: GeneratorState,
}

impl DatasetGenerator {
    /// Reads the configuration, wires the scene, and validates the frame
    /// plan. Nothing is animated or written yet; every configuration error
    /// raises here.
    #[tracing::instrument(skip_all, fields(scene = %scene.name))]
    pub fn new(scene: &mut Scene, config: GeneratorConfig) -> SyntherResult<Self> {
        config.validate()?;

        let plan = FrameRange::plan(config.first_item_index, config.items_to_generate)?;

        if config.masks.enabled {
            // Object-index passes need the path-traced engine.
            scene.render.engine = RenderEngine::Cycles;
        }
        scene.render.resolution = config.render.resolution;

        let labels =
            LabeledObjects::discover(scene, config.labeled_objects_collection.as_deref())?;
        let background = Background::configure(scene, &config.background)?;
        let lights = if config.lights.randomize_toggle {
            Some(Lights::from_collection(
                scene,
                config.lights.collection.as_deref(),
            )?)
        } else {
            None
        };

        compositor::wire_render_output(scene, &config.render)?;
        if config.masks.enabled {
            let masks_folder = config
                .masks
                .segmentation_masks_folder
                .as_deref()
                .ok_or_else(|| {
                    SyntherError::missing_configuration(
                        "you have to specify the segmentation masks folder",
                    )
                })?;
            compositor::wire_segmentation(scene, masks_folder, labels.depth())?;
        } else {
            compositor::clear_segmentation(scene);
        }

        let manifest = DatasetManifest::compose(&config.render, config.masks.enabled, &labels);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        tracing::debug!(
            items = config.items_to_generate,
            first = config.first_item_index,
            models = labels.model_count(),
            "generator configured"
        );

        Ok(Self {
            config,
            plan,
            labels,
            background,
            lights,
            manifest,
            rng,
            state: GeneratorState::Validated,
        })
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn frame_range(&self) -> FrameRange {
        self.plan
    }

    pub fn manifest(&self) -> &DatasetManifest {
        &self.manifest
    }

    pub fn labels(&self) -> &LabeledObjects {
        &self.labels
    }

    /// Builds the randomized animation, writes the manifest, and hands the
    /// scene to the host render loop.
    #[tracing::instrument(skip_all)]
    pub fn run(&mut self, scene: &mut Scene, host: &mut dyn RenderHost) -> SyntherResult<()> {
        let result = self.run_inner(scene, host);
        if result.is_err() {
            self.state = GeneratorState::Failed;
        }
        result
    }

    fn run_inner(&mut self, scene: &mut Scene, host: &mut dyn RenderHost) -> SyntherResult<()> {
        self.state = GeneratorState::Animating;
        self.compose_animation(scene)?;

        self.state = GeneratorState::Rendering;
        let manifest_path = self
            .manifest
            .write(&self.config.render.rendered_images_folder)?;
        tracing::debug!(path = %manifest_path.display(), "wrote dataset manifest");

        // Prime the first frame's texture before the host takes over.
        if self.background.is_plane() {
            self.background.set_next_texture(scene)?;
        }

        let background = &mut self.background;
        let plane_mode = background.is_plane();
        let mut on_frame = |scene: &mut Scene| -> SyntherResult<()> {
            // Render-time side effects not captured by keyframes.
            if plane_mode {
                background.set_next_texture(scene)?;
            }
            Ok(())
        };
        host.render_animation(scene, self.plan, &mut on_frame)?;

        self.state = GeneratorState::Done;
        Ok(())
    }

    /// Keyframes every registered entity on every frame of the plan, then
    /// resets the frame pointer to the start of the window.
    fn compose_animation(&mut self, scene: &mut Scene) -> SyntherResult<()> {
        scene.frame_start = self.plan.first;
        scene.frame_end = self.plan.last;

        let randomize_brightness =
            self.background.is_plane() && self.config.background.randomize_brightness;

        for frame in self.plan.frames() {
            scene.frame_set(frame)?;

            self.labels
                .insert_animation_keyframe(scene, &mut self.rng, frame)?;
            if let Some(lights) = self.lights.as_mut() {
                lights.insert_animation_keyframe(scene, &mut self.rng, frame)?;
            }
            if randomize_brightness {
                self.background
                    .insert_animation_keyframe(scene, &mut self.rng, frame)?;
            }
        }

        scene.frame_set(self.plan.first)?;
        Ok(())
    }
}
