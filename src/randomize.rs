//! Per-frame scene randomization.
//!
//! Every randomizable entity mutates its own state pseudo-randomly and then
//! commits the new state as a keyframe at the requested frame. The random
//! source is explicit and injectable so runs can be reproduced from a seed.

use rand::{Rng, rngs::StdRng};

use crate::{
    core::FrameIndex,
    error::{SyntherError, SyntherResult},
    labels::LabeledObjects,
    scene::{DataPath, KeyValue, ObjectKind, Scene},
};

/// Rotation magnitudes are drawn as whole degrees from this range.
pub const ROTATION_DEGREES: std::ops::RangeInclusive<u32> = 117..=454;

pub trait Randomize {
    fn insert_animation_keyframe(
        &mut self,
        scene: &mut Scene,
        rng: &mut StdRng,
        frame: FrameIndex,
    ) -> SyntherResult<()>;
}

impl Randomize for LabeledObjects {
    /// Rotates every root object around one randomly picked axis, then
    /// keyframes the full rotation vector of each root at `frame`.
    fn insert_animation_keyframe(
        &mut self,
        scene: &mut Scene,
        rng: &mut StdRng,
        frame: FrameIndex,
    ) -> SyntherResult<()> {
        for root in self.roots() {
            let axis = rng.random_range(0..3usize);
            let degrees = rng.random_range(ROTATION_DEGREES);

            let object = scene.require_object_mut(root)?;
            let mut euler = object.rotation_euler.to_array();
            euler[axis] = f64::from(degrees).to_radians();
            object.rotation_euler = euler.into();
        }

        for root in self.roots() {
            let rotation = scene.require_object(root)?.rotation_euler;
            scene.keyframe_insert(
                root,
                DataPath::RotationEuler,
                frame,
                KeyValue::Vec3(rotation),
            );
        }

        Ok(())
    }
}

/// View over the lights collection used for visibility randomization.
#[derive(Clone, Debug)]
pub struct Lights {
    names: Vec<String>,
}

impl Lights {
    pub fn from_collection(scene: &Scene, collection: Option<&str>) -> SyntherResult<Self> {
        let collection = collection.ok_or_else(|| {
            SyntherError::missing_configuration("you have to specify the lights collection")
        })?;
        if scene.collection(collection).is_none() {
            return Err(SyntherError::missing_configuration(format!(
                "lights collection '{collection}' is not in the scene"
            )));
        }

        let names: Vec<String> = scene
            .all_objects_of(collection)?
            .into_iter()
            .filter(|n| {
                scene
                    .object(n)
                    .is_some_and(|o| o.kind == ObjectKind::Light)
            })
            .collect();
        if names.is_empty() {
            return Err(SyntherError::validation(format!(
                "lights collection '{collection}' holds no lights"
            )));
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Randomize for Lights {
    /// Flips viewport and render visibility on a random non-empty sample of
    /// the light set (drawn with replacement, so a light picked twice toggles
    /// back), then keyframes the render flag of every light at `frame`.
    fn insert_animation_keyframe(
        &mut self,
        scene: &mut Scene,
        rng: &mut StdRng,
        frame: FrameIndex,
    ) -> SyntherResult<()> {
        let count = rng.random_range(1..=self.names.len());
        for _ in 0..count {
            let pick = rng.random_range(0..self.names.len());
            let light = scene.require_object_mut(&self.names[pick])?;
            light.hide_viewport = !light.hide_viewport;
            light.hide_render = !light.hide_render;
        }

        for name in &self.names {
            let hidden = scene.require_object(name)?.hide_render;
            scene.keyframe_insert(name, DataPath::HideRender, frame, KeyValue::Bool(hidden));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::{
        labels::LabeledObjects,
        scene::{Collection, SceneObject},
    };

    fn rotation_scene() -> (Scene, LabeledObjects) {
        let mut scene = Scene::new("test");
        scene
            .add_object(SceneObject::new("cup_a", ObjectKind::Mesh))
            .unwrap();
        let mut cup = Collection::new("cup");
        cup.objects = vec!["cup_a".to_string()];
        let mut grouping = Collection::new("Labeled Objects");
        grouping.children = vec!["cup".to_string()];
        scene.add_collection(cup).unwrap();
        scene.add_collection(grouping).unwrap();

        let labels = LabeledObjects::discover(&mut scene, Some("Labeled Objects")).unwrap();
        (scene, labels)
    }

    fn lights_scene(n: usize) -> (Scene, Lights) {
        let mut scene = Scene::new("test");
        let mut coll = Collection::new("Lights");
        for i in 0..n {
            let name = format!("light{i}");
            scene
                .add_object(SceneObject::new(&name, ObjectKind::Light))
                .unwrap();
            coll.objects.push(name);
        }
        scene.add_collection(coll).unwrap();
        let lights = Lights::from_collection(&scene, Some("Lights")).unwrap();
        (scene, lights)
    }

    #[test]
    fn rotation_touches_exactly_one_axis_per_step() {
        let (mut scene, mut labels) = rotation_scene();
        let mut rng = StdRng::seed_from_u64(7);

        let before = scene.object("cup_a").unwrap().rotation_euler;
        labels
            .insert_animation_keyframe(&mut scene, &mut rng, FrameIndex(0))
            .unwrap();
        let after = scene.object("cup_a").unwrap().rotation_euler;

        let changed = (0..3)
            .filter(|&i| before.to_array()[i] != after.to_array()[i])
            .count();
        assert_eq!(changed, 1);

        let set = after
            .to_array()
            .into_iter()
            .find(|&v| v != 0.0)
            .expect("one axis rotated");
        let min = f64::from(117).to_radians();
        let max = f64::from(454).to_radians();
        assert!(set >= min && set <= max);
    }

    #[test]
    fn rotation_keyframes_full_vector_per_frame() {
        let (mut scene, mut labels) = rotation_scene();
        let mut rng = StdRng::seed_from_u64(1);

        for f in 0..3 {
            labels
                .insert_animation_keyframe(&mut scene, &mut rng, FrameIndex(f))
                .unwrap();
        }

        let channel = scene.channel("cup_a", DataPath::RotationEuler).unwrap();
        assert_eq!(channel.keys.len(), 3);
        assert!(
            channel
                .keys
                .iter()
                .all(|(_, v)| matches!(v, KeyValue::Vec3(_)))
        );
    }

    #[test]
    fn lights_from_collection_requires_configuration() {
        let scene = Scene::new("empty");
        assert!(matches!(
            Lights::from_collection(&scene, None),
            Err(SyntherError::MissingConfiguration(_))
        ));
        assert!(matches!(
            Lights::from_collection(&scene, Some("Lights")),
            Err(SyntherError::MissingConfiguration(_))
        ));
    }

    #[test]
    fn toggle_keyframes_every_light_and_flags_stay_paired() {
        let (mut scene, mut lights) = lights_scene(4);
        let mut rng = StdRng::seed_from_u64(99);

        lights
            .insert_animation_keyframe(&mut scene, &mut rng, FrameIndex(0))
            .unwrap();

        for name in lights.names() {
            let channel = scene.channel(name, DataPath::HideRender).unwrap();
            assert_eq!(channel.keys.len(), 1);
            let light = scene.object(name).unwrap();
            // Viewport and render visibility flip together.
            assert_eq!(light.hide_viewport, light.hide_render);
        }
    }

    #[test]
    fn toggle_samples_with_replacement_may_cancel_out() {
        // With replacement a light can be picked twice and net zero changes;
        // the distinct-change count can legitimately be anything in 0..=N.
        for seed in 0..50u64 {
            let (mut scene, mut lights) = lights_scene(3);
            let mut rng = StdRng::seed_from_u64(seed);
            lights
                .insert_animation_keyframe(&mut scene, &mut rng, FrameIndex(0))
                .unwrap();
            let flipped = lights
                .names()
                .iter()
                .filter(|n| scene.object(n).unwrap().hide_render)
                .count();
            assert!(flipped <= 3);
        }
    }
}
