//! Explicit scene store.
//!
//! The generator never reaches into ambient global state: every component
//! takes a `&mut Scene` handle. The store keeps named objects, collections,
//! emission materials, the compositor node graph, render settings, the frame
//! window/pointer, and a keyframe journal. `frame_set` applies the journal
//! with hold interpolation, so a baked scene can be stepped frame by frame.

use std::collections::BTreeMap;

use glam::DVec3;

use crate::{
    compositor::NodeGraph,
    core::{FrameIndex, ImageSize},
    error::{SyntherError, SyntherResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ObjectKind {
    Mesh,
    Light,
    Camera,
    Curve,
    Empty,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub parent: Option<String>,
    pub rotation_euler: DVec3,
    pub pass_index: u32,
    pub hide_viewport: bool,
    pub hide_render: bool,
    pub active_material: Option<String>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            rotation_euler: DVec3::ZERO,
            pass_index: 0,
            hide_viewport: false,
            hide_render: false,
            active_material: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Named group of objects, optionally holding child collections.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub objects: Vec<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            objects: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageTexture {
    pub source: std::path::PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Emission-shaded material: image texture feeding an emission shader.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Material {
    pub name: String,
    pub emission_strength: f64,
    pub texture: Option<ImageTexture>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emission_strength: 1.0,
            texture: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RenderEngine {
    Eevee,
    Cycles,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderSettings {
    pub resolution: ImageSize,
    pub engine: RenderEngine,
    pub use_pass_object_index: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: ImageSize::new(1920, 1080),
            engine: RenderEngine::Eevee,
            use_pass_object_index: false,
        }
    }
}

/// Animatable property addressed by a keyframe channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DataPath {
    /// Object euler rotation vector.
    RotationEuler,
    /// Object render-visibility flag.
    HideRender,
    /// Material emission strength.
    EmissionStrength,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum KeyValue {
    Float(f64),
    Bool(bool),
    Vec3(DVec3),
}

/// Keyframes for one (target, path) pair, sorted by frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Channel {
    pub target: String,
    pub path: DataPath,
    pub keys: Vec<(FrameIndex, KeyValue)>,
}

impl Channel {
    /// Hold interpolation: the latest key at or before `frame`.
    pub fn sample(&self, frame: FrameIndex) -> Option<&KeyValue> {
        self.keys
            .iter()
            .take_while(|(f, _)| *f <= frame)
            .last()
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub name: String,
    pub objects: BTreeMap<String, SceneObject>,
    pub collections: BTreeMap<String, Collection>,
    pub materials: BTreeMap<String, Material>,
    #[serde(default)]
    pub node_graph: NodeGraph,
    #[serde(default)]
    pub render: RenderSettings,
    pub frame_start: FrameIndex,
    pub frame_end: FrameIndex,
    pub frame_current: FrameIndex,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: BTreeMap::new(),
            collections: BTreeMap::new(),
            materials: BTreeMap::new(),
            node_graph: NodeGraph::default(),
            render: RenderSettings::default(),
            frame_start: FrameIndex(0),
            frame_end: FrameIndex(0),
            frame_current: FrameIndex(0),
            channels: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> SyntherResult<()> {
        if self.objects.contains_key(&object.name) {
            return Err(SyntherError::validation(format!(
                "object '{}' already exists",
                object.name
            )));
        }
        self.objects.insert(object.name.clone(), object);
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(name)
    }

    pub fn require_object(&self, name: &str) -> SyntherResult<&SceneObject> {
        self.objects
            .get(name)
            .ok_or_else(|| SyntherError::not_found(format!("object '{name}' is not in the scene")))
    }

    pub fn require_object_mut(&mut self, name: &str) -> SyntherResult<&mut SceneObject> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| SyntherError::not_found(format!("object '{name}' is not in the scene")))
    }

    pub fn add_collection(&mut self, collection: Collection) -> SyntherResult<()> {
        if self.collections.contains_key(&collection.name) {
            return Err(SyntherError::validation(format!(
                "collection '{}' already exists",
                collection.name
            )));
        }
        self.collections.insert(collection.name.clone(), collection);
        Ok(())
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Member object names of a collection and, recursively, of its child
    /// collections, in stored order.
    pub fn all_objects_of(&self, collection: &str) -> SyntherResult<Vec<String>> {
        let coll = self.collections.get(collection).ok_or_else(|| {
            SyntherError::not_found(format!("collection '{collection}' is not in the scene"))
        })?;

        let mut names = coll.objects.clone();
        for child in &coll.children {
            names.extend(self.all_objects_of(child)?);
        }
        Ok(names)
    }

    pub fn upsert_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    pub fn require_material_mut(&mut self, name: &str) -> SyntherResult<&mut Material> {
        self.materials.get_mut(name).ok_or_else(|| {
            SyntherError::not_found(format!("material '{name}' is not in the scene"))
        })
    }

    /// Records `value` at `frame`. A key already present at the same frame is
    /// replaced, so re-running a generation pass does not accumulate keys.
    pub fn keyframe_insert(
        &mut self,
        target: &str,
        path: DataPath,
        frame: FrameIndex,
        value: KeyValue,
    ) {
        let channel = match self
            .channels
            .iter_mut()
            .find(|c| c.target == target && c.path == path)
        {
            Some(c) => c,
            None => {
                self.channels.push(Channel {
                    target: target.to_string(),
                    path,
                    keys: Vec::new(),
                });
                self.channels.last_mut().unwrap()
            }
        };

        match channel.keys.binary_search_by_key(&frame, |(f, _)| *f) {
            Ok(i) => channel.keys[i].1 = value,
            Err(i) => channel.keys.insert(i, (frame, value)),
        }
    }

    pub fn channel(&self, target: &str, path: DataPath) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.target == target && c.path == path)
    }

    /// Moves the frame pointer and applies every channel's hold-sampled value
    /// at that frame to the live scene state.
    pub fn frame_set(&mut self, frame: FrameIndex) -> SyntherResult<()> {
        self.frame_current = frame;

        for channel in &self.channels {
            let Some(value) = channel.sample(frame) else {
                continue;
            };

            match (channel.path, value) {
                (DataPath::RotationEuler, KeyValue::Vec3(v)) => {
                    if let Some(obj) = self.objects.get_mut(&channel.target) {
                        obj.rotation_euler = *v;
                    }
                }
                (DataPath::HideRender, KeyValue::Bool(b)) => {
                    if let Some(obj) = self.objects.get_mut(&channel.target) {
                        obj.hide_render = *b;
                    }
                }
                (DataPath::EmissionStrength, KeyValue::Float(s)) => {
                    if let Some(mat) = self.materials.get_mut(&channel.target) {
                        mat.emission_strength = *s;
                    }
                }
                (path, value) => {
                    return Err(SyntherError::validation(format!(
                        "channel '{}' holds {:?} keys for path {:?}",
                        channel.target, value, path
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_cube() -> Scene {
        let mut scene = Scene::new("test");
        scene
            .add_object(SceneObject::new("Cube", ObjectKind::Mesh))
            .unwrap();
        scene
    }

    #[test]
    fn add_object_rejects_duplicates() {
        let mut scene = scene_with_cube();
        assert!(
            scene
                .add_object(SceneObject::new("Cube", ObjectKind::Mesh))
                .is_err()
        );
    }

    #[test]
    fn all_objects_recurses_into_child_collections() {
        let mut scene = scene_with_cube();
        scene
            .add_object(SceneObject::new("Lamp", ObjectKind::Light))
            .unwrap();

        let mut inner = Collection::new("inner");
        inner.objects.push("Lamp".to_string());
        let mut outer = Collection::new("outer");
        outer.objects.push("Cube".to_string());
        outer.children.push("inner".to_string());
        scene.add_collection(inner).unwrap();
        scene.add_collection(outer).unwrap();

        assert_eq!(scene.all_objects_of("outer").unwrap(), vec!["Cube", "Lamp"]);
        assert!(scene.all_objects_of("missing").is_err());
    }

    #[test]
    fn keyframe_insert_replaces_same_frame() {
        let mut scene = scene_with_cube();
        scene.keyframe_insert(
            "Cube",
            DataPath::HideRender,
            FrameIndex(3),
            KeyValue::Bool(false),
        );
        scene.keyframe_insert(
            "Cube",
            DataPath::HideRender,
            FrameIndex(3),
            KeyValue::Bool(true),
        );

        let channel = scene.channel("Cube", DataPath::HideRender).unwrap();
        assert_eq!(channel.keys.len(), 1);
        assert_eq!(channel.keys[0], (FrameIndex(3), KeyValue::Bool(true)));
    }

    #[test]
    fn frame_set_applies_hold_interpolation() {
        let mut scene = scene_with_cube();
        scene.keyframe_insert(
            "Cube",
            DataPath::RotationEuler,
            FrameIndex(0),
            KeyValue::Vec3(DVec3::new(1.0, 0.0, 0.0)),
        );
        scene.keyframe_insert(
            "Cube",
            DataPath::RotationEuler,
            FrameIndex(5),
            KeyValue::Vec3(DVec3::new(0.0, 2.0, 0.0)),
        );

        scene.frame_set(FrameIndex(4)).unwrap();
        assert_eq!(
            scene.object("Cube").unwrap().rotation_euler,
            DVec3::new(1.0, 0.0, 0.0)
        );

        scene.frame_set(FrameIndex(7)).unwrap();
        assert_eq!(
            scene.object("Cube").unwrap().rotation_euler,
            DVec3::new(0.0, 2.0, 0.0)
        );
        assert_eq!(scene.frame_current, FrameIndex(7));
    }

    #[test]
    fn frame_set_before_first_key_leaves_state_untouched() {
        let mut scene = scene_with_cube();
        scene.keyframe_insert(
            "Cube",
            DataPath::HideRender,
            FrameIndex(10),
            KeyValue::Bool(true),
        );

        scene.frame_set(FrameIndex(2)).unwrap();
        assert!(!scene.object("Cube").unwrap().hide_render);
    }

    #[test]
    fn json_roundtrip() {
        let mut scene = scene_with_cube();
        scene.upsert_material(Material::new("BS Plane Material"));
        scene.keyframe_insert(
            "BS Plane Material",
            DataPath::EmissionStrength,
            FrameIndex(1),
            KeyValue::Float(0.5),
        );

        let s = serde_json::to_string_pretty(&scene).unwrap();
        let back: Scene = serde_json::from_str(&s).unwrap();
        assert_eq!(back.objects.len(), 1);
        assert_eq!(back.channels.len(), 1);
        assert_eq!(
            back.channels[0].keys[0],
            (FrameIndex(1), KeyValue::Float(0.5))
        );
    }
}
