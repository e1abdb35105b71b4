//! Labeled-object discovery and pass-index assignment.
//!
//! The labeled grouping collection holds one child collection per semantic
//! label. Each label's members are partitioned into root objects (no parent)
//! and their descendants, and every root gets a pass index spaced evenly
//! across the mask depth range so instances stay distinguishable in the
//! segmentation encoding.

use std::collections::BTreeMap;

use crate::{
    core::MaskDepth,
    error::{SyntherError, SyntherResult},
    scene::Scene,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LabeledObject {
    pub root: String,
    pub descendants: Vec<String>,
    pub pass_index: u32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LabelGroup {
    pub label: String,
    pub members: Vec<LabeledObject>,
}

#[derive(Clone, Debug)]
pub struct LabeledObjects {
    groups: Vec<LabelGroup>,
    roots: Vec<String>,
    depth: MaskDepth,
    step: u32,
}

/// Index spacing for `model_count` objects: the full depth range divided
/// evenly, 8-bit below 256 objects, 16-bit from there on.
pub fn pass_index_step(model_count: usize) -> (MaskDepth, u32) {
    let depth = MaskDepth::for_model_count(model_count);
    (depth, depth.max_value() / model_count as u32)
}

impl LabeledObjects {
    /// Walks the configured grouping collection, partitions each label's
    /// members into (root, descendants) tuples, and writes a pass index onto
    /// every root object in discovery order.
    #[tracing::instrument(skip(scene))]
    pub fn discover(scene: &mut Scene, collection: Option<&str>) -> SyntherResult<Self> {
        let collection = collection.ok_or_else(|| {
            SyntherError::missing_configuration(
                "you have to specify the labeled objects collection",
            )
        })?;
        let grouping = scene.collection(collection).ok_or_else(|| {
            SyntherError::missing_configuration(format!(
                "labeled objects collection '{collection}' is not in the scene"
            ))
        })?;

        let label_names = grouping.children.clone();
        let mut groups = Vec::with_capacity(label_names.len());
        let mut roots = Vec::new();

        for label in label_names {
            let members = member_tuples(scene, &label)?;
            roots.extend(members.iter().map(|m| m.root.clone()));
            groups.push(LabelGroup { label, members });
        }

        if roots.is_empty() {
            return Err(SyntherError::validation(format!(
                "labeled objects collection '{collection}' holds no root objects"
            )));
        }

        let (depth, step) = pass_index_step(roots.len());

        let mut k = 0u32;
        for group in &mut groups {
            for member in &mut group.members {
                k += 1;
                member.pass_index = k * step;
                scene.require_object_mut(&member.root)?.pass_index = member.pass_index;
            }
        }

        scene.render.use_pass_object_index = true;
        tracing::debug!(
            models = roots.len(),
            bits = depth.bits(),
            step,
            "assigned pass indices"
        );

        Ok(Self {
            groups,
            roots,
            depth,
            step,
        })
    }

    pub fn groups(&self) -> &[LabelGroup] {
        &self.groups
    }

    /// All root objects across labels, in discovery order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn model_count(&self) -> usize {
        self.roots.len()
    }

    pub fn depth(&self) -> MaskDepth {
        self.depth
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Label name to the pass indices of its members, in discovery order.
    pub fn label_pass_indices(&self) -> BTreeMap<String, Vec<u32>> {
        self.groups
            .iter()
            .map(|g| {
                (
                    g.label.clone(),
                    g.members.iter().map(|m| m.pass_index).collect(),
                )
            })
            .collect()
    }
}

/// Partitions a label collection's objects into (root, descendants) tuples.
/// Descendants are attributed to the topmost ancestor of their parent chain.
fn member_tuples(scene: &Scene, label_collection: &str) -> SyntherResult<Vec<LabeledObject>> {
    let object_names = scene.all_objects_of(label_collection)?;

    let mut members: Vec<LabeledObject> = Vec::new();
    for name in &object_names {
        let object = scene.require_object(name)?;
        if object.parent.is_none() {
            members.push(LabeledObject {
                root: name.clone(),
                descendants: Vec::new(),
                pass_index: 0,
            });
        }
    }

    for name in &object_names {
        let object = scene.require_object(name)?;
        if object.parent.is_none() {
            continue;
        }

        let root = topmost_ancestor(scene, name)?;
        let member = members.iter_mut().find(|m| m.root == root).ok_or_else(|| {
            SyntherError::validation(format!(
                "object '{name}' in label '{label_collection}' has topmost ancestor '{root}' \
                 outside the label"
            ))
        })?;
        member.descendants.push(name.clone());
    }

    Ok(members)
}

fn topmost_ancestor(scene: &Scene, name: &str) -> SyntherResult<String> {
    let mut current = name.to_string();
    // Bounded by the object count, so a parent cycle cannot loop forever.
    for _ in 0..=scene.objects.len() {
        match &scene.require_object(&current)?.parent {
            Some(parent) => current = parent.clone(),
            None => return Ok(current),
        }
    }
    Err(SyntherError::validation(format!(
        "parent cycle detected while resolving ancestors of '{name}'"
    )))
}
