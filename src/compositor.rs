//! Compositor node graph wiring.
//!
//! Output routing lives in the host's post-processing graph: the render-layer
//! passes are split into an RGB file output and, when segmentation masks are
//! requested, an object-index pass divided down to the mask depth and written
//! as single-channel images. Nodes are addressed by name and reused across
//! runs instead of duplicated.

use std::path::{Path, PathBuf};

use crate::{
    config::RenderConfig,
    core::{FrameIndex, ImageFormat, MaskDepth, frame_file_stem},
    error::{SyntherError, SyntherResult},
    scene::Scene,
};

pub const RENDER_LAYERS_NODE: &str = "Render Layers";
pub const COMPOSITE_NODE: &str = "Composite";
pub const RENDER_OUTPUT_NODE: &str = "BS Render Output";
pub const DIVIDE_NODE: &str = "BS Divide";
pub const SEGMENTATION_OUTPUT_NODE: &str = "BS Segmentation Output";

/// Placeholder the host substitutes with the zero-padded frame index.
pub const FRAME_SLOT_PATTERN: &str = "##########";

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorMode {
    Rgb,
    Bw,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileOutputSettings {
    pub base_path: PathBuf,
    pub file_format: ImageFormat,
    pub color_mode: ColorMode,
    pub color_depth: MaskDepth,
    pub file_slot: String,
}

impl FileOutputSettings {
    /// Full path of the artifact the host writes for `frame`.
    pub fn frame_path(&self, frame: FrameIndex) -> PathBuf {
        self.base_path.join(format!(
            "{}.{}",
            frame_file_stem(frame),
            self.file_format.extension()
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MathOperation {
    Divide,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    RenderLayers,
    Composite,
    Math {
        operation: MathOperation,
        operand: f64,
    },
    FileOutput(FileOutputSettings),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CompositorNode {
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeLink {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct NodeGraph {
    pub nodes: Vec<CompositorNode>,
    pub links: Vec<NodeLink>,
}

impl NodeGraph {
    /// Reuses the node named `name` if present (refreshing its parameters),
    /// otherwise appends it.
    pub fn ensure_node(&mut self, name: &str, kind: NodeKind) {
        match self.nodes.iter_mut().find(|n| n.name == name) {
            Some(node) => node.kind = kind,
            None => self.nodes.push(CompositorNode {
                name: name.to_string(),
                kind,
            }),
        }
    }

    pub fn remove_node(&mut self, name: &str) {
        self.nodes.retain(|n| n.name != name);
        self.links
            .retain(|l| l.from_node != name && l.to_node != name);
    }

    pub fn node(&self, name: &str) -> Option<&CompositorNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn ensure_link(
        &mut self,
        from_node: &str,
        from_socket: &str,
        to_node: &str,
        to_socket: &str,
    ) {
        let link = NodeLink {
            from_node: from_node.to_string(),
            from_socket: from_socket.to_string(),
            to_node: to_node.to_string(),
            to_socket: to_socket.to_string(),
        };
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }
}

fn require_dir(path: &Path, role: &str) -> SyntherResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    Err(SyntherError::not_found(format!(
        "{role} '{}' does not exist",
        path.display()
    )))
}

/// Render Layers feeding the Composite node; the base every run shares.
pub fn wire_base(scene: &mut Scene) {
    let graph = &mut scene.node_graph;
    graph.ensure_node(RENDER_LAYERS_NODE, NodeKind::RenderLayers);
    graph.ensure_node(COMPOSITE_NODE, NodeKind::Composite);
    graph.ensure_link(RENDER_LAYERS_NODE, "Image", COMPOSITE_NODE, "Image");
}

/// Routes the RGB render pass into a per-frame file output under the
/// configured images folder.
pub fn wire_render_output(scene: &mut Scene, render: &RenderConfig) -> SyntherResult<()> {
    require_dir(&render.rendered_images_folder, "rendered images folder")?;

    wire_base(scene);
    let graph = &mut scene.node_graph;
    graph.ensure_node(
        RENDER_OUTPUT_NODE,
        NodeKind::FileOutput(FileOutputSettings {
            base_path: render.rendered_images_folder.clone(),
            file_format: render.image_format,
            color_mode: ColorMode::Rgb,
            color_depth: MaskDepth::Eight,
            file_slot: FRAME_SLOT_PATTERN.to_string(),
        }),
    );
    graph.ensure_link(RENDER_LAYERS_NODE, "Image", RENDER_OUTPUT_NODE, "Image");
    Ok(())
}

/// Routes the object-index pass through a divide node (normalizing pass
/// indices to the mask depth) into a single-channel file output.
pub fn wire_segmentation(
    scene: &mut Scene,
    masks_folder: &Path,
    depth: MaskDepth,
) -> SyntherResult<()> {
    require_dir(masks_folder, "segmentation masks folder")?;

    wire_base(scene);
    let graph = &mut scene.node_graph;
    graph.ensure_node(
        DIVIDE_NODE,
        NodeKind::Math {
            operation: MathOperation::Divide,
            operand: f64::from(depth.max_value()),
        },
    );
    graph.ensure_node(
        SEGMENTATION_OUTPUT_NODE,
        NodeKind::FileOutput(FileOutputSettings {
            base_path: masks_folder.to_path_buf(),
            file_format: ImageFormat::Png,
            color_mode: ColorMode::Bw,
            color_depth: depth,
            file_slot: FRAME_SLOT_PATTERN.to_string(),
        }),
    );
    graph.ensure_link(RENDER_LAYERS_NODE, "IndexOB", DIVIDE_NODE, "Value");
    graph.ensure_link(DIVIDE_NODE, "Value", SEGMENTATION_OUTPUT_NODE, "Image");
    Ok(())
}

/// Drops segmentation wiring left over from a previous masks-enabled run.
pub fn clear_segmentation(scene: &mut Scene) {
    scene.node_graph.remove_node(DIVIDE_NODE);
    scene.node_graph.remove_node(SEGMENTATION_OUTPUT_NODE);
}
